//! Dataset snapshots: metadata, entities, node types and node records in one
//! file, used to seed and save the in-memory backends.
//!
//! Two encodings are supported, chosen by file extension:
//! - `.json`: human editable
//! - `.cbor`: compact binary

use crate::entity::DynamicEntity;
use crate::error::{CoreError, CoreResult};
use crate::metadata::TypeDeclaration;
use crate::node::{NodeData, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Encoding of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// JSON.
    Json,
    /// CBOR.
    Cbor,
}

impl DatasetFormat {
    /// Picks the format from a file extension; anything but `cbor` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("cbor") => Self::Cbor,
            _ => Self::Json,
        }
    }
}

/// A complete snapshot of both sides of the synchronization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Entity type declarations.
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
    /// Entity records.
    #[serde(default)]
    pub entities: Vec<DynamicEntity>,
    /// Node type declarations.
    #[serde(default)]
    pub node_types: Vec<NodeType>,
    /// Node records.
    #[serde(default)]
    pub nodes: Vec<NodeData>,
}

impl Dataset {
    /// Reads and validates a dataset file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let dataset: Self = match DatasetFormat::from_path(path) {
            DatasetFormat::Json => serde_json::from_reader(reader)?,
            DatasetFormat::Cbor => {
                ciborium::from_reader(reader).map_err(|e| CoreError::cbor(e.to_string()))?
            }
        };
        dataset.validate()?;
        tracing::debug!(
            path = %path.display(),
            entities = dataset.entities.len(),
            nodes = dataset.nodes.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Writes the dataset, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        match DatasetFormat::from_path(path) {
            DatasetFormat::Json => serde_json::to_writer_pretty(&mut writer, self)?,
            DatasetFormat::Cbor => ciborium::into_writer(self, &mut writer)
                .map_err(|e| CoreError::cbor(e.to_string()))?,
        }
        writer.flush()?;
        Ok(())
    }

    /// Parses a JSON dataset from a string.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Checks internal consistency.
    ///
    /// Rejects duplicate entities, duplicate node records within a
    /// workspace, and nodes of undeclared node types.
    pub fn validate(&self) -> CoreResult<()> {
        let mut entities = HashSet::new();
        for entity in &self.entities {
            if !entities.insert((&entity.entity_type, &entity.identifier)) {
                return Err(CoreError::invalid_dataset(format!(
                    "duplicate entity {}",
                    entity.reference()
                )));
            }
        }

        let node_types: HashSet<&str> = self.node_types.iter().map(|t| t.name.as_str()).collect();
        let mut nodes = HashSet::new();
        for node in &self.nodes {
            if !nodes.insert((&node.identifier, node.workspace.as_str())) {
                return Err(CoreError::invalid_dataset(format!(
                    "duplicate node {} in workspace {}",
                    node.identifier, node.workspace
                )));
            }
            if !node_types.contains(node.node_type.as_str()) {
                return Err(CoreError::invalid_dataset(format!(
                    "node {} uses undeclared node type {}",
                    node.identifier, node.node_type
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentObjectRef;
    use crate::value::Value;

    fn sample() -> Dataset {
        Dataset {
            types: vec![TypeDeclaration::proxyable_entity("Acme.Shop:Product")],
            entities: vec![DynamicEntity::new("Acme.Shop:Product", "p-1")
                .with_property("title", "Chair")
                .with_property("price", 120)
                .with_property("weight", 4.5)],
            node_types: vec![NodeType::new("Acme.Shop:ProductPage")
                .with_label_property("title")
                .with_proxy_mapping("Acme.Shop:Product", "price", "displayPrice")],
            nodes: vec![NodeData::new("n-1", "/sites/shop/chair", "live", "Acme.Shop:ProductPage")
                .with_property("title", "Chair")
                .with_content_object(ContentObjectRef::new("Acme.Shop:Product", "p-1"))],
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(DatasetFormat::from_path(Path::new("a.cbor")), DatasetFormat::Cbor);
        assert_eq!(DatasetFormat::from_path(Path::new("a.CBOR")), DatasetFormat::Cbor);
        assert_eq!(DatasetFormat::from_path(Path::new("a.json")), DatasetFormat::Json);
        assert_eq!(DatasetFormat::from_path(Path::new("dataset")), DatasetFormat::Json);
    }

    #[test]
    fn save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");
        sample().save(&path).unwrap();
        assert_eq!(Dataset::load(&path).unwrap(), sample());
    }

    #[test]
    fn save_and_load_cbor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.cbor");
        sample().save(&path).unwrap();

        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded.entities[0].properties.get("price"), Some(&Value::Integer(120)));
        assert_eq!(loaded.entities[0].properties.get("weight"), Some(&Value::Float(4.5)));
        assert_eq!(loaded, sample());
    }

    #[test]
    fn rejects_duplicates() {
        let mut dataset = sample();
        dataset.entities.push(dataset.entities[0].clone());
        assert!(matches!(dataset.validate(), Err(CoreError::InvalidDataset { .. })));

        let mut dataset = sample();
        dataset.nodes.push(dataset.nodes[0].clone());
        assert!(matches!(dataset.validate(), Err(CoreError::InvalidDataset { .. })));

        // Same node in another workspace is fine.
        let mut dataset = sample();
        let mut copy = dataset.nodes[0].clone();
        copy.workspace = "user-admin".into();
        dataset.nodes.push(copy);
        assert!(dataset.validate().is_ok());
    }

    #[test]
    fn rejects_undeclared_node_type() {
        let mut dataset = sample();
        dataset.node_types.clear();
        let err = dataset.validate().unwrap_err();
        assert!(err.to_string().contains("undeclared node type"));
    }

    #[test]
    fn missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(dir.path().join("missing.json")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn sections_default_to_empty() {
        let dataset = Dataset::from_json("{}").unwrap();
        assert!(dataset.entities.is_empty());
        assert!(dataset.nodes.is_empty());
    }
}
