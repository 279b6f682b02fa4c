//! Types command implementation.

use contentproxy_sync::CapabilityRegistry;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Mirrorable types found in a dataset.
#[derive(Debug, Serialize)]
pub struct TypesResult {
    /// Type names in discovery order.
    pub types: Vec<String>,
}

/// Runs the types command.
pub fn run(
    dataset: &Path,
    format: &str,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let backends = super::load_backends(dataset)?;
    let registry = CapabilityRegistry::discover(backends.metadata.as_ref())?;
    let result = TypesResult {
        types: registry.types().iter().map(|t| t.to_string()).collect(),
    };

    match format {
        "json" => {
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        }
        _ => {
            writeln!(out)?;
            writeln!(out, "Proxyable Entities")?;
            for name in &result.types {
                writeln!(out, "-- {}", name)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::write_shop_dataset;

    #[test]
    fn lists_types_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_shop_dataset(dir.path(), "shop.json");

        let mut out = Vec::new();
        run(&path, "text", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Proxyable Entities"));
        assert!(text.contains("-- Acme.Shop:Product"));
        assert!(text.contains("-- Acme.Shop:Brand"));
    }

    #[test]
    fn lists_types_as_json_from_cbor() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_shop_dataset(dir.path(), "shop.cbor");

        let mut out = Vec::new();
        run(&path, "json", &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["types"][0], "Acme.Shop:Product");
        assert_eq!(json["types"][1], "Acme.Shop:Brand");
    }

    #[test]
    fn missing_dataset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        assert!(run(&dir.path().join("none.json"), "text", &mut out).is_err());
    }
}
