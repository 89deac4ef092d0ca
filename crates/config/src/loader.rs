//! Role registry loading

use jsonproxy_core::{Error, Result, RoleRegistry};
use std::path::Path;
use tracing::info;

/// Read and parse the role file. The registry is read once at startup and
/// never reloaded.
pub fn load_role_registry(path: &Path) -> Result<RoleRegistry> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        Error::configuration(format!(
            "unable to open role file {}: {e}",
            path.display()
        ))
    })?;

    let registry = RoleRegistry::from_json(&source).map_err(|e| {
        Error::configuration(format!(
            "unable to parse role file {}: {e}",
            path.display()
        ))
    })?;

    info!(
        "Loaded {} roles from {}",
        registry.len(),
        path.display()
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_role_registry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "candidates": {
                    "/candidates/*": {"methods": ["GET"], "response_keys": ["id"]}
                },
                "admin": {
                    "/*": {"methods": ["*"], "response_keys": ["*"]}
                }
            }"#,
        )
        .unwrap();

        let registry = load_role_registry(file.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("candidates"));
        assert!(registry.contains("admin"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_role_registry(&dir.path().join("missing.json")).unwrap_err();

        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"candidates": ["/candidates/*"]}"#).unwrap();

        let err = load_role_registry(file.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
