use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ManifestError;
use crate::registry::DEFAULT_REGISTRY;

/// Name of the manifest file inside the package folder.
pub const MANIFEST_FILE: &str = "package.json";

/// The parts of package.json dockhand cares about. Read once per run;
/// read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: String,
    /// Opaque version string; never semantically parsed.
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "publishConfig")]
    pub publish_config: PublishConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishConfig {
    /// Registry the package declares it should be published to.
    /// Normalized to the default registry by [`read_manifest`] when
    /// absent, so downstream comparisons never see an empty value.
    #[serde(default)]
    pub registry: String,
}

/// Read and validate `<folder>/package.json`.
pub fn read_manifest(folder: &Path) -> Result<PackageManifest, ManifestError> {
    let path = folder.join(MANIFEST_FILE);

    let meta = match fs::metadata(&path) {
        Ok(meta) => meta,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::NotFound { path });
        }
        Err(source) => return Err(ManifestError::Unreadable { path, source }),
    };
    if meta.is_dir() {
        return Err(ManifestError::IsDirectory { path });
    }

    let raw = fs::read_to_string(&path)
        .map_err(|source| ManifestError::Unreadable { path: path.clone(), source })?;

    let mut manifest: PackageManifest = serde_json::from_str(&raw)
        .map_err(|source| ManifestError::Malformed { path: path.clone(), source })?;

    if manifest.name.is_empty() {
        return Err(ManifestError::MissingField { path, field: "name" });
    }
    if manifest.version.is_empty() {
        return Err(ManifestError::MissingField { path, field: "version" });
    }

    if manifest.publish_config.registry.is_empty() {
        manifest.publish_config.registry = DEFAULT_REGISTRY.to_string();
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn write_manifest(dir: &Path, contents: &str) {
        fs::write(dir.join(MANIFEST_FILE), contents).expect("write");
    }

    #[test]
    fn reads_name_version_and_declared_registry() {
        let td = tempdir().expect("tempdir");
        write_manifest(
            td.path(),
            r#"{
  "name": "left-pad",
  "version": "1.33.7",
  "publishConfig": { "registry": "https://npm.example.com" }
}"#,
        );

        let manifest = read_manifest(td.path()).expect("read");
        assert_eq!(manifest.name, "left-pad");
        assert_eq!(manifest.version, "1.33.7");
        assert_eq!(manifest.publish_config.registry, "https://npm.example.com");
    }

    #[test]
    fn defaults_registry_when_publish_config_absent() {
        let td = tempdir().expect("tempdir");
        write_manifest(td.path(), r#"{"name": "left-pad", "version": "1.33.7"}"#);

        let manifest = read_manifest(td.path()).expect("read");
        assert_eq!(manifest.publish_config.registry, DEFAULT_REGISTRY);
    }

    #[test]
    fn defaults_registry_when_declared_empty() {
        let td = tempdir().expect("tempdir");
        write_manifest(
            td.path(),
            r#"{"name": "left-pad", "version": "1.33.7", "publishConfig": {"registry": ""}}"#,
        );

        let manifest = read_manifest(td.path()).expect("read");
        assert_eq!(manifest.publish_config.registry, DEFAULT_REGISTRY);
    }

    #[test]
    fn missing_file_is_not_found() {
        let td = tempdir().expect("tempdir");
        let err = read_manifest(td.path()).expect_err("must fail");
        assert!(matches!(err, ManifestError::NotFound { .. }));
        assert!(err.to_string().contains("no package.json at"));
    }

    #[test]
    fn directory_at_manifest_path_is_rejected() {
        let td = tempdir().expect("tempdir");
        fs::create_dir(td.path().join(MANIFEST_FILE)).expect("mkdir");
        let err = read_manifest(td.path()).expect_err("must fail");
        assert!(matches!(err, ManifestError::IsDirectory { .. }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let td = tempdir().expect("tempdir");
        write_manifest(td.path(), "{not json");
        let err = read_manifest(td.path()).expect_err("must fail");
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }

    #[test]
    fn empty_name_is_a_missing_field() {
        let td = tempdir().expect("tempdir");
        write_manifest(td.path(), r#"{"name": "", "version": "1.0.0"}"#);
        let err = read_manifest(td.path()).expect_err("must fail");
        assert!(matches!(
            err,
            ManifestError::MissingField { field: "name", .. }
        ));
    }

    #[test]
    fn absent_version_is_a_missing_field() {
        let td = tempdir().expect("tempdir");
        write_manifest(td.path(), r#"{"name": "left-pad"}"#);
        let err = read_manifest(td.path()).expect_err("must fail");
        assert!(matches!(
            err,
            ManifestError::MissingField { field: "version", .. }
        ));
    }
}
