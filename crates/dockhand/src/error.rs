use std::path::PathBuf;

use thiserror::Error;

use crate::registry::RegistrySource;

/// Failures reading the package manifest. Any of these is fatal to
/// the run.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no package.json at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("the package.json at {} is a directory", .path.display())]
    IsDirectory { path: PathBuf },

    #[error("could not read package.json at {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse package.json at {}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no package {field} present in {}", .path.display())]
    MissingField { path: PathBuf, field: &'static str },
}

/// Everything that can end a dockhand run. Errors are surfaced
/// immediately; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The credential invariant is violated: no token, and one of
    /// username/email/password is missing.
    #[error("no {0} provided")]
    MissingCredential(&'static str),

    #[error("invalid package.json: {0}")]
    Manifest(#[from] ManifestError),

    #[error("invalid {which} registry url {url:?}: {reason}")]
    InvalidRegistryUrl {
        which: RegistrySource,
        url: String,
        reason: String,
    },

    #[error(
        "registry values do not match: configured {configured} package.json {declared}"
    )]
    RegistryMismatch {
        configured: String,
        declared: String,
    },

    #[error("could not create npmrc: {0}")]
    CredentialWrite(String),

    #[error("could not authenticate: {step}: {message}")]
    Authentication { step: String, message: String },

    #[error("could not parse registry versions for {name}")]
    VersionQueryMalformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot publish {name}@{version} due to version conflict")]
    VersionConflict { name: String, version: String },

    #[error("could not publish package: {0}")]
    Publish(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_errors_name_the_offending_path() {
        let err = ManifestError::NotFound {
            path: PathBuf::from("/work/package.json"),
        };
        assert_eq!(err.to_string(), "no package.json at /work/package.json");

        let err = ManifestError::MissingField {
            path: PathBuf::from("/work/package.json"),
            field: "version",
        };
        assert!(err.to_string().contains("no package version present"));
    }

    #[test]
    fn registry_mismatch_carries_both_urls() {
        let err = Error::RegistryMismatch {
            configured: "https://a.example.com".to_string(),
            declared: "https://b.example.com".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://a.example.com"));
        assert!(msg.contains("https://b.example.com"));
    }

    #[test]
    fn version_conflict_names_package_and_version() {
        let err = Error::VersionConflict {
            name: "left-pad".to_string(),
            version: "1.33.7".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot publish left-pad@1.33.7 due to version conflict"
        );
    }
}
