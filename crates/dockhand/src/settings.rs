use std::path::PathBuf;

use crate::error::Error;

/// How strictly [`crate::registry::registries_equivalent`] compares
/// the configured registry against the one declared in package.json.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryStrictness {
    /// Compare scheme, host, and (default-port-normalized) port.
    #[default]
    SchemeHostPort,
    /// Additionally compare URL paths, modulo a trailing slash.
    SchemeHostPortPath,
}

/// Immutable input record for a single run.
///
/// Empty strings mean "not provided"; optional publish modifiers
/// (`tag`, `access`) are only appended to the publish argv when
/// non-empty.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub username: String,
    pub password: String,
    pub token: String,
    pub email: String,
    /// Registry URL for this run. Empty means the default public
    /// registry.
    pub registry: String,
    /// Folder containing package.json; also the working directory for
    /// every npm invocation.
    pub folder: PathBuf,
    /// Fail the run (non-zero exit) instead of skipping when the
    /// target version already exists in the registry.
    pub fail_on_version_conflict: bool,
    /// Skip the `npm whoami` credential check.
    pub skip_whoami: bool,
    /// Bypass the registry reconciliation gate entirely.
    pub skip_registry_validation: bool,
    /// Disable TLS verification (`strict-ssl false`).
    pub skip_verify: bool,
    /// Dist-tag for the published version (`--tag`).
    pub tag: String,
    /// Access level for scoped packages (`--access`).
    pub access: String,
    pub strictness: RegistryStrictness,
}

impl Settings {
    /// The registry URL this run targets, falling back to the default
    /// public registry when none was configured.
    pub fn effective_registry(&self) -> &str {
        if self.registry.is_empty() {
            crate::registry::DEFAULT_REGISTRY
        } else {
            &self.registry
        }
    }

    /// Check the credential invariant: either a token, or all of
    /// username, email, and password.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.token.is_empty() {
            return Ok(());
        }

        if self.username.is_empty() {
            return Err(Error::MissingCredential("username"));
        }
        if self.email.is_empty() {
            return Err(Error::MissingCredential("email address"));
        }
        if self.password.is_empty() {
            return Err(Error::MissingCredential("password"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_auth_settings() -> Settings {
        Settings {
            username: "fakeUser".to_string(),
            password: "fakePass".to_string(),
            email: "fake@user.tst".to_string(),
            registry: "https://fakenpm.reg.org".to_string(),
            folder: PathBuf::from("folderpath"),
            ..Settings::default()
        }
    }

    #[test]
    fn token_alone_satisfies_the_invariant() {
        let settings = Settings {
            token: "abc".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn username_email_password_satisfy_the_invariant() {
        assert!(basic_auth_settings().validate().is_ok());
    }

    #[test]
    fn missing_username_is_reported_first() {
        let settings = Settings {
            password: "p".to_string(),
            email: "e@x.tst".to_string(),
            ..Settings::default()
        };
        let err = settings.validate().expect_err("must fail");
        assert_eq!(err.to_string(), "no username provided");
    }

    #[test]
    fn missing_email_is_reported() {
        let mut settings = basic_auth_settings();
        settings.email.clear();
        let err = settings.validate().expect_err("must fail");
        assert_eq!(err.to_string(), "no email address provided");
    }

    #[test]
    fn missing_password_is_reported() {
        let mut settings = basic_auth_settings();
        settings.password.clear();
        let err = settings.validate().expect_err("must fail");
        assert_eq!(err.to_string(), "no password provided");
    }

    #[test]
    fn token_bypasses_basic_credential_checks() {
        let settings = Settings {
            token: "abc".to_string(),
            username: String::new(),
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn effective_registry_defaults_when_unset() {
        let settings = Settings::default();
        assert_eq!(
            settings.effective_registry(),
            crate::registry::DEFAULT_REGISTRY
        );

        let settings = basic_auth_settings();
        assert_eq!(settings.effective_registry(), "https://fakenpm.reg.org");
    }
}
