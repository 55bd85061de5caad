use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::Error;
use crate::registry::{self, RegistrySource};
use crate::settings::Settings;

/// Name of the credential file in the home directory.
pub const NPMRC_FILE: &str = ".npmrc";

/// Render the `.npmrc` contents for this run's credentials.
///
/// With a token the entry is keyed by the scheme-relative registry
/// URL (`//host[:port]/path/:_authToken=…`); default ports are elided
/// and the path always ends in a slash before the colon. Without a
/// token a basic-auth block is rendered instead. Pure; the caller
/// writes the result through a [`CredentialSink`].
pub fn render(settings: &Settings) -> Result<String, Error> {
    if settings.token.is_empty() {
        Ok(contents_username_password(settings))
    } else {
        contents_token(settings)
    }
}

fn contents_username_password(settings: &Settings) -> String {
    let encoded = BASE64.encode(format!("{}:{}", settings.username, settings.password));
    format!("_auth = {}\nemail = {}", encoded, settings.email)
}

fn contents_token(settings: &Settings) -> Result<String, Error> {
    let url = registry::parse_registry(RegistrySource::Configured, settings.effective_registry())?;

    // `Url` drops known default ports at parse time, so `port()` is
    // only Some for non-default ports.
    let mut key = format!("//{}", url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        key.push_str(&format!(":{port}"));
    }
    key.push_str(url.path());
    if !key.ends_with('/') {
        key.push('/');
    }

    Ok(format!("{key}:_authToken={}", settings.token))
}

/// Where the credential file lives: `$HOME/.npmrc`.
pub fn npmrc_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(NPMRC_FILE))
        .context("could not resolve home directory for .npmrc")
}

/// Capability for persisting rendered credentials. Injected into the
/// engine so tests never touch the real `$HOME`.
pub trait CredentialSink {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()>;
}

/// Writes the credential file to disk, owner-readable only.
#[derive(Debug, Default)]
pub struct FsCredentialSink;

impl CredentialSink for FsCredentialSink {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .with_context(|| format!("failed to restrict {}", path.display()))?;
        }

        Ok(())
    }
}
