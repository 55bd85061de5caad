use std::fmt;

use url::Url;

use crate::error::Error;
use crate::manifest::PackageManifest;
use crate::settings::{RegistryStrictness, Settings};

/// The canonical public npm registry, used whenever no registry is
/// configured or declared.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Which side of the reconciliation a registry URL came from. Carried
/// in [`Error::InvalidRegistryUrl`] so diagnostics name the offender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrySource {
    /// The registry configured for this run (flag or environment).
    Configured,
    /// The registry declared in package.json's publishConfig.
    Declared,
}

impl fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrySource::Configured => write!(f, "configured"),
            RegistrySource::Declared => write!(f, "package.json"),
        }
    }
}

/// Parse a registry URL, requiring a scheme and a host.
pub fn parse_registry(which: RegistrySource, raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidRegistryUrl {
        which,
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    // Scheme-less inputs like "host.org:80" parse as an opaque URL
    // with "host.org" for a scheme; requiring a host rejects them.
    if url.host_str().is_none() {
        return Err(Error::InvalidRegistryUrl {
            which,
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// Whether two registry URLs point at the same registry.
///
/// Schemes must match exactly and hosts must match case-insensitively
/// (`Url` lowercases registered hostnames at parse time, so plain
/// equality suffices). Ports compare under default-port equivalence:
/// an explicit 443/80 for https/http equals no port at all, while any
/// non-default port must match exactly. Path comparison is opt-in via
/// [`RegistryStrictness::SchemeHostPortPath`].
pub fn registries_equivalent(
    configured: &Url,
    declared: &Url,
    strictness: RegistryStrictness,
) -> bool {
    if configured.scheme() != declared.scheme() {
        return false;
    }
    if configured.host_str() != declared.host_str() {
        return false;
    }
    if configured.port_or_known_default() != declared.port_or_known_default() {
        return false;
    }

    match strictness {
        RegistryStrictness::SchemeHostPort => true,
        RegistryStrictness::SchemeHostPortPath => {
            configured.path().trim_end_matches('/') == declared.path().trim_end_matches('/')
        }
    }
}

/// Gate preventing a publish to the wrong registry: the registry
/// configured for this run must be equivalent to the one the manifest
/// declares. `skip_registry_validation` bypasses the gate entirely.
pub fn reconcile(settings: &Settings, manifest: &PackageManifest) -> Result<(), Error> {
    if settings.skip_registry_validation {
        return Ok(());
    }

    let configured_raw = settings.effective_registry();
    let declared_raw = &manifest.publish_config.registry;

    let configured = parse_registry(RegistrySource::Configured, configured_raw)?;
    let declared = parse_registry(RegistrySource::Declared, declared_raw)?;

    if registries_equivalent(&configured, &declared, settings.strictness) {
        Ok(())
    } else {
        Err(Error::RegistryMismatch {
            configured: configured_raw.to_string(),
            declared: declared_raw.to_string(),
        })
    }
}

/// Whether a registry URL is (equivalent to) the default public
/// registry. Unparseable URLs are not the default.
pub fn is_default_registry(raw: &str) -> bool {
    let Ok(candidate) = Url::parse(raw) else {
        return false;
    };
    let Ok(default) = Url::parse(DEFAULT_REGISTRY) else {
        return false;
    };
    registries_equivalent(&candidate, &default, RegistryStrictness::SchemeHostPort)
}
