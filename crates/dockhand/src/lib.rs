//! # Dockhand
//!
//! Conditional npm publishing for CI pipelines.
//!
//! Dockhand is a single pipeline step that publishes a package to an
//! npm-compatible registry only when it is safe and useful to do so:
//! credentials are validated up front, the configured registry is
//! reconciled against the one the manifest declares, and the target
//! version is checked against the registry before any publish is
//! attempted.
//!
//! ## Pipeline
//!
//! The flow is **validate → reconcile → authenticate → decide →
//! publish**:
//!
//! 1. [`settings::Settings::validate`] enforces the credential
//!    invariant (a token, or username + email + password).
//! 2. [`manifest::read_manifest`] loads `package.json` and normalizes
//!    the declared publish registry.
//! 3. [`registry::reconcile`] gates the run on registry equivalence
//!    (scheme + host + default-port-normalized port).
//! 4. [`npmrc::render`] produces the credential file, written through
//!    an injected [`npmrc::CredentialSink`].
//! 5. [`engine::run`] authenticates via the npm CLI, queries the
//!    published version set, and publishes, skips, or fails per
//!    [`engine::decide`].
//!
//! Everything is synchronous and sequential; external commands are
//! blocking calls behind the `dockhand-process` capability, and no
//! operation is ever retried.
//!
//! ## Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use dockhand::{engine, settings::Settings};
//! use dockhand::npmrc::FsCredentialSink;
//! use dockhand_process::ProcessRunner;
//!
//! let settings = Settings {
//!     token: "deploy-token".to_string(),
//!     folder: PathBuf::from("."),
//!     ..Settings::default()
//! };
//! let report = engine::run(
//!     &settings,
//!     &mut ProcessRunner,
//!     &mut FsCredentialSink,
//!     &mut my_reporter,
//! )?;
//! ```
//!
//! ## CLI Usage
//!
//! For command-line usage, see the `dockhand-cli` crate.

/// The sequential pipeline, the publish decision, and the `Reporter`
/// progress seam.
pub mod engine;

/// Typed error taxonomy for everything that can end a run.
pub mod error;

/// package.json reading and normalization.
pub mod manifest;

/// npm command construction (argv assembly only; execution lives in
/// `dockhand-process`).
pub mod npm;

/// Credential rendering and the `.npmrc` sink capability.
pub mod npmrc;

/// Registry URL parsing, equivalence, and the reconciliation gate.
pub mod registry;

/// The immutable per-run settings record.
pub mod settings;

/// Version-existence checking via the npm CLI.
pub mod versions;

/// External process execution capability.
/// Re-exported from the dockhand-process microcrate.
pub use dockhand_process as process;
