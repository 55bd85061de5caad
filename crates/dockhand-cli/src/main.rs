use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use dockhand::engine::{self, PublishDecision, Reporter};
use dockhand::npmrc::FsCredentialSink;
use dockhand::settings::{RegistryStrictness, Settings};
use dockhand_process::ProcessRunner;

#[derive(Parser, Debug)]
#[command(name = "dockhand", version)]
#[command(about = "Publish an npm package from CI, only when the target version is new")]
struct Cli {
    /// npm username (basic auth).
    #[arg(long, env = "PLUGIN_USERNAME", default_value = "")]
    username: String,

    /// npm password (basic auth).
    #[arg(long, env = "PLUGIN_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// npm email address (basic auth).
    #[arg(long, env = "PLUGIN_EMAIL", default_value = "")]
    email: String,

    /// npm deploy token; replaces username/password/email.
    #[arg(long, env = "PLUGIN_TOKEN", default_value = "", hide_env_values = true)]
    token: String,

    /// Registry to publish to (default: the public npm registry).
    #[arg(long, env = "PLUGIN_REGISTRY", default_value = "")]
    registry: String,

    /// Folder containing package.json.
    #[arg(long, env = "PLUGIN_FOLDER", default_value = ".")]
    folder: PathBuf,

    /// Skip the `npm whoami` credential check.
    #[arg(long, env = "PLUGIN_SKIP_WHOAMI")]
    skip_whoami: bool,

    /// Fail the step when the version already exists in the registry
    /// (default: skip with exit code 0).
    #[arg(long, env = "PLUGIN_FAIL_ON_VERSION_CONFLICT")]
    fail_on_version_conflict: bool,

    /// Dist-tag for the published version.
    #[arg(long, env = "PLUGIN_TAG", default_value = "")]
    tag: String,

    /// Access level for scoped packages (e.g. public, restricted).
    #[arg(long, env = "PLUGIN_ACCESS", default_value = "")]
    access: String,

    /// Skip reconciling the registry against package.json's
    /// publishConfig.
    #[arg(long, env = "PLUGIN_SKIP_REGISTRY_VALIDATION")]
    skip_registry_validation: bool,

    /// Disable TLS verification for npm.
    #[arg(long, env = "PLUGIN_SKIP_VERIFY")]
    skip_verify: bool,

    /// Also compare URL paths when reconciling registries.
    #[arg(long, env = "PLUGIN_REGISTRY_PATH_CHECK")]
    registry_path_check: bool,
}

/// Forwards engine progress to the log facade.
struct LogReporter;

impl Reporter for LogReporter {
    fn info(&mut self, msg: &str) {
        log::info!("{msg}");
    }

    fn warn(&mut self, msg: &str) {
        log::warn!("{msg}");
    }

    fn error(&mut self, msg: &str) {
        log::error!("{msg}");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = settings_from_cli(cli);

    if env::var(dockhand::npm::NPM_BIN_ENV).is_err() && !dockhand_process::command_exists("npm") {
        log::warn!("npm not found in PATH; authentication will fail");
    }

    let report = engine::run(
        &settings,
        &mut ProcessRunner,
        &mut FsCredentialSink,
        &mut LogReporter,
    )?;

    match report.decision {
        PublishDecision::Publish { reason } => {
            println!("{}@{}: published ({reason})", report.name, report.version);
        }
        PublishDecision::SkipAlreadyPublished { reason } => {
            println!("{}@{}: skipped ({reason})", report.name, report.version);
        }
        // A conflict surfaces as an error from the engine.
        PublishDecision::FailVersionConflict { reason } => {
            println!("{}@{}: conflict ({reason})", report.name, report.version);
        }
    }

    Ok(())
}

fn settings_from_cli(cli: Cli) -> Settings {
    Settings {
        username: with_env_fallback(cli.username, "NPM_USERNAME"),
        password: with_env_fallback(cli.password, "NPM_PASSWORD"),
        email: with_env_fallback(cli.email, "NPM_EMAIL"),
        token: with_env_fallback(cli.token, "NPM_TOKEN"),
        registry: with_env_fallback(cli.registry, "NPM_REGISTRY"),
        folder: cli.folder,
        fail_on_version_conflict: cli.fail_on_version_conflict,
        skip_whoami: cli.skip_whoami || env_flag("NPM_SKIP_WHOAMI"),
        skip_registry_validation: cli.skip_registry_validation,
        skip_verify: cli.skip_verify,
        tag: cli.tag,
        access: cli.access,
        strictness: if cli.registry_path_check {
            RegistryStrictness::SchemeHostPortPath
        } else {
            RegistryStrictness::SchemeHostPort
        },
    }
}

/// CI runners expose most settings under two names (`PLUGIN_*` and
/// `NPM_*`); clap binds the primary, this picks up the alias.
fn with_env_fallback(value: String, alias: &str) -> String {
    if value.is_empty() {
        env::var(alias).unwrap_or_default()
    } else {
        value
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).as_deref(),
        Ok("true") | Ok("TRUE") | Ok("1") | Ok("yes")
    )
}
