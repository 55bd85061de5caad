use std::env;
use std::path::Path;

use dockhand_process::CommandSpec;

use crate::settings::Settings;

/// Environment variable overriding the npm program name. Used by the
/// end-to-end tests to substitute a shim.
pub const NPM_BIN_ENV: &str = "DOCKHAND_NPM_BIN";

fn npm_program() -> String {
    env::var(NPM_BIN_ENV).unwrap_or_else(|_| "npm".to_string())
}

/// `npm --version`: sanity check that the tool is usable.
pub fn version_probe(folder: &Path) -> CommandSpec {
    CommandSpec::new(&npm_program(), ["--version"], folder)
}

/// `npm config set registry <url>`.
pub fn set_registry(registry: &str, folder: &Path) -> CommandSpec {
    CommandSpec::new(
        &npm_program(),
        ["config", "set", "registry", registry],
        folder,
    )
}

/// `npm config set always-auth true`: force authentication.
pub fn set_always_auth(folder: &Path) -> CommandSpec {
    CommandSpec::new(
        &npm_program(),
        ["config", "set", "always-auth", "true"],
        folder,
    )
}

/// `npm config set strict-ssl false`: disable TLS verification.
pub fn disable_strict_ssl(folder: &Path) -> CommandSpec {
    CommandSpec::new(
        &npm_program(),
        ["config", "set", "strict-ssl", "false"],
        folder,
    )
}

/// `npm whoami`: confirm the written credentials actually work.
pub fn whoami(folder: &Path) -> CommandSpec {
    CommandSpec::new(&npm_program(), ["whoami"], folder)
}

/// `npm view <name> versions --json`: list published versions.
pub fn view_versions(name: &str, folder: &Path) -> CommandSpec {
    CommandSpec::new(&npm_program(), ["view", name, "versions", "--json"], folder)
}

/// `npm publish`, with `--tag` and `--access` appended only when the
/// corresponding settings are non-empty.
pub fn publish(settings: &Settings) -> CommandSpec {
    let mut args = vec!["publish".to_string()];

    if !settings.tag.is_empty() {
        args.push("--tag".to_string());
        args.push(settings.tag.clone());
    }
    if !settings.access.is_empty() {
        args.push("--access".to_string());
        args.push(settings.access.clone());
    }

    CommandSpec::new(&npm_program(), args, &settings.folder)
}
