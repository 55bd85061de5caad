use dockhand_process::{CommandRunner, CommandSpec};

use crate::error::Error;
use crate::manifest::{self, PackageManifest};
use crate::npm;
use crate::npmrc::{self, CredentialSink};
use crate::registry;
use crate::settings::Settings;
use crate::versions;

/// Progress reporting seam. The CLI forwards these to its logger.
pub trait Reporter {
    fn info(&mut self, msg: &str);
    fn warn(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// Outcome of the publish decision, with the reason it was taken.
/// Fully determined by Settings + Manifest + VersionSet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishDecision {
    Publish { reason: String },
    SkipAlreadyPublished { reason: String },
    FailVersionConflict { reason: String },
}

/// What a completed (or intentionally skipped) run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub name: String,
    pub version: String,
    pub decision: PublishDecision,
}

/// Decide whether the package should be published. Pure; identical
/// inputs always yield the same decision.
pub fn decide(
    settings: &Settings,
    manifest: &PackageManifest,
    published: &[String],
) -> PublishDecision {
    if published.iter().any(|v| v == &manifest.version) {
        let reason = format!(
            "version {} already exists in the registry",
            manifest.version
        );
        if settings.fail_on_version_conflict {
            PublishDecision::FailVersionConflict { reason }
        } else {
            PublishDecision::SkipAlreadyPublished { reason }
        }
    } else {
        let reason = if published.is_empty() {
            "package not found in the registry".to_string()
        } else {
            format!("version {} not found in the registry", manifest.version)
        };
        PublishDecision::Publish { reason }
    }
}

/// Execute the full pipeline:
///
/// ```text
/// validate -> manifest -> reconcile -> write credentials
///     -> authenticate -> check versions -> publish | skip | fail
/// ```
///
/// Strictly sequential, no retries. Any error aborts the run.
pub fn run(
    settings: &Settings,
    runner: &mut dyn CommandRunner,
    sink: &mut dyn CredentialSink,
    reporter: &mut dyn Reporter,
) -> Result<RunReport, Error> {
    settings.validate()?;
    if settings.token.is_empty() {
        reporter.info(&format!(
            "using basic credentials for {} <{}>",
            settings.username, settings.email
        ));
    } else {
        reporter.info("using token credentials");
    }

    let manifest = manifest::read_manifest(&settings.folder)?;
    reporter.info(&format!(
        "found package {}@{}",
        manifest.name, manifest.version
    ));

    registry::reconcile(settings, &manifest)?;

    let contents = npmrc::render(settings)?;
    let npmrc_path = npmrc::npmrc_path().map_err(|e| Error::CredentialWrite(format!("{e:#}")))?;
    reporter.info(&format!("writing credentials to {}", npmrc_path.display()));
    sink.write(&npmrc_path, &contents)
        .map_err(|e| Error::CredentialWrite(format!("{e:#}")))?;

    authenticate(settings, runner, reporter)?;

    reporter.info(&format!(
        "checking the registry for published versions of {}",
        manifest.name
    ));
    let published = versions::published_versions(runner, &manifest.name, &settings.folder)?;

    let decision = decide(settings, &manifest, &published);
    match &decision {
        PublishDecision::Publish { reason } => {
            reporter.info(&format!(
                "publishing {}@{}: {reason}",
                manifest.name, manifest.version
            ));
            run_streaming_step(runner, &npm::publish(settings)).map_err(Error::Publish)?;
        }
        PublishDecision::SkipAlreadyPublished { reason } => {
            reporter.info(&format!("not publishing: {reason}"));
        }
        PublishDecision::FailVersionConflict { reason } => {
            reporter.error(&format!("not publishing: {reason}"));
            return Err(Error::VersionConflict {
                name: manifest.name,
                version: manifest.version,
            });
        }
    }

    Ok(RunReport {
        name: manifest.name,
        version: manifest.version,
        decision,
    })
}

/// The authenticate sequence: version probe, registry config when not
/// targeting the default registry, always-auth, optional strict-ssl
/// off, and the whoami credential check unless skipped. Any command
/// failure aborts the run.
fn authenticate(
    settings: &Settings,
    runner: &mut dyn CommandRunner,
    reporter: &mut dyn Reporter,
) -> Result<(), Error> {
    reporter.info("authenticating with the registry");

    let folder = &settings.folder;
    let mut steps = vec![npm::version_probe(folder)];

    let registry_url = settings.effective_registry();
    if !registry::is_default_registry(registry_url) {
        steps.push(npm::set_registry(registry_url, folder));
    }

    steps.push(npm::set_always_auth(folder));

    if settings.skip_verify {
        reporter.warn("TLS verification disabled for this run");
        steps.push(npm::disable_strict_ssl(folder));
    }

    if !settings.skip_whoami {
        steps.push(npm::whoami(folder));
    }

    for spec in &steps {
        run_streaming_step(runner, spec).map_err(|message| Error::Authentication {
            step: spec.display_line(),
            message,
        })?;
    }

    Ok(())
}

fn run_streaming_step(runner: &mut dyn CommandRunner, spec: &CommandSpec) -> Result<(), String> {
    match runner.run_streaming(spec) {
        Ok(result) if result.success => Ok(()),
        Ok(result) => Err(match result.exit_code {
            Some(code) => format!("exited with code {code}"),
            None => "terminated by signal".to_string(),
        }),
        Err(e) => Err(format!("{e:#}")),
    }
}
