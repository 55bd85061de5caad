use std::path::Path;

use dockhand_process::CommandRunner;

use crate::error::Error;
use crate::npm;

/// Parse result for the version query's ambiguous JSON shape: npm
/// emits a bare string when exactly one version exists and an array
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionsOutput {
    Many(Vec<String>),
    Single(String),
}

impl VersionsOutput {
    fn into_versions(self) -> Vec<String> {
        match self {
            VersionsOutput::Many(versions) => versions,
            VersionsOutput::Single(version) => vec![version],
        }
    }
}

/// Parse the version query's stdout. Collection parse is attempted
/// first, then single-value; the error reported on total failure is
/// the single-value one.
fn parse_versions(raw: &str) -> Result<VersionsOutput, serde_json::Error> {
    if let Ok(versions) = serde_json::from_str::<Vec<String>>(raw) {
        return Ok(VersionsOutput::Many(versions));
    }
    serde_json::from_str::<String>(raw).map(VersionsOutput::Single)
}

/// The set of versions the registry has published for `name`.
///
/// A failing command (spawn error or non-zero exit) means the package
/// has never been published, the common case for a first publish, and
/// yields an empty set. Output that succeeds but parses as
/// neither a collection nor a single value is a hard error.
pub fn published_versions(
    runner: &mut dyn CommandRunner,
    name: &str,
    folder: &Path,
) -> Result<Vec<String>, Error> {
    let spec = npm::view_versions(name, folder);

    let result = match runner.run_captured(&spec) {
        Ok(result) => result,
        Err(_) => return Ok(Vec::new()),
    };
    if !result.success {
        return Ok(Vec::new());
    }

    let raw = result.stdout.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    parse_versions(raw)
        .map(VersionsOutput::into_versions)
        .map_err(|source| Error::VersionQueryMalformed {
            name: name.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use anyhow::{Result, bail};
    use dockhand_process::{CommandResult, CommandSpec};

    use super::*;

    /// Runner double returning a canned outcome for the view command.
    struct FakeRunner {
        outcome: Outcome,
    }

    enum Outcome {
        Stdout(&'static str),
        ExitNonZero,
        SpawnError,
    }

    impl CommandRunner for FakeRunner {
        fn run_captured(&mut self, spec: &CommandSpec) -> Result<CommandResult> {
            assert!(spec.args.starts_with(&["view".to_string()]));
            match self.outcome {
                Outcome::Stdout(raw) => Ok(CommandResult {
                    success: true,
                    exit_code: Some(0),
                    stdout: raw.to_string(),
                    stderr: String::new(),
                    duration_ms: 1,
                }),
                Outcome::ExitNonZero => Ok(CommandResult {
                    success: false,
                    exit_code: Some(1),
                    stdout: String::new(),
                    stderr: "404 Not Found".to_string(),
                    duration_ms: 1,
                }),
                Outcome::SpawnError => bail!("failed to run command"),
            }
        }

        fn run_streaming(&mut self, _spec: &CommandSpec) -> Result<CommandResult> {
            unreachable!("version query must be captured, not streamed");
        }
    }

    fn query(outcome: Outcome) -> Result<Vec<String>, Error> {
        let mut runner = FakeRunner { outcome };
        published_versions(&mut runner, "left-pad", &PathBuf::from("folderpath"))
    }

    #[test]
    fn collection_output_parses_into_the_full_set() {
        let versions = query(Outcome::Stdout("[\"1.0.0\",\"2.0.0\"]\n")).expect("query");
        assert_eq!(versions, ["1.0.0", "2.0.0"]);
    }

    #[test]
    fn single_value_output_parses_into_one_element() {
        let versions = query(Outcome::Stdout("\"1.0.0\"\n")).expect("query");
        assert_eq!(versions, ["1.0.0"]);
    }

    #[test]
    fn empty_collection_is_a_valid_not_found() {
        let versions = query(Outcome::Stdout("[]")).expect("query");
        assert!(versions.is_empty());
    }

    #[test]
    fn whitespace_only_output_is_not_found() {
        let versions = query(Outcome::Stdout("  \n")).expect("query");
        assert!(versions.is_empty());
    }

    #[test]
    fn failing_command_means_never_published() {
        let versions = query(Outcome::ExitNonZero).expect("query");
        assert!(versions.is_empty());
    }

    #[test]
    fn spawn_error_means_never_published() {
        let versions = query(Outcome::SpawnError).expect("query");
        assert!(versions.is_empty());
    }

    #[test]
    fn malformed_output_is_a_hard_error() {
        let err = query(Outcome::Stdout("{\"oops\": true}")).expect_err("must fail");
        assert!(matches!(
            err,
            Error::VersionQueryMalformed { ref name, .. } if name == "left-pad"
        ));
    }

    #[test]
    fn collection_parse_is_attempted_before_single_value() {
        // An array of non-strings must not silently coerce; it fails
        // both parses and surfaces as malformed.
        let err = query(Outcome::Stdout("[1, 2]")).expect_err("must fail");
        assert!(matches!(err, Error::VersionQueryMalformed { .. }));
    }
}
