//! Toolchain invocation and process execution.
//!
//! [`Toolchain`] describes the external "run a single source file" command
//! (e.g. `go run`). [`ProcessRunner`] executes an [`Invocation`] and captures
//! everything it prints. The runner is injected into
//! [`CachedRunner`](crate::CachedRunner) so tests can count or fake
//! executions.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

/// External command that runs one source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
    /// Program to execute (e.g. `go` or `/usr/local/go/bin/go`).
    pub program: String,
    /// Arguments placed before the staged file name (e.g. `["run"]`).
    pub run_args: Vec<String>,
    /// Prefix removed from the displayed invocation line.
    ///
    /// Keeps machine-specific install paths out of rendered pages.
    pub elide_prefix: Option<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            program: "go".to_owned(),
            run_args: vec!["run".to_owned()],
            elide_prefix: None,
        }
    }
}

impl Toolchain {
    /// Build the invocation for a staged file.
    ///
    /// `args` is split on whitespace; quoting is not supported.
    #[must_use]
    pub fn invocation(&self, staged_name: &str, args: &str, working_dir: PathBuf) -> Invocation {
        let mut argv = self.run_args.clone();
        argv.push(staged_name.to_owned());
        argv.extend(args.split_whitespace().map(str::to_owned));
        Invocation {
            program: self.program.clone(),
            args: argv,
            working_dir,
        }
    }

    /// Invocation line as shown on a page, without the prompt.
    #[must_use]
    pub fn command_line(&self, invocation: &Invocation) -> String {
        let line = invocation.command_line();
        match self.elide_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => line.replacen(prefix, "", 1),
            _ => line,
        }
    }
}

/// A single program execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute.
    pub program: String,
    /// Program arguments.
    pub args: Vec<String>,
    /// Directory the program runs in.
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Program and arguments joined by single spaces.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Why an execution did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// Output could not be collected or the process could not be awaited.
    #[error("failed to capture output of {program}: {source}")]
    Capture {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The program ran and exited unsuccessfully.
    #[error("{program} exited with {}", describe_exit(.code.as_ref()))]
    Exit { program: String, code: Option<i32> },
}

fn describe_exit(code: Option<&i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_owned(),
    }
}

/// Result of an execution.
///
/// Output is kept even when the execution failed: a failing drill's error
/// text is still worth showing.
#[derive(Debug, Default)]
pub struct ProcessOutput {
    /// Interleaved stdout and stderr.
    pub combined: Vec<u8>,
    /// Set when the program did not run to a successful exit.
    pub failure: Option<ProcessError>,
}

/// Executes invocations.
pub trait ProcessRunner: Send + Sync {
    /// Run to completion and capture combined output.
    fn run(&self, invocation: &Invocation) -> ProcessOutput;
}

/// [`ProcessRunner`] that spawns real processes.
///
/// Stdout and stderr share one pipe, so output interleaves the way it does
/// in a terminal. Stdin is closed. There is no timeout: a program that never
/// exits blocks the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, invocation: &Invocation) -> ProcessOutput {
        tracing::debug!(
            "spawning {} in {}",
            invocation.command_line(),
            invocation.working_dir.display()
        );
        match run_combined(invocation) {
            Ok(Captured { combined, status }) => {
                let failure = (!status.success()).then(|| ProcessError::Exit {
                    program: invocation.program.clone(),
                    code: status.code(),
                });
                ProcessOutput { combined, failure }
            }
            Err(failure) => ProcessOutput {
                combined: format!("{failure}\n").into_bytes(),
                failure: Some(failure),
            },
        }
    }
}

struct Captured {
    combined: Vec<u8>,
    status: ExitStatus,
}

fn run_combined(invocation: &Invocation) -> Result<Captured, ProcessError> {
    let program = || invocation.program.clone();
    let spawn_err = |source: io::Error| ProcessError::Spawn {
        program: program(),
        source,
    };

    let (mut reader, writer) = io::pipe().map_err(spawn_err)?;
    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .current_dir(&invocation.working_dir)
        .stdin(Stdio::null())
        .stdout(writer.try_clone().map_err(spawn_err)?)
        .stderr(writer);

    let mut child = command.spawn().map_err(spawn_err)?;
    // The command still owns the write ends; reading would never see EOF.
    drop(command);

    let mut combined = Vec::new();
    let read = reader.read_to_end(&mut combined);
    let status = child.wait().map_err(|source| ProcessError::Capture {
        program: program(),
        source,
    })?;
    read.map_err(|source| ProcessError::Capture {
        program: program(),
        source,
    })?;

    Ok(Captured { combined, status })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_invocation_places_staged_file_before_args() {
        let inv = Toolchain::default().invocation("flag_types.go", "-h -v", PathBuf::from("build/flag_types"));

        assert_eq!(inv.program, "go");
        assert_eq!(inv.args, vec!["run", "flag_types.go", "-h", "-v"]);
        assert_eq!(inv.working_dir, PathBuf::from("build/flag_types"));
        assert_eq!(inv.command_line(), "go run flag_types.go -h -v");
    }

    #[test]
    fn test_invocation_ignores_empty_and_repeated_spaces() {
        let toolchain = Toolchain::default();
        let inv = toolchain.invocation("double.go", "", PathBuf::from("."));
        assert_eq!(inv.args, vec!["run", "double.go"]);

        let inv = toolchain.invocation("double.go", "  a   b ", PathBuf::from("."));
        assert_eq!(inv.args, vec!["run", "double.go", "a", "b"]);
    }

    #[test]
    fn test_command_line_elides_prefix_once() {
        let toolchain = Toolchain {
            program: "/opt/go/bin/go".to_owned(),
            run_args: vec!["run".to_owned()],
            elide_prefix: Some("/opt/go/bin/".to_owned()),
        };
        let inv = toolchain.invocation("paths.go", "/opt/go/bin/", PathBuf::from("."));

        assert_eq!(toolchain.command_line(&inv), "go run paths.go /opt/go/bin/");
    }

    #[test]
    fn test_exit_error_message() {
        let err = ProcessError::Exit {
            program: "go".to_owned(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "go exited with status 2");

        let err = ProcessError::Exit {
            program: "go".to_owned(),
            code: None,
        };
        assert_eq!(err.to_string(), "go exited with a signal");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_combines_stdout_and_stderr() {
        let tmp = tempfile::TempDir::new().unwrap();
        let inv = Invocation {
            program: "sh".to_owned(),
            args: vec!["-c".to_owned(), "echo out; echo err 1>&2; echo out2".to_owned()],
            working_dir: tmp.path().to_path_buf(),
        };

        let output = SystemProcessRunner.run(&inv);

        assert!(output.failure.is_none());
        assert_eq!(String::from_utf8(output.combined).unwrap(), "out\nerr\nout2\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_keeps_output_on_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let inv = Invocation {
            program: "sh".to_owned(),
            args: vec!["-c".to_owned(), "echo boom 1>&2; exit 3".to_owned()],
            working_dir: tmp.path().to_path_buf(),
        };

        let output = SystemProcessRunner.run(&inv);

        assert_eq!(output.combined, b"boom\n".to_vec());
        assert!(matches!(
            output.failure,
            Some(ProcessError::Exit { code: Some(3), .. })
        ));
    }

    #[test]
    fn test_system_runner_reports_missing_program() {
        let tmp = tempfile::TempDir::new().unwrap();
        let inv = Invocation {
            program: "definitely-not-a-real-toolchain".to_owned(),
            args: vec![],
            working_dir: tmp.path().to_path_buf(),
        };

        let output = SystemProcessRunner.run(&inv);

        let text = String::from_utf8(output.combined).unwrap();
        assert!(text.starts_with("failed to start definitely-not-a-real-toolchain"));
        assert!(matches!(output.failure, Some(ProcessError::Spawn { .. })));
    }
}
