//! Running the rendering executable.
//!
//! [`CommandRunner`] is the seam between a [`Document`](crate::Document) and
//! the operating system. [`SystemRunner`] spawns a real process; tests swap
//! in their own runner.

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Everything needed for one run of the executable.
pub struct Invocation<'a> {
    /// Executable to start
    pub program: &'a Path,
    /// Complete argument vector
    pub args: &'a [String],
    /// Bytes written to the process's standard input
    pub stdin: Option<&'a [u8]>,
    /// Cancellation signal observed while the process runs
    pub cancel: &'a CancelToken,
    /// Receives the process's standard output
    pub stdout: &'a mut (dyn Write + Send),
    /// Receives standard error; when `None` it is captured for the error report
    pub stderr: Option<&'a mut (dyn Write + Send)>,
}

/// Starts the executable and wires its standard streams.
pub trait CommandRunner: Send + Sync {
    /// Run to completion, honouring the cancellation signal.
    fn run(&self, invocation: Invocation<'_>) -> Result<()>;
}

/// Runs the executable as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: Invocation<'_>) -> Result<()> {
        let Invocation {
            program,
            args,
            stdin,
            cancel,
            stdout,
            stderr,
        } = invocation;

        if let Some(reason) = cancel.reason() {
            return Err(Error::Cancelled(reason));
        }

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| Error::Spawn {
            program: program.display().to_string(),
            source,
        })?;

        let child_stdin = child.stdin.take();
        let mut child_stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
        let mut child_stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("child stderr was not captured"))?;

        let outcome = thread::scope(|scope| -> Result<RunOutcome> {
            let writer = scope.spawn(move || -> io::Result<()> {
                if let (Some(mut pipe), Some(data)) = (child_stdin, stdin) {
                    match pipe.write_all(data) {
                        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                        _ => {}
                    }
                }
                Ok(())
            });
            let out_pump = scope.spawn(move || io::copy(&mut child_stdout, stdout));
            let err_pump = scope.spawn(move || -> io::Result<Option<Vec<u8>>> {
                match stderr {
                    Some(sink) => {
                        io::copy(&mut child_stderr, sink)?;
                        Ok(None)
                    }
                    None => {
                        let mut captured = Vec::new();
                        child_stderr.read_to_end(&mut captured)?;
                        Ok(Some(captured))
                    }
                }
            });

            let (status, cancelled) = loop {
                match child.try_wait() {
                    Ok(Some(status)) => break (status, None),
                    Ok(None) => {}
                    Err(e) => {
                        // the pumps only finish once the child's pipes close
                        if let Err(stop_err) = terminate(&mut child, program) {
                            log::debug!("stopping {}: {}", program.display(), stop_err);
                        }
                        return Err(e.into());
                    }
                }
                if let Some(reason) = cancel.reason() {
                    log::debug!("cancelling {}: {}", program.display(), reason);
                    break (terminate(&mut child, program)?, Some(reason));
                }
                thread::sleep(POLL_INTERVAL);
            };

            Ok(RunOutcome {
                status,
                cancelled,
                stdin: join(writer)?,
                stdout: join(out_pump)?.map(|_| ()),
                stderr: join(err_pump)?,
            })
        })?;

        if let Some(reason) = outcome.cancelled.or_else(|| {
            // a failure observed after the signal fired reports the signal
            if outcome.status.success() {
                None
            } else {
                cancel.reason()
            }
        }) {
            return Err(Error::Cancelled(reason));
        }

        let captured = outcome.stderr?;
        if !outcome.status.success() {
            return Err(Error::Process {
                code: outcome.status.code(),
                stderr: captured.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
            });
        }

        outcome.stdin?;
        outcome.stdout?;
        Ok(())
    }
}

struct RunOutcome {
    status: ExitStatus,
    cancelled: Option<crate::cancel::CancelReason>,
    stdin: io::Result<()>,
    stdout: io::Result<()>,
    stderr: io::Result<Option<Vec<u8>>>,
}

/// Kill the child and reap it.
///
/// A failed kill is logged; the process may already have exited.
fn terminate(child: &mut Child, program: &Path) -> io::Result<ExitStatus> {
    if let Err(e) = child.kill() {
        log::debug!("kill {}: {}", program.display(), e);
    }
    child.wait()
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> Result<T> {
    handle
        .join()
        .map_err(|_| Error::Io(io::Error::other("stream pump thread panicked")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cancel::CancelReason;
    use std::path::PathBuf;

    fn sh() -> PathBuf {
        PathBuf::from("/bin/sh")
    }

    fn script(body: &str) -> Vec<String> {
        vec!["-c".to_string(), body.to_string()]
    }

    fn run(
        body: &str,
        stdin: Option<&[u8]>,
        cancel: &CancelToken,
        stderr: Option<&mut (dyn Write + Send)>,
    ) -> (Result<()>, Vec<u8>) {
        let program = sh();
        let args = script(body);
        let mut out = Vec::new();
        let result = SystemRunner.run(Invocation {
            program: &program,
            args: &args,
            stdin,
            cancel,
            stdout: &mut out,
            stderr: stderr.map(|s| s as &mut (dyn Write + Send)),
        });
        (result, out)
    }

    #[test]
    fn test_terminate_kills_and_reaps() {
        let program = sh();
        let mut child = Command::new(&program)
            .args(script("exec sleep 5"))
            .spawn()
            .unwrap();

        let started = std::time::Instant::now();
        let status = terminate(&mut child, &program).unwrap();
        assert!(!status.success());
        assert!(started.elapsed() < Duration::from_secs(4));

        // a second call finds the child gone and still reports its status
        assert_eq!(terminate(&mut child, &program).unwrap(), status);
    }

    #[test]
    fn test_stdin_is_piped_to_stdout() {
        let (result, out) = run("cat", Some(b"<p>hello</p>"), &CancelToken::new(), None);
        result.unwrap();
        assert_eq!(out, b"<p>hello</p>");
    }

    #[test]
    fn test_failure_carries_stderr() {
        let (result, out) = run(
            "printf partial; echo boom >&2; exit 3",
            None,
            &CancelToken::new(),
            None,
        );
        match result {
            Err(Error::Process { code, stderr }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.as_deref(), Some("boom\n"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // partial output is still delivered
        assert_eq!(out, b"partial");
    }

    #[test]
    fn test_redirected_stderr_is_not_captured() {
        let mut sink = Vec::new();
        let (result, _) = run(
            "echo boom >&2; exit 1",
            None,
            &CancelToken::new(),
            Some(&mut sink),
        );
        match result {
            Err(Error::Process { code, stderr }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, None);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(sink, b"boom\n");
    }

    #[test]
    fn test_deadline_kills_process() {
        let token = CancelToken::with_timeout(Duration::from_millis(100));
        let (result, _) = run("exec sleep 5", None, &token, None);
        assert!(matches!(
            result,
            Err(Error::Cancelled(CancelReason::DeadlineExceeded))
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let (result, out) = run("echo should-not-run", None, &token, None);
        assert!(matches!(result, Err(Error::Cancelled(CancelReason::Cancelled))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_spawn_failure() {
        let program = PathBuf::from("/nonexistent/wkhtmltopdf");
        let mut out = Vec::new();
        let err = SystemRunner
            .run(Invocation {
                program: &program,
                args: &[],
                stdin: None,
                cancel: &CancelToken::new(),
                stdout: &mut out,
                stderr: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
