//! Termination Handler
//!
//! Single exit point for governance failures. Logs the reason and the exit
//! code and hands the code back to `main`, which returns it to the process.
//! Nothing here calls `std::process::exit`.

use super::policy::Enforcement;
use crate::error::{GovernanceError, EXIT_GOVERNANCE, EXIT_SUCCESS};
use std::process::ExitCode;
use tracing::error;

/// Exit code a finished gate run resolves to
///
/// Streaming runs that continue past a denial still exit 0; errors carry
/// their own code.
pub fn exit_code_for(outcome: Result<Enforcement, &GovernanceError>) -> u8 {
    match outcome {
        Ok(Enforcement::Proceed | Enforcement::ContinueWithDrift) => EXIT_SUCCESS,
        Ok(Enforcement::Halt) => EXIT_GOVERNANCE,
        Err(e) => e.exit_code(),
    }
}

/// A governance-driven process exit, already logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the exit must be returned from main"]
pub struct GovernanceExit {
    pub exit_code: u8,
}

impl From<GovernanceExit> for ExitCode {
    fn from(exit: GovernanceExit) -> Self {
        ExitCode::from(exit.exit_code)
    }
}

pub struct TerminationHandler;

impl TerminationHandler {
    /// Log a termination and build the exit the caller must return
    ///
    /// `rows_started` reports whether any data had been processed when the
    /// run was stopped.
    pub fn terminate(reason: impl AsRef<str>, exit_code: u8, rows_started: bool) -> GovernanceExit {
        error!("{}", reason.as_ref());
        if !rows_started {
            error!("PIPELINE TERMINATED BEFORE DATA PROCESSING");
            error!("NO ROWS WERE PROCESSED");
        }
        error!("GOVERNANCE EXIT CODE: {}", exit_code);

        GovernanceExit { exit_code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EXIT_INFRASTRUCTURE;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            BufferWriter(Arc::clone(&self.0))
        }
    }

    impl io::Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut guard = self
                .0
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
            guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(reason: &str, exit_code: u8, rows_started: bool) -> (GovernanceExit, String) {
        let sink = SharedBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_ansi(false)
            .with_max_level(Level::INFO)
            .finish();

        let exit = tracing::subscriber::with_default(subscriber, || {
            TerminationHandler::terminate(reason, exit_code, rows_started)
        });

        let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        (exit, text)
    }

    #[test]
    fn test_terminate_before_rows_logs_boundary() {
        let (exit, logs) = capture(
            "Compatibility enforcement failed (batch mode).",
            EXIT_GOVERNANCE,
            false,
        );

        assert_eq!(exit.exit_code, 2);
        assert!(logs.contains("Compatibility enforcement failed (batch mode)."));
        assert!(logs.contains("PIPELINE TERMINATED BEFORE DATA PROCESSING"));
        assert!(logs.contains("NO ROWS WERE PROCESSED"));
        assert!(logs.contains("GOVERNANCE EXIT CODE: 2"));

        let lines: Vec<&str> = logs.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|line| line.contains("ERROR")));
        assert!(lines[0].contains("Compatibility enforcement failed"));
        assert!(lines[3].contains("GOVERNANCE EXIT CODE: 2"));
    }

    #[test]
    fn test_terminate_after_rows_started_skips_boundary() {
        let (exit, logs) = capture("Contract drift detected mid-run", EXIT_GOVERNANCE, true);

        assert_eq!(exit.exit_code, EXIT_GOVERNANCE);
        assert!(logs.contains("Contract drift detected mid-run"));
        assert!(!logs.contains("PIPELINE TERMINATED BEFORE DATA PROCESSING"));
        assert!(!logs.contains("NO ROWS WERE PROCESSED"));
        assert!(logs.contains("GOVERNANCE EXIT CODE: 2"));
        assert_eq!(logs.lines().count(), 2);
    }

    #[test]
    fn test_exit_converts_to_process_code() {
        let (exit, logs) = capture("Contract file not found", EXIT_INFRASTRUCTURE, false);
        assert_eq!(exit.exit_code, 1);
        assert!(logs.contains("GOVERNANCE EXIT CODE: 1"));

        let code: ExitCode = exit.into();
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::from(1)));
    }

    #[test]
    fn test_exit_code_for_enforcement() {
        assert_eq!(exit_code_for(Ok(Enforcement::Proceed)), 0);
        assert_eq!(exit_code_for(Ok(Enforcement::ContinueWithDrift)), 0);
        assert_eq!(exit_code_for(Ok(Enforcement::Halt)), 2);
    }

    #[test]
    fn test_exit_code_for_errors() {
        let missing = GovernanceError::MissingArtifact {
            kind: "Contract",
            path: PathBuf::from("contracts/contract_v2.json"),
        };
        let unknown = GovernanceError::UnknownMode("lenient".to_string());

        assert_eq!(exit_code_for(Err(&missing)), EXIT_INFRASTRUCTURE);
        assert_eq!(exit_code_for(Err(&unknown)), EXIT_GOVERNANCE);
    }
}
