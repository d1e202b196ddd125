//! Logging facade for pool diagnostics.
//!
//! The pool reports worker reclamation and uncaught panics through a
//! minimal [`Logger`] trait so that callers decide where those lines go.
//! By default nothing is emitted; [`TracingLogger`] forwards facade lines
//! into the `tracing` stream the rest of the crate logs to.

use std::fmt;
use std::sync::Arc;

/// Destination for the pool's diagnostic lines.
///
/// Implementations must be cheap to call; the pool never invokes the
/// logger while holding its internal lock.
pub trait Logger: Send + Sync {
    /// Write one formatted line.
    fn log(&self, args: fmt::Arguments<'_>);
}

/// Logger that discards everything. This is the default.
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _args: fmt::Arguments<'_>) {}
}

/// Logger that forwards facade lines to `tracing` at info level.
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "taskpool", "{}", args);
    }
}

pub(crate) fn default_logger() -> Arc<dyn Logger> {
    Arc::new(NoopLogger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CapturingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl Logger for CapturingLogger {
        fn log(&self, args: fmt::Arguments<'_>) {
            self.lines.lock().unwrap().push(args.to_string());
        }
    }

    #[test]
    fn test_capturing_logger_receives_formatted_line() {
        let logger = CapturingLogger {
            lines: Mutex::new(Vec::new()),
        };
        logger.log(format_args!("worker at index {} expired", 3));
        assert_eq!(
            logger.lines.lock().unwrap().as_slice(),
            &["worker at index 3 expired".to_string()]
        );
    }

    #[test]
    fn test_noop_logger_accepts_lines() {
        NoopLogger.log(format_args!("dropped"));
    }
}
