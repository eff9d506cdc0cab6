//! Opt-in diagnostic logging for the render pipeline.
//!
//! Writes structured lines to stderr. Disabled by default; enabled with
//! [`enable`] or by setting `CHESHIRE_DEBUG=1` and calling [`init_from_env`].
//! Logging never influences rendered output.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Environment variable checked by [`init_from_env`].
pub const ENV_VAR: &str = "CHESHIRE_DEBUG";

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Start time stored as millis since UNIX epoch.
static START_TIME_MS: AtomicU64 = AtomicU64::new(0);

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Enables debug logging.
pub fn enable() {
    START_TIME_MS.store(now_ms(), Ordering::SeqCst);
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Disables debug logging.
pub fn disable() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

/// Enables logging when `CHESHIRE_DEBUG` is set to `1` or `true`.
///
/// Returns whether logging is enabled afterwards.
pub fn init_from_env() -> bool {
    let wanted = std::env::var(ENV_VAR)
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
        .unwrap_or(false);
    if wanted {
        enable();
    }
    is_enabled()
}

/// Returns true if debug logging is enabled.
#[inline]
pub fn is_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

fn elapsed_ms() -> u64 {
    let start = START_TIME_MS.load(Ordering::Relaxed);
    if start == 0 {
        return 0;
    }
    now_ms().saturating_sub(start)
}

/// Log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Function entry/exit and per-stage detail.
    Trace,
    /// Debug information.
    Debug,
    /// Informational messages.
    Info,
    /// Warnings.
    Warn,
    /// Errors.
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    fn color_code(self) -> &'static str {
        match self {
            Level::Trace => "\x1b[90m",
            Level::Debug => "\x1b[36m",
            Level::Info => "\x1b[32m",
            Level::Warn => "\x1b[33m",
            Level::Error => "\x1b[31m",
        }
    }
}

/// Writes one log line if logging is enabled.
///
/// Format: `[+0000ms] [LEVEL] [component] message`.
pub fn log(level: Level, component: &str, message: &str) {
    if !is_enabled() {
        return;
    }

    let _ = writeln!(
        io::stderr(),
        "[+{:04}ms] {}[{:5}]\x1b[0m [{}] {}",
        elapsed_ms(),
        level.color_code(),
        level.as_str(),
        component,
        message
    );
}

/// Logs with format arguments.
#[macro_export]
macro_rules! debug_log {
    ($level:expr, $component:expr, $($arg:tt)*) => {
        if $crate::debug::is_enabled() {
            $crate::debug::log($level, $component, &format!($($arg)*));
        }
    };
}

/// Trace-level log line.
#[macro_export]
macro_rules! trace {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Trace, $component, $($arg)*)
    };
}

/// Debug-level log line.
#[macro_export]
macro_rules! debug {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Debug, $component, $($arg)*)
    };
}

/// Info-level log line.
#[macro_export]
macro_rules! info {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Info, $component, $($arg)*)
    };
}

/// Warn-level log line.
#[macro_export]
macro_rules! warn {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Warn, $component, $($arg)*)
    };
}

/// Error-level log line.
#[macro_export]
macro_rules! error {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Error, $component, $($arg)*)
    };
}

/// RAII guard timing a scope at trace level.
pub struct TimingGuard {
    component: &'static str,
    operation: String,
    start: Instant,
}

impl TimingGuard {
    /// Starts timing `operation`.
    pub fn new(component: &'static str, operation: impl Into<String>) -> Self {
        let operation = operation.into();
        if is_enabled() {
            log(Level::Trace, component, &format!("-> {operation}"));
        }
        Self { component, operation, start: Instant::now() }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if is_enabled() {
            let elapsed = self.start.elapsed();
            log(
                Level::Trace,
                self.component,
                &format!("<- {} ({:.2}ms)", self.operation, elapsed.as_secs_f64() * 1000.0),
            );
        }
    }
}

/// Times the rest of the enclosing scope.
#[macro_export]
macro_rules! time_scope {
    ($component:expr, $operation:expr) => {
        let _guard = $crate::debug::TimingGuard::new($component, $operation);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_disable() {
        disable();
        assert!(!is_enabled());

        enable();
        assert!(is_enabled());

        disable();
        assert!(!is_enabled());
    }

    #[test]
    fn test_level_as_str() {
        assert_eq!(Level::Trace.as_str(), "TRACE");
        assert_eq!(Level::Warn.as_str(), "WARN");
        assert_eq!(Level::Error.as_str(), "ERROR");
    }

    #[test]
    fn test_levels_ordered() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_log_when_disabled_does_nothing() {
        disable();
        log(Level::Debug, "test", "message");
    }

    #[test]
    fn test_timing_guard_records_operation() {
        let guard = TimingGuard::new("render", "map");
        assert_eq!(guard.component, "render");
        assert_eq!(guard.operation, "map");
        drop(guard);
    }

    #[test]
    fn test_macros_expand() {
        crate::debug!("test", "value {}", 42);
        crate::trace!("test", "trace {}", "x");
        crate::time_scope!("test", "scope");
    }
}
