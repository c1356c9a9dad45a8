//! The single fatal path of the crate.
//!
//! Every contract violation, unsupported operation and non-graceful
//! allocation failure ends up in [`fail`]. By default it unwinds with an
//! [`Exception`] payload that callers may catch with
//! [`std::panic::catch_unwind`]; with the `abort-on-fail` feature the
//! process is aborted after the diagnostic is logged.

use std::{fmt, panic::Location};

/// `false` when the crate is built with `no-bounds-check`.
pub const BOUNDS_CHECK: bool = cfg!(not(feature = "no-bounds-check"));

/// Unwind payload carried by [`fail`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{file}:{line}: {msg}")]
pub struct Exception {
    pub file: &'static str,
    pub line: u32,
    pub msg: String,
}

#[cold]
#[track_caller]
pub fn fail(args: fmt::Arguments<'_>) -> ! {
    let location = Location::caller();
    let exception = Exception {
        file: location.file(),
        line: location.line(),
        msg: args.to_string(),
    };

    tracing::error!(file = exception.file, line = exception.line, "{}", exception.msg);

    if cfg!(feature = "abort-on-fail") {
        std::process::abort();
    }
    std::panic::panic_any(exception)
}

/// Formatted log sink, `kind` picks the level.
pub fn log(kind: &str, args: fmt::Arguments<'_>) {
    match kind {
        "error" | "panic" => tracing::error!(kind, "{args}"),
        "warn" | "assert" => tracing::warn!(kind, "{args}"),
        "debug" => tracing::debug!(kind, "{args}"),
        "trace" => tracing::trace!(kind, "{args}"),
        _ => tracing::info!(kind, "{args}"),
    }
}

#[macro_export]
macro_rules! fail {
    ($($arg:tt)*) => {
        $crate::panic::fail(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! fail_if {
    ($cond:expr $(,)?) => {
        if $cond {
            $crate::panic::fail(format_args!("{}", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if $cond {
            $crate::panic::fail(format_args!($($arg)+));
        }
    };
}

#[macro_export]
macro_rules! check_bounds {
    ($cond:expr $(,)?) => {
        if $crate::panic::BOUNDS_CHECK && !($cond) {
            $crate::panic::fail(format_args!("Bounds check failure: {}", stringify!($cond)));
        }
    };
}

/// Checked only with `debug_assertions`.
#[macro_export]
macro_rules! debug_check {
    ($cond:expr $(,)?) => {
        if cfg!(debug_assertions) && !($cond) {
            $crate::panic::log("assert", format_args!("{}", stringify!($cond)));
            $crate::panic::fail(format_args!("Assertion failed: {}", stringify!($cond)));
        }
    };
}

#[macro_export]
macro_rules! warn_if {
    ($cond:expr $(,)?) => {
        if $cond {
            $crate::panic::log(
                "warn",
                format_args!("{}:{}: {}", file!(), line!(), stringify!($cond)),
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::test_utils::catch_exception;

    #[test]
    fn test_fail_reports_caller_location() {
        let line = line!() + 1;
        let e = catch_exception(|| fail!("broken {}", 42));

        assert_eq!(e.msg, "broken 42");
        assert_eq!(e.line, line);
        assert!(e.file.ends_with("panic.rs"));
        assert_eq!(e.to_string(), format!("{}:{}: broken 42", e.file, line));
    }

    #[test]
    fn test_fail_if() {
        let e = catch_exception(|| fail_if!(1 + 1 == 2));
        assert_eq!(e.msg, "1 + 1 == 2");

        let e = catch_exception(|| fail_if!(true, "custom {}", "message"));
        assert_eq!(e.msg, "custom message");

        fail_if!(false);
    }

    #[test]
    #[cfg(not(feature = "no-bounds-check"))]
    fn test_check_bounds_message() {
        let len = 3;
        let e = catch_exception(|| check_bounds!(4 < len));
        assert_eq!(e.msg, "Bounds check failure: 4 < len");
    }

    #[test]
    #[cfg(debug_assertions)]
    fn test_debug_check() {
        let e = catch_exception(|| debug_check!(2 > 3));
        assert_eq!(e.msg, "Assertion failed: 2 > 3");

        debug_check!(3 > 2);
    }

    #[test]
    fn test_warn_if_does_not_fail() {
        crate::test_utils::init_tracing();
        warn_if!(true);
        warn_if!(false);
    }
}
