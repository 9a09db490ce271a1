//! Span definitions for the two engine entry points.

/// Span wrapping one `observe` call.
#[macro_export]
macro_rules! observe_span {
    ($action:expr) => {
        tracing::debug_span!("foresight.observe", action = %$action)
    };
}

/// Span wrapping one `handle` call.
#[macro_export]
macro_rules! handle_span {
    ($action:expr) => {
        tracing::debug_span!("foresight.handle", action = %$action)
    };
}

/// Span wrapping one speculative computation.
#[macro_export]
macro_rules! speculation_span {
    ($action:expr, $entry_id:expr) => {
        tracing::debug_span!("foresight.speculation", action = %$action, entry_id = $entry_id)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const OBSERVE: &str = "foresight.observe";
    pub const HANDLE: &str = "foresight.handle";
    pub const SPECULATION: &str = "foresight.speculation";
}
