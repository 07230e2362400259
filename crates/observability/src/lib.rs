//! Process-wide logging setup shared by every binary.

/// Subscriber configuration (filters, output format).
pub mod subscriber;

pub use subscriber::LogFormat;

/// Initialize process-wide tracing/logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    subscriber::init();
}
