//! Tracing and logging setup shared by the job board binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, LogSettings};

/// Initialize process-wide logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init_with(settings: LogSettings) {
    tracing::init(settings);
}
