//! Logging subsystem: compact or JSON stdout output plus optional rolling
//! log files.

pub mod manager;
pub mod types;


// Re-export main types and functions
pub use manager::{init, LoggingError};
pub use types::{FileLoggingConfig, LoggerConfig, StdoutConfig};

// Re-export tracing-appender types for convenience
pub use tracing_appender::rolling::Rotation;
