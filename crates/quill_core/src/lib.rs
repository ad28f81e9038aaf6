//! Built-in value sources and host setup for Quill.
//!
//! - [`register_builtin_injectors`] adds the date/time injectors
//!   (`current_date`, `current_time`, ...) to a registry
//! - [`WorkspaceVariablesProvider`] serves user-authored workspace variables
//!   through the provider contract
//! - [`Clock`] makes the built-ins testable against a fixed time
//! - [`TracingConfig`] installs the `tracing` subscriber

pub mod builtins;
pub mod format;
pub mod time;
pub mod tracing_setup;
pub mod workspace;

pub use builtins::{
    CURRENT_DATE, CURRENT_DATE_TIME, CURRENT_DAY, CURRENT_MONTH, CURRENT_TIME, CURRENT_YEAR,
    DATETIME_GROUP, DateTimeInjector, register_builtin_injectors,
};
pub use format::{RFC3339, strftime_pattern};
#[cfg(any(test, feature = "test-utils"))]
pub use time::MockClock;
pub use time::{Clock, ClockProvider, SystemClock};
pub use tracing_setup::{ParseTracingFormatError, TracingConfig, TracingFormat};
pub use workspace::{WorkspaceError, WorkspaceVariable, WorkspaceVariablesProvider};
