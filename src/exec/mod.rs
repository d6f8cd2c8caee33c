// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`tools`] builds the command lines for the external tools.
//! - [`relay`] streams a child's output into a `JobReporter` and extracts
//!   progress percentages.
//! - [`backend`] provides the `ProcessBackend` trait and the real
//!   `tokio::process` implementation; tests swap in a fake.

pub mod backend;
pub mod relay;
pub mod tools;

pub use backend::{BoxFuture, ProcessBackend, ProcessOutcome, RealProcessBackend};
pub use relay::{OutputRelay, ProgressScanner};
pub use tools::{ToolInvocation, ToolKind};
