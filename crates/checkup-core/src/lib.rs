//! Upload a build artifact to the Checks API, wait for the analysis
//! operation, and turn the resulting report into a CI verdict.

pub mod api;
pub mod artifact;
pub mod auth;
pub mod error;
pub mod report;
pub mod rules;
pub mod util;
pub mod workflow;

pub use error::{ApiError, CheckupError};

pub const TOOL_NAME: &str = "checkup";
