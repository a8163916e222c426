use std::path::PathBuf;

use thiserror::Error;

/// Non-2xx answer from the Checks API.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Bad Request")]
    BadRequest,
    #[error("Forbidden")]
    Forbidden,
    #[error("API Error returned with status code={0}")]
    Other(u16),
}

impl ApiError {
    /// Maps an HTTP status to an error; `None` for 2xx.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            400 => Some(ApiError::BadRequest),
            403 => Some(ApiError::Forbidden),
            code => Some(ApiError::Other(code)),
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckupError {
    #[error("You must provide initialized credentials id ({0})")]
    MissingCredentials(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("failed to read artifact {}", path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("request to the Checks API failed")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body")]
    Schema(#[from] serde_json::Error),

    #[error("operation {0} finished without a report reference")]
    MissingReport(String),

    #[error("Report has errors: {0} issue(s) at or above the severity threshold")]
    ReportHasErrors(usize),

    #[error("no report available for operation {0} before the deadline")]
    ReportUnavailable(String),

    #[error("stopped: {0}")]
    Stopped(String),

    #[error("poll state at {}", path.display())]
    State {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("poll task ended abnormally: {0}")]
    Task(String),
}

impl CheckupError {
    /// CI exit code: 1 when the report itself fails the build, 2 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckupError::ReportHasErrors(_) | CheckupError::ReportUnavailable(_) => 1,
            _ => 2,
        }
    }

    /// The error followed by each of its sources, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            lines.push(err.to_string());
            source = err.source();
        }
        lines
    }
}
