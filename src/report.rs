use std::path::Path;
use std::process::ExitCode;

use crate::error::Result;
use crate::fetch::FetchOutcome;

pub const FAILURE_MESSAGE: &str = "Model download failed.";

pub fn success_message(path: &Path) -> String {
    format!("Model downloaded successfully to {}", path.display())
}

/// The single line printed for a run, and whether the run succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub line: String,
    pub success: bool,
}

impl Report {
    pub fn from_result(result: &Result<FetchOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                line: success_message(&outcome.path),
                success: true,
            },
            Err(_) => Self {
                line: FAILURE_MESSAGE.to_string(),
                success: false,
            },
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
