use crate::core::ProbeResponse;
use crate::utils::error::Result;
use std::process::ExitCode;

pub const HEALTHY: &str = "HEALTHY";

/// The one line written to stdout and the matching process exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    line: String,
    code: u8,
}

impl Report {
    pub fn from_result(result: &Result<ProbeResponse>) -> Self {
        match result {
            Ok(_) => Self {
                line: HEALTHY.to_string(),
                code: 0,
            },
            Err(e) => Self {
                line: e.to_string(),
                code: e.exit_code(),
            },
        }
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code)
    }
}
