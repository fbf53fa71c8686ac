use std::time::Duration;

use crate::example::ExampleResult;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ExampleOutcome {
    pub status: ExampleStatus,
    pub duration: Duration,
}

impl ExampleOutcome {
    pub fn passed(&self) -> bool {
        self.status.passed()
    }

    pub fn failed(&self) -> bool {
        self.status.failed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExampleStatus {
    Passed,
    Failed(ExampleFailure),
}

impl ExampleStatus {
    pub fn passed(&self) -> bool {
        matches!(self, ExampleStatus::Passed)
    }

    pub fn failed(&self) -> bool {
        matches!(self, ExampleStatus::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExampleFailure {
    Error(String),
    Panicked(String),
}

impl From<ExampleResult> for ExampleStatus {
    fn from(value: ExampleResult) -> Self {
        match value.0 {
            Ok(_) => ExampleStatus::Passed,
            Err(err) => ExampleStatus::Failed(ExampleFailure::Error(err)),
        }
    }
}
