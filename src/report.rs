use std::{
    process::{ExitCode, Termination},
    time::Duration,
};

use crate::outcome::ExampleOutcome;

pub type ExampleOutcomes = Vec<(String, ExampleOutcome)>;

/// The outcomes of running an [`ExampleGroup`](crate::group::ExampleGroup) tree.
///
/// Each outcome is keyed by the full description of its example, the
/// non-empty group descriptions from the root down joined by spaces.
#[derive(Debug)]
#[non_exhaustive]
pub struct GroupReport {
    pub outcomes: ExampleOutcomes,
    pub duration: Duration,
}

impl GroupReport {
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.passed())
    }

    pub fn failures(&self) -> impl Iterator<Item = &(String, ExampleOutcome)> {
        self.outcomes.iter().filter(|(_, outcome)| outcome.failed())
    }
}

impl Termination for GroupReport {
    fn report(self) -> ExitCode {
        match self.all_passed() {
            true => ExitCode::SUCCESS,
            false => ExitCode::FAILURE,
        }
    }
}
