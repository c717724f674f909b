//! Trial submission plan consumed by the `backend_sim` CLI.

use serde::{Deserialize, Serialize};

use super::trial::TrialIndex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialPlan {
    #[serde(default)]
    pub trials: Vec<PlannedTrial>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedTrial {
    pub trial_index: TrialIndex,
    /// Unscaled runtime in seconds.
    pub runtime: f64,
    /// Submit right before the N-th `update()` call (0 = before the first).
    #[serde(default)]
    pub submit_at_update: u64,
}

impl TrialPlan {
    /// `count` trials with consecutive indices and the same runtime, all submitted up front.
    pub fn uniform(count: u64, runtime: f64) -> Self {
        Self {
            trials: (0..count)
                .map(|i| PlannedTrial {
                    trial_index: TrialIndex(i),
                    runtime,
                    submit_at_update: 0,
                })
                .collect(),
        }
    }

    /// Trials due right before update number `update`, in plan order.
    pub fn due_at(&self, update: u64) -> impl Iterator<Item = &PlannedTrial> {
        self.trials
            .iter()
            .filter(move |t| t.submit_at_update == update)
    }

    /// Index of the last update that still has submissions.
    pub fn last_submission(&self) -> u64 {
        self.trials
            .iter()
            .map(|t| t.submit_at_update)
            .max()
            .unwrap_or(0)
    }
}
