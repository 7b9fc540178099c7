//! Evaluation counters and per-run reports.

use crate::params::RunParameters;
use cellfield_core::types::SignalId;
use serde::{Deserialize, Serialize};

/// The four ways a source box can reach a target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvalPath {
    /// Every source-target pair summed exactly.
    DirectDirect,
    /// Each source Gaussian expanded into the target box's Taylor series.
    DirectTaylor,
    /// Source box Hermite series evaluated at each target.
    HermiteDirect,
    /// Source box Hermite series converted into the target Taylor series.
    HermiteTaylor,
}

/// How many box pairs took each evaluation path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalCounters {
    pub direct_direct: u32,
    pub direct_taylor: u32,
    pub hermite_direct: u32,
    pub hermite_taylor: u32,
}

impl EvalCounters {
    pub fn record(&mut self, path: EvalPath) {
        match path {
            EvalPath::DirectDirect => self.direct_direct += 1,
            EvalPath::DirectTaylor => self.direct_taylor += 1,
            EvalPath::HermiteDirect => self.hermite_direct += 1,
            EvalPath::HermiteTaylor => self.hermite_taylor += 1,
        }
    }

    pub fn get(&self, path: EvalPath) -> u32 {
        match path {
            EvalPath::DirectDirect => self.direct_direct,
            EvalPath::DirectTaylor => self.direct_taylor,
            EvalPath::HermiteDirect => self.hermite_direct,
            EvalPath::HermiteTaylor => self.hermite_taylor,
        }
    }

    /// Box pairs that went through an expansion rather than direct sums.
    pub fn expansions(&self) -> u32 {
        self.direct_taylor + self.hermite_direct + self.hermite_taylor
    }

    pub fn total(&self) -> u32 {
        self.direct_direct + self.expansions()
    }
}

/// Summary of one fast transform run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformReport {
    pub signal: SignalId,
    /// Number of sources (N).
    pub sources: usize,
    /// Number of targets (M).
    pub targets: usize,
    /// Normalization scale applied to coordinates.
    pub scale: f64,
    pub parameters: RunParameters,
    pub counters: EvalCounters,
    /// Target boxes whose Taylor series were evaluated.
    pub taylor_boxes: usize,
}

impl TransformReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_read_back() {
        let mut c = EvalCounters::default();
        c.record(EvalPath::DirectDirect);
        c.record(EvalPath::DirectDirect);
        c.record(EvalPath::HermiteTaylor);
        assert_eq!(c.get(EvalPath::DirectDirect), 2);
        assert_eq!(c.get(EvalPath::HermiteTaylor), 1);
        assert_eq!(c.expansions(), 1);
        assert_eq!(c.total(), 3);
    }
}
