//! Per-step records for opinion time series.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opinion counts after a single step.
///
/// One record per line forms the JSONL time series a plotting tool consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    /// Opinion value -> number of agents holding it
    pub distribution: BTreeMap<u8, usize>,
}

impl StepRecord {
    pub fn new(step: u64, distribution: BTreeMap<u8, usize>) -> Self {
        Self { step, distribution }
    }

    /// Number of agents holding `opinion` (zero if absent).
    pub fn count(&self, opinion: u8) -> usize {
        self.distribution.get(&opinion).copied().unwrap_or(0)
    }

    /// Total number of agents counted.
    pub fn total(&self) -> usize {
        self.distribution.values().sum()
    }

    /// Serializes the record to a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a record from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_record_counts() {
        let record = StepRecord::new(7, BTreeMap::from([(0, 10), (1, 4), (2, 0)]));
        assert_eq!(record.count(0), 10);
        assert_eq!(record.count(2), 0);
        assert_eq!(record.count(9), 0);
        assert_eq!(record.total(), 14);
    }

    #[test]
    fn test_step_record_jsonl_line() {
        let record = StepRecord::new(3, BTreeMap::from([(0, 1), (1, 2)]));
        let line = record.to_jsonl().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"step\":3"));

        let parsed = StepRecord::from_jsonl(&line).unwrap();
        assert_eq!(parsed, record);
    }
}
