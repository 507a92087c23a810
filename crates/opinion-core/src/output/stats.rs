//! Statistics Output
//!
//! Opinion counts for the current population and their per-step history.

use bevy_ecs::prelude::*;
use opinion_events::StepRecord;
use std::collections::BTreeMap;

use crate::components::agent::{Agent, Opinion};
use crate::components::population::SimClock;

/// Number of agents holding each opinion
///
/// Every opinion is present, with zero counts included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpinionDistribution {
    counts: BTreeMap<Opinion, usize>,
}

impl Default for OpinionDistribution {
    fn default() -> Self {
        Self {
            counts: Opinion::all().map(|o| (o, 0)).collect(),
        }
    }
}

impl OpinionDistribution {
    pub fn from_opinions<'a>(opinions: impl IntoIterator<Item = &'a Opinion>) -> Self {
        let mut distribution = Self::default();
        for opinion in opinions {
            *distribution.counts.entry(*opinion).or_insert(0) += 1;
        }
        distribution
    }

    pub fn count(&self, opinion: Opinion) -> usize {
        self.counts.get(&opinion).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Fraction of agents holding `opinion`, 0.0 for an empty population.
    pub fn share(&self, opinion: Opinion) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.count(opinion) as f64 / total as f64
        }
    }

    /// Most widely held opinion. Ties go to the lowest opinion value; an empty
    /// population has none.
    pub fn dominant(&self) -> Option<Opinion> {
        let mut best: Option<(Opinion, usize)> = None;
        for (&opinion, &count) in &self.counts {
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((opinion, count));
            }
        }
        best.map(|(opinion, _)| opinion)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Opinion, usize)> + '_ {
        self.counts.iter().map(|(o, c)| (*o, *c))
    }

    /// Counts keyed by raw opinion value, the form snapshots carry.
    pub fn to_map(&self) -> BTreeMap<u8, usize> {
        self.iter().map(|(o, c)| (o.value(), c)).collect()
    }

    pub fn to_step_record(&self, step: u64) -> StepRecord {
        StepRecord::new(step, self.to_map())
    }
}

/// Resource: one record per completed step, oldest first
#[derive(Resource, Debug, Default, Clone)]
pub struct OpinionHistory {
    records: Vec<StepRecord>,
}

impl OpinionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count series for a single opinion, in step order.
    pub fn series(&self, opinion: Opinion) -> Vec<usize> {
        self.records.iter().map(|r| r.count(opinion.value())).collect()
    }
}

/// System: append the distribution observed after the step just completed.
pub fn record_distribution(
    clock: Res<SimClock>,
    mut history: ResMut<OpinionHistory>,
    opinions: Query<&Opinion, With<Agent>>,
) {
    let distribution = OpinionDistribution::from_opinions(opinions.iter());
    history.push(distribution.to_step_record(clock.step));
}
