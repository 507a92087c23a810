//! Snapshot Types
//!
//! Serialization structs for world snapshots.
//!
//! A snapshot captures everything a renderer needs to draw one frame: agent
//! positions and opinions, the zone layout, and the current distribution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Agent state at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: u32,
    pub x: i32,
    pub y: i32,
    pub opinion: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<f64>,
    #[serde(default)]
    pub high_integrity: bool,
    /// "student" or "worker" when the agent follows a daily routine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    /// Zone kind the agent is heading for this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_location: Option<String>,
    #[serde(default)]
    pub friend_count: usize,
}

impl AgentSnapshot {
    /// Creates an AgentSnapshot with the fields every model has.
    pub fn new(agent_id: u32, x: i32, y: i32, opinion: u8) -> Self {
        Self {
            agent_id,
            x,
            y,
            opinion,
            integrity: None,
            high_integrity: false,
            occupation: None,
            target_location: None,
            friend_count: 0,
        }
    }
}

/// One rectangular zone block, inclusive-exclusive bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    /// "home", "work", "school" or "leisure"
    pub kind: String,
    pub group: usize,
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

/// Complete world snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub snapshot_id: String,
    pub step: u64,
    pub width: i32,
    pub height: i32,
    pub agents: Vec<AgentSnapshot>,
    pub distribution: BTreeMap<u8, usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<ZoneSnapshot>,
}

impl WorldSnapshot {
    /// Creates an empty snapshot for a grid of the given size.
    pub fn new(snapshot_id: impl Into<String>, step: u64, width: i32, height: i32) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            step,
            width,
            height,
            agents: Vec::new(),
            distribution: BTreeMap::new(),
            zones: Vec::new(),
        }
    }

    /// Finds an agent by ID.
    pub fn find_agent(&self, agent_id: u32) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    /// Returns the agent standing on a cell, if any.
    pub fn agent_at(&self, x: i32, y: i32) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.x == x && a.y == y)
    }

    /// Returns agents holding a given opinion.
    pub fn agents_with_opinion(&self, opinion: u8) -> Vec<&AgentSnapshot> {
        self.agents.iter().filter(|a| a.opinion == opinion).collect()
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the snapshot to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_snapshot_id() {
        assert_eq!(generate_snapshot_id(1), "snap_000001");
        assert_eq!(generate_snapshot_id(42371), "snap_042371");
    }

    #[test]
    fn test_world_snapshot_lookups() {
        let mut snapshot = WorldSnapshot::new("snap_000001", 12, 10, 10);
        snapshot.agents.push(AgentSnapshot::new(0, 1, 1, 0));
        snapshot.agents.push(AgentSnapshot::new(1, 2, 1, 2));
        snapshot.agents.push(AgentSnapshot::new(2, 5, 5, 2));

        assert_eq!(snapshot.find_agent(1).map(|a| a.x), Some(2));
        assert!(snapshot.find_agent(9).is_none());
        assert_eq!(snapshot.agent_at(5, 5).map(|a| a.agent_id), Some(2));
        assert_eq!(snapshot.agents_with_opinion(2).len(), 2);
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let mut snapshot = WorldSnapshot::new("snap_000002", 0, 4, 4);
        snapshot.agents.push(AgentSnapshot::new(0, 0, 0, 1));

        let json = snapshot.to_json().unwrap();
        assert!(!json.contains("integrity"));
        assert!(!json.contains("target_location"));
        assert!(!json.contains("zones"));

        let parsed = WorldSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed.agents[0], snapshot.agents[0]);
    }
}
