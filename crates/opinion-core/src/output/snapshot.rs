//! Snapshot Generation
//!
//! Turns the live environment into the serializable frames renderers consume,
//! and writes them to disk.

use opinion_events::{generate_snapshot_id, AgentSnapshot, WorldSnapshot, ZoneSnapshot};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::stats::OpinionHistory;
use super::OutputError;
use crate::environment::Environment;

/// Capture the full world state. Agents are listed by construction index so
/// consecutive frames line up.
pub fn generate_snapshot(env: &Environment, sequence: u64) -> WorldSnapshot {
    let mut snapshot = WorldSnapshot::new(
        generate_snapshot_id(sequence),
        env.step_count(),
        env.width(),
        env.height(),
    );

    let graph = env.social_graph();
    let mut agents: Vec<AgentSnapshot> = env
        .agents()
        .map(|view| AgentSnapshot {
            integrity: view.integrity,
            high_integrity: view.high_integrity,
            occupation: view.occupation.map(|o| o.label().to_string()),
            target_location: view.target.map(|z| z.kind.label().to_string()),
            friend_count: graph.degree(view.entity),
            ..AgentSnapshot::new(view.index, view.position.x, view.position.y, view.opinion.value())
        })
        .collect();
    agents.sort_by_key(|a| a.agent_id);
    snapshot.agents = agents;

    snapshot.distribution = env.opinion_distribution().to_map();
    snapshot.zones = env
        .layout()
        .all_zones()
        .filter(|zone| !zone.is_empty())
        .map(|zone| ZoneSnapshot {
            kind: zone.id.kind.label().to_string(),
            group: zone.id.group,
            x_min: zone.x_min,
            y_min: zone.y_min,
            x_max: zone.x_max,
            y_max: zone.y_max,
        })
        .collect();

    snapshot
}

/// Write one snapshot as pretty JSON, creating parent directories.
pub fn write_snapshot(snapshot: &WorldSnapshot, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = path.as_ref();
    create_parent(path)?;
    fs::write(path, snapshot.to_json_pretty()?)?;
    Ok(())
}

/// Write the opinion history as JSONL, one step record per line.
pub fn write_history(history: &OpinionHistory, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = path.as_ref();
    create_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for record in history.records() {
        writeln!(writer, "{}", record.to_jsonl()?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Appends compact snapshots to a JSONL file, one frame per line.
pub struct SnapshotStream {
    writer: BufWriter<File>,
    next_sequence: u64,
}

impl SnapshotStream {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref();
        create_parent(path)?;
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            next_sequence: 1,
        })
    }

    /// Capture and append the current state. Returns the snapshot id.
    pub fn record(&mut self, env: &Environment) -> Result<String, OutputError> {
        let snapshot = generate_snapshot(env, self.next_sequence);
        self.next_sequence += 1;
        writeln!(self.writer, "{}", snapshot.to_json()?)?;
        Ok(snapshot.snapshot_id)
    }

    pub fn frames_written(&self) -> u64 {
        self.next_sequence - 1
    }

    pub fn finish(mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
