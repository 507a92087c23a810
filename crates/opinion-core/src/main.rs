//! Opinion Diffusion Simulation
//!
//! Seeds a grid with agents, runs the tick loop and optionally writes the
//! opinion history and a snapshot stream for renderers.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use opinion_core::output::{generate_snapshot, write_history, write_snapshot, SnapshotStream};
use opinion_core::{
    populate, Environment, InteractionModel, MovementModel, Neighborhood, Opinion,
    OpinionDistribution, SimConfig,
};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "opinion_sim")]
#[command(about = "Integrity-driven opinion diffusion on a grid")]
struct Args {
    /// TOML config file; defaults to opinion_sim.toml if present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    width: Option<i32>,

    #[arg(long)]
    height: Option<i32>,

    /// Agents to seed (split equally across opinions)
    #[arg(long)]
    agents: Option<usize>,

    /// Fraction of agents pinned at integrity 1.0
    #[arg(long)]
    high_integrity_ratio: Option<f64>,

    /// Friends each agent adds while the social graph is built
    #[arg(long)]
    friends: Option<usize>,

    /// Number of steps to simulate
    #[arg(long)]
    steps: Option<u64>,

    #[arg(long, value_enum)]
    movement: Option<MovementArg>,

    #[arg(long, value_enum)]
    interaction: Option<InteractionArg>,

    #[arg(long, value_enum)]
    neighborhood: Option<NeighborhoodArg>,

    /// Skip the friend interaction pass (and friend graph construction)
    #[arg(long)]
    no_social: bool,

    /// Write the per-step opinion counts as JSONL
    #[arg(long)]
    history_out: Option<PathBuf>,

    /// Write world snapshots as JSONL: the initial state, every
    /// `--report-every` steps, and the final state
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Write the final world state as pretty JSON
    #[arg(long)]
    final_out: Option<PathBuf>,

    /// Steps between progress reports (0 disables them)
    #[arg(long, default_value_t = 10)]
    report_every: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MovementArg {
    RandomWalk,
    PersistentWalk,
    Scheduled,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InteractionArg {
    Plain,
    Integrity,
    Persuasion,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NeighborhoodArg {
    Moore,
    VonNeumann,
}

impl From<MovementArg> for MovementModel {
    fn from(arg: MovementArg) -> Self {
        match arg {
            MovementArg::RandomWalk => MovementModel::RandomWalk,
            MovementArg::PersistentWalk => MovementModel::PersistentWalk,
            MovementArg::Scheduled => MovementModel::Scheduled,
        }
    }
}

impl From<InteractionArg> for InteractionModel {
    fn from(arg: InteractionArg) -> Self {
        match arg {
            InteractionArg::Plain => InteractionModel::Plain,
            InteractionArg::Integrity => InteractionModel::Integrity,
            InteractionArg::Persuasion => InteractionModel::Persuasion,
        }
    }
}

impl From<NeighborhoodArg> for Neighborhood {
    fn from(arg: NeighborhoodArg) -> Self {
        match arg {
            NeighborhoodArg::Moore => Neighborhood::Moore,
            NeighborhoodArg::VonNeumann => Neighborhood::VonNeumann,
        }
    }
}

impl Args {
    /// Command line flags win over the config file.
    fn apply(&self, config: &mut SimConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(width) = self.width {
            config.world.width = width;
        }
        if let Some(height) = self.height {
            config.world.height = height;
        }
        if let Some(agents) = self.agents {
            config.population.num_agents = agents;
        }
        if let Some(ratio) = self.high_integrity_ratio {
            config.population.high_integrity_ratio = ratio;
        }
        if let Some(friends) = self.friends {
            config.population.friend_cap = friends;
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if let Some(movement) = self.movement {
            config.dynamics.movement = movement.into();
        }
        if let Some(interaction) = self.interaction {
            config.dynamics.interaction = interaction.into();
        }
        if let Some(neighborhood) = self.neighborhood {
            config.dynamics.neighborhood = neighborhood.into();
        }
        if self.no_social {
            config.dynamics.social_pass = false;
        }
    }
}

fn format_distribution(distribution: &OpinionDistribution) -> String {
    Opinion::all()
        .map(|o| {
            format!(
                "{}: {} ({:.1}%)",
                o.value(),
                distribution.count(o),
                distribution.share(o) * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("opinion_core=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::load_or_default()?,
    };
    args.apply(&mut config);
    config.validate()?;

    println!("Opinion Diffusion Simulation");
    println!("============================");
    println!("Seed: {}", config.seed);
    println!("Grid: {}x{}", config.world.width, config.world.height);
    println!("Steps: {}", config.steps);
    println!(
        "Dynamics: {:?} movement, {:?} interaction, social pass {}",
        config.dynamics.movement,
        config.dynamics.interaction,
        if config.dynamics.social_pass { "on" } else { "off" }
    );
    println!();

    let mut env = Environment::new(&config);
    let summary = populate(&mut env, &config.population);
    println!(
        "Placed {} agents ({} high integrity, {} friendships)",
        summary.placed, summary.high_integrity, summary.friendships
    );
    if summary.skipped() > 0 {
        println!("  {} agents did not fit on the grid", summary.skipped());
    }
    println!("Initial: {}", format_distribution(&env.opinion_distribution()));

    let mut stream = match &args.snapshot_out {
        Some(path) => {
            let mut stream = SnapshotStream::create(path)?;
            stream.record(&env)?;
            Some(stream)
        }
        None => None,
    };

    for _ in 0..config.steps {
        env.step();
        let step = env.step_count();
        if args.report_every > 0 && step % args.report_every == 0 {
            info!(step, distribution = %format_distribution(&env.opinion_distribution()), "progress");
            if let Some(stream) = stream.as_mut() {
                stream.record(&env)?;
            }
        }
    }

    let final_distribution = env.opinion_distribution();
    println!("Final:   {}", format_distribution(&final_distribution));
    if let Some(dominant) = final_distribution.dominant() {
        println!("Dominant opinion: {}", dominant.value());
    }

    if let Some(mut stream) = stream {
        let reported = args.report_every > 0 && env.step_count() % args.report_every == 0;
        if !reported && env.step_count() > 0 {
            stream.record(&env)?;
        }
        let frames = stream.frames_written();
        stream.finish()?;
        info!(frames, "snapshot stream written");
    }
    if let Some(path) = &args.history_out {
        write_history(env.history(), path)?;
        info!(records = env.history().len(), path = %path.display(), "history written");
    }
    if let Some(path) = &args.final_out {
        write_snapshot(&generate_snapshot(&env, env.step_count()), path)?;
        info!(path = %path.display(), "final snapshot written");
    }

    Ok(())
}
