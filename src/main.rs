//! Train a DQN or Double DQN agent on the built-in grid world.
//!
//! ```bash
//! cargo run --release -- --episodes 300 --algorithm ddqn --target-sync 10
//! RUST_LOG=debug cargo run -- --random-baseline
//! ```

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use snake_rl::agent::Agent;
use snake_rl::config::RunConfig;
use snake_rl::env::{Environment, GridWorld};
use snake_rl::estimator::{MlpEstimator, Optimizer};
use snake_rl::learner::UpdateRule;
use snake_rl::trainer::{run_random_episode, Trainer};
use snake_rl::Result;

#[derive(Parser, Debug)]
#[command(name = "snake-rl", about = "Train a value-based agent on a grid world")]
struct Args {
    /// JSON run configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// dqn or ddqn
    #[arg(long)]
    algorithm: Option<UpdateRule>,

    #[arg(long)]
    seed: Option<u64>,

    /// Grid side length
    #[arg(long, default_value_t = 5)]
    grid_size: usize,

    /// Hidden layer width of the value network
    #[arg(long, default_value_t = 256)]
    hidden: usize,

    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,

    /// Copy online weights into the target network every N episodes
    #[arg(long)]
    target_sync: Option<usize>,

    /// Resume from this checkpoint episode before training
    #[arg(long)]
    resume: Option<usize>,

    #[arg(long)]
    render: bool,

    /// Only step the environment with random actions
    #[arg(long)]
    random_baseline: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut run_config = match &args.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(episodes) = args.episodes {
        run_config.trainer.episodes = episodes;
    }
    if let Some(rule) = args.algorithm {
        run_config.agent.update_rule = rule;
    }
    if let Some(seed) = args.seed {
        run_config.agent.seed = Some(seed);
    }
    if let Some(dir) = args.checkpoint_dir {
        run_config.agent.checkpoint_dir = dir;
    }
    if args.target_sync.is_some() {
        run_config.trainer.target_sync_interval = args.target_sync;
    }
    run_config.trainer.render |= args.render;
    run_config.validate()?;

    let mut env = GridWorld::new(args.grid_size, run_config.trainer.max_steps)?;
    let mut rng = match run_config.agent.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if args.random_baseline {
        let stats = run_random_episode(&mut env, run_config.trainer.max_steps, run_config.trainer.render, &mut rng)?;
        info!(reward = stats.total_reward, steps = stats.steps, "random episode finished");
        return Ok(());
    }

    let layers = [env.observation_dim(), args.hidden, env.num_actions()];
    let (online, target) =
        MlpEstimator::pair(&layers, Optimizer::rmsprop(), run_config.agent.learning_rate, &mut rng)?;
    let mut agent = Agent::new(online, target, run_config.agent.clone())?;

    if let Some(episode) = args.resume {
        agent.load(&run_config.trainer.model_name, episode)?;
        agent.sync_target()?;
        run_config.trainer.start_episode = episode;
    }

    let mut trainer = Trainer::new(run_config.trainer.clone())?;
    let report = trainer.run(&mut env, &mut agent)?;

    // checkpoint ids count completed episodes, continuing after a resume
    let final_episode = trainer.tracker().next_episode();
    let path = if report.episodes.is_empty() || agent.last_checkpoint() == Some(final_episode) {
        agent.checkpoint_path(&run_config.trainer.model_name, final_episode)
    } else {
        agent.save(&run_config.trainer.model_name, final_episode)?
    };

    info!(
        episodes = report.episodes.len(),
        steps = report.total_steps,
        train_steps = report.train_steps,
        target_syncs = report.target_syncs,
        avg_reward = report.final_average_reward(10).unwrap_or(0.0),
        checkpoint = %path.display(),
        "training finished"
    );
    Ok(())
}
