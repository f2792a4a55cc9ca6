use anyhow::Result;
use log::info;
use metaschool_core::{BoxEnv, Env, GymTaskset, GymTasksetConfig, TaskConfig};
use metaschool_envs::{
    jump::{JumpFactory, ACT_JUMP, ACT_RUN},
    wrappers::{EpisodeStatisticsFactory, TimeLimitFactory},
    BoxTask,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;

const NUM_ITERATIONS: usize = 5;
const TRAIN_TASKS: usize = 10;
const MAX_STEPS: usize = 200;

/// Runs an episode with a policy jumping at random, returns its return.
fn run_episode(env: &mut BoxEnv<Vec<f32>, usize>, rng: &mut StdRng) -> Result<f32> {
    env.reset()?;
    loop {
        let a = if rng.gen_bool(0.05) { ACT_JUMP } else { ACT_RUN };
        let step = env.step(&a);
        if step.is_done() {
            return Ok(step.info.get_scalar("episode_return")?);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut rng = StdRng::seed_from_u64(0);

    let taskset = GymTaskset::<BoxTask>::build(
        &GymTasksetConfig::default().seed(42),
        Arc::new(JumpFactory::default()),
        vec![
            Arc::new(TimeLimitFactory::new(MAX_STEPS, MAX_STEPS)),
            Arc::new(EpisodeStatisticsFactory),
        ],
    );

    // Evaluation tasks cover the whole grid of the factory.
    let eval_configs = taskset.env_factory().enumerate().unwrap_or_default();
    let wrapper_configs = [
        TaskConfig::new().with("max_steps", MAX_STEPS),
        TaskConfig::new(),
    ];

    for iteration in 0..NUM_ITERATIONS {
        let mut train_return = 0.0;
        for _ in 0..TRAIN_TASKS {
            let (mut task, _) = taskset.sample()?;
            train_return += run_episode(&mut task, &mut rng)?;
        }

        let mut eval_return = 0.0;
        for config in eval_configs.iter() {
            let env = taskset.env_factory().make(config)?;
            let mut task = taskset.wrappers().wrap(env, &wrapper_configs)?;
            eval_return += run_episode(&mut task, &mut rng)?;
        }

        info!(
            "iteration {}: train return {:.2}, eval return {:.2}",
            iteration,
            train_return / TRAIN_TASKS as f32,
            eval_return / eval_configs.len().max(1) as f32,
        );
    }

    // Every training task can be rebuilt from the history.
    for (record, task) in taskset.envs().take(3) {
        let mut task = task?;
        info!(
            "replayed {} with return {:.2}",
            record.base_config(),
            run_episode(&mut task, &mut rng)?
        );
    }

    Ok(())
}
