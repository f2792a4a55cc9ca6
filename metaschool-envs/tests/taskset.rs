use anyhow::Result;
use metaschool_core::{
    record::Record, BoxEnv, ConfigError, Env, EnvFactory, GymTaskset, GymTasksetConfig, Space,
    Stage, Step, TaskConfig, TaskRecord, TasksetError, WrapperFactory,
};
use metaschool_envs::{
    jump::{JumpFactory, JumpFactoryConfig, ACT_JUMP, ACT_RUN},
    wrappers::{EpisodeStatisticsFactory, ObsMaskFactory, RewardScaleFactory, TimeLimitFactory},
    BoxTask,
};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use std::sync::Arc;
use test_log::test;

/// Moves right at a constant speed forever.
struct Drift {
    speed: i64,
    position: i64,
}

impl Env for Drift {
    type Obs = Vec<f32>;
    type Act = usize;

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.position = 0;
        Ok(vec![0.0])
    }

    fn step(&mut self, _a: &usize) -> Step<Vec<f32>> {
        self.position += self.speed;
        Step::new(
            vec![self.position as f32],
            self.speed as f32,
            false,
            false,
            Record::empty(),
        )
    }

    fn observation_space(&self) -> Space {
        Space::Box {
            low: 0.0,
            high: f32::MAX,
            shape: vec![1],
        }
    }

    fn action_space(&self) -> Space {
        Space::Discrete(1)
    }
}

struct DriftFactory;

impl EnvFactory<BoxTask> for DriftFactory {
    fn sample(&self, rng: &mut dyn RngCore) -> Result<TaskConfig> {
        Ok(TaskConfig::new().with("speed", rng.gen_range(1..=10)))
    }

    fn make(&self, config: &TaskConfig) -> Result<BoxTask> {
        Ok(Box::new(Drift {
            speed: config.get_i64("speed")?,
            position: 0,
        }))
    }
}

/// Runs one episode with the given actions, cycled, and collects its transitions.
fn rollout(env: &mut BoxTask, actions: &[usize]) -> Vec<(Vec<f32>, f32, bool, bool)> {
    let mut transitions = vec![];
    env.reset().unwrap();
    for a in actions.iter().cycle() {
        let step = env.step(a);
        let done = step.is_done();
        transitions.push((step.obs, step.reward, step.is_terminated, step.is_truncated));
        if done {
            break;
        }
    }
    transitions
}

#[test]
fn test_truncation_follows_record() {
    let taskset = GymTaskset::<BoxTask>::build(
        &GymTasksetConfig::default().seed(42),
        Arc::new(DriftFactory),
        vec![Arc::new(TimeLimitFactory::new(5, 50))],
    );

    for _ in 0..10 {
        let (_, record) = taskset.sample().unwrap();
        let speed = record.base_config().get_i64("speed").unwrap();
        assert!((1..=10).contains(&speed));
        assert_eq!(record.wrapper_configs().len(), 1);
        let limit = record.wrapper_configs()[0].get_usize("max_steps").unwrap();
        assert!((5..=50).contains(&limit));

        let mut env = taskset.make_like(&record).unwrap();
        let transitions = rollout(&mut env, &[ACT_RUN]);
        assert_eq!(transitions.len(), limit);
        assert!(transitions.last().unwrap().3);
    }
}

fn jump_taskset(seed: u64) -> GymTaskset<BoxTask> {
    GymTaskset::<BoxTask>::build(
        &GymTasksetConfig::default().seed(seed),
        Arc::new(JumpFactory::default()),
        vec![
            Arc::new(TimeLimitFactory::new(20, 200)),
            Arc::new(RewardScaleFactory::new(0.5, 1.5)),
            Arc::new(ObsMaskFactory),
            Arc::new(EpisodeStatisticsFactory),
        ],
    )
}

#[test]
fn test_replay_is_indistinguishable() {
    let taskset = jump_taskset(0);
    let mut rng = StdRng::seed_from_u64(123);

    for _ in 0..10 {
        let actions: Vec<usize> = (0..300)
            .map(|_| if rng.gen_bool(0.1) { ACT_JUMP } else { ACT_RUN })
            .collect();
        let (mut env, record) = taskset.sample().unwrap();
        let mut copy = taskset.make_like(&record).unwrap();

        assert_eq!(env.observation_space(), copy.observation_space());
        assert_eq!(rollout(&mut env, &actions), rollout(&mut copy, &actions));
    }
    assert_eq!(taskset.len(), 10);
}

#[test]
fn test_sampling_is_reproducible() {
    let a = jump_taskset(9);
    let b = jump_taskset(9);
    for _ in 0..5 {
        let (_, ra) = a.sample().unwrap();
        let (_, rb) = b.sample().unwrap();
        assert_eq!(ra, rb);
    }
    assert!(a.iter().zip(b.iter()).all(|(ra, rb)| ra == rb));
}

#[test]
fn test_every_record_has_every_stage() {
    let taskset = jump_taskset(1);
    for _ in 0..20 {
        taskset.sample().unwrap();
    }
    for record in &taskset {
        assert_eq!(record.num_wrappers(), taskset.wrappers().len());
        // The mask index is sampled within the jump state vector.
        assert!(record.wrapper_configs()[2].get_usize("index").unwrap() < 10);
        assert!(record.wrapper_configs()[3].is_empty());
    }
}

#[test]
fn test_record_from_other_taskset() {
    let wide = jump_taskset(0);
    let (_, record) = wide.sample().unwrap();

    let narrow = GymTaskset::<BoxTask>::build(
        &GymTasksetConfig::default().seed(0),
        Arc::new(JumpFactory::default()),
        vec![Arc::new(TimeLimitFactory::new(20, 200))],
    );
    let err = narrow.make_like(&record).err().unwrap();
    assert!(matches!(
        err,
        TasksetError::ShapeMismatch {
            expected: 1,
            found: 4
        }
    ));
    assert!(narrow.is_empty());
}

#[test]
fn test_iteration_snapshot() {
    let taskset = jump_taskset(2);
    for _ in 0..3 {
        taskset.sample().unwrap();
    }
    let records = taskset.iter();
    let envs = taskset.envs();
    for _ in 0..2 {
        taskset.sample().unwrap();
    }

    assert_eq!(records.count(), 3);
    let mut n = 0;
    for (record, env) in envs {
        let mut env = env.unwrap();
        let mut copy = taskset.make_like(&record).unwrap();
        assert_eq!(rollout(&mut env, &[ACT_RUN]), rollout(&mut copy, &[ACT_RUN]));
        n += 1;
    }
    assert_eq!(n, 3);
    assert_eq!(taskset.iter().count(), 5);
}

#[test]
fn test_failed_sampling_reports_stage() {
    let taskset = GymTaskset::<BoxTask>::build(
        &GymTasksetConfig::default().seed(0),
        Arc::new(JumpFactory::build(
            JumpFactoryConfig::default().possible_positions(vec![]),
        )),
        vec![Arc::new(TimeLimitFactory::default())],
    );
    let err = taskset.sample().err().unwrap();
    assert_eq!(err.stage().map(|s| s.index()), Some(-1));
    assert!(matches!(
        err.config_error(),
        Some(ConfigError::InvalidValue { .. })
    ));

    let taskset = GymTaskset::<BoxTask>::build(
        &GymTasksetConfig::default().seed(0),
        Arc::new(JumpFactory::default()),
        vec![
            Arc::new(TimeLimitFactory::default()),
            Arc::new(TimeLimitFactory::new(0, 10)),
        ],
    );
    for _ in 0..3 {
        let err = taskset.sample().err().unwrap();
        assert_eq!(err.stage(), Some(Stage::Wrapper(1)));
    }
    assert!(taskset.is_empty());
}

#[test]
fn test_evaluate_enumerated_tasks() -> Result<()> {
    let factory = JumpFactory::build(
        JumpFactoryConfig::default()
            .possible_heights(vec![10, 15])
            .possible_positions(vec![25, 30]),
    );
    let taskset = GymTaskset::<BoxTask>::build(
        &GymTasksetConfig::default().seed(0),
        Arc::new(factory),
        vec![Arc::new(TimeLimitFactory::new(100, 100))],
    );

    let configs = taskset.env_factory().enumerate().unwrap();
    assert_eq!(configs.len(), 4);
    for config in configs.iter() {
        let env = taskset.env_factory().make(config)?;
        let wrapper_configs = [TaskConfig::new().with("max_steps", 100)];
        let mut env = taskset.wrappers().wrap(env, &wrapper_configs)?;
        let transitions = rollout(&mut env, &[ACT_RUN]);
        // Running straight into the obstacle.
        assert!(transitions.last().unwrap().2);
        assert_eq!(transitions.last().unwrap().1, -1.0);
    }
    // Evaluation tasks are not recorded.
    assert!(taskset.is_empty());
    Ok(())
}

#[test]
fn test_records_round_trip_yaml() -> Result<()> {
    let taskset = jump_taskset(4);
    let (mut env, record) = taskset.sample()?;

    let yaml = serde_yaml::to_string(&record)?;
    let loaded: TaskRecord = serde_yaml::from_str(&yaml)?;
    assert_eq!(loaded, record);

    let mut copy = taskset.make_like(&loaded)?;
    assert_eq!(rollout(&mut env, &[ACT_RUN]), rollout(&mut copy, &[ACT_RUN]));
    Ok(())
}

/// Picks a horizon proportional to the observation size of the wrapped env.
struct ObsSizedLimit;

impl WrapperFactory<BoxTask> for ObsSizedLimit {
    fn sample(&self, env: Option<&BoxTask>, _rng: &mut dyn RngCore) -> Result<TaskConfig> {
        let env = env.ok_or(ConfigError::EnvRequired("ObsSizedLimit"))?;
        Ok(TaskConfig::new().with("max_steps", 2 * env.observation_space().flat_dim()))
    }

    fn wrap(&self, env: BoxTask, config: &TaskConfig) -> Result<BoxTask> {
        WrapperFactory::<BoxEnv<Vec<f32>, usize>>::wrap(&TimeLimitFactory::default(), env, config)
    }
}

#[test]
fn test_wrapper_sees_wrapped_env() {
    let taskset = GymTaskset::<BoxTask>::build(
        &GymTasksetConfig::default().seed(0),
        Arc::new(DriftFactory),
        vec![Arc::new(ObsSizedLimit)],
    );
    let (mut env, record) = taskset.sample().unwrap();
    assert_eq!(record.wrapper_configs()[0].get_usize("max_steps").unwrap(), 2);
    assert_eq!(rollout(&mut env, &[ACT_RUN]).len(), 2);

    let mut rng = StdRng::seed_from_u64(0);
    assert!(ObsSizedLimit.sample(None, &mut rng).is_err());
}
