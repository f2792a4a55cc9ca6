//! Sample, record and replay tasks.
mod config;
mod history;
mod iter;
mod record;
use crate::{
    error::{BuildPhase, Stage, TasksetError},
    Env, EnvFactory, WrapperChain, WrapperFactory,
};
pub use config::GymTasksetConfig;
use history::History;
pub use iter::{TaskEnvIter, TaskIter};
use log::{debug, info, warn};
use rand::{rngs::StdRng, RngCore, SeedableRng};
pub use record::TaskRecord;
use std::sync::{Arc, Mutex, PoisonError};

/// Samples tasks and keeps track of previously seen ones.
///
/// A taskset composes one [`EnvFactory`] with an ordered list of
/// [`WrapperFactory`]. Every call to [`GymTaskset::sample`] samples a base
/// config, builds the base environment, then lets each wrapper factory sample
/// its config with the environment built so far and wrap it. The resulting
/// [`TaskRecord`] is appended to the history of the taskset, from which
/// [`GymTaskset::make_like`] rebuilds an identical environment.
///
/// ```rust,ignore
/// let taskset = GymTaskset::<BoxTask>::build(
///     &GymTasksetConfig::default().seed(42),
///     Arc::new(JumpFactory::default()),
///     vec![Arc::new(TimeLimitFactory::new(20, 200))],
/// );
///
/// for _ in 0..num_iterations {
///     let (mut train_task, record) = taskset.sample()?;
///     // ... train on train_task ...
///     let mut test_task = taskset.make_like(&record)?;
///     // ... test on a freshly built, identical task ...
/// }
///
/// // Enumerate sampled tasks.
/// for record in taskset.iter() {
///     // ... process previously seen task ...
/// }
/// ```
///
/// # Concurrency
///
/// All methods take `&self`, so a taskset can be shared across threads
/// behind an [`Arc`]. The random source is held for the whole pipeline of a
/// `sample()` call and a record is appended to the history in one step;
/// readers never observe a partially built record.
pub struct GymTaskset<E: Env> {
    env_factory: Arc<dyn EnvFactory<E>>,
    wrappers: WrapperChain<E>,
    history: History,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl<E: Env> GymTaskset<E> {
    /// Creates a taskset whose random source is seeded from system entropy.
    pub fn new(
        env_factory: Arc<dyn EnvFactory<E>>,
        wrapper_factories: Vec<Arc<dyn WrapperFactory<E>>>,
    ) -> Self {
        Self::build(&GymTasksetConfig::default(), env_factory, wrapper_factories)
    }

    /// Creates a taskset with the given configuration.
    pub fn build(
        config: &GymTasksetConfig,
        env_factory: Arc<dyn EnvFactory<E>>,
        wrapper_factories: Vec<Arc<dyn WrapperFactory<E>>>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(env_factory, wrapper_factories, rng)
    }

    /// Creates a taskset drawing randomness from `rng`.
    pub fn with_rng(
        env_factory: Arc<dyn EnvFactory<E>>,
        wrapper_factories: Vec<Arc<dyn WrapperFactory<E>>>,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        Self {
            env_factory,
            wrappers: WrapperChain::new(wrapper_factories),
            history: History::default(),
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// The factory of base environments.
    pub fn env_factory(&self) -> &Arc<dyn EnvFactory<E>> {
        &self.env_factory
    }

    /// The wrapper factories, in pipeline order.
    pub fn wrappers(&self) -> &WrapperChain<E> {
        &self.wrappers
    }

    fn build_task(&self, rng: &mut dyn RngCore) -> Result<(E, TaskRecord), TasksetError> {
        let base = self
            .env_factory
            .sample(rng)
            .map_err(|source| TasksetError::TaskBuild {
                stage: Stage::Base,
                phase: BuildPhase::Sample,
                source,
            })?;
        let env = self
            .env_factory
            .make(&base)
            .map_err(|source| TasksetError::TaskBuild {
                stage: Stage::Base,
                phase: BuildPhase::Make,
                source,
            })?;
        debug!("Built base environment {}", base);

        let (env, wrappers) = self.wrappers.sample_and_wrap(env, rng)?;
        Ok((env, TaskRecord::new(base, wrappers)))
    }

    /// Samples a new task.
    ///
    /// Returns the wrapped environment and the record of its configs. A copy
    /// of the record is appended to the history.
    ///
    /// Sampling is all-or-nothing: if any stage fails, the error is returned
    /// as [`TasksetError::TaskBuild`] identifying the stage, and the history
    /// is left unchanged.
    pub fn sample(&self) -> Result<(E, TaskRecord), TasksetError> {
        let result = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.build_task(&mut **rng)
        };

        match result {
            Ok((env, record)) => {
                let ix = self.history.push(record.clone());
                info!("Sampled task {}", ix);
                Ok((env, record))
            }
            Err(e) => {
                warn!("Failed to sample a task: {}", e);
                Err(e)
            }
        }
    }

    /// Builds a new environment identical to the task described by `record`.
    ///
    /// No randomness is consumed and the history is not modified.
    /// `record` must hold one wrapper config per registered wrapper factory,
    /// otherwise [`TasksetError::ShapeMismatch`] is returned.
    pub fn make_like(&self, record: &TaskRecord) -> Result<E, TasksetError> {
        if record.num_wrappers() != self.wrappers.len() {
            return Err(TasksetError::ShapeMismatch {
                expected: self.wrappers.len(),
                found: record.num_wrappers(),
            });
        }

        let env = self
            .env_factory
            .make(record.base_config())
            .map_err(|source| TasksetError::ReplayFailed {
                stage: Stage::Base,
                source,
            })?;
        debug!("Rebuilt base environment {}", record.base_config());
        self.wrappers.wrap(env, record.wrapper_configs())
    }

    /// Builds a new environment for the `ix`-th sampled task.
    pub fn make(&self, ix: usize) -> Result<E, TasksetError> {
        let record = self.get(ix).ok_or(TasksetError::IndexOutOfRange {
            index: ix,
            len: self.len(),
        })?;
        self.make_like(&record)
    }

    /// Returns the record of the `ix`-th sampled task.
    pub fn get(&self, ix: usize) -> Option<Arc<TaskRecord>> {
        self.history.get(ix)
    }

    /// Number of tasks sampled so far.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns `true` if no task has been sampled yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies out the records sampled so far.
    pub fn history(&self) -> Vec<Arc<TaskRecord>> {
        self.history.snapshot()
    }

    /// Iterates over the records sampled so far, in sampling order.
    pub fn iter(&self) -> TaskIter {
        TaskIter::new(self.history.clone())
    }

    /// Iterates over the tasks sampled so far, rebuilding their environments.
    pub fn envs(&self) -> TaskEnvIter<'_, E> {
        TaskEnvIter::new(self, self.iter())
    }
}

impl<'a, E: Env> IntoIterator for &'a GymTaskset<E> {
    type Item = Arc<TaskRecord>;
    type IntoIter = TaskIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ConfigError, Space, Step, TaskConfig};
    use anyhow::Result;
    use rand::{rngs::mock::StepRng, Rng};
    use std::{sync::atomic::AtomicUsize, sync::atomic::Ordering, thread};
    use test_log::test;

    /// Counts up by `speed`, truncating after `limit` steps when set.
    #[derive(Debug)]
    struct Counter {
        speed: i64,
        value: i64,
        limit: Option<usize>,
        steps: usize,
    }

    impl Env for Counter {
        type Obs = i64;
        type Act = ();

        fn reset(&mut self) -> Result<i64> {
            self.value = 0;
            self.steps = 0;
            Ok(self.value)
        }

        fn step(&mut self, _a: &()) -> Step<i64> {
            self.value += self.speed;
            self.steps += 1;
            let truncated = self.limit.map_or(false, |l| self.steps >= l);
            Step::new(self.value, 1.0, false, truncated, Default::default())
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

    struct CounterFactory;

    impl EnvFactory<Counter> for CounterFactory {
        fn sample(&self, rng: &mut dyn RngCore) -> Result<TaskConfig> {
            Ok(TaskConfig::new().with("speed", rng.gen_range(1..=10)))
        }

        fn make(&self, config: &TaskConfig) -> Result<Counter> {
            Ok(Counter {
                speed: config.get_i64("speed")?,
                value: 0,
                limit: None,
                steps: 0,
            })
        }
    }

    struct LimitFactory;

    impl WrapperFactory<Counter> for LimitFactory {
        fn sample(&self, _env: Option<&Counter>, rng: &mut dyn RngCore) -> Result<TaskConfig> {
            Ok(TaskConfig::new().with("limit", rng.gen_range(5..=50)))
        }

        fn wrap(&self, mut env: Counter, config: &TaskConfig) -> Result<Counter> {
            env.limit = Some(config.get_usize("limit")?);
            Ok(env)
        }
    }

    /// Fails to sample on every call whose number is in `fail_on`.
    struct FlakyFactory {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
    }

    impl FlakyFactory {
        fn new(fail_on: Vec<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    impl WrapperFactory<Counter> for FlakyFactory {
        fn sample(&self, _env: Option<&Counter>, _rng: &mut dyn RngCore) -> Result<TaskConfig> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.contains(&call) {
                Err(ConfigError::MissingKey("flaky".to_string()).into())
            } else {
                Ok(TaskConfig::new())
            }
        }

        fn wrap(&self, env: Counter, _config: &TaskConfig) -> Result<Counter> {
            Ok(env)
        }
    }

    fn taskset(seed: u64) -> GymTaskset<Counter> {
        GymTaskset::<Counter>::build(
            &GymTasksetConfig::default().seed(seed),
            Arc::new(CounterFactory),
            vec![Arc::new(LimitFactory)],
        )
    }

    fn run(env: &mut Counter) -> Vec<i64> {
        env.reset().unwrap();
        let mut obs = vec![];
        loop {
            let step = env.step(&());
            obs.push(step.obs);
            if step.is_done() {
                return obs;
            }
        }
    }

    #[test]
    fn test_sample_record_shape() {
        let taskset = taskset(0);
        let (_, record) = taskset.sample().unwrap();

        let speed = record.base_config().get_i64("speed").unwrap();
        assert!((1..=10).contains(&speed));
        assert_eq!(record.num_wrappers(), 1);
        let limit = record.wrapper_configs()[0].get_i64("limit").unwrap();
        assert!((5..=50).contains(&limit));

        assert_eq!(taskset.len(), 1);
        assert_eq!(*taskset.get(0).unwrap(), record);
    }

    #[test]
    fn test_make_like_replays() {
        let taskset = taskset(1);
        for _ in 0..5 {
            let (mut env, record) = taskset.sample().unwrap();
            let mut copy = taskset.make_like(&record).unwrap();
            assert_eq!(run(&mut env), run(&mut copy));
        }
        // Replay never records.
        assert_eq!(taskset.len(), 5);
    }

    #[test]
    fn test_same_seed_same_tasks() {
        let a = taskset(7);
        let b = taskset(7);
        for _ in 0..10 {
            a.sample().unwrap();
            b.sample().unwrap();
        }
        assert_eq!(a.history(), b.history());
    }

    #[test]
    fn test_injected_rng() {
        let taskset = GymTaskset::<Counter>::with_rng(
            Arc::new(CounterFactory),
            vec![Arc::new(LimitFactory)],
            StepRng::new(0, 0),
        );
        let (_, r1) = taskset.sample().unwrap();
        let (_, r2) = taskset.sample().unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_failed_sample_leaves_no_trace() {
        let taskset = GymTaskset::<Counter>::build(
            &GymTasksetConfig::default().seed(0),
            Arc::new(CounterFactory),
            vec![
                Arc::new(LimitFactory),
                Arc::new(FlakyFactory::new(vec![1, 3, 4])),
            ],
        );

        let mut successes = 0;
        for _ in 0..6 {
            match taskset.sample() {
                Ok(_) => successes += 1,
                Err(e) => {
                    assert_eq!(e.stage(), Some(Stage::Wrapper(1)));
                    assert_eq!(e.stage().unwrap().index(), 1);
                    assert!(matches!(
                        e,
                        TasksetError::TaskBuild {
                            phase: BuildPhase::Sample,
                            ..
                        }
                    ));
                    assert_eq!(
                        e.config_error(),
                        Some(&ConfigError::MissingKey("flaky".to_string()))
                    );
                }
            }
        }
        assert_eq!(successes, 3);
        assert_eq!(taskset.len(), 3);
        assert!(taskset.iter().all(|r| r.num_wrappers() == 2));
    }

    struct BrokenFactory;

    impl EnvFactory<Counter> for BrokenFactory {
        fn sample(&self, _rng: &mut dyn RngCore) -> Result<TaskConfig> {
            Ok(TaskConfig::new())
        }

        fn make(&self, config: &TaskConfig) -> Result<Counter> {
            CounterFactory.make(config)
        }
    }

    #[test]
    fn test_base_failure_stage() {
        let taskset = GymTaskset::<Counter>::new(Arc::new(BrokenFactory), vec![Arc::new(LimitFactory)]);
        let e = match taskset.sample() {
            Err(e) => e,
            Ok(_) => panic!("sampling should fail"),
        };
        assert_eq!(e.stage().map(|s| s.index()), Some(-1));
        assert!(matches!(
            e,
            TasksetError::TaskBuild {
                phase: BuildPhase::Make,
                ..
            }
        ));
        assert!(taskset.is_empty());
    }

    #[test]
    fn test_shape_mismatch() {
        let taskset = taskset(0);
        let base = TaskConfig::new().with("speed", 3);

        let record = TaskRecord::new(base.clone(), vec![]);
        assert!(matches!(
            taskset.make_like(&record),
            Err(TasksetError::ShapeMismatch {
                expected: 1,
                found: 0
            })
        ));

        let limit = TaskConfig::new().with("limit", 5);
        let record = TaskRecord::new(base, vec![limit.clone(), limit]);
        assert!(matches!(
            taskset.make_like(&record),
            Err(TasksetError::ShapeMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn test_replay_missing_key() {
        let taskset = taskset(0);
        let record = TaskRecord::new(TaskConfig::new(), vec![TaskConfig::new()]);
        let e = match taskset.make_like(&record) {
            Err(e) => e,
            Ok(_) => panic!("replay should fail"),
        };
        assert_eq!(e.stage(), Some(Stage::Base));
        assert_eq!(
            e.config_error(),
            Some(&ConfigError::MissingKey("speed".to_string()))
        );
    }

    #[test]
    fn test_chain_wrap_shape_mismatch() {
        let taskset = taskset(0);
        let env = CounterFactory
            .make(&TaskConfig::new().with("speed", 2))
            .unwrap();
        assert!(matches!(
            taskset.wrappers().wrap(env, &[]),
            Err(TasksetError::ShapeMismatch {
                expected: 1,
                found: 0
            })
        ));
    }

    #[test]
    fn test_replay_wrapper_failure() {
        let taskset = taskset(0);
        let record = TaskRecord::new(TaskConfig::new().with("speed", 2), vec![TaskConfig::new()]);
        let e = match taskset.make_like(&record) {
            Err(e) => e,
            Ok(_) => panic!("replay should fail"),
        };
        assert!(matches!(e, TasksetError::ReplayFailed { .. }));
        assert_eq!(e.stage(), Some(Stage::Wrapper(0)));
        assert_eq!(
            e.config_error(),
            Some(&ConfigError::MissingKey("limit".to_string()))
        );
    }

    /// Samples fine, but never manages to wrap.
    struct RejectingFactory;

    impl WrapperFactory<Counter> for RejectingFactory {
        fn sample(&self, _env: Option<&Counter>, _rng: &mut dyn RngCore) -> Result<TaskConfig> {
            Ok(TaskConfig::new().with("limit", 0))
        }

        fn wrap(&self, _env: Counter, _config: &TaskConfig) -> Result<Counter> {
            Err(ConfigError::InvalidValue {
                key: "limit".to_string(),
                reason: "must be positive".to_string(),
            }
            .into())
        }
    }

    #[test]
    fn test_wrap_failure_during_sample() {
        let taskset = GymTaskset::<Counter>::build(
            &GymTasksetConfig::default().seed(0),
            Arc::new(CounterFactory),
            vec![Arc::new(RejectingFactory), Arc::new(LimitFactory)],
        );
        for _ in 0..3 {
            let e = match taskset.sample() {
                Err(e) => e,
                Ok(_) => panic!("sampling should fail"),
            };
            assert!(matches!(
                e,
                TasksetError::TaskBuild {
                    stage: Stage::Wrapper(0),
                    phase: BuildPhase::Wrap,
                    ..
                }
            ));
        }
        assert!(taskset.is_empty());
        assert_eq!(taskset.iter().count(), 0);
    }

    #[test]
    fn test_chain_push() {
        let mut chain = WrapperChain::<Counter>::default();
        assert!(chain.is_empty());
        chain.push(Arc::new(LimitFactory));
        chain.push(Arc::new(RejectingFactory));
        assert_eq!(chain.len(), 2);

        let env = CounterFactory
            .make(&TaskConfig::new().with("speed", 1))
            .unwrap();
        let mut rng = StepRng::new(0, 1);
        let e = match chain.sample_and_wrap(env, &mut rng) {
            Err(e) => e,
            Ok(_) => panic!("the pushed factory should run"),
        };
        assert_eq!(e.stage(), Some(Stage::Wrapper(1)));

        let env = CounterFactory
            .make(&TaskConfig::new().with("speed", 1))
            .unwrap();
        let mut env = WrapperChain::new(vec![Arc::new(LimitFactory) as Arc<dyn WrapperFactory<Counter>>])
            .wrap(env, &[TaskConfig::new().with("limit", 4)])
            .unwrap();
        assert_eq!(run(&mut env), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_iter_snapshot() {
        let taskset = taskset(3);
        for _ in 0..3 {
            taskset.sample().unwrap();
        }
        let iter = taskset.iter();
        let envs = taskset.envs();
        for _ in 0..2 {
            taskset.sample().unwrap();
        }

        assert_eq!(iter.len(), 3);
        assert_eq!(iter.clone().count(), 3);
        assert_eq!(envs.count(), 3);
        assert_eq!(taskset.iter().count(), 5);

        // Records come out in sampling order.
        let history = taskset.history();
        for (i, record) in iter.enumerate() {
            assert!(Arc::ptr_eq(&record, &history[i]));
        }
    }

    #[test]
    fn test_envs_rebuild_tasks() {
        let taskset = taskset(5);
        let mut sampled = vec![];
        for _ in 0..4 {
            let (mut env, _) = taskset.sample().unwrap();
            sampled.push(run(&mut env));
        }
        for (i, (_, env)) in taskset.envs().enumerate() {
            assert_eq!(run(&mut env.unwrap()), sampled[i]);
        }
        assert_eq!(run(&mut taskset.make(2).unwrap()), sampled[2]);
        assert!(matches!(
            taskset.make(4),
            Err(TasksetError::IndexOutOfRange { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_concurrent_sampling() {
        let taskset = Arc::new(taskset(11));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let taskset = taskset.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        taskset.sample().unwrap();
                        // Readers see whole records only.
                        assert!(taskset.iter().all(|r| r.num_wrappers() == 1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(taskset.len(), 100);
    }
}
