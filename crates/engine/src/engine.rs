//! Worker pool ownership and engine-wide configuration.

use std::env;

use parastream_core::{Cursor, SizeEstimate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::task::{self, TreeTask};

pub const DEFAULT_OVER_PARTITION_FACTOR: usize = 4;
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "parastream-worker";

const PARALLELISM_VAR: &str = "PARASTREAM_PARALLELISM";
const LEAF_SIZE_VAR: &str = "PARASTREAM_LEAF_SIZE";

/// Settings for an [`Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of worker threads.
    pub parallelism: usize,
    /// How many leaves per worker a task tree aims for.
    pub over_partition_factor: usize,
    /// Fixed leaf size; overrides the size computed from the root estimate.
    pub leaf_size: Option<usize>,
    pub thread_name_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: num_cpus::get().max(1),
            over_partition_factor: DEFAULT_OVER_PARTITION_FACTOR,
            leaf_size: None,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = threads.max(1);
        self
    }

    #[must_use]
    pub fn with_over_partition_factor(mut self, factor: usize) -> Self {
        self.over_partition_factor = factor.max(1);
        self
    }

    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = Some(leaf_size.max(1));
        self
    }

    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Defaults overlaid with `PARASTREAM_PARALLELISM` and `PARASTREAM_LEAF_SIZE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(PARALLELISM_VAR) {
            config.parallelism = parse_count(PARALLELISM_VAR, &value)?;
        }
        if let Some(value) = lookup(LEAF_SIZE_VAR) {
            config.leaf_size = Some(parse_count(LEAF_SIZE_VAR, &value)?);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(Error::InvalidConfig("parallelism must be at least 1".into()));
        }
        if self.over_partition_factor == 0 {
            return Err(Error::InvalidConfig("over_partition_factor must be at least 1".into()));
        }
        if self.leaf_size == Some(0) {
            return Err(Error::InvalidConfig("leaf_size must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_count(name: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|err| Error::InvalidConfig(format!("{name}={value:?}: {err}")))
}

/// Owns the worker pool every parallel evaluation runs on.
#[derive(Debug)]
pub struct Engine {
    pool: rayon::ThreadPool,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let prefix = config.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallelism)
            .thread_name(move |index| format!("{prefix}-{index}"))
            .build()?;
        debug!(parallelism = config.parallelism, leaf_size = ?config.leaf_size, "engine started");
        Ok(Self { pool, config })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(EngineConfig::default())
    }

    pub fn parallelism(&self) -> usize {
        self.config.parallelism
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Leaf size for a tree whose root reports `estimate`.
    pub fn target_size(&self, estimate: SizeEstimate) -> usize {
        self.config.leaf_size.unwrap_or_else(|| {
            task::target_size_for(estimate, self.config.parallelism.saturating_mul(self.config.over_partition_factor))
        })
    }

    /// Runs `task` over `cursor` as a fork/join tree on the pool and returns the root result.
    pub fn invoke<T: TreeTask>(&self, task: T, cursor: T::Cursor) -> Result<T::Output> {
        let estimate = cursor.estimate_size();
        let target = self.target_size(estimate);
        debug!(?estimate, target, "invoking task tree");
        task::run(&self.pool, task, cursor, target)
    }
}
