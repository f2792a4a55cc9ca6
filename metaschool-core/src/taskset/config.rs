//! Configuration of [`GymTaskset`](super::GymTaskset).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`GymTaskset`](super::GymTaskset).
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Default)]
pub struct GymTasksetConfig {
    /// Seed of the random source passed to the factories.
    ///
    /// With `None`, the source is seeded from system entropy.
    pub seed: Option<u64>,
}

impl GymTasksetConfig {
    /// Sets the seed of the random source.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Constructs [`GymTasksetConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GymTasksetConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
