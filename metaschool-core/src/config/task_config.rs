//! Parameters of one construction stage.
use super::ConfigValue;
use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Index,
};

/// An ordered record of named parameters for one task facet.
///
/// A [`TaskConfig`] holds the parameters of a base environment, or of one
/// wrapper applied around it. Keys keep their insertion order, but two configs
/// are equal whenever they hold the same key-value pairs, whatever the order.
///
/// No schema is enforced here. Consumers, i.e. [`EnvFactory::make`] and
/// [`WrapperFactory::wrap`], read the keys they expect with the typed getters
/// and fail with [`ConfigError`] when a key is absent or of the wrong shape.
///
/// ```rust
/// use metaschool_core::TaskConfig;
///
/// let mut config = TaskConfig::new().with("seed", 42).with("car", "Volvo");
/// config.set("location", "Town2");
/// assert_eq!(config.get_i64("seed").unwrap(), 42);
/// assert_eq!(config["car"].as_str(), Some("Volvo"));
/// ```
///
/// [`EnvFactory::make`]: crate::EnvFactory::make
/// [`WrapperFactory::wrap`]: crate::WrapperFactory::wrap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskConfig(IndexMap<String, ConfigValue>);

impl TaskConfig {
    /// Creates an empty config.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Creates a config from a slice of key-value pairs.
    pub fn from_slice<K, V>(s: &[(K, V)]) -> Self
    where
        K: Into<String> + Clone,
        V: Into<ConfigValue> + Clone,
    {
        s.iter().cloned().collect()
    }

    /// Sets a parameter and returns the config.
    pub fn with(mut self, k: impl Into<String>, v: impl Into<ConfigValue>) -> Self {
        self.set(k, v);
        self
    }

    /// Sets a parameter, replacing any previous value under the same key.
    pub fn set(&mut self, k: impl Into<String>, v: impl Into<ConfigValue>) {
        self.insert(k, v.into());
    }

    /// Inserts a value, returning the value previously stored under the key.
    pub fn insert(&mut self, k: impl Into<String>, v: ConfigValue) -> Option<ConfigValue> {
        self.0.insert(k.into(), v)
    }

    /// Removes a parameter, keeping the order of the remaining ones.
    pub fn remove(&mut self, k: &str) -> Option<ConfigValue> {
        self.0.shift_remove(k)
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&ConfigValue> {
        self.0.get(k)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the config holds no parameter.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over the key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, k: &str) -> Result<&ConfigValue, ConfigError> {
        self.0
            .get(k)
            .ok_or_else(|| ConfigError::MissingKey(k.to_string()))
    }

    fn mismatch(k: &str, expected: &'static str) -> ConfigError {
        ConfigError::TypeMismatch {
            key: k.to_string(),
            expected,
        }
    }

    /// Gets an integer parameter.
    pub fn get_i64(&self, k: &str) -> Result<i64, ConfigError> {
        self.require(k)?
            .as_i64()
            .ok_or_else(|| Self::mismatch(k, "int"))
    }

    /// Gets a non-negative integer parameter.
    pub fn get_usize(&self, k: &str) -> Result<usize, ConfigError> {
        let v = self.get_i64(k)?;
        usize::try_from(v).map_err(|_| ConfigError::InvalidValue {
            key: k.to_string(),
            reason: format!("expected a non-negative integer, got {}", v),
        })
    }

    /// Gets a numeric parameter. Integers are converted.
    pub fn get_f64(&self, k: &str) -> Result<f64, ConfigError> {
        self.require(k)?
            .as_f64()
            .ok_or_else(|| Self::mismatch(k, "float"))
    }

    /// Gets a boolean parameter.
    pub fn get_bool(&self, k: &str) -> Result<bool, ConfigError> {
        self.require(k)?
            .as_bool()
            .ok_or_else(|| Self::mismatch(k, "bool"))
    }

    /// Gets a text parameter.
    pub fn get_str(&self, k: &str) -> Result<&str, ConfigError> {
        self.require(k)?
            .as_str()
            .ok_or_else(|| Self::mismatch(k, "string"))
    }

    /// Gets a sequence parameter.
    pub fn get_list(&self, k: &str) -> Result<&[ConfigValue], ConfigError> {
        self.require(k)?
            .as_list()
            .ok_or_else(|| Self::mismatch(k, "list"))
    }

    /// Returns a copy of this config with the keys of `overlay` laid over it.
    ///
    /// Values of `overlay` win on conflicting keys.
    pub fn merge(&self, overlay: &TaskConfig) -> TaskConfig {
        let mut merged = self.clone();
        merged.merge_inplace(overlay);
        merged
    }

    /// Lays the keys of `overlay` over this config.
    pub fn merge_inplace(&mut self, overlay: &TaskConfig) {
        for (k, v) in overlay.0.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Builds a config from the fields of a serializable struct.
    pub fn from_struct<T: Serialize>(value: &T) -> Result<Self, ConfigError> {
        let value = serde_yaml::to_value(value).map_err(|e| ConfigError::Serde(e.to_string()))?;
        serde_yaml::from_value(value).map_err(|e| ConfigError::Serde(e.to_string()))
    }

    /// Reads the config as a typed struct.
    ///
    /// Fields absent from the config must have a serde default on `T`.
    pub fn to_struct<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let value = serde_yaml::to_value(self).map_err(|e| ConfigError::Serde(e.to_string()))?;
        serde_yaml::from_value(value).map_err(|e| ConfigError::Serde(e.to_string()))
    }

    fn sorted_pairs(&self) -> Vec<(&String, &ConfigValue)> {
        let mut pairs: Vec<_> = self.0.iter().collect();
        pairs.sort();
        pairs
    }
}

impl Hash for TaskConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted_pairs().hash(state);
    }
}

impl Index<&str> for TaskConfig {
    type Output = ConfigValue;

    /// Panics if the key is absent, like map indexing in the standard library.
    fn index(&self, k: &str) -> &ConfigValue {
        &self.0[k]
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for TaskConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> Extend<(K, V)> for TaskConfig {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl fmt::Display for TaskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}
