//! Mapping layer configuration.

/// Default bound on id-collision retries during insert.
pub const DEFAULT_MAX_INSERT_ATTEMPTS: u32 = 16;

/// Default namespace of the per-model id counters.
pub const DEFAULT_COUNTER_PREFIX: &str = "_meta:";

/// Configuration for a model registry.
#[derive(Debug, Clone)]
pub struct Config {
    /// How many freshly allocated ids an insert tries before giving up.
    pub max_insert_attempts: u32,

    /// Prefix of the counter key each model allocates ids from.
    pub counter_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_insert_attempts: DEFAULT_MAX_INSERT_ATTEMPTS,
            counter_prefix: DEFAULT_COUNTER_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the insert attempt bound. Values below 1 are raised to 1.
    #[must_use]
    pub fn max_insert_attempts(mut self, attempts: u32) -> Self {
        self.max_insert_attempts = attempts.max(1);
        self
    }

    /// Sets the id counter prefix.
    #[must_use]
    pub fn counter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.counter_prefix = prefix.into();
        self
    }
}
