//! Construction options for the skip list.

use crate::skip_list::MAX_LEVEL;

/// Options controlling level selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of levels, counting level 0. Clamped to `1..=MAX_LEVEL`.
    pub max_level: usize,
    /// Seed for the promotion coin. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Config {
    pub fn new() -> Config {
        Config {
            max_level: MAX_LEVEL,
            seed: None,
        }
    }

    /// Make level selection reproducible.
    pub fn with_seed(mut self, seed: u64) -> Config {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_level(mut self, max_level: usize) -> Config {
        self.max_level = max_level;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = Config::default().with_seed(42).with_max_level(4);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_level, 4);
        assert_eq!(Config::new().max_level, MAX_LEVEL);
    }
}
