//! Runtime configuration.

/// Default cap on recorded hops per raise.
pub const DEFAULT_HOP_LIMIT: usize = 32;

/// Name of the frame that is always at the bottom of the stack.
pub const DEFAULT_ROOT_NAME: &str = "<root>";

/// Knobs for a [`Runtime`](crate::Runtime) or [`Process`](crate::Process).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Config {
    /// Maximum hops kept on a [`Raised`](crate::Raised); later hops are dropped.
    pub hop_limit: usize,
    pub root_name: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hop_limit: DEFAULT_HOP_LIMIT,
            root_name: DEFAULT_ROOT_NAME,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hop_limit(mut self, limit: usize) -> Self {
        self.hop_limit = limit;
        self
    }

    pub fn root_name(mut self, name: &'static str) -> Self {
        self.root_name = name;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::new().hop_limit(4).root_name("init");
        assert_eq!(config.hop_limit, 4);
        assert_eq!(config.root_name, "init");
        assert_eq!(Config::default().hop_limit, DEFAULT_HOP_LIMIT);
    }
}
