use std::time::Duration;

/// Runtime limits for one session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub max_turns: usize,
    pub read_max_bytes: usize,
    pub command_output_max_bytes: usize,
    pub http_body_max_bytes: usize,
    pub command_timeout: Duration,
    pub http_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: 100,
            read_max_bytes: 50_000,
            command_output_max_bytes: 8_000,
            http_body_max_bytes: 8_000,
            command_timeout: Duration::from_secs(120),
            http_timeout: Duration::from_secs(15),
        }
    }
}

impl SessionConfig {
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_turns, 100);
        assert_eq!(config.read_max_bytes, 50_000);
        assert_eq!(config.command_output_max_bytes, 8_000);
        assert_eq!(config.http_body_max_bytes, 8_000);
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(SessionConfig::default().with_max_turns(3).max_turns, 3);
    }
}
