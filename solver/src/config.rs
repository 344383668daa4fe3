//! Runtime-tunable knobs enumerated in spec.md §6, gathered into one
//! struct so the CLI and the orchestrator agree on a single source of
//! defaults.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Fraction in (0,1]; exploration stops once coverage exceeds this.
    pub coverage_limit: f64,
    /// Wall-clock budget for a single exploration run.
    pub time_limit_seconds: f64,
    /// Cells per second; controls the inter-move delay and the
    /// return-budget heuristic.
    pub robot_speed: f64,
    /// Delay between consolidated motion-frame chunks.
    pub motion_chunk_pacing_seconds: f64,
    /// Delay after a move before requesting fresh sensor readings.
    pub sensor_request_delay_seconds: f64,
    /// How often the orchestrator polls the inbound queue when idle.
    pub inbound_poll_interval_seconds: f64,
    /// Length of the movement signature that triggers loop escape.
    pub loop_escape_signature_length: usize,
    /// Max characters per consolidated motion-frame chunk.
    pub motion_chunk_char_budget: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coverage_limit: 1.0,
            time_limit_seconds: 360.0,
            robot_speed: 1.0,
            motion_chunk_pacing_seconds: 7.0,
            sensor_request_delay_seconds: 0.2,
            inbound_poll_interval_seconds: 0.1,
            loop_escape_signature_length: 6,
            motion_chunk_char_budget: 64,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0 < self.coverage_limit && self.coverage_limit <= 1.0) {
            return Err(format!(
                "coverage_limit must be in (0,1], got {}",
                self.coverage_limit
            ));
        }
        if self.robot_speed <= 0.0 {
            return Err(format!(
                "robot_speed must be > 0, got {}",
                self.robot_speed
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.coverage_limit, 1.0);
        assert_eq!(config.time_limit_seconds, 360.0);
        assert_eq!(config.motion_chunk_pacing_seconds, 7.0);
        assert_eq!(config.sensor_request_delay_seconds, 0.2);
        assert_eq!(config.inbound_poll_interval_seconds, 0.1);
        assert_eq!(config.loop_escape_signature_length, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_coverage_limit() {
        let mut config = Config::default();
        config.coverage_limit = 0.0;
        assert!(config.validate().is_err());
        config.coverage_limit = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_nonpositive_speed() {
        let mut config = Config::default();
        config.robot_speed = 0.0;
        assert!(config.validate().is_err());
    }
}
