//! CLI options and the traffic-shaping mode selector.

use clap::{Parser, ValueEnum};

/// Traffic-shaping mode selecting one of the four pacers.
///
/// Names are matched case-sensitively at startup; anything else fails the
/// run before a single message is published.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Fixed-size batches released once per second
    #[value(name = "constant")]
    Constant,
    /// Back-to-back batches separated by a fixed sleep
    #[value(name = "burst")]
    Burst,
    /// Batch size follows a linearly interpolated target rate
    #[value(name = "ramp-up")]
    RampUp,
    /// Batch size follows a uniformly random target rate
    #[value(name = "random")]
    Random,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Constant => "constant",
            Mode::Burst => "burst",
            Mode::RampUp => "ramp-up",
            Mode::Random => "random",
        };
        write!(f, "{name}")
    }
}

/// MQTT connection options.
#[derive(Parser, Clone, Debug)]
pub struct MqttOpts {
    /// Broker URL, e.g. tcp://localhost:1883
    #[arg(long, default_value = "tcp://localhost:1883", env = "BROKER_URL")]
    pub broker_url: String,

    /// Client identifier sent to the broker
    #[arg(long, default_value = "benchClient", env = "CLIENT_ID_PREFIX")]
    pub client_id_prefix: String,

    /// Username for broker authentication (credentials are omitted when empty)
    #[arg(long, default_value = "", env = "MQTT_USERNAME")]
    pub mqtt_username: String,

    /// Password for broker authentication
    #[arg(long, default_value = "", env = "MQTT_PASSWORD")]
    pub mqtt_password: String,

    /// Quality-of-service level for every publish (0, 1 or 2)
    #[arg(long, default_value = "0", env = "QoS")]
    pub qos: u8,

    /// Seconds to wait for a publish acknowledgment before counting a failure
    #[arg(long, default_value = "30", env = "PUBLISH_TIMEOUT_SEC")]
    pub publish_timeout_sec: u64,
}

/// Pacing options; each mode reads its own subset.
#[derive(Parser, Clone, Debug)]
pub struct ScheduleOpts {
    /// Traffic-shaping mode
    #[arg(long, value_enum, default_value = "constant", env = "MODE")]
    pub mode: Mode,

    /// Total number of messages generated and published
    #[arg(long, default_value = "1000", env = "TOTAL_SIGNALS")]
    pub total_signals: usize,

    /// constant: messages published per one-second tick
    #[arg(long, default_value = "100", env = "SIGNALS_PER_SECOND")]
    pub signals_per_second: usize,

    /// burst: messages per burst
    #[arg(long, default_value = "100", env = "BURST_SIZE")]
    pub burst_size: usize,

    /// burst: sleep between bursts in milliseconds
    #[arg(long, default_value = "1000", env = "BURST_INTERVAL_MS")]
    pub burst_interval_ms: u64,

    /// ramp-up: target rate at the start of the ramp
    #[arg(long, default_value = "50", env = "START_RATE")]
    pub start_rate: usize,

    /// ramp-up: target rate once the ramp completes
    #[arg(long, default_value = "1000", env = "END_RATE")]
    pub end_rate: usize,

    /// ramp-up: seconds over which the rate is interpolated
    #[arg(long, default_value = "300", env = "RAMP_DURATION_SEC")]
    pub ramp_duration_sec: u64,

    /// random: lower bound of the per-batch rate
    #[arg(long, default_value = "100", env = "MIN_RATE")]
    pub min_rate: usize,

    /// random: upper bound of the per-batch rate
    #[arg(long, default_value = "1000", env = "MAX_RATE")]
    pub max_rate: usize,
}

impl ScheduleOpts {
    /// Reject values the selected pacer cannot run with.
    ///
    /// Only the selected mode's parameters are checked, so an unrelated
    /// environment variable left at zero does not block the run.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.mode {
            Mode::Constant => {
                if self.signals_per_second == 0 {
                    anyhow::bail!("signals-per-second must be at least 1");
                }
            }
            Mode::Burst => {
                if self.burst_size == 0 {
                    anyhow::bail!("burst-size must be at least 1");
                }
            }
            Mode::RampUp => {
                if self.start_rate == 0 || self.end_rate == 0 {
                    anyhow::bail!("start-rate and end-rate must be at least 1");
                }
                if self.ramp_duration_sec == 0 {
                    anyhow::bail!("ramp-duration-sec must be at least 1");
                }
            }
            Mode::Random => {
                if self.min_rate == 0 {
                    anyhow::bail!("min-rate must be at least 1");
                }
                if self.max_rate < self.min_rate {
                    anyhow::bail!("max-rate must not be smaller than min-rate");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(mode: Mode) -> ScheduleOpts {
        ScheduleOpts {
            mode,
            total_signals: 1000,
            signals_per_second: 100,
            burst_size: 100,
            burst_interval_ms: 1000,
            start_rate: 50,
            end_rate: 1000,
            ramp_duration_sec: 300,
            min_rate: 100,
            max_rate: 1000,
        }
    }

    #[test]
    fn test_mode_names_are_case_sensitive() {
        assert_eq!(Mode::from_str("constant", false).unwrap(), Mode::Constant);
        assert_eq!(Mode::from_str("burst", false).unwrap(), Mode::Burst);
        assert_eq!(Mode::from_str("ramp-up", false).unwrap(), Mode::RampUp);
        assert_eq!(Mode::from_str("random", false).unwrap(), Mode::Random);

        assert!(Mode::from_str("Constant", false).is_err());
        assert!(Mode::from_str("BURST", false).is_err());
        assert!(Mode::from_str("rampup", false).is_err());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Mode::from_str("sawtooth", false).is_err());
        assert!(Mode::from_str("", false).is_err());
    }

    #[test]
    fn test_mode_display_matches_cli_names() {
        assert_eq!(Mode::Constant.to_string(), "constant");
        assert_eq!(Mode::Burst.to_string(), "burst");
        assert_eq!(Mode::RampUp.to_string(), "ramp-up");
        assert_eq!(Mode::Random.to_string(), "random");
    }

    #[test]
    fn test_validate_accepts_defaults_for_every_mode() {
        for mode in [Mode::Constant, Mode::Burst, Mode::RampUp, Mode::Random] {
            assert!(schedule(mode).validate().is_ok());
        }
    }

    #[test]
    fn test_validate_rejects_zero_rates_for_selected_mode() {
        let mut opts = schedule(Mode::Constant);
        opts.signals_per_second = 0;
        assert!(opts.validate().is_err());

        let mut opts = schedule(Mode::Burst);
        opts.burst_size = 0;
        assert!(opts.validate().is_err());

        let mut opts = schedule(Mode::RampUp);
        opts.ramp_duration_sec = 0;
        assert!(opts.validate().is_err());

        let mut opts = schedule(Mode::Random);
        opts.min_rate = 0;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_validate_ignores_other_modes_parameters() {
        let mut opts = schedule(Mode::Constant);
        opts.burst_size = 0;
        opts.min_rate = 0;
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_random_range() {
        let mut opts = schedule(Mode::Random);
        opts.min_rate = 500;
        opts.max_rate = 100;
        assert!(opts.validate().is_err());
    }
}
