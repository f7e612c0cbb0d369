//! Message generator producing the pre-built publish sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Placeholder in the topic pattern replaced with a random device id.
pub const DEVICE_ID_PLACEHOLDER: &str = "{device_id}";
/// Placeholder in the topic pattern replaced with a random control id.
pub const CONTROL_ID_PLACEHOLDER: &str = "{control_id}";

/// Device ids are drawn from `1..=DEVICE_ID_MAX`.
pub const DEVICE_ID_MAX: u32 = 1000;
/// Control ids are drawn from `1..=CONTROL_ID_MAX`.
pub const CONTROL_ID_MAX: u32 = 10;
/// Payload values are drawn from `0..=PAYLOAD_VALUE_MAX`.
pub const PAYLOAD_VALUE_MAX: u32 = 100;

/// A single pre-generated publish: topic plus payload.
///
/// Messages are produced once, up front, and consumed strictly in order by
/// the scheduler; they are never mutated after generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: String,
}

/// Generator that expands a topic pattern into a message sequence.
///
/// The pattern's `{device_id}` placeholder is substituted with a random
/// integer in `1..=1000` and `{control_id}` with one in `1..=10`; the payload
/// is a stringified integer in `0..=100`. Use [`MessageGenerator::with_seed`]
/// when a reproducible sequence is needed.
pub struct MessageGenerator {
    /// Topic pattern, possibly containing placeholders
    pattern: String,
    /// Random number generator driving all substitutions
    rng: StdRng,
}

impl MessageGenerator {
    /// Create a generator seeded from the operating system.
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a deterministic generator from a fixed seed.
    pub fn with_seed(pattern: &str, seed: u64) -> Self {
        Self {
            pattern: pattern.to_string(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `count` messages in publish order.
    pub fn generate(&mut self, count: usize) -> Vec<Message> {
        (0..count).map(|_| self.next_message()).collect()
    }

    fn next_message(&mut self) -> Message {
        let device_id = self.rng.random_range(1..=DEVICE_ID_MAX);
        let control_id = self.rng.random_range(1..=CONTROL_ID_MAX);
        let topic = self
            .pattern
            .replace(DEVICE_ID_PLACEHOLDER, &device_id.to_string())
            .replace(CONTROL_ID_PLACEHOLDER, &control_id.to_string());
        let payload = self.rng.random_range(0..=PAYLOAD_VALUE_MAX).to_string();

        Message { topic, payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: &str = "/devices/{device_id}/controls/{control_id}";

    #[test]
    fn test_generate_count() {
        let mut generator = MessageGenerator::with_seed(PATTERN, 42);
        let messages = generator.generate(250);
        assert_eq!(messages.len(), 250);
    }

    #[test]
    fn test_same_seed_produces_same_sequence() {
        let mut a = MessageGenerator::with_seed(PATTERN, 42);
        let mut b = MessageGenerator::with_seed(PATTERN, 42);
        assert_eq!(a.generate(100), b.generate(100));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = MessageGenerator::with_seed(PATTERN, 1);
        let mut b = MessageGenerator::with_seed(PATTERN, 2);
        assert_ne!(a.generate(100), b.generate(100));
    }

    #[test]
    fn test_placeholder_substitution_stays_in_range() {
        let mut generator = MessageGenerator::with_seed(PATTERN, 7);
        for message in generator.generate(200) {
            let segments: Vec<&str> = message.topic.split('/').collect();
            assert_eq!(segments[1], "devices");
            assert_eq!(segments[3], "controls");

            let device_id: u32 = segments[2].parse().unwrap();
            assert!((1..=DEVICE_ID_MAX).contains(&device_id));

            let control_id: u32 = segments[4].parse().unwrap();
            assert!((1..=CONTROL_ID_MAX).contains(&control_id));
        }
    }

    #[test]
    fn test_payload_value_range() {
        let mut generator = MessageGenerator::with_seed(PATTERN, 7);
        for message in generator.generate(200) {
            let value: u32 = message.payload.parse().unwrap();
            assert!(value <= PAYLOAD_VALUE_MAX);
        }
    }

    #[test]
    fn test_pattern_without_placeholders_is_kept_verbatim() {
        let mut generator = MessageGenerator::with_seed("bench/static/topic", 42);
        for message in generator.generate(10) {
            assert_eq!(message.topic, "bench/static/topic");
        }
    }
}
