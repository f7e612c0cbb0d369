//! Synthetic message generation for the mqtt-bench publish benchmark.
//!
//! This crate provides the `MessageGenerator` which produces the full ordered
//! message sequence before a benchmark run starts. Topics are derived from a
//! pattern by substituting random device and control identifiers; payloads
//! are small stringified integers.
//!
//! # Architecture
//!
//! ```text
//! topic pattern ("/devices/{device_id}/controls/{control_id}")
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ MessageGenerator │
//! │                  │
//! │  - pattern       │
//! │  - rng (StdRng)  │
//! └────────┬─────────┘
//!          │
//!          ▼
//!    Message { topic, payload }
//! ```
//!
//! # Example
//!
//! ```rust
//! use bench_generator::MessageGenerator;
//!
//! let mut generator = MessageGenerator::with_seed("/devices/{device_id}/state", 42);
//! let messages = generator.generate(3);
//! assert_eq!(messages.len(), 3);
//! ```

pub mod generator;

// Re-exports for convenience
pub use generator::{Message, MessageGenerator};
