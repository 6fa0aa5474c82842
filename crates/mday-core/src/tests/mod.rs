//! Cross-module tests for the engine.
//!
//! - **Determinism tests**: identical command streams produce identical worlds
//! - **Integration tests**: full activations through the `Runner`
//! - **Property tests**: movement and view invariants over generated inputs
//!
//! # Test Structure
//!
//! - `determinism.rs`: replays the same scenario twice and compares state
//! - `integration.rs`: end-to-end tests through the scheduler
//! - `properties.rs`: `proptest` properties for the mover and the view
//! - `helpers.rs`: scenario builders shared by the above

mod determinism;
mod helpers;

pub use helpers::*;
