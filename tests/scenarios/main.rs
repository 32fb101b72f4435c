//! Hangar end-to-end scenarios
//!
//! Every scenario goes through the `hangar` facade only, over an in-memory
//! store.
//!
//! ## Groups
//!
//! - **world**: create, enumerate, resolve, mutate and persist world entities
//! - **inventory**: actor-scoped registries and the `actor:` name form
//! - **compendium**: content packs, locking and cache coherence
//! - **insinuation**: copying entities between registries
//!
//! ## Running Tests
//!
//! ```bash
//! RUST_LOG=hangar=debug cargo test --test scenarios
//! ```

// Test modules
mod test_utils;

mod compendium;
mod insinuation;
mod inventory;
mod world;
