//! Shared helpers for scenario tests

use std::sync::{Arc, Once};

use hangar::{Hangar, MemoryStore, RawRecord, RegRef};
use serde_json::Value;

static TRACING: Once = Once::new();

/// Install a fmt subscriber writing through the test harness
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A hangar over a fresh store, with the store kept for pack setup
pub fn setup() -> (Arc<MemoryStore>, Hangar) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let hangar = Hangar::new(store.clone());
    (store, hangar)
}

pub fn raw(value: Value) -> RawRecord {
    RawRecord::from_value(value)
}

pub fn json_ref(r: &RegRef) -> Value {
    r.to_json().unwrap()
}
