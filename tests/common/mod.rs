//! Shared helpers for the integration tests.

#![allow(dead_code)]

use rusty_logic::Value;

/// Route library logging to the test harness. Safe to call from every test.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn v(n: u64) -> Value {
    Value::from(n)
}
