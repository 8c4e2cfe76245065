#![allow(dead_code)]

use unixsock::logging::{LogConfig, init_logging};

/// Install a debug-level subscriber once per test binary.
pub fn init_test_logging() {
    let config = LogConfig {
        level: "unixsock=debug".to_string(),
        ..LogConfig::default()
    };
    let _ = init_logging(&config);
}

/// An abstract address unique to this process and test.
pub fn abstract_name(test_name: &str) -> Vec<u8> {
    format!("\0unixsock-{}-{test_name}", std::process::id()).into_bytes()
}
