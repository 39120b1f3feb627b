//! Full configuration validation.
//!
//! Validates numeric ranges, names and URLs. Every violation is collected
//! into a single `ConfigError`.

mod helpers;


use crate::schema::BridgeConfig;
use wcbridge_common::ConfigError;

use helpers::{validate_non_empty, validate_range, validate_url};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &BridgeConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_channel(&mut errors, config);
    validate_relay(&mut errors, config);
    validate_tab(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_channel(errors: &mut Vec<String>, config: &BridgeConfig) {
    validate_non_empty(errors, "channel.name", &config.channel.name);
    validate_range(errors, "channel.capacity", config.channel.capacity, 1, 4096);
}

fn validate_relay(errors: &mut Vec<String>, config: &BridgeConfig) {
    let relay = &config.relay;
    validate_non_empty(errors, "relay.tab_name", &relay.tab_name);
    validate_url(errors, "relay.tab_url", &relay.tab_url, &["http://", "https://"]);
    validate_range(errors, "relay.ping_interval_ms", relay.ping_interval_ms, 10, 60_000);
    validate_range(errors, "relay.ready_timeout_secs", relay.ready_timeout_secs, 1, 3600);
    validate_range(errors, "relay.reply_timeout_secs", relay.reply_timeout_secs, 1, 86_400);

    if relay.ping_interval() >= relay.ready_timeout() {
        errors.push(format!(
            "relay.ping_interval_ms = {} must be shorter than relay.ready_timeout_secs = {}",
            relay.ping_interval_ms, relay.ready_timeout_secs
        ));
    }
}

fn validate_tab(errors: &mut Vec<String>, config: &BridgeConfig) {
    validate_url(
        errors,
        "tab.bridge_url",
        &config.tab.bridge_url,
        &["http://", "https://", "ws://", "wss://"],
    );
    if config.tab.chain_id == 0 {
        errors.push("tab.chain_id must be non-zero".into());
    }
}
