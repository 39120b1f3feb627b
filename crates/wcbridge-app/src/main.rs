//! wcbridge: in-process wallet bridge.
//!
//! Wires an extension window, the iframe relay and the tab controller
//! together, backed by a loopback signer. Extension commands are read as
//! JSON lines on stdin; everything the relay posts back to the extension is
//! written as JSON lines on stdout.

mod cli;
mod harness;
mod loopback;

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;
use wcbridge_common::{Action, BridgeError, CommandEnvelope, ConfigError, ProtocolError};
use wcbridge_config::BridgeConfig;

use crate::cli::Args;
use crate::harness::Bridge;
use crate::loopback::LoopbackSigner;

const IFRAME_TARGET: &str = "WC-IFRAME";

fn load_config(args: &Args) -> Result<BridgeConfig, ConfigError> {
    match &args.config {
        Some(path) => wcbridge_config::load_config_from(Path::new(path)),
        None => wcbridge_config::load_config(),
    }
}

/// `RUST_LOG` wins, then `--log-level`, then the config file.
fn init_logging(args: &Args, config: &BridgeConfig) {
    let directive = match &args.log_level {
        Some(level) if level.contains('=') => level.clone(),
        Some(level) => format!("wcbridge={level}"),
        None => config.logging.directive(),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();
}

/// Parse one stdin line into a command for the relay. A missing `target`
/// defaults to the relay's; any other target would never be answered.
fn parse_command(line: &str) -> Result<CommandEnvelope, ProtocolError> {
    let mut value: serde_json::Value =
        serde_json::from_str(line).map_err(|e| ProtocolError::InvalidEnvelope(e.to_string()))?;
    let Some(object) = value.as_object_mut() else {
        return Err(ProtocolError::InvalidEnvelope("not a JSON object".into()));
    };
    match object.get("target").cloned() {
        None => {
            object.insert("target".into(), IFRAME_TARGET.into());
        }
        Some(target) if target.as_str() == Some(IFRAME_TARGET) => {}
        Some(target) => {
            let target = target
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| target.to_string());
            return Err(ProtocolError::UnexpectedTarget(target));
        }
    }
    let command = CommandEnvelope::deserialize(&value)
        .map_err(|e| ProtocolError::InvalidEnvelope(e.to_string()))?;
    Ok(command)
}

/// Whether the relay will eventually post something back for `command`.
fn expects_reply(command: &CommandEnvelope) -> bool {
    command.action != Action::ConnectionCheck
}

async fn run(args: Args, config: BridgeConfig) -> wcbridge_common::Result<()> {
    let signer = Arc::new(LoopbackSigner::new(
        config.tab.bridge_url.clone(),
        args.accounts.clone(),
        config.tab.chain_id,
        args.reject,
    ));
    let mut bridge = Bridge::start(&config, signer)
        .await
        .map_err(|e| BridgeError::Signing(e.message))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut stdin_open = true;
    let mut outstanding = 0usize;

    let result = loop {
        if !stdin_open && outstanding == 0 {
            break Ok(());
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break Ok(());
            }

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(command) => {
                        if expects_reply(&command) {
                            outstanding += 1;
                        }
                        bridge.send(&command);
                    }
                    Err(e) => tracing::warn!(error = %e, "Ignoring input line"),
                },
                Ok(None) => {
                    tracing::debug!(outstanding, "Input closed");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read input");
                    stdin_open = false;
                }
            },

            reply = bridge.recv() => {
                let Some(reply) = reply else { break Ok(()) };
                outstanding = outstanding.saturating_sub(1);
                let line = format!("{reply}\n");
                if let Err(e) = stdout.write_all(line.as_bytes()).await {
                    break Err(BridgeError::from(e));
                }
                let _ = stdout.flush().await;
            }
        }
    };

    bridge.shutdown();
    result
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let (mut config, config_error) = match load_config(&args) {
        Ok(config) => (config, None),
        Err(e) => (BridgeConfig::default(), Some(e)),
    };
    init_logging(&args, &config);

    tracing::info!("wcbridge v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {path}");
    }
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }
    if let Some(chain_id) = args.chain_id {
        config.tab.chain_id = chain_id;
    }

    if let Err(e) = run(args, config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use wcbridge_common::Target;

    #[test]
    fn missing_target_defaults_to_relay() {
        let cmd = parse_command(r#"{"action":"walletconnect-unlock","params":{"addrIndex":0}}"#)
            .unwrap();
        assert_eq!(cmd.target, Target::Iframe);
        assert_eq!(cmd.action, Action::Unlock);
    }

    #[test]
    fn relay_target_is_accepted() {
        let cmd = parse_command(r#"{"target":"WC-IFRAME","action":"foo","id":"ab"}"#).unwrap();
        assert_eq!(cmd.action, Action::Unsupported("foo".into()));
        assert_eq!(cmd.id.as_ref().map(|id| id.as_str()), Some("ab"));
    }

    #[test]
    fn other_targets_are_rejected() {
        for line in [
            r#"{"target":"WC-TAB","action":"walletconnect-unlock","params":{"addrIndex":0}}"#,
            r#"{"target":"nope","action":"walletconnect-unlock"}"#,
            r#"{"target":7,"action":"walletconnect-unlock"}"#,
        ] {
            assert!(matches!(
                parse_command(line),
                Err(ProtocolError::UnexpectedTarget(_))
            ));
        }
    }

    #[test]
    fn malformed_lines_are_rejected() {
        for line in ["not json", "[1,2]", r#"{"target":"WC-IFRAME"}"#, r#"{"action":7}"#] {
            assert!(
                matches!(parse_command(line), Err(ProtocolError::InvalidEnvelope(_))),
                "{line}"
            );
        }
    }

    #[test]
    fn connection_checks_expect_no_reply() {
        let check = parse_command(r#"{"action":"walletconnect-connection-check"}"#).unwrap();
        assert!(!expects_reply(&check));
        let unlock = parse_command(r#"{"action":"walletconnect-unlock"}"#).unwrap();
        assert!(expects_reply(&unlock));
        let unknown = parse_command(r#"{"action":"foo"}"#).unwrap();
        assert!(expects_reply(&unknown));
    }
}
