use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Envelope-level failures: a message that cannot be routed or decoded.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid command: {0}")]
    InvalidEnvelope(String),

    #[error("invalid params for {action}: {reason}")]
    InvalidParams { action: String, reason: String },

    #[error("unexpected target: {0}")]
    UnexpectedTarget(String),
}

/// Failures on the relay side of the bridge. Each one is reported back to
/// the extension as an error reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("tab did not become ready within {0:?}")]
    ReadyTimeout(Duration),

    #[error("no reply from tab within {0:?}")]
    ReplyTimeout(Duration),

    #[error("relay shut down")]
    Cancelled,

    #[error("failed to open tab: {0}")]
    TabOpen(String),

    #[error("channel closed")]
    ChannelClosed,
}

/// Failures that stop the bridge process.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("signing session failed: {0}")]
    Signing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("relay.ping_interval_ms = 0".into());
        assert_eq!(
            err.to_string(),
            "config validation error: relay.ping_interval_ms = 0"
        );
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::InvalidParams {
            action: "walletconnect-unlock".into(),
            reason: "missing field `addrIndex`".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid params for walletconnect-unlock: missing field `addrIndex`"
        );

        let err = ProtocolError::UnexpectedTarget("WC-NOWHERE".into());
        assert_eq!(err.to_string(), "unexpected target: WC-NOWHERE");
    }

    #[test]
    fn relay_error_display() {
        let err = RelayError::ReadyTimeout(Duration::from_secs(2));
        assert_eq!(err.to_string(), "tab did not become ready within 2s");

        let err = RelayError::ReplyTimeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "no reply from tab within 250ms");

        assert_eq!(RelayError::Cancelled.to_string(), "relay shut down");
    }

    #[test]
    fn bridge_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: BridgeError = io_err.into();
        assert!(matches!(err, BridgeError::Io(_)));
        assert!(err.to_string().contains("stdout closed"));
    }

    #[test]
    fn bridge_error_signing() {
        let err = BridgeError::Signing("bridge unreachable".into());
        assert_eq!(err.to_string(), "signing session failed: bridge unreachable");
    }
}
