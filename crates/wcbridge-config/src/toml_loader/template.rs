//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Wallet bridge configuration
# Only override what you want to change -- missing fields use defaults.

[channel]
# name = "walletconnect"
# capacity = 64               # 1-4096

[relay]
# tab_name = "walletconnect-tab"
# tab_url = "http://localhost:3000"
# ping_interval_ms = 1000     # 10-60000
# ready_timeout_secs = 120    # 1-3600
# reply_timeout_secs = 600    # 1-86400

[tab]
# bridge_url = "https://bridge.walletconnect.org"
# chain_id = 1

[logging]
# level = "INFO"              # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
