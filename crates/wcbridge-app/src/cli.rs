use clap::Parser;

/// wcbridge: relays wallet-extension commands to a signing tab.
///
/// Reads extension commands as JSON lines on stdin and prints the replies
/// as JSON lines on stdout.
#[derive(Parser, Debug)]
#[command(name = "wcbridge", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Make the loopback signer reject every request.
    #[arg(long)]
    pub reject: bool,

    /// Accounts exposed by the loopback signer.
    #[arg(long, value_delimiter = ',', default_value = "0x0000000000000000000000000000000000000001")]
    pub accounts: Vec<String>,

    /// Chain id override for the signing session.
    #[arg(long)]
    pub chain_id: Option<u64>,
}

pub fn parse() -> Args {
    Args::parse()
}
