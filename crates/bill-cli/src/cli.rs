use std::net::SocketAddr;
use std::path::PathBuf;

use bill_types::Amount;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bill",
    about = "Banknote ledger relay: register, look up, sign, and verify bills",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Relay gateway URL (overrides the relay config file)
    #[arg(long, global = true)]
    pub relay: Option<String>,

    /// Relay client config file (TOML)
    #[arg(long, global = true)]
    pub relay_config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the relay gateway over an in-memory ledger
    Serve(ServeArgs),
    /// Print the canonical message and content hash of a bill
    Hash(BillArgs),
    /// Sign a bill for a physical tag
    Sign(SignArgs),
    /// Verify a tag payload against its public key
    VerifyTag(VerifyTagArgs),
    /// Ask the relay whether a serial is issued
    Lookup(LookupArgs),
    /// Register a bill through the relay
    Register(RegisterArgs),
    /// Read extractor replies from stdin and emit notifications on stdout
    Scan(ScanArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Gateway config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Disable permissive CORS
    #[arg(long)]
    pub no_cors: bool,
}

#[derive(Args, Clone)]
pub struct BillArgs {
    pub serial: String,
    pub currency: String,
    pub value: Amount,
}

#[derive(Args)]
pub struct KeyArgs {
    /// Signing key file; created on first use
    #[arg(long)]
    pub key_file: Option<PathBuf>,
    /// Fixed hex seed (test fixtures only)
    #[arg(long)]
    pub seed_hex: Option<String>,
}

#[derive(Args)]
pub struct SignArgs {
    #[command(flatten)]
    pub bill: BillArgs,
    #[command(flatten)]
    pub key: KeyArgs,
    /// Write the encoded tag record to this file
    #[arg(long)]
    pub record: Option<PathBuf>,
    /// Also register the bill through the relay
    #[arg(long)]
    pub register: bool,
}

#[derive(Args)]
pub struct VerifyTagArgs {
    /// Tag dump: an encoded text record or any bytes containing the payload JSON
    pub input: PathBuf,
    /// Hex public key of the signer
    #[arg(long)]
    pub pubkey: String,
    /// Expected serial, currency, and denomination from the last scan
    #[arg(long, num_args = 3, value_names = ["SERIAL", "CURRENCY", "DENOMINATION"])]
    pub expect: Option<Vec<String>>,
}

#[derive(Args)]
pub struct LookupArgs {
    pub serial: String,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub bill: BillArgs,
    /// Tag public key to report to the gateway
    #[arg(long)]
    pub pubkey: Option<String>,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Skip ledger lookups
    #[arg(long)]
    pub no_blockchain_check: bool,
    /// Send the fixed test scan before reading stdin
    #[arg(long)]
    pub test_scan: bool,
}
