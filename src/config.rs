use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::network::{ONE_XLM, STANDALONE_NETWORK_PASSPHRASE};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8000/soroban/rpc";

/// Account the CLI signs with by default; the fixture creates it.
pub const DEFAULT_ACCOUNT: &str = "GDIY6AQQ75WMD4W46EYB7O6UYMHOCGQHLAQGQTKHDX4J2DYQCHVCR4W4";

pub const DEFAULT_WASM: &str = "target/wasm32-unknown-unknown/test-wasms/test_hello_world.wasm";

/// Everything a scenario needs to know about its surroundings. Loaded once and
/// shared read-only by every component.
#[derive(Debug, clap::Args, Clone)]
#[group(skip)]
pub struct Config {
    /// RPC server endpoint
    #[arg(long, env = "SOROBAN_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Network passphrase to sign and send transactions with
    #[arg(
        long,
        env = "SOROBAN_NETWORK_PASSPHRASE",
        default_value = STANDALONE_NETWORK_PASSPHRASE
    )]
    pub network_passphrase: String,

    /// Program that runs the CLI under test
    #[arg(long, env = "SOROBAN_E2E_CLI", default_value = "cargo")]
    pub cli: String,

    /// Arguments placed before every scenario command, shell quoted
    #[arg(
        long,
        env = "SOROBAN_E2E_CLI_ARGS",
        default_value = "run -q -- --vv",
        allow_hyphen_values = true
    )]
    pub cli_args: String,

    /// Working directory for the CLI process, defaults to the current one
    #[arg(long, env = "SOROBAN_E2E_CLI_DIR")]
    pub cli_dir: Option<PathBuf>,

    /// Kill the CLI and fail the scenario after this long
    #[arg(long, env = "SOROBAN_E2E_CLI_TIMEOUT", default_value = "300s", value_parser = humantime::parse_duration)]
    pub cli_timeout: Duration,

    /// Contract used by the scenarios
    #[arg(long, env = "SOROBAN_E2E_WASM", default_value = DEFAULT_WASM)]
    pub wasm: PathBuf,

    /// Account created before each scenario
    #[arg(long, env = "SOROBAN_E2E_ACCOUNT", default_value = DEFAULT_ACCOUNT)]
    pub account: String,

    /// Starting balance of the created account, in XLM
    #[arg(long, env = "SOROBAN_E2E_STARTING_BALANCE", default_value = "100000")]
    pub starting_balance: i64,

    /// Time between transaction status checks
    #[arg(long, env = "SOROBAN_E2E_POLL_INTERVAL", default_value = "1s", value_parser = humantime::parse_duration)]
    pub poll_interval: Duration,

    /// Give up waiting for a submitted transaction after this long
    #[arg(long, env = "SOROBAN_E2E_TX_TIMEOUT", default_value = "30s", value_parser = humantime::parse_duration)]
    pub tx_timeout: Duration,
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct FromEnv {
    #[command(flatten)]
    config: Config,
}

impl Config {
    /// Reads the configuration from `SOROBAN_*` environment variables, falling
    /// back to the standalone network defaults.
    pub fn from_env() -> Result<Self, clap::Error> {
        FromEnv::try_parse_from(std::iter::empty::<String>()).map(|parsed| parsed.config)
    }

    /// Starting balance in stroops.
    pub fn starting_balance_stroops(&self) -> i64 {
        self.starting_balance.saturating_mul(ONE_XLM)
    }
}
