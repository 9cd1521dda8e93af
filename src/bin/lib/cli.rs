pub use clap::Parser;
use clap::{Args, Subcommand};

use a0x_quoter::quoting::{config::QuoterConfig, errors::QuoteError, models::Chain};

#[derive(Parser)]
#[command(name = "a0x-quote", version)]
/// Quote multi-hop swaps through an on-chain Uniswap-V3-style quoter
///
/// `quote` reads a JSON object from stdin with the following structure:
/// ```json
/// {
///     "path": ["0x...", "0x...", "0x..."],
///     "fees": [500, 3000],
///     "amountIn": "1.5",
///     "tokenInDecimals": 18,
///     "tokenOutDecimals": 6
/// }
/// ```
/// and prints the quote as JSON. Settings not given as flags are read from the environment
/// (`ETH_RPC_URL`, `QUOTER_CHAIN`, `QUOTER_ADDRESS`, `QUOTE_MAX_ATTEMPTS`,
/// `QUOTE_RETRY_QUOTER_FAILURES`), including a `.env` file.
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level or filter directives (e.g. `debug` or `a0x_quoter=trace`). `RUST_LOG` wins if set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the packed path for a route without touching the chain
    EncodePath {
        /// Token addresses in swap order, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        path: Vec<String>,

        /// Fee tier of each hop in hundredths of a bip, comma separated
        #[arg(long, value_delimiter = ',')]
        fees: Vec<u32>,
    },
    /// Quote the request read from stdin
    Quote(QuoteArgs),
}

#[derive(Args)]
pub struct QuoteArgs {
    /// JSON-RPC endpoint of the target chain
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Chain whose default quoter deployment is used (ethereum, base)
    #[arg(long)]
    pub chain: Option<String>,

    /// Quoter contract address, overrides the chain default
    #[arg(long)]
    pub quoter: Option<String>,

    /// Attempts for transient RPC failures
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Hand failing quoter calls to the retry loop instead of returning an empty quote
    #[arg(long)]
    pub retry_quoter_failures: bool,
}

impl QuoteArgs {
    /// Layers the command line flags over `config`.
    pub fn apply(self, mut config: QuoterConfig) -> Result<QuoterConfig, QuoteError> {
        if let Some(rpc_url) = self.rpc_url {
            config.rpc_url = Some(rpc_url);
        }
        if let Some(chain) = self.chain {
            config.chain = chain.parse::<Chain>()?;
        }
        if let Some(quoter) = self.quoter {
            config.quoter_address = Some(quoter);
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if self.retry_quoter_failures {
            config.retry_quoter_failures = true;
        }
        config.validate()?;
        Ok(config)
    }
}
