use std::io::{self, Read};

use a0x_quoter::quoting::{
    config::QuoterConfig,
    evm::{client::get_client, quoter::Quoter},
    models::{QuoteRequest, SwapRoute},
};
use tracing::info;

mod lib {
    pub mod cli;
    pub mod logging;
}

use lib::{
    cli::{Cli, Command, Parser},
    logging::setup_logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level, cli.log_json);

    match cli.command {
        Command::EncodePath { path, fees } => {
            let route = SwapRoute::new(path, fees)?;
            println!("{}", route.encode()?);
        }
        Command::Quote(args) => {
            // Read from stdin until EOF
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Failed to read from stdin: {}", e))?;

            if buffer.trim().is_empty() {
                eprintln!("Error: No input provided, expected a quote request as JSON on stdin");
                std::process::exit(1);
            }

            let request: QuoteRequest = serde_json::from_str(&buffer)?;
            request.validate()?;

            let config = args.apply(QuoterConfig::from_env()?)?;
            let client = get_client(config.rpc_url()?).await?;
            let quoter = Quoter::from_config(client, &config)?;
            info!(
                chain = %config.chain,
                quoter = %quoter.quoter_address(),
                hops = request.route.hops(),
                "Quoting"
            );

            let quote = quoter.quote(&request).await?;
            println!(
                "{}",
                serde_json::to_string(&quote)
                    .map_err(|e| format!("Failed to serialize output: {}", e))?
            );
        }
    }

    Ok(())
}
