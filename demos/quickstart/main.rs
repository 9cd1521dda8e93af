use a0x_quoter::quoting::{
    config::QuoterConfig,
    evm::{client::get_client, quoter::Quoter},
    models::{Chain, QuoteRequest, SwapRoute, Token},
};

#[tokio::main]
async fn main() {
    // Setup variables. ETH_RPC_URL must point at a Base node (a .env file works too)
    let config = QuoterConfig {
        chain: Chain::Base,
        ..QuoterConfig::from_env().expect("Invalid config")
    };
    let client = get_client(config.rpc_url().expect("Missing ETH_RPC_URL"))
        .await
        .expect("Failed to connect to RPC");
    let quoter = Quoter::from_config(client, &config).expect("Failed to create quoter");

    // Prepare the route. We will price 1 WETH in USDC through the 0.05% pool
    let weth = Token::new("0x4200000000000000000000000000000000000006", 18)
        .expect("Failed to create WETH token");
    let usdc = Token::new("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", 6)
        .expect("Failed to create USDC token");
    let route =
        SwapRoute::through(&[weth.clone(), usdc.clone()], vec![500]).expect("Invalid route");
    let request = QuoteRequest::new(route, "1", weth.decimals, usdc.decimals);

    // Quote it
    let quote = quoter
        .quote(&request)
        .await
        .expect("Failed to quote");

    match quote.rate {
        Some(rate) => println!("1 WETH is worth {rate} USDC (path {})", quote.encoded_path),
        None => println!("No price available for path {}", quote.encoded_path),
    }
}
