use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use tracing::{debug, warn};

use crate::quoting::{
    config::QuoterConfig,
    errors::QuoteError,
    evm::{
        client::ChainReader,
        utils::{biguint_to_u256, decode_amount_out, parse_address, u256_to_biguint},
    },
    models::{validate_decimals, Quote, QuoteRequest},
    path::{encode_path_bytes, validate_swap_route},
    retry::RetryPolicy,
    units::{format_units, parse_units, units_to_f64},
};

sol! {
    #[derive(Debug)]
    function quoteExactInput(bytes path, uint256 amountIn) external returns (uint256 amountOut);
}

/// Prices multi-hop swaps through a Uniswap-V3-style quoter contract.
///
/// Every quote is computed fresh: nothing is cached and no state is shared between calls, so a
/// single `Quoter` can serve concurrent callers.
///
/// Failure handling has two tiers. Route, amount and decimals problems are returned as errors
/// before any RPC traffic. A failing quoter call is, by default, absorbed into an empty quote
/// (`amount_out == None`) inside the retried operation, so the retry loop sees a success and does
/// not retry it. With `retry_quoter_failures` the call error is handed to the retry loop instead.
pub struct Quoter<C> {
    client: C,
    quoter_address: Address,
    retry_policy: RetryPolicy,
    retry_quoter_failures: bool,
}

impl<C: ChainReader> Quoter<C> {
    pub fn new(client: C, quoter_address: Address) -> Self {
        Self {
            client,
            quoter_address,
            retry_policy: RetryPolicy::default(),
            retry_quoter_failures: false,
        }
    }

    pub fn from_config(client: C, config: &QuoterConfig) -> Result<Self, QuoteError> {
        config.validate()?;
        Ok(Self::new(client, parse_address(config.quoter_address())?)
            .with_retry_policy(RetryPolicy::new(config.max_attempts))
            .with_retry_quoter_failures(config.retry_quoter_failures))
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_retry_quoter_failures(mut self, retry_quoter_failures: bool) -> Self {
        self.retry_quoter_failures = retry_quoter_failures;
        self
    }

    pub fn quoter_address(&self) -> Address {
        self.quoter_address
    }

    /// Quotes `amount_in` (a human-readable decimal of the first token) along the route and
    /// returns the output amount of the last token as a float, or `None` if the quoter call failed.
    pub async fn quote_exact_input<T: AsRef<str>>(
        &self,
        path: &[T],
        fees: &[u32],
        amount_in: &str,
        token_in_decimals: u8,
        token_out_decimals: u8,
    ) -> Result<Option<f64>, QuoteError> {
        let quote = self
            .quote_route(path, fees, amount_in, token_in_decimals, token_out_decimals)
            .await?;
        Ok(quote.rate)
    }

    pub async fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        self.quote_route(
            &request.route.path,
            &request.route.fees,
            &request.amount_in,
            request.token_in_decimals,
            request.token_out_decimals,
        )
        .await
    }

    async fn quote_route<T: AsRef<str>>(
        &self,
        path: &[T],
        fees: &[u32],
        amount_in: &str,
        token_in_decimals: u8,
        token_out_decimals: u8,
    ) -> Result<Quote, QuoteError> {
        validate_decimals(token_in_decimals)?;
        validate_decimals(token_out_decimals)?;
        validate_swap_route(path.len(), fees.len())?;
        let encoded_path = Bytes::from(encode_path_bytes(path, fees)?);
        let amount_in_raw = parse_units(amount_in, token_in_decimals)?;
        let amount_in_units = biguint_to_u256(&amount_in_raw)?;
        debug!(
            quoter = %self.quoter_address,
            path = %encoded_path,
            amount_in = %amount_in_units,
            "Requesting quote"
        );

        let encoded = &encoded_path;
        let amount_out = self
            .retry_policy
            .run(move || self.attempt_quote(encoded, amount_in_units))
            .await?;

        let amount_out_raw = amount_out.map(u256_to_biguint);
        let (amount_out, rate) = match &amount_out_raw {
            Some(raw) => (
                Some(format_units(raw, token_out_decimals)),
                Some(units_to_f64(raw, token_out_decimals)?),
            ),
            None => (None, None),
        };

        Ok(Quote {
            encoded_path: encoded_path.to_string(),
            amount_in_raw,
            amount_out_raw,
            amount_out,
            rate,
        })
    }

    async fn attempt_quote(
        &self,
        encoded_path: &Bytes,
        amount_in: U256,
    ) -> Result<Option<U256>, QuoteError> {
        match self
            .call_quoter(encoded_path, amount_in)
            .await
        {
            Ok(amount_out) => Ok(Some(amount_out)),
            Err(err) if self.retry_quoter_failures => Err(err),
            Err(err) => {
                warn!(error = %err, "Quoter call failed, no quote available");
                Ok(None)
            }
        }
    }

    async fn call_quoter(&self, encoded_path: &Bytes, amount_in: U256) -> Result<U256, QuoteError> {
        let call = quoteExactInputCall { path: encoded_path.clone(), amountIn: amount_in };
        let response = self
            .client
            .read_call(self.quoter_address, Bytes::from(call.abi_encode()))
            .await?;
        let amount_out = decode_amount_out(&response)?;
        debug!(amount_out = %amount_out, "Quoter responded");
        Ok(amount_out)
    }
}

/// One-shot quote through `client`, using the default retry policy and the faithful failure
/// handling of [`Quoter`].
pub async fn quote_exact_input<C: ChainReader + Send + Sync, T: AsRef<str>>(
    client: &C,
    quoter_address: Address,
    path: &[T],
    fees: &[u32],
    amount_in: &str,
    token_in_decimals: u8,
    token_out_decimals: u8,
) -> Result<Option<f64>, QuoteError> {
    Quoter::new(client, quoter_address)
        .quote_exact_input(path, fees, amount_in, token_in_decimals, token_out_decimals)
        .await
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use alloy_sol_types::SolValue;
    use num_bigint::BigUint;
    use tokio::time::Instant;

    use super::*;
    use crate::quoting::models::SwapRoute;

    const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
    const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const DAI: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";
    const QUOTER: &str = "0x61ffe014ba17989e743c5f6cb21bf9697530b21e";

    /// Replays scripted `eth_call` responses and records every call it receives.
    #[derive(Default)]
    struct MockReader {
        responses: Mutex<VecDeque<Result<Bytes, QuoteError>>>,
        calls: Mutex<Vec<(Address, Bytes)>>,
    }

    impl MockReader {
        fn with_responses(responses: Vec<Result<Bytes, QuoteError>>) -> Self {
            Self { responses: Mutex::new(responses.into()), ..Default::default() }
        }

        fn returning(amount_out: u128) -> Self {
            Self::with_responses(vec![Ok(Bytes::from(U256::from(amount_out).abi_encode()))])
        }

        fn calls(&self) -> Vec<(Address, Bytes)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ChainReader for MockReader {
        async fn read_call(&self, to: Address, input: Bytes) -> Result<Bytes, QuoteError> {
            self.calls
                .lock()
                .unwrap()
                .push((to, input));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(QuoteError::FatalError("no scripted response".to_string())))
        }
    }

    fn quoter(reader: &MockReader) -> Quoter<&MockReader> {
        Quoter::new(reader, Address::from_str(QUOTER).unwrap())
    }

    #[tokio::test]
    async fn test_quote_one_weth_in_usdc() {
        let reader = MockReader::returning(1_800_000_000);

        let rate = quoter(&reader)
            .quote_exact_input(&[WETH, USDC], &[500], "1", 18, 6)
            .await
            .unwrap();

        assert_eq!(rate, Some(1800.0));
        let calls = reader.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Address::from_str(QUOTER).unwrap());

        let call = quoteExactInputCall::abi_decode(&calls[0].1, true).unwrap();
        assert_eq!(call.amountIn, U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(
            hex::encode(&call.path),
            concat!(
                "c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                "0001f4",
                "a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            )
        );
    }

    #[tokio::test]
    async fn test_call_data_layout() {
        let reader = MockReader::returning(1);

        quoter(&reader)
            .quote_exact_input(&[WETH, USDC], &[500], "2.5", 6, 6)
            .await
            .unwrap();

        let input = &reader.calls()[0].1;
        assert_eq!(&input[..4], quoteExactInputCall::SELECTOR.as_slice());
        let call = quoteExactInputCall::abi_decode(input, true).unwrap();
        assert_eq!(call.amountIn, U256::from(2_500_000u64));
    }

    #[tokio::test]
    async fn test_quote_multi_hop_request() {
        let reader = MockReader::returning(3_000_000_000_000_000_000);
        let request = QuoteRequest::new(
            SwapRoute::new(vec![WETH.into(), USDC.into(), DAI.into()], vec![500, 100]).unwrap(),
            "0.001",
            18,
            18,
        );

        let quote = quoter(&reader)
            .quote(&request)
            .await
            .unwrap();

        assert_eq!(quote.encoded_path, request.route.encode().unwrap());
        assert_eq!(quote.amount_in_raw, BigUint::from(1_000_000_000_000_000u64));
        assert_eq!(quote.amount_out_raw, Some(BigUint::from(3_000_000_000_000_000_000u128)));
        assert_eq!(quote.amount_out.as_deref(), Some("3"));
        assert_eq!(quote.rate, Some(3.0));
    }

    #[tokio::test]
    async fn test_quoter_v2_response_shape() {
        let response = (
            U256::from(2_500_000u64),
            Vec::<U256>::new(),
            Vec::<U256>::new(),
            U256::from(150_000u64),
        )
            .abi_encode_params();
        let reader = MockReader::with_responses(vec![Ok(Bytes::from(response))]);

        let rate = quoter(&reader)
            .quote_exact_input(&[WETH, USDC], &[500], "1", 18, 6)
            .await
            .unwrap();

        assert_eq!(rate, Some(2.5));
    }

    #[tokio::test]
    async fn test_route_mismatch_fails_before_any_call() {
        let reader = MockReader::returning(1);

        let result = quoter(&reader)
            .quote_exact_input(&[WETH, USDC], &[], "1", 18, 6)
            .await;

        assert_eq!(result, Err(QuoteError::InvalidRoute("path/fee length mismatch".to_string())));
        assert!(reader.calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_token_route_fails_before_any_call() {
        let reader = MockReader::returning(1);

        let result = quoter(&reader)
            .quote_exact_input(&[WETH], &[], "1", 18, 18)
            .await;

        assert_eq!(
            result,
            Err(QuoteError::InvalidRoute("route needs at least two tokens".to_string()))
        );
        assert!(reader.calls().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_quotes_are_independent() {
        let reader = MockReader::with_responses(vec![
            Ok(Bytes::from(U256::from(1_800_000_000u64).abi_encode())),
            Ok(Bytes::from(U256::from(2_000_000_000_000_000_000u128).abi_encode())),
        ]);
        let shared = quoter(&reader);
        let first = QuoteRequest::new(
            SwapRoute::new(vec![WETH.into(), USDC.into()], vec![500]).unwrap(),
            "1",
            18,
            6,
        );
        let second = QuoteRequest::new(
            SwapRoute::new(vec![WETH.into(), USDC.into(), DAI.into()], vec![500, 100]).unwrap(),
            "0.5",
            18,
            18,
        );

        let (a, b) = tokio::join!(shared.quote(&first), shared.quote(&second));
        let (a, b) = (a.unwrap(), b.unwrap());

        // each quote keeps its own path and input amount
        assert_eq!(a.encoded_path, first.route.encode().unwrap());
        assert_eq!(b.encoded_path, second.route.encode().unwrap());
        assert_eq!(a.amount_in_raw, BigUint::from(10u64).pow(18));
        assert_eq!(b.amount_in_raw, BigUint::from(5u64) * BigUint::from(10u64).pow(17));

        // which scripted response each call receives depends on polling order
        let mut amounts_out = vec![a.amount_out_raw.unwrap(), b.amount_out_raw.unwrap()];
        amounts_out.sort();
        assert_eq!(
            amounts_out,
            vec![BigUint::from(1_800_000_000u64), BigUint::from(2_000_000_000_000_000_000u128)]
        );

        let calls = reader.calls();
        assert_eq!(calls.len(), 2);
        let mut amounts: Vec<U256> = calls
            .iter()
            .map(|(_, input)| {
                quoteExactInputCall::abi_decode(input, true)
                    .unwrap()
                    .amountIn
            })
            .collect();
        amounts.sort();
        assert_eq!(
            amounts,
            vec![U256::from(500_000_000_000_000_000u128), U256::from(1_000_000_000_000_000_000u128)]
        );
    }

    #[tokio::test]
    async fn test_invalid_amount_fails_before_any_call() {
        let reader = MockReader::returning(1);

        let result = quoter(&reader)
            .quote_exact_input(&[WETH, USDC], &[500], "1.0000001", 6, 18)
            .await;

        assert!(matches!(result, Err(QuoteError::InvalidInput(_))));
        assert!(reader.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_decimals_fail_before_any_call() {
        let reader = MockReader::returning(1);

        let result = quoter(&reader)
            .quote_exact_input(&[WETH, USDC], &[500], "1", 18, 19)
            .await;

        assert!(matches!(result, Err(QuoteError::InvalidInput(_))));
        assert!(reader.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_call_is_absorbed_without_retry() {
        let reader = MockReader::with_responses(vec![
            Err(QuoteError::RecoverableError("connection refused".to_string())),
            Ok(Bytes::from(U256::from(1u64).abi_encode())),
        ]);
        let start = Instant::now();

        let quote = quoter(&reader)
            .quote(&QuoteRequest::new(
                SwapRoute::new(vec![WETH.into(), USDC.into()], vec![500]).unwrap(),
                "1",
                18,
                6,
            ))
            .await
            .unwrap();

        assert_eq!(quote.rate, None);
        assert_eq!(quote.amount_out_raw, None);
        assert_eq!(quote.amount_in_raw, BigUint::from(10u64).pow(18));
        assert_eq!(reader.calls().len(), 1);
        assert_eq!(start.elapsed(), std::time::Duration::ZERO);
    }

    #[tokio::test]
    async fn test_undecodable_response_is_absorbed() {
        let reader = MockReader::with_responses(vec![Ok(Bytes::new())]);

        let rate = quoter(&reader)
            .quote_exact_input(&[WETH, USDC], &[500], "1", 18, 6)
            .await
            .unwrap();

        assert_eq!(rate, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_opt_in_retries_transient_call_failures() {
        let reader = MockReader::with_responses(vec![
            Err(QuoteError::RecoverableError("RPC request failed: connection reset".to_string())),
            Err(QuoteError::RecoverableError("RPC request failed: timeout".to_string())),
            Ok(Bytes::from(U256::from(1_800_000_000u64).abi_encode())),
        ]);
        let start = Instant::now();

        let rate = quoter(&reader)
            .with_retry_quoter_failures(true)
            .quote_exact_input(&[WETH, USDC], &[500], "1", 18, 6)
            .await
            .unwrap();

        assert_eq!(rate, Some(1800.0));
        assert_eq!(reader.calls().len(), 3);
        assert_eq!(start.elapsed(), std::time::Duration::from_millis(3_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_opt_in_surfaces_last_error_when_exhausted() {
        let reader = MockReader::with_responses(vec![
            Err(QuoteError::RecoverableError("network down #1".to_string())),
            Err(QuoteError::RecoverableError("network down #2".to_string())),
            Err(QuoteError::RecoverableError("network down #3".to_string())),
        ]);

        let result = quoter(&reader)
            .with_retry_quoter_failures(true)
            .quote_exact_input(&[WETH, USDC], &[500], "1", 18, 6)
            .await;

        assert_eq!(result, Err(QuoteError::RecoverableError("network down #3".to_string())));
        assert_eq!(reader.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_opt_in_does_not_retry_reverts() {
        let reader = MockReader::with_responses(vec![Err(QuoteError::FatalError(
            "Call reverted with code 3: execution reverted".to_string(),
        ))]);

        let result = quoter(&reader)
            .with_retry_quoter_failures(true)
            .quote_exact_input(&[WETH, USDC], &[500], "1", 18, 6)
            .await;

        assert!(matches!(result, Err(QuoteError::FatalError(_))));
        assert_eq!(reader.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_from_config() {
        let reader = Arc::new(MockReader::returning(5_000_000));
        let config = QuoterConfig {
            quoter_address: Some(QUOTER.to_string()),
            max_attempts: 5,
            retry_quoter_failures: true,
            ..Default::default()
        };

        let quoter = Quoter::from_config(Arc::clone(&reader), &config).unwrap();
        assert_eq!(quoter.quoter_address(), Address::from_str(QUOTER).unwrap());
        assert_eq!(quoter.retry_policy.max_attempts, 5);
        assert!(quoter.retry_quoter_failures);

        let rate = quoter
            .quote_exact_input(&[USDC, WETH], &[500], "1", 6, 6)
            .await
            .unwrap();
        assert_eq!(rate, Some(5.0));
    }

    #[tokio::test]
    async fn test_free_function_quote() {
        let reader = MockReader::returning(1_234_500);

        let rate = quote_exact_input(
            &reader,
            Address::from_str(QUOTER).unwrap(),
            &[WETH, USDC],
            &[3000],
            "1",
            18,
            6,
        )
        .await
        .unwrap();

        assert_eq!(rate, Some(1.2345));
    }
}
