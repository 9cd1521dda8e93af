use std::{future::Future, sync::Arc};

use alloy::{
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{TransactionInput, TransactionRequest},
    transports::{BoxTransport, TransportError},
};
use alloy_primitives::{Address, Bytes, TxKind};
use tracing::debug;

use crate::quoting::errors::QuoteError;

/// The one capability the quoter needs from a chain connection: a non-state-changing `eth_call`.
///
/// Implementations map transport-level failures to `QuoteError::RecoverableError` with the
/// underlying error text, so the retry classifier can inspect it.
pub trait ChainReader {
    fn read_call(
        &self,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = Result<Bytes, QuoteError>> + Send;
}

impl ChainReader for RootProvider<BoxTransport> {
    async fn read_call(&self, to: Address, input: Bytes) -> Result<Bytes, QuoteError> {
        let tx = TransactionRequest {
            to: Some(TxKind::from(to)),
            input: TransactionInput { input: Some(input), data: None },
            ..Default::default()
        };

        Provider::call(self, &tx)
            .await
            .map_err(|err| classify_call_error(to, err))
    }
}

/// Maps an `eth_call` failure onto the error taxonomy. Only transport failures become
/// `RecoverableError`; their message carries a transient marker so the retry loop picks them up.
/// Everything else is fatal and worded without transient markers.
pub(crate) fn classify_call_error(to: Address, err: TransportError) -> QuoteError {
    if let Some(payload) = err.as_error_resp() {
        // The node answered: the call reverted or was rejected.
        return QuoteError::FatalError(format!(
            "Call to {to} reverted with code {}: {}",
            payload.code, payload.message
        ));
    }
    if err.is_transport_error() {
        return QuoteError::RecoverableError(format!(
            "RPC request failed: eth_call to {to}: {err}"
        ));
    }

    let kind = if err.is_null_resp() {
        "empty result"
    } else if err.is_deser_error() {
        "undecodable result"
    } else if err.is_ser_error() {
        "unencodable request"
    } else {
        "local client error"
    };
    debug!(error = %err, "eth_call failed without reaching the node's execution");
    QuoteError::FatalError(format!("Call to {to} failed: {kind}"))
}

impl<T: ChainReader + Send + Sync> ChainReader for Arc<T> {
    fn read_call(
        &self,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = Result<Bytes, QuoteError>> + Send {
        (**self).read_call(to, input)
    }
}

impl<T: ChainReader + Send + Sync> ChainReader for &T {
    fn read_call(
        &self,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = Result<Bytes, QuoteError>> + Send {
        (**self).read_call(to, input)
    }
}

/// Connects to the JSON-RPC endpoint at `rpc_url` (http, ws or ipc).
pub async fn get_client(rpc_url: &str) -> Result<Arc<RootProvider<BoxTransport>>, QuoteError> {
    debug!(rpc_url, "Connecting to RPC provider");
    let client = ProviderBuilder::new()
        .on_builtin(rpc_url)
        .await
        .map_err(|err| QuoteError::FatalError(format!("Failed to connect to {rpc_url}: {err}")))?;
    Ok(Arc::new(client))
}
