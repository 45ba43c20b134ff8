use crate::{config::ProviderConfig, transaction::WalletTransaction};
use serde_json::Value;

pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const SIGN_TRANSACTION: &str = "eth_signTransaction";
pub const SEND_RAW_TRANSACTION: &str = "eth_sendRawTransaction";

/// The JSON-RPC calls the proxy interprets; everything else is opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderCall {
    /// `eth_sendTransaction`, completed, signed and broadcast as raw
    SendTransaction(WalletTransaction),
    /// `eth_signTransaction`, completed and signed locally
    SignTransaction(WalletTransaction),
    /// Forwarded to the wrapped endpoint unchanged
    Passthrough,
}

impl ProviderCall {
    /// Returns true if `method` would be intercepted under `config`
    pub fn intercepts(method: &str, config: &ProviderConfig) -> bool {
        match method {
            SEND_TRANSACTION => config.hook_sends,
            SIGN_TRANSACTION => config.polyfill_sign,
            _ => false,
        }
    }

    /// Classifies a call. `params` is only inspected for intercepted methods.
    ///
    /// Returns `Ok(None)` when an intercepted method carries no transaction.
    pub fn classify(
        method: &str,
        params: Value,
        config: &ProviderConfig,
    ) -> Result<Option<Self>, serde_json::Error> {
        if !Self::intercepts(method, config) {
            return Ok(Some(ProviderCall::Passthrough))
        }
        let tx = match params {
            Value::Array(mut params) if !params.is_empty() => params.swap_remove(0),
            obj @ Value::Object(_) => obj,
            _ => return Ok(None),
        };
        let tx: WalletTransaction = serde_json::from_value(tx)?;
        Ok(Some(match method {
            SEND_TRANSACTION => ProviderCall::SendTransaction(tx),
            _ => ProviderCall::SignTransaction(tx),
        }))
    }
}
