use crate::{signer::SignatureParseError, transaction::TransactionError};
use ethers_providers::{JsonRpcClient, JsonRpcError, ProviderError, RpcError};
use thiserror::Error;

/// Message returned by the deprecated `send` entry points
pub const DEPRECATED_SEND: &str = "send method is deprecated";

#[derive(Error, Debug)]
/// Error thrown by the [`SponsoringProvider`](crate::SponsoringProvider)
pub enum SponsorError<P>
where
    P: JsonRpcClient,
{
    /// Thrown when a request to the wrapped endpoint fails, including signer
    /// rejections of `eth_sign`
    #[error(transparent)]
    Upstream(P::Error),

    /// (De)serialization error at the proxy boundary
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Thrown when the request cannot be turned into a signable transaction
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Thrown when the wallet's signature string does not decode into (v, r, s)
    #[error("invalid signature returned by signer: {0}")]
    Signature(#[from] SignatureParseError),

    /// Thrown when `eth_chainId` does not return a hex quantity
    #[error("invalid chain id returned by endpoint: {0:?}")]
    InvalidChainId(String),

    /// Thrown when an intercepted call carries no transaction object
    #[error("no transaction was provided in the request params")]
    MissingTransaction,

    /// Thrown by disabled legacy entry points
    #[error("{0}")]
    Deprecated(&'static str),
}

impl<P> RpcError for SponsorError<P>
where
    P: JsonRpcClient,
{
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            SponsorError::Upstream(e) => e.as_error_response(),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            SponsorError::SerdeJson(e) => Some(e),
            SponsorError::Upstream(e) => e.as_serde_error(),
            _ => None,
        }
    }
}

impl<P> From<SponsorError<P>> for ProviderError
where
    P: JsonRpcClient + 'static,
    <P as JsonRpcClient>::Error: Sync + Send + 'static,
{
    fn from(src: SponsorError<P>) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}
