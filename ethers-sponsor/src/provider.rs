use crate::{
    call::{ProviderCall, SEND_RAW_TRANSACTION},
    chain::resolve_chain,
    config::{EndpointHints, ProviderConfig, SponsorOptions},
    errors::{SponsorError, DEPRECATED_SEND},
    fill::complete_transaction,
    payload::build_payload,
    signer::{self, serialize, EndpointSigner, SignedTransaction, SigningError},
    transaction::{SponsoredTransaction, TransactionError, WalletTransaction},
};
use async_trait::async_trait;
use ethers_core::types::U256;
use ethers_providers::{JsonRpcClient, PubsubClient};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use tracing::{debug, instrument, trace};

/// A [`JsonRpcClient`] that sits in front of a wallet endpoint and signs
/// transactions through the wallet's `eth_sign`.
///
/// `eth_sendTransaction` (when `hook_sends` is set) and `eth_signTransaction`
/// (when `polyfill_sign` is set) are completed with any missing nonce, gas
/// price and gas limit, hashed under the endpoint's chain rules, signed as an
/// opaque message and either broadcast through `eth_sendRawTransaction` or
/// returned as raw hex. Every other call is forwarded untouched.
///
/// # Example
///
/// ```no_run
/// use ethers_providers::{Http, Middleware, Provider};
/// use ethers_sponsor::{EndpointHints, SponsorOptions, SponsoringProvider};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let http: Http = "http://localhost:8545".parse()?;
/// let hints = EndpointHints::new().marker("isMetaMask");
/// let sponsor =
///     SponsoringProvider::with_options(http, &SponsorOptions::new().hook_sends(true), hints);
///
/// let provider = Provider::new(sponsor);
/// let accounts = provider.get_accounts().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SponsoringProvider<P> {
    inner: P,
    config: ProviderConfig,
    hints: EndpointHints,
}

impl<P> SponsoringProvider<P> {
    /// Wraps `inner` with the default configuration
    pub fn new(inner: P) -> Self {
        Self::with_options(inner, &SponsorOptions::default(), EndpointHints::default())
    }

    /// Wraps `inner`, resolving the configuration from `opts` and the endpoint's
    /// identity `hints` once.
    pub fn with_options(inner: P, opts: &SponsorOptions, hints: EndpointHints) -> Self {
        let config = ProviderConfig::resolve(opts, &hints);
        Self { inner, config, hints }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The identity hints of the wrapped endpoint
    pub fn hints(&self) -> &EndpointHints {
        &self.hints
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P> SponsoringProvider<P>
where
    P: JsonRpcClient,
{
    /// Completes `tx`, resolves the chain and signs through the endpoint's `eth_sign`
    #[instrument(skip_all, fields(from = ?tx.from))]
    pub async fn complete_and_sign(
        &self,
        tx: WalletTransaction,
    ) -> Result<SignedTransaction, SponsorError<P>> {
        let pinned_chain_id = tx.chain_id;
        let complete = complete_transaction(&self.inner, tx).await?;

        let chain = resolve_chain(&self.inner, self.config.hardfork).await?;
        if let Some(got) = pinned_chain_id {
            if got.as_u64() != chain.chain_id {
                return Err(TransactionError::ChainIdMismatch {
                    expected: chain.chain_id,
                    got: got.as_u64(),
                }
                .into())
            }
        }

        let tx = SponsoredTransaction::new(complete, &chain)?;
        let payload = build_payload(&tx, &chain, chain.replay_protection_active());
        let from = tx.transaction().from;

        signer::sign_transaction(&EndpointSigner::new(&self.inner), from, payload).await.map_err(
            |err| match err {
                SigningError::Signer(e) => SponsorError::Upstream(e),
                SigningError::Parse(e) => SponsorError::Signature(e),
            },
        )
    }

    /// Returns the raw signed transaction as `0x`-prefixed hex, without broadcasting it
    pub async fn sign_transaction(&self, tx: WalletTransaction) -> Result<String, SponsorError<P>> {
        let signed = self.complete_and_sign(tx).await?;
        Ok(serialize(&signed))
    }

    /// Signs `tx` and broadcasts it through `eth_sendRawTransaction`, returning
    /// the endpoint's response as is.
    pub async fn send_transaction<R>(&self, tx: WalletTransaction) -> Result<R, SponsorError<P>>
    where
        R: DeserializeOwned + Send,
    {
        let raw = self.sign_transaction(tx).await?;
        self.inner.request(SEND_RAW_TRANSACTION, [raw]).await.map_err(SponsorError::Upstream)
    }

    /// Legacy synchronous send entry point, always rejected
    pub fn send(&self) -> Result<(), SponsorError<P>> {
        Err(SponsorError::Deprecated(DEPRECATED_SEND))
    }

    /// Legacy callback-style send entry point, always rejected
    pub fn send_async(&self) -> Result<(), SponsorError<P>> {
        Err(SponsorError::Deprecated(DEPRECATED_SEND))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<P> JsonRpcClient for SponsoringProvider<P>
where
    P: JsonRpcClient + 'static,
    <P as JsonRpcClient>::Error: Sync + Send + 'static,
{
    type Error = SponsorError<P>;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        if ProviderCall::intercepts(method, &self.config) {
            let call = ProviderCall::classify(method, serde_json::to_value(&params)?, &self.config)?
                .ok_or(SponsorError::MissingTransaction)?;
            match call {
                ProviderCall::SendTransaction(tx) => {
                    debug!(method, "intercepted send");
                    return self.send_transaction(tx).await
                }
                ProviderCall::SignTransaction(tx) => {
                    debug!(method, "intercepted sign");
                    let raw = self.sign_transaction(tx).await?;
                    return Ok(serde_json::from_value(Value::String(raw))?)
                }
                ProviderCall::Passthrough => {}
            }
        }

        trace!(method, "forwarding request");
        self.inner.request(method, params).await.map_err(SponsorError::Upstream)
    }
}

impl<P> PubsubClient for SponsoringProvider<P>
where
    P: PubsubClient + 'static,
    <P as JsonRpcClient>::Error: Sync + Send + 'static,
{
    type NotificationStream = P::NotificationStream;

    fn subscribe<T: Into<U256>>(&self, id: T) -> Result<Self::NotificationStream, Self::Error> {
        self.inner.subscribe(id).map_err(SponsorError::Upstream)
    }

    fn unsubscribe<T: Into<U256>>(&self, id: T) -> Result<(), Self::Error> {
        self.inner.unsubscribe(id).map_err(SponsorError::Upstream)
    }
}
