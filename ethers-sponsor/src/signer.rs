//! Signing through a generic message-signing primitive.
//!
//! The wallet behind the endpoint only offers `eth_sign`, so the transaction
//! hash is signed as an opaque 32-byte message and the resulting recoverable
//! signature is attached to the transaction here.

use crate::{payload::SigningPayload, transaction::TxKind};
use async_trait::async_trait;
use ethers_core::types::{
    transaction::eip2718::TypedTransaction, Address, Bytes, Signature, SignatureError, H256,
};
use ethers_providers::JsonRpcClient;
use std::{error::Error, fmt::Debug};
use thiserror::Error;
use tracing::instrument;

/// Anything able to produce a recoverable signature over a 32-byte message on
/// behalf of `address`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MessageSigner: Debug + Send + Sync {
    type Error: Error + Send + Sync;

    /// Returns the signature as a `0x`-prefixed hex string
    async fn sign_message(&self, address: Address, message: H256) -> Result<String, Self::Error>;
}

/// [`MessageSigner`] backed by a JSON-RPC endpoint's `eth_sign`
#[derive(Clone, Copy, Debug)]
pub struct EndpointSigner<'a, P> {
    inner: &'a P,
}

impl<'a, P> EndpointSigner<'a, P> {
    pub fn new(inner: &'a P) -> Self {
        Self { inner }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<'a, P: JsonRpcClient> MessageSigner for EndpointSigner<'a, P> {
    type Error = P::Error;

    async fn sign_message(&self, address: Address, message: H256) -> Result<String, Self::Error> {
        self.inner.request("eth_sign", (address, message)).await
    }
}

/// Errors in the `eth_sign` response
#[derive(Debug, Error)]
pub enum SignatureParseError {
    #[error("signature is not 0x-prefixed")]
    MissingPrefix,
    #[error(transparent)]
    Malformed(#[from] SignatureError),
    #[error("invalid recovery id in signature v value {0}")]
    InvalidRecoveryId(u64),
}

#[derive(Debug, Error)]
pub enum SigningError<E: Error> {
    /// Thrown when the signer fails or the user declines
    #[error("{0}")]
    Signer(E),
    #[error(transparent)]
    Parse(#[from] SignatureParseError),
}

/// Parses a 65-byte `r || s || v` signature, hex encoded with a `0x` prefix.
///
/// Recovery ids given as 0/1 are lifted to 27/28, so the returned `v` is always
/// 27 or 28.
pub fn parse_rpc_signature(raw: &str) -> Result<Signature, SignatureParseError> {
    let digits = raw.strip_prefix("0x").ok_or(SignatureParseError::MissingPrefix)?;
    let mut signature: Signature = digits.parse()?;

    if signature.v < 27 {
        signature.v += 27;
    }
    if signature.v > 28 {
        return Err(SignatureParseError::InvalidRecoveryId(signature.v))
    }
    Ok(signature)
}

/// A transaction and the signature over its [`SigningPayload`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    envelope: TypedTransaction,
    signature: Signature,
}

impl SignedTransaction {
    pub fn envelope(&self) -> &TypedTransaction {
        &self.envelope
    }

    /// The signature as it appears in the encoding
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Canonical wire encoding
    pub fn rlp(&self) -> Bytes {
        self.envelope.rlp_signed(&self.signature)
    }

    pub fn hash(&self) -> H256 {
        self.envelope.hash(&self.signature)
    }
}

/// Attaches a parsed wallet signature to the payload it was produced for.
///
/// Legacy transactions get their `v` value encoded here, with the chain id
/// folded in when the payload was replay protected (`recovery_id + chain_id * 2
/// + 35`). Typed envelopes carry the bare recovery id.
///
/// `signature.v` may be a bare recovery id (0/1), `27`/`28`, or an EIP-155
/// value.
pub fn attach_signature(payload: SigningPayload, signature: Signature) -> SignedTransaction {
    let recovery_id = recovery_id(signature.v);
    let v = match payload.kind {
        TxKind::Legacy if payload.replay_protected => recovery_id + payload.chain_id * 2 + 35,
        TxKind::Legacy => recovery_id + 27,
        TxKind::AccessList => recovery_id,
    };
    SignedTransaction { envelope: payload.envelope, signature: Signature { v, ..signature } }
}

fn recovery_id(v: u64) -> u64 {
    match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        v => v.saturating_sub(35) % 2,
    }
}

/// Signs `payload` with `signer` on behalf of `from`.
#[instrument(skip(signer, payload), fields(hash = ?payload.hash))]
pub async fn sign_transaction<S: MessageSigner>(
    signer: &S,
    from: Address,
    payload: SigningPayload,
) -> Result<SignedTransaction, SigningError<S::Error>> {
    let raw = signer.sign_message(from, payload.hash).await.map_err(SigningError::Signer)?;
    let signature = parse_rpc_signature(&raw)?;
    Ok(attach_signature(payload, signature))
}

/// Serializes a signed transaction as `0x`-prefixed lowercase hex
pub fn serialize(signed: &SignedTransaction) -> String {
    format!("0x{}", hex::encode(signed.rlp()))
}
