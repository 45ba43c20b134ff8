use crate::{
    chain::ChainContext,
    transaction::{SponsoredTransaction, TxKind},
};
use ethers_core::types::{transaction::eip2718::TypedTransaction, H256};
use tracing::debug;

/// The hash a wallet has to sign for a transaction, together with the exact
/// envelope it was derived from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningPayload {
    pub hash: H256,
    pub kind: TxKind,
    pub chain_id: u64,
    /// Whether the chain id was folded into the hash
    pub replay_protected: bool,
    /// Set when replay protection was assumed for this payload although the
    /// transaction itself was not flagged for it
    pub assumed_replay_protection: bool,
    pub(crate) envelope: TypedTransaction,
}

impl SigningPayload {
    pub fn envelope(&self) -> &TypedTransaction {
        &self.envelope
    }
}

/// Computes the signing payload of `tx`.
///
/// Legacy transactions fold the chain id into their hash (EIP-155) when they
/// are flagged for replay protection, or when `assume_replay_protection` is
/// set. The latter covers legacy transactions whose capability state lags
/// behind a chain that already mandates replay protection; the assumption only
/// affects the returned payload and is reported via
/// [`SigningPayload::assumed_replay_protection`]. Typed envelopes always commit
/// to the chain id.
pub fn build_payload(
    tx: &SponsoredTransaction,
    chain: &ChainContext,
    assume_replay_protection: bool,
) -> SigningPayload {
    let (replay_protected, assumed) = match tx.kind() {
        TxKind::Legacy => {
            let assumed = assume_replay_protection && !tx.replay_protection();
            (tx.replay_protection() || assumed, assumed)
        }
        TxKind::AccessList => (true, false),
    };
    if assumed {
        debug!(
            chain_id = chain.chain_id,
            hardfork = %chain.hardfork,
            "assuming replay protection for legacy transaction"
        );
    }

    let envelope = tx.envelope(replay_protected);
    SigningPayload {
        hash: envelope.sighash(),
        kind: tx.kind(),
        chain_id: tx.chain_id(),
        replay_protected,
        assumed_replay_protection: assumed,
        envelope,
    }
}
