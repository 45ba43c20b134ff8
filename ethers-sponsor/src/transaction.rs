use crate::chain::{ChainContext, Hardfork, MAX_CHAIN_ID};
use ethers_core::types::{
    transaction::{
        eip2718::TypedTransaction,
        eip2930::{AccessList, Eip2930TransactionRequest},
    },
    Address, Bytes, TransactionRequest, U256, U64,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// A transaction as submitted to `eth_sendTransaction` / `eth_signTransaction`.
///
/// Wallets name the gas limit `gas`, while the canonical transaction calls it
/// `gasLimit`; both are accepted and folded together during completion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "input")]
    pub data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// Wallet-facing gas limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<U64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_list: Option<AccessList>,
    /// Fields this crate does not interpret
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl WalletTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from<T: Into<Address>>(mut self, from: T) -> Self {
        self.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn to<T: Into<Address>>(mut self, to: T) -> Self {
        self.to = Some(to.into());
        self
    }

    #[must_use]
    pub fn value<T: Into<U256>>(mut self, value: T) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub fn nonce<T: Into<U256>>(mut self, nonce: T) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    #[must_use]
    pub fn gas_price<T: Into<U256>>(mut self, gas_price: T) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    /// Sets the wallet-facing `gas` field
    #[must_use]
    pub fn gas<T: Into<U256>>(mut self, gas: T) -> Self {
        self.gas = Some(gas.into());
        self
    }

    #[must_use]
    pub fn chain_id<T: Into<U64>>(mut self, chain_id: T) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    /// Turns the request into an EIP-2930 access-list transaction
    #[must_use]
    pub fn access_list(mut self, access_list: AccessList) -> Self {
        self.transaction_type = Some(1u64.into());
        self.access_list = Some(access_list);
        self
    }

    /// Moves the wallet's `gas` key into `gas_limit`, dropping the wallet key.
    /// `gas` takes precedence when both are present.
    pub fn normalize_gas(&mut self) {
        if let Some(gas) = self.gas.take() {
            self.gas_limit = Some(gas);
        }
    }

    /// The envelope requested through the `type` field
    pub fn kind(&self) -> Result<TxKind, TransactionError> {
        match self.transaction_type.map(|t| t.as_u64()) {
            None => Ok(if self.access_list.is_some() { TxKind::AccessList } else { TxKind::Legacy }),
            Some(0) => Ok(TxKind::Legacy),
            Some(1) => Ok(TxKind::AccessList),
            Some(other) => Err(TransactionError::UnsupportedType(other)),
        }
    }
}

/// Transaction envelopes this crate can sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxKind {
    /// Pre-EIP-2718 transaction
    Legacy,
    /// EIP-2930 transaction
    AccessList,
}

/// A transaction with every field needed for signing resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompleteTransaction {
    pub kind: TxKind,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub access_list: AccessList,
}

/// A complete transaction bound to a chain, carrying its replay-protection
/// capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SponsoredTransaction {
    tx: CompleteTransaction,
    chain_id: u64,
    replay_protection: bool,
}

impl SponsoredTransaction {
    /// Binds `tx` to `chain`.
    ///
    /// Replay protection starts out enabled whenever the chain's ruleset makes
    /// it mandatory.
    pub fn new(tx: CompleteTransaction, chain: &ChainContext) -> Result<Self, TransactionError> {
        if !chain.supports(tx.kind) {
            return Err(TransactionError::UnsupportedByRuleset(tx.kind, chain.hardfork))
        }
        if chain.chain_id > MAX_CHAIN_ID {
            return Err(TransactionError::ChainIdOutOfRange(chain.chain_id))
        }
        Ok(Self { tx, chain_id: chain.chain_id, replay_protection: chain.replay_protection_active() })
    }

    /// Overrides the persisted replay-protection capability
    #[must_use]
    pub fn with_replay_protection(mut self, enabled: bool) -> Self {
        self.replay_protection = enabled;
        self
    }

    pub fn transaction(&self) -> &CompleteTransaction {
        &self.tx
    }

    pub fn kind(&self) -> TxKind {
        self.tx.kind
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Whether the transaction itself is flagged as EIP-155 protected
    pub fn replay_protection(&self) -> bool {
        self.replay_protection
    }

    /// Builds the ethers envelope. The chain id is only included for legacy
    /// transactions when `with_chain_id` is set; typed envelopes always carry it.
    pub(crate) fn envelope(&self, with_chain_id: bool) -> TypedTransaction {
        let tx = &self.tx;
        let mut request = TransactionRequest::new()
            .from(tx.from)
            .value(tx.value)
            .data(tx.data.clone())
            .nonce(tx.nonce)
            .gas_price(tx.gas_price)
            .gas(tx.gas_limit);
        request.to = tx.to.map(Into::into);

        match tx.kind {
            TxKind::Legacy => {
                if with_chain_id {
                    request = request.chain_id(self.chain_id);
                }
                TypedTransaction::Legacy(request)
            }
            TxKind::AccessList => TypedTransaction::Eip2930(Eip2930TransactionRequest::new(
                request.chain_id(self.chain_id),
                tx.access_list.clone(),
            )),
        }
    }
}

/// Errors raised while shaping a wallet request into a signable transaction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// Thrown if the `from` field is missing
    #[error("no sender was specified")]
    MissingSender,
    /// Thrown for envelopes other than legacy and EIP-2930
    #[error("unsupported transaction type {0}")]
    UnsupportedType(u64),
    /// Thrown if the chain's ruleset predates the envelope
    #[error("{0:?} transactions are not supported by the {1} ruleset")]
    UnsupportedByRuleset(TxKind, Hardfork),
    /// Thrown if the caller pinned a chain id different from the endpoint's
    #[error("transaction chain id {got} does not match endpoint chain id {expected}")]
    ChainIdMismatch { expected: u64, got: u64 },
    /// Thrown if the chain id cannot be folded into an EIP-155 `v` value
    #[error("chain id {0} is too large to sign for")]
    ChainIdOutOfRange(u64),
}
