use crate::{errors::SponsorError, transaction::TxKind};
use ethers_core::types::U64;
use ethers_providers::JsonRpcClient;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Ethereum protocol upgrades, in activation order.
///
/// Only a few of these change anything here: `SpuriousDragon` makes EIP-155
/// replay protection mandatory and `Berlin` introduces typed access-list
/// transactions.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Hardfork {
    Chainstart,
    Homestead,
    Dao,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    MuirGlacier,
    Berlin,
    #[default]
    London,
    ArrowGlacier,
    GrayGlacier,
    Paris,
    Shanghai,
}

/// Largest chain id whose EIP-155 `v` value (`recovery_id + chain_id * 2 + 35`)
/// still fits a `u64`.
pub const MAX_CHAIN_ID: u64 = (u64::MAX - 36) / 2;

/// Chain identifier plus the ruleset active on it, resolved once per signing
/// operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainContext {
    pub chain_id: u64,
    pub hardfork: Hardfork,
}

impl ChainContext {
    pub fn new(chain_id: u64, hardfork: Hardfork) -> Self {
        Self { chain_id, hardfork }
    }

    /// Returns true if `hardfork` has been activated on this chain
    pub fn is_active(&self, hardfork: Hardfork) -> bool {
        self.hardfork >= hardfork
    }

    /// Whether legacy transactions must fold the chain id into their signature (EIP-155)
    pub fn replay_protection_active(&self) -> bool {
        self.is_active(Hardfork::SpuriousDragon)
    }

    /// Whether the ruleset knows how to encode the given envelope
    pub fn supports(&self, kind: TxKind) -> bool {
        match kind {
            TxKind::Legacy => true,
            TxKind::AccessList => self.is_active(Hardfork::Berlin),
        }
    }
}

/// Queries `eth_chainId` and pairs the result with `hardfork`.
pub async fn resolve_chain<P: JsonRpcClient>(
    inner: &P,
    hardfork: Hardfork,
) -> Result<ChainContext, SponsorError<P>> {
    let raw: String = inner.request("eth_chainId", ()).await.map_err(SponsorError::Upstream)?;
    let chain_id = parse_chain_id(&raw).ok_or(SponsorError::InvalidChainId(raw))?;
    trace!(chain_id, %hardfork, "resolved chain");
    Ok(ChainContext::new(chain_id, hardfork))
}

/// Parses a `0x`-prefixed hex quantity, rejecting ids above [`MAX_CHAIN_ID`]
pub(crate) fn parse_chain_id(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x").filter(|d| !d.is_empty())?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None
    }
    let chain_id = U64::from_str_radix(digits, 16).ok()?.as_u64();
    (chain_id <= MAX_CHAIN_ID).then_some(chain_id)
}
