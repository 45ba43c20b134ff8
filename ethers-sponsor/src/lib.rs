#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! # Transaction sponsoring proxy
//!
//! Some wallets will sign arbitrary 32-byte messages through `eth_sign` but do
//! not offer `eth_signTransaction`, or cannot be trusted to fill transactions
//! the way an application needs. [`SponsoringProvider`] wraps such an endpoint
//! and takes over transaction handling:
//!
//! 1. missing `nonce`, `gasPrice` and gas limit are queried from the endpoint
//!    ([`fill`]),
//! 2. the chain id is resolved for every operation ([`chain`]),
//! 3. the canonical signing hash is computed under the chain's rules
//!    ([`payload`]),
//! 4. the wallet signs the hash through `eth_sign`, and the recoverable
//!    signature is attached to the transaction ([`signer`]),
//! 5. the signed transaction is either broadcast via `eth_sendRawTransaction`
//!    or returned as raw hex.
//!
//! All other JSON-RPC calls pass straight through, so the proxy can be used as
//! the transport of a regular [`ethers_providers::Provider`].
//!
//! ```
//! use ethers_providers::MockProvider;
//! use ethers_sponsor::{EndpointHints, SponsorOptions, SponsoringProvider};
//!
//! let sponsor = SponsoringProvider::with_options(
//!     MockProvider::new(),
//!     &SponsorOptions::new().hook_sends(true),
//!     EndpointHints::new().marker("isMetaMask"),
//! );
//! assert!(sponsor.config().hook_sends);
//! assert!(sponsor.config().polyfill_sign);
//! ```

pub mod call;
pub mod chain;
pub mod config;
pub mod fill;
pub mod payload;
pub mod signer;
pub mod transaction;

mod errors;
pub use errors::{SponsorError, DEPRECATED_SEND};

mod provider;
pub use provider::SponsoringProvider;

pub use call::ProviderCall;
pub use chain::{resolve_chain, ChainContext, Hardfork, MAX_CHAIN_ID};
pub use config::{EndpointHints, ProviderConfig, SponsorOptions};
pub use fill::complete_transaction;
pub use payload::{build_payload, SigningPayload};
pub use signer::{
    attach_signature, parse_rpc_signature, serialize, EndpointSigner, MessageSigner,
    SignatureParseError, SignedTransaction, SigningError,
};
pub use transaction::{
    CompleteTransaction, SponsoredTransaction, TransactionError, TxKind, WalletTransaction,
};
