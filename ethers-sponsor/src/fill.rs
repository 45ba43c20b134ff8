use crate::{
    errors::SponsorError,
    transaction::{CompleteTransaction, TransactionError, WalletTransaction},
};
use ethers_core::types::{Address, Bytes, U256};
use ethers_providers::{maybe, JsonRpcClient};
use futures_util::future::try_join;
use serde::Serialize;
use tracing::{debug, instrument};

/// Body of the `eth_estimateGas` query issued for requests without a gas limit
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GasEstimate<'a> {
    from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<U256>,
    gas_price: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Bytes>,
}

/// Fills the nonce, gas price and gas limit of `tx` from the endpoint, issuing
/// a query only for the fields the caller left out.
///
/// The nonce and gas price queries are independent and run concurrently; the
/// gas estimate is only requested once the gas price is known and carries it.
#[instrument(skip_all, fields(from = ?tx.from))]
pub async fn complete_transaction<P: JsonRpcClient>(
    inner: &P,
    mut tx: WalletTransaction,
) -> Result<CompleteTransaction, SponsorError<P>> {
    tx.normalize_gas();
    let kind = tx.kind()?;
    let from = tx.from.ok_or(TransactionError::MissingSender)?;

    let (nonce, gas_price) = try_join(
        maybe(tx.nonce, inner.request("eth_getTransactionCount", (from, "latest"))),
        maybe(tx.gas_price, inner.request("eth_gasPrice", ())),
    )
    .await
    .map_err(SponsorError::Upstream)?;

    let gas_limit = match tx.gas_limit {
        Some(gas_limit) => gas_limit,
        None => {
            let estimate = GasEstimate {
                from,
                to: tx.to,
                value: tx.value,
                gas_price,
                data: tx.data.as_ref(),
            };
            inner.request("eth_estimateGas", [estimate]).await.map_err(SponsorError::Upstream)?
        }
    };
    debug!(%nonce, %gas_price, %gas_limit, "completed transaction");

    Ok(CompleteTransaction {
        kind,
        from,
        to: tx.to,
        value: tx.value.unwrap_or_default(),
        data: tx.data.unwrap_or_default(),
        nonce,
        gas_price,
        gas_limit,
        access_list: tx.access_list.unwrap_or_default(),
    })
}
