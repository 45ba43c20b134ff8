use crate::recipient;
use ethers_core::types::{Address, U256};
use ethers_providers::{MockError, MockProvider};
use ethers_sponsor::{complete_transaction, SponsorError, TransactionError, WalletTransaction};
use serde_json::json;

fn sender() -> Address {
    "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23".parse().unwrap()
}

fn assert_no_more_requests(mock: &MockProvider) {
    assert!(matches!(mock.assert_request("eth_chainId", ()), Err(MockError::EmptyRequests)));
}

#[tokio::test]
async fn fully_specified_request_issues_no_queries() {
    let mock = MockProvider::new();
    let tx = WalletTransaction::new()
        .from(sender())
        .to(recipient())
        .value(100)
        .nonce(5)
        .gas_price(20)
        .gas(21000);

    let complete = complete_transaction(&mock, tx).await.unwrap();
    assert_eq!(complete.nonce, U256::from(5));
    assert_eq!(complete.gas_price, U256::from(20));
    assert_eq!(complete.gas_limit, U256::from(21000));
    assert_no_more_requests(&mock);
}

#[tokio::test]
async fn missing_nonce_queries_latest_count() {
    let mock = MockProvider::new();
    mock.push(U256::from(7)).unwrap();
    let tx = WalletTransaction::new().from(sender()).gas_price(20).gas(21000);

    let complete = complete_transaction(&mock, tx).await.unwrap();
    assert_eq!(complete.nonce, U256::from(7));
    mock.assert_request("eth_getTransactionCount", (sender(), "latest")).unwrap();
    assert_no_more_requests(&mock);
}

#[tokio::test]
async fn missing_gas_price_queries_gas_price() {
    let mock = MockProvider::new();
    mock.push(U256::from(30)).unwrap();
    let tx = WalletTransaction::new().from(sender()).nonce(1).gas(21000);

    let complete = complete_transaction(&mock, tx).await.unwrap();
    assert_eq!(complete.gas_price, U256::from(30));
    mock.assert_request("eth_gasPrice", ()).unwrap();
    assert_no_more_requests(&mock);
}

#[tokio::test]
async fn missing_gas_limit_is_estimated_with_supplied_gas_price() {
    let mock = MockProvider::new();
    mock.push(U256::from(53000)).unwrap();
    let tx = WalletTransaction::new()
        .from(sender())
        .to(recipient())
        .value(100)
        .data(vec![0xde, 0xad])
        .nonce(1)
        .gas_price(20);

    let complete = complete_transaction(&mock, tx).await.unwrap();
    assert_eq!(complete.gas_limit, U256::from(53000));
    mock.assert_request(
        "eth_estimateGas",
        [json!({
            "from": sender(),
            "to": recipient(),
            "value": "0x64",
            "gasPrice": "0x14",
            "data": "0xdead",
        })],
    )
    .unwrap();
    assert_no_more_requests(&mock);
}

#[tokio::test]
async fn gas_price_resolves_before_estimate() {
    let mock = MockProvider::new();
    mock.push(U256::from(21000)).unwrap();
    mock.push(U256::from(20)).unwrap();
    let tx = WalletTransaction::new().from(sender()).to(recipient()).nonce(0);

    let complete = complete_transaction(&mock, tx).await.unwrap();
    assert_eq!(complete.gas_price, U256::from(20));
    assert_eq!(complete.gas_limit, U256::from(21000));

    mock.assert_request("eth_gasPrice", ()).unwrap();
    mock.assert_request(
        "eth_estimateGas",
        [json!({ "from": sender(), "to": recipient(), "gasPrice": "0x14" })],
    )
    .unwrap();
    assert_no_more_requests(&mock);
}

#[tokio::test]
async fn wallet_gas_key_becomes_gas_limit() {
    let mock = MockProvider::new();
    let mut tx = WalletTransaction::new().from(sender()).nonce(0).gas_price(1).gas(90_000);
    tx.gas_limit = Some(21_000.into());

    let complete = complete_transaction(&mock, tx).await.unwrap();
    assert_eq!(complete.gas_limit, U256::from(90_000));
    assert_no_more_requests(&mock);
}

#[tokio::test]
async fn missing_sender_fails_before_any_query() {
    let mock = MockProvider::new();
    let err = complete_transaction(&mock, WalletTransaction::new().to(recipient())).await.unwrap_err();
    assert!(matches!(err, SponsorError::Transaction(TransactionError::MissingSender)));
    assert_no_more_requests(&mock);
}

#[tokio::test]
async fn upstream_failures_propagate() {
    // no responses queued
    let mock = MockProvider::new();
    let err = complete_transaction(&mock, WalletTransaction::new().from(sender())).await.unwrap_err();
    assert!(matches!(err, SponsorError::Upstream(MockError::EmptyResponses)));
}
