use crate::{recipient, wallet, WalletSigner};
use ethers_core::types::{
    transaction::eip2930::{AccessList, AccessListItem},
    Bytes, H256, U256,
};
use ethers_signers::Signer;
use ethers_sponsor::{
    build_payload, serialize, signer, ChainContext, CompleteTransaction, Hardfork,
    SponsoredTransaction, TransactionError, TxKind,
};
use tracing_test::traced_test;

fn complete(kind: TxKind) -> CompleteTransaction {
    CompleteTransaction {
        kind,
        from: wallet().address(),
        to: Some(recipient()),
        value: 1_000_000_000u64.into(),
        data: Bytes::default(),
        nonce: U256::zero(),
        gas_price: 21_000_000_000u64.into(),
        gas_limit: 2_000_000u64.into(),
        access_list: AccessList::default(),
    }
}

#[tokio::test]
async fn signs_known_vector() {
    let chain = ChainContext::new(1, Hardfork::London);
    let tx = SponsoredTransaction::new(complete(TxKind::Legacy), &chain).unwrap();
    let payload = build_payload(&tx, &chain, true);
    assert!(!payload.assumed_replay_protection);

    let signed =
        signer::sign_transaction(&WalletSigner(wallet()), wallet().address(), payload).await.unwrap();
    assert_eq!(signed.signature().v, 37);
    assert_eq!(
        serialize(&signed),
        "0xf869808504e3b29200831e848094f0109fc8df283027b6285cc889f5aa624eac1f55843b9aca008025a0c9cf86333bcb065d140032ecaab5d9281bde80f21b9687b3e94161de42d51895a0727a108a0b8d101465414033c3f705a9c7b826e596766046ee1183dbc8aeaa68"
    );
}

#[tokio::test]
#[traced_test]
async fn unflagged_legacy_transaction_is_signed_with_chain_id() {
    let chain = ChainContext::new(1, Hardfork::London);
    let tx = SponsoredTransaction::new(complete(TxKind::Legacy), &chain)
        .unwrap()
        .with_replay_protection(false);

    let payload = build_payload(&tx, &chain, chain.replay_protection_active());
    assert!(payload.replay_protected);
    assert!(payload.assumed_replay_protection);

    let signed =
        signer::sign_transaction(&WalletSigner(wallet()), wallet().address(), payload).await.unwrap();
    let v = signed.signature().v;
    assert!(v == 37 || v == 38);
    assert_eq!(signed.signature().recover(signed.envelope().sighash()).unwrap(), wallet().address());

    // the assumption never leaks back into the transaction
    assert!(!tx.replay_protection());
    assert!(logs_contain("assuming replay protection"));
}

#[tokio::test]
async fn legacy_without_replay_protection_keeps_plain_v() {
    let chain = ChainContext::new(1, Hardfork::Homestead);
    let tx = SponsoredTransaction::new(complete(TxKind::Legacy), &chain).unwrap();
    assert!(!tx.replay_protection());

    let payload = build_payload(&tx, &chain, chain.replay_protection_active());
    assert!(!payload.replay_protected);

    let signed =
        signer::sign_transaction(&WalletSigner(wallet()), wallet().address(), payload).await.unwrap();
    let v = signed.signature().v;
    assert!(v == 27 || v == 28);
    assert_eq!(signed.signature().recover(signed.envelope().sighash()).unwrap(), wallet().address());
}

#[tokio::test]
async fn access_list_transaction_is_typed() {
    let chain = ChainContext::new(5, Hardfork::Berlin);
    let mut complete = complete(TxKind::AccessList);
    complete.access_list = AccessList(vec![AccessListItem {
        address: recipient(),
        storage_keys: vec![H256::zero()],
    }]);
    let tx = SponsoredTransaction::new(complete, &chain).unwrap();

    let payload = build_payload(&tx, &chain, false);
    assert!(payload.replay_protected);
    assert!(!payload.assumed_replay_protection);

    let signed =
        signer::sign_transaction(&WalletSigner(wallet()), wallet().address(), payload).await.unwrap();
    assert!(signed.signature().v <= 1);
    assert!(serialize(&signed).starts_with("0x01"));
    assert_eq!(signed.signature().recover(signed.envelope().sighash()).unwrap(), wallet().address());
}

#[test]
fn access_list_requires_berlin() {
    let chain = ChainContext::new(1, Hardfork::Istanbul);
    let err = SponsoredTransaction::new(complete(TxKind::AccessList), &chain).unwrap_err();
    assert_eq!(err, TransactionError::UnsupportedByRuleset(TxKind::AccessList, Hardfork::Istanbul));
}
