//! Dispatch scenarios: validation gates every backend call.

use dapi_gateway::{assemble_registry, Network};
use serde_json::json;

use crate::mocks::mock_backends;

#[tokio::test]
async fn estimate_fee_resolves_against_stub_backend() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let result = registry
        .dispatch("estimateFee", Some(&json!({"nbBlocks": 1})))
        .await
        .unwrap();

    assert_eq!(result, json!(1.0));
    assert_eq!(handles.core.call_count(), 1);
}

#[tokio::test]
async fn estimate_fee_rejects_negative_before_backend() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let err = registry
        .dispatch("estimateFee", Some(&json!({"nbBlocks": -1})))
        .await
        .unwrap_err();

    assert!(err.message.contains("should be >= 0"));
    assert_eq!(handles.core.call_count(), 0);
}

#[tokio::test]
async fn handler_invoked_exactly_once_per_valid_call() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    registry
        .dispatch("getBestBlockHeight", None)
        .await
        .unwrap();

    assert_eq!(handles.core.call_count(), 1);
}

#[tokio::test]
async fn mn_list_diff_resolves_with_array_fields() {
    let (backends, _handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let hash = "0".repeat(64);
    let result = registry
        .dispatch(
            "getMnListDiff",
            Some(&json!({"baseBlockHash": hash, "blockHash": hash})),
        )
        .await
        .unwrap();

    assert!(result["mnList"].is_array());
    assert!(result["deletedMNs"].is_array());
    assert!(result["merkleRootMNList"].is_string());
}

#[tokio::test]
async fn utxo_window_over_1000_rejected_before_backend() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let err = registry
        .dispatch(
            "getUTXO",
            Some(&json!({"address": "yQvzG2LXqAXa6DLLVYZidRFoRtEV9JBnrH", "from": 0, "to": 1001})),
        )
        .await
        .unwrap_err();

    assert!(err.message.contains("should be <= 1000"));
    assert_eq!(handles.address_index.call_count(), 0);
}

#[tokio::test]
async fn transaction_window_over_50_rejected_even_with_valid_bounds() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    // both from and to pass the per-field checks on their own
    let err = registry
        .dispatch(
            "getTransactionsByAddress",
            Some(&json!({"address": "yQvzG2LXqAXa6DLLVYZidRFoRtEV9JBnrH", "from": 100, "to": 151})),
        )
        .await
        .unwrap_err();

    assert!(err.message.contains("params.to - params.from should be <= 50"));
    assert_eq!(handles.address_index.call_count(), 0);
}

#[tokio::test]
async fn address_summary_accepts_address_array() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let result = registry
        .dispatch(
            "getAddressSummary",
            Some(&json!({"address": ["yOne", "yTwo"], "noTxList": true})),
        )
        .await
        .unwrap();

    assert_eq!(result["balance"], 5000);
    assert_eq!(handles.address_index.call_count(), 1);
}

#[tokio::test]
async fn address_type_violation_names_field_path() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let err = registry
        .dispatch("getAddressSummary", Some(&json!({"address": 42})))
        .await
        .unwrap_err();

    assert!(err.message.contains("params.address should be array,string"));
    assert_eq!(handles.address_index.call_count(), 0);
}

#[tokio::test]
async fn array_params_rejected_as_schema_violation() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let err = registry
        .dispatch("estimateFee", Some(&json!([1])))
        .await
        .unwrap_err();

    assert!(err.message.contains("params should be object"));
    assert_eq!(handles.core.call_count(), 0);
}

#[tokio::test]
async fn unknown_method_yields_method_not_found() {
    let (backends, _handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let err = registry.dispatch("getQuorum", None).await.unwrap_err();
    assert_eq!(err.code, -32601);
    assert!(err.message.contains("getQuorum"));
}

#[tokio::test]
async fn send_raw_transaction_uses_single_field_name() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let result = registry
        .dispatch(
            "sendRawTransaction",
            Some(&json!({"rawTransaction": "00ff00ff"})),
        )
        .await
        .unwrap();
    assert_eq!(result.as_str().unwrap().len(), 64);

    // the undocumented alias from the old deployments is not accepted
    let err = registry
        .dispatch(
            "sendRawTransaction",
            Some(&json!({"rawIxTransaction": "00ff00ff"})),
        )
        .await
        .unwrap_err();
    assert!(err.message.contains("required property 'rawTransaction'"));
    assert_eq!(handles.core.call_count(), 1);
}

#[tokio::test]
async fn get_identity_round_trips_base64() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let result = registry
        .dispatch("getIdentity", Some(&json!({"id": "GWRSAVFMjXx8HpQFa"})))
        .await
        .unwrap();

    assert_eq!(result, json!("aWRlbnRpdHk="));
    assert_eq!(handles.consensus.call_count(), 1);
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let (backends, handles) = mock_backends(false);
    let registry = std::sync::Arc::new(assemble_registry(Network::Testnet, &backends));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let registry = std::sync::Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .dispatch("estimateFee", Some(&json!({"nbBlocks": 2})))
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(handles.core.call_count(), 8);
}
