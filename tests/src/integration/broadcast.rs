//! State transition broadcast scenarios.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use dapi_gateway::domain::hash::{double_sha256, double_sha256_hex};
use dapi_gateway::transition::{encode_transition_tx, TransitionPayload};
use dapi_gateway::{assemble_registry, Network};
use serde_json::json;

use crate::mocks::{mock_backends, mock_backends_with_consensus, MockConsensus};

fn header_hex_for(packet: &[u8]) -> String {
    hex::encode(encode_transition_tx(&TransitionPayload {
        version: 1,
        reg_tx_id: [0x55; 32],
        hash_prev_sub_tx: [0u8; 32],
        credit_fee: 1000,
        hash_st_packet: double_sha256(packet),
        signature: vec![0x0c; 65],
    }))
}

#[tokio::test]
async fn double_sha256_is_deterministic() {
    let once = double_sha256_hex(b"same input");
    let twice = double_sha256_hex(b"same input");
    assert_eq!(once, twice);
    assert_eq!(once.len(), 64);
}

#[tokio::test]
async fn send_raw_transition_commits_and_returns_txid() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let packet = b"the data packet";
    let result = registry
        .dispatch(
            "sendRawTransition",
            Some(&json!({
                "rawTransitionHeader": header_hex_for(packet),
                "rawTransitionPacket": hex::encode(packet),
            })),
        )
        .await
        .unwrap();

    assert_eq!(result.as_str().unwrap().len(), 64);
    assert_eq!(handles.storage.call_count(), 1);
    assert_eq!(handles.consensus.call_count(), 1);
}

#[tokio::test]
async fn hash_mismatch_fails_before_storage_and_broadcast() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let err = registry
        .dispatch(
            "sendRawTransition",
            Some(&json!({
                "rawTransitionHeader": header_hex_for(b"bound packet"),
                "rawTransitionPacket": hex::encode(b"some other packet"),
            })),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, -32003);
    assert!(err.message.contains("hash mismatch"));
    assert_eq!(handles.storage.call_count(), 0);
    assert_eq!(handles.consensus.call_count(), 0);
}

#[tokio::test]
async fn missing_packet_rejected_when_header_requires_one() {
    let (backends, handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let err = registry
        .dispatch(
            "sendRawTransition",
            Some(&json!({"rawTransitionHeader": header_hex_for(b"packet")})),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, -32602);
    assert_eq!(handles.storage.call_count(), 0);
}

#[tokio::test]
async fn check_phase_rejection_is_authoritative() {
    let (backends, handles) =
        mock_backends_with_consensus(false, MockConsensus::rejecting(17, 1));
    let registry = assemble_registry(Network::Testnet, &backends);

    let st = BASE64.encode(b"platform state transition");
    let err = registry
        .dispatch("applyStateTransition", Some(&json!({ "stateTransition": st })))
        .await
        .unwrap_err();

    assert_eq!(err.code, -32003);
    let data = err.data.unwrap();
    assert_eq!(data["phase"], "check");
    assert_eq!(data["code"], 17);
    assert_eq!(handles.consensus.call_count(), 1);
}

#[tokio::test]
async fn deliver_phase_rejection_surfaced_when_check_passes() {
    let (backends, _handles) =
        mock_backends_with_consensus(false, MockConsensus::rejecting(0, 9));
    let registry = assemble_registry(Network::Testnet, &backends);

    let st = BASE64.encode(b"platform state transition");
    let err = registry
        .dispatch("applyStateTransition", Some(&json!({ "stateTransition": st })))
        .await
        .unwrap_err();

    let data = err.data.unwrap();
    assert_eq!(data["phase"], "deliver");
    assert_eq!(data["code"], 9);
}

#[tokio::test]
async fn apply_state_transition_returns_true_on_double_accept() {
    let (backends, _handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &backends);

    let st = BASE64.encode(b"platform state transition");
    let result = registry
        .dispatch("applyStateTransition", Some(&json!({ "stateTransition": st })))
        .await
        .unwrap();

    assert_eq!(result, json!(true));
}

#[tokio::test]
async fn rejected_transition_is_not_retried() {
    let (backends, handles) =
        mock_backends_with_consensus(false, MockConsensus::rejecting(1, 0));
    let registry = assemble_registry(Network::Testnet, &backends);

    let packet = b"packet";
    registry
        .dispatch(
            "sendRawTransition",
            Some(&json!({
                "rawTransitionHeader": header_hex_for(packet),
                "rawTransitionPacket": hex::encode(packet),
            })),
        )
        .await
        .unwrap_err();

    // exactly one submission; the gateway never retries a rejection
    assert_eq!(handles.consensus.call_count(), 1);
}
