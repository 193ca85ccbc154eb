//! Deployment profile gating: which command sets get assembled.

use dapi_gateway::{assemble_registry, Network};
use serde_json::json;

use crate::mocks::mock_backends;

#[tokio::test]
async fn regression_commands_absent_outside_regression_networks() {
    let (backends, _handles) = mock_backends(false);

    for network in [Network::Mainnet, Network::Testnet] {
        let registry = assemble_registry(network, &backends);
        assert!(!registry.contains("generate"));
        assert!(!registry.contains("generateToAddress"));

        let err = registry
            .dispatch("generate", Some(&json!({"amount": 1})))
            .await
            .unwrap_err();
        assert_eq!(err.code, -32601);
    }
}

#[tokio::test]
async fn regression_commands_present_on_regression_networks() {
    let (backends, handles) = mock_backends(false);

    for network in [Network::Regtest, Network::Devnet] {
        let registry = assemble_registry(network, &backends);
        assert!(registry.contains("generate"));
        assert!(registry.contains("generateToAddress"));
    }

    let registry = assemble_registry(Network::Regtest, &backends);
    let result = registry
        .dispatch("generate", Some(&json!({"amount": 2})))
        .await
        .unwrap();
    assert_eq!(result.as_array().unwrap().len(), 2);
    assert!(handles.core.call_count() > 0);
}

#[tokio::test]
async fn spv_commands_gated_on_spv_backend() {
    let (without_spv, _handles) = mock_backends(false);
    let registry = assemble_registry(Network::Testnet, &without_spv);
    for method in [
        "loadBloomFilter",
        "addToBloomFilter",
        "clearBloomFilter",
        "getSpvData",
        "findDataForBlock",
    ] {
        assert!(!registry.contains(method), "{method} should be absent");
    }

    let (with_spv, handles) = mock_backends(true);
    let registry = assemble_registry(Network::Testnet, &with_spv);
    for method in [
        "loadBloomFilter",
        "addToBloomFilter",
        "clearBloomFilter",
        "getSpvData",
        "findDataForBlock",
    ] {
        assert!(registry.contains(method), "{method} should be present");
    }

    let result = registry
        .dispatch(
            "loadBloomFilter",
            Some(&json!({"filter": {"vData": "0fab", "nHashFuncs": 11, "nTweak": 0, "nFlags": 0}})),
        )
        .await
        .unwrap();
    assert_eq!(result, json!(true));
    assert_eq!(handles.spv.unwrap().call_count(), 1);
}

#[tokio::test]
async fn base_set_identical_across_profiles() {
    let (backends, _handles) = mock_backends(false);

    let testnet = assemble_registry(Network::Testnet, &backends);
    let regtest = assemble_registry(Network::Regtest, &backends);

    // every testnet method also exists in the regtest profile
    for method in testnet.method_names() {
        assert!(regtest.contains(method), "{method} missing from regtest");
    }
    // regtest adds exactly the generation commands
    let extra: Vec<_> = regtest
        .method_names()
        .into_iter()
        .filter(|m| !testnet.contains(m))
        .collect();
    assert_eq!(extra, vec!["generate", "generateToAddress"]);
}
