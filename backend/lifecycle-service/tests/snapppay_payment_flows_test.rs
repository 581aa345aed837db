#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use common_utils::{
    consts,
    masking::{PeekInterface, Secret},
    MinorUnit,
};
use domain_types::{
    router_data::ConnectorAuthType,
    transaction::{CallbackParams, OrderLineItem, PaymentOrder, Transaction, TransactionState},
    types::{ConnectorParams, Connectors, Proxy},
};
use interfaces::records::TransactionRecordStore;
use lifecycle_service::{
    configs::{Common, Config, GatewayCredentials, HttpClient},
    error::LifecycleError,
    logger::config::Log,
    payments::PaymentLifecycle,
    records::InMemoryTransactionStore,
};

const TEST_AMOUNT: i64 = 100_000;
const TEST_RETURN_URL: &str = "https://shop.example/payment/callback";
// Nothing listens here, so gateway calls fail fast with a transport error.
const DEAD_GATEWAY_URL: &str = "http://127.0.0.1:9";

fn test_config(base_url: &str) -> Config {
    Config {
        common: Common {
            environment: consts::Env::Development,
        },
        log: Log::default(),
        proxy: Proxy::default(),
        connectors: Connectors {
            snapppay: ConnectorParams {
                base_url: base_url.to_string(),
            },
        },
        gateway_credentials: GatewayCredentials {
            client_id: Secret::new("client_id_1".to_string()),
            client_secret: Secret::new("client_secret_1".to_string()),
            username: Secret::new("merchant_user".to_string()),
            password: Secret::new("merchant_pass".to_string()),
        },
        http_client: HttpClient::default(),
    }
}

fn lifecycle_with_store(base_url: &str) -> (PaymentLifecycle, InMemoryTransactionStore) {
    let store = InMemoryTransactionStore::new();
    let lifecycle = PaymentLifecycle::new(&test_config(base_url), Box::new(store.clone()));
    (lifecycle, store)
}

fn order() -> PaymentOrder {
    PaymentOrder {
        items: vec![OrderLineItem {
            id: 7,
            name: "pizza".to_string(),
            unit_price: MinorUnit::new(50_000),
            discounted_unit_price: None,
            quantity: 2,
        }],
        discount_amount: MinorUnit::zero(),
        external_source_amount: MinorUnit::zero(),
        customer_mobile: "09123456789".to_string(),
    }
}

async fn seed_transaction(
    store: &InMemoryTransactionStore,
    state: TransactionState,
    payment_token: Option<&str>,
) -> Transaction {
    let mut transaction = Transaction::new(
        MinorUnit::new(TEST_AMOUNT),
        order(),
        TEST_RETURN_URL.to_string(),
    );
    transaction.set_state(state);
    if let Some(token) = payment_token {
        transaction.set_payment_token(Secret::new(token.to_string()));
    }
    store
        .insert_transaction(transaction.clone())
        .await
        .unwrap();
    transaction
}

fn callback_ok() -> CallbackParams {
    CallbackParams {
        transaction_id: Some("981273645".to_string()),
        amount: Some(MinorUnit::new(TEST_AMOUNT)),
        state: Some("OK".to_string()),
    }
}

fn assert_precondition(error: &error_stack::Report<LifecycleError>, expected_reason: &str) {
    match error.current_context() {
        LifecycleError::Precondition { reason } => assert_eq!(*reason, expected_reason),
        other => panic!("expected a precondition error, got {other:?}"),
    }
}

#[test]
fn callback_predicate_only_accepts_state_ok() {
    let (lifecycle, _store) = lifecycle_with_store(DEAD_GATEWAY_URL);

    assert!(lifecycle.can_continue_with_callback_parameters(&callback_ok()));

    let failed = CallbackParams {
        state: Some("FAILED".to_string()),
        ..callback_ok()
    };
    assert!(!lifecycle.can_continue_with_callback_parameters(&failed));
    assert!(!lifecycle.can_continue_with_callback_parameters(&CallbackParams::default()));
}

#[test]
fn gateway_reference_id_requires_the_callback_transaction_id() {
    let (lifecycle, _store) = lifecycle_with_store(DEAD_GATEWAY_URL);

    let reference = lifecycle.gateway_reference_id(&callback_ok()).unwrap();
    assert_eq!(reference, "981273645");

    let missing = CallbackParams {
        transaction_id: None,
        ..callback_ok()
    };
    let error = lifecycle.gateway_reference_id(&missing).unwrap_err();
    assert_precondition(&error, "callback carries no gateway transaction id");
}

#[test]
fn credentials_map_into_the_multi_auth_variant() {
    let config = test_config(DEAD_GATEWAY_URL);
    match config.gateway_credentials.auth_type() {
        ConnectorAuthType::MultiAuthKey {
            api_key,
            key1,
            api_secret,
            key2,
        } => {
            assert_eq!(api_key.peek(), "merchant_user");
            assert_eq!(api_secret.peek(), "merchant_pass");
            assert_eq!(key1.peek(), "client_id_1");
            assert_eq!(key2.peek(), "client_secret_1");
        }
        other => panic!("expected multi auth key credentials, got {other:?}"),
    }
}

#[tokio::test]
async fn form_params_requires_an_existing_record() {
    let (lifecycle, _store) = lifecycle_with_store(DEAD_GATEWAY_URL);

    let error = lifecycle.form_params("txn_missing").await.unwrap_err();
    assert_precondition(&error, "transaction record not found");
}

#[tokio::test]
async fn verify_rejects_incomplete_callback_parameters() {
    let (lifecycle, store) = lifecycle_with_store(DEAD_GATEWAY_URL);
    let transaction =
        seed_transaction(&store, TransactionState::AwaitingCallback, Some("ptk_1")).await;

    let incomplete = CallbackParams {
        amount: None,
        ..callback_ok()
    };
    let error = lifecycle
        .verify_transaction(&transaction.transaction_id, &incomplete)
        .await
        .unwrap_err();
    assert_precondition(&error, "callback parameters are incomplete");

    // No gateway call was made, so the record is untouched.
    let stored = store
        .find_transaction(&transaction.transaction_id)
        .await
        .unwrap();
    assert_eq!(stored.state, TransactionState::AwaitingCallback);
}

#[tokio::test]
async fn verify_rejects_records_that_already_went_through_verify() {
    let (lifecycle, store) = lifecycle_with_store(DEAD_GATEWAY_URL);
    let transaction = seed_transaction(&store, TransactionState::Verified, Some("ptk_1")).await;

    let error = lifecycle
        .verify_transaction(&transaction.transaction_id, &callback_ok())
        .await
        .unwrap_err();
    assert_precondition(&error, "transaction is not verifiable in its current state");
}

#[tokio::test]
async fn verify_requires_a_stored_payment_token() {
    let (lifecycle, store) = lifecycle_with_store(DEAD_GATEWAY_URL);
    let transaction = seed_transaction(&store, TransactionState::AwaitingCallback, None).await;

    let error = lifecycle
        .verify_transaction(&transaction.transaction_id, &callback_ok())
        .await
        .unwrap_err();
    assert_precondition(&error, "no payment token is stored for this transaction");

    let stored = store
        .find_transaction(&transaction.transaction_id)
        .await
        .unwrap();
    assert_eq!(stored.state, TransactionState::AwaitingCallback);
}

#[tokio::test]
async fn cancel_is_rejected_outside_cancelable_states() {
    let (lifecycle, store) = lifecycle_with_store(DEAD_GATEWAY_URL);

    let initiated = seed_transaction(&store, TransactionState::Initiated, Some("ptk_1")).await;
    let error = lifecycle
        .cancel(&initiated.transaction_id)
        .await
        .unwrap_err();
    assert_precondition(&error, "transaction state does not permit cancellation");

    let settled = seed_transaction(&store, TransactionState::Settled, Some("ptk_2")).await;
    let error = lifecycle.cancel(&settled.transaction_id).await.unwrap_err();
    assert_precondition(&error, "transaction state does not permit cancellation");
}

#[tokio::test]
async fn update_requires_a_stored_payment_token() {
    let (lifecycle, store) = lifecycle_with_store(DEAD_GATEWAY_URL);
    let transaction = seed_transaction(&store, TransactionState::AwaitingCallback, None).await;

    let error = lifecycle
        .update(&transaction.transaction_id)
        .await
        .unwrap_err();
    assert_precondition(&error, "no payment token is stored for this transaction");
}

#[tokio::test]
async fn create_failure_marks_the_record_failed_and_persists_no_token() {
    let (lifecycle, store) = lifecycle_with_store(DEAD_GATEWAY_URL);
    let transaction = seed_transaction(&store, TransactionState::Initiated, None).await;

    let error = lifecycle
        .form_params(&transaction.transaction_id)
        .await
        .unwrap_err();
    assert!(matches!(
        error.current_context(),
        LifecycleError::Transport
    ));

    let stored = store
        .find_transaction(&transaction.transaction_id)
        .await
        .unwrap();
    assert_eq!(stored.state, TransactionState::Failed);
    assert!(stored.payment_token().is_none());
}

#[tokio::test]
async fn verify_transport_failure_marks_the_record_failed() {
    let (lifecycle, store) = lifecycle_with_store(DEAD_GATEWAY_URL);
    let transaction =
        seed_transaction(&store, TransactionState::AwaitingCallback, Some("ptk_1")).await;

    let error = lifecycle
        .verify_transaction(&transaction.transaction_id, &callback_ok())
        .await
        .unwrap_err();
    assert!(matches!(
        error.current_context(),
        LifecycleError::Transport
    ));

    let stored = store
        .find_transaction(&transaction.transaction_id)
        .await
        .unwrap();
    assert_eq!(stored.state, TransactionState::Failed);
}

#[tokio::test]
async fn cancel_transport_failure_leaves_the_record_untouched() {
    let (lifecycle, store) = lifecycle_with_store(DEAD_GATEWAY_URL);
    let transaction =
        seed_transaction(&store, TransactionState::AwaitingCallback, Some("ptk_1")).await;

    let error = lifecycle
        .cancel(&transaction.transaction_id)
        .await
        .unwrap_err();
    assert!(matches!(
        error.current_context(),
        LifecycleError::Transport
    ));

    let stored = store
        .find_transaction(&transaction.transaction_id)
        .await
        .unwrap();
    assert_eq!(stored.state, TransactionState::AwaitingCallback);
    assert_eq!(
        stored.payment_token().map(|token| token.peek().clone()),
        Some("ptk_1".to_string())
    );
}
