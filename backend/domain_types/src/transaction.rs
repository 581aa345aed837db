use common_utils::{
    date_time, generate_time_ordered_id,
    masking::{ExposeInterface, PeekInterface, Secret, SecretSerdeValue},
    MinorUnit,
};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// Key under which the gateway payment token is kept in the transaction's
/// additional data bag.
const PAYMENT_TOKEN_KEY: &str = "payment_token";

/// Callback `state` value the gateway sends for a customer who completed the
/// hosted payment page.
pub const CALLBACK_STATE_OK: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    Initiated,
    TokenCreated,
    AwaitingCallback,
    Verified,
    Settled,
    Canceled,
    Failed,
}

impl TransactionState {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::Canceled | Self::Failed)
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Self::Failed) => true,
            (Self::Initiated, Self::TokenCreated) => true,
            (Self::TokenCreated, Self::AwaitingCallback) => true,
            (Self::AwaitingCallback, Self::Verified) => true,
            (Self::AwaitingCallback, Self::Canceled) => true,
            (Self::Verified, Self::Settled) => true,
            (Self::Verified, Self::Canceled) => true,
            _ => false,
        }
    }
}

/// A single purchasable line within an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineItem {
    pub id: i64,
    pub name: String,
    /// Regular unit price, toman denominated.
    pub unit_price: MinorUnit,
    /// Discounted unit price, taking precedence over `unit_price` when set.
    pub discounted_unit_price: Option<MinorUnit>,
    pub quantity: u32,
}

impl OrderLineItem {
    /// The price the gateway should charge per unit, before rial scaling.
    pub fn effective_unit_price(&self) -> MinorUnit {
        self.discounted_unit_price.unwrap_or(self.unit_price)
    }
}

/// Order snapshot taken when the paying customer is sent to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentOrder {
    pub items: Vec<OrderLineItem>,
    /// Total discount applied on top of the line items, toman denominated.
    pub discount_amount: MinorUnit,
    /// Portion of the total settled outside the gateway, toman denominated.
    pub external_source_amount: MinorUnit,
    /// Customer mobile number as captured by the order flow.
    pub customer_mobile: String,
}

/// Query parameters the gateway appends when redirecting the customer back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
    pub amount: Option<MinorUnit>,
    pub state: Option<String>,
}

impl CallbackParams {
    /// The gateway reports a completed hosted page with `state=OK`. Anything
    /// else means the customer abandoned or the gateway declined.
    pub fn indicates_success(&self) -> bool {
        self.state.as_deref() == Some(CALLBACK_STATE_OK)
    }
}

/// A payment attempt as persisted by the record store.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub transaction_id: String,
    /// Total payable amount, toman denominated.
    pub amount: MinorUnit,
    pub state: TransactionState,
    /// Opaque bag the orchestrator persists gateway artifacts into.
    pub additional_data: Option<SecretSerdeValue>,
    pub order: PaymentOrder,
    pub return_url: String,
    pub created_at: PrimitiveDateTime,
    pub modified_at: PrimitiveDateTime,
}

impl Transaction {
    pub fn new(amount: MinorUnit, order: PaymentOrder, return_url: String) -> Self {
        let now = date_time::now();
        Self {
            transaction_id: generate_time_ordered_id("txn"),
            amount,
            state: TransactionState::Initiated,
            additional_data: None,
            order,
            return_url,
            created_at: now,
            modified_at: now,
        }
    }

    /// Gateway payment token persisted after a create or update call.
    pub fn payment_token(&self) -> Option<Secret<String>> {
        self.additional_data
            .as_ref()
            .and_then(|data| data.peek().get(PAYMENT_TOKEN_KEY))
            .and_then(|token| token.as_str())
            .map(|token| Secret::new(token.to_string()))
    }

    /// Merge the gateway payment token into the additional data bag.
    pub fn set_payment_token(&mut self, token: Secret<String>) {
        let mut data = self
            .additional_data
            .take()
            .map(ExposeInterface::expose)
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        if let Some(map) = data.as_object_mut() {
            map.insert(
                PAYMENT_TOKEN_KEY.to_string(),
                serde_json::Value::String(token.expose()),
            );
        }
        self.additional_data = Some(Secret::new(data));
        self.modified_at = date_time::now();
    }

    /// Guard consulted before verification. A record that already went
    /// through verify must not be verified again.
    pub fn check_for_verify(&self) -> bool {
        !matches!(
            self.state,
            TransactionState::Verified | TransactionState::Settled
        )
    }

    pub fn set_state(&mut self, state: TransactionState) {
        self.state = state;
        self.modified_at = date_time::now();
    }
}

#[cfg(test)]
mod state_machine_tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn order() -> PaymentOrder {
        PaymentOrder {
            items: vec![],
            discount_amount: MinorUnit::zero(),
            external_source_amount: MinorUnit::zero(),
            customer_mobile: "09123456789".to_string(),
        }
    }

    #[test]
    fn happy_path_transitions_are_permitted() {
        use TransactionState::*;
        assert!(Initiated.can_transition_to(TokenCreated));
        assert!(TokenCreated.can_transition_to(AwaitingCallback));
        assert!(AwaitingCallback.can_transition_to(Verified));
        assert!(Verified.can_transition_to(Settled));
    }

    #[test]
    fn cancellation_is_limited_to_callback_and_verified_states() {
        use TransactionState::*;
        assert!(AwaitingCallback.can_transition_to(Canceled));
        assert!(Verified.can_transition_to(Canceled));
        assert!(!Initiated.can_transition_to(Canceled));
        assert!(!TokenCreated.can_transition_to(Canceled));
        assert!(!Settled.can_transition_to(Canceled));
    }

    #[test]
    fn any_live_state_may_fail() {
        use TransactionState::*;
        for state in [Initiated, TokenCreated, AwaitingCallback, Verified] {
            assert!(state.can_transition_to(Failed), "{state} should fail");
        }
    }

    #[test]
    fn terminal_states_admit_no_transitions() {
        use TransactionState::*;
        for state in [Settled, Canceled, Failed] {
            for next in [
                Initiated,
                TokenCreated,
                AwaitingCallback,
                Verified,
                Settled,
                Canceled,
                Failed,
            ] {
                assert!(!state.can_transition_to(next));
            }
        }
    }

    #[test]
    fn skipping_states_is_rejected() {
        use TransactionState::*;
        assert!(!Initiated.can_transition_to(Verified));
        assert!(!TokenCreated.can_transition_to(Settled));
        assert!(!AwaitingCallback.can_transition_to(Settled));
    }

    #[test]
    fn payment_token_round_trips_through_additional_data() {
        use common_utils::masking::PeekInterface;

        let mut txn = Transaction::new(MinorUnit::new(100_000), order(), "https://shop.example/cb".to_string());
        assert!(txn.payment_token().is_none());

        txn.set_payment_token(Secret::new("ptk_123".to_string()));
        assert_eq!(txn.payment_token().map(|t| t.peek().clone()), Some("ptk_123".to_string()));
    }

    #[test]
    fn setting_a_token_preserves_other_additional_data() {
        let mut txn = Transaction::new(MinorUnit::new(5_000), order(), "https://shop.example/cb".to_string());
        txn.additional_data = Some(Secret::new(serde_json::json!({"order_ref": "ord-9"})));

        txn.set_payment_token(Secret::new("ptk_456".to_string()));

        let data = txn.additional_data.clone().unwrap().expose();
        assert_eq!(data["order_ref"], "ord-9");
        assert_eq!(data["payment_token"], "ptk_456");
    }

    #[test]
    fn verify_guard_rejects_already_verified_records() {
        let mut txn = Transaction::new(MinorUnit::new(100), order(), "https://shop.example/cb".to_string());
        assert!(txn.check_for_verify());

        txn.set_state(TransactionState::Verified);
        assert!(!txn.check_for_verify());

        txn.set_state(TransactionState::Settled);
        assert!(!txn.check_for_verify());
    }

    #[test]
    fn callback_success_requires_state_ok() {
        let ok = CallbackParams {
            transaction_id: Some("txn_1".to_string()),
            amount: Some(MinorUnit::new(10)),
            state: Some("OK".to_string()),
        };
        assert!(ok.indicates_success());

        let failed = CallbackParams {
            state: Some("FAILED".to_string()),
            ..Default::default()
        };
        assert!(!failed.indicates_success());
        assert!(!CallbackParams::default().indicates_success());
    }

    #[test]
    fn discounted_unit_price_takes_precedence() {
        let item = OrderLineItem {
            id: 1,
            name: "pizza".to_string(),
            unit_price: MinorUnit::new(60_000),
            discounted_unit_price: Some(MinorUnit::new(50_000)),
            quantity: 2,
        };
        assert_eq!(item.effective_unit_price(), MinorUnit::new(50_000));

        let plain = OrderLineItem {
            discounted_unit_price: None,
            ..item
        };
        assert_eq!(plain.effective_unit_price(), MinorUnit::new(60_000));
    }
}
