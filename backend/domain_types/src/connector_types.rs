use common_utils::{masking::Secret, MinorUnit};

use crate::{
    transaction::{PaymentOrder, TransactionState},
    types::Connectors,
};

/// Data shared by every payment flow against the gateway, alongside the
/// flow-specific request payload.
#[derive(Debug, Clone)]
pub struct PaymentFlowData {
    /// Merchant side transaction identifier, also sent to the gateway.
    pub transaction_id: String,
    pub status: TransactionState,
    /// OAuth access token obtained through the access token flow. Set by the
    /// orchestrator before any authenticated call is made.
    pub access_token: Option<Secret<String>>,
    pub connectors: Connectors,
}

/// Data shared by offer queries, which run outside any transaction lifecycle.
#[derive(Debug, Clone)]
pub struct OfferFlowData {
    pub access_token: Option<Secret<String>>,
    pub connectors: Connectors,
}

/// The access token flow draws its credentials from the connector auth type,
/// so it carries no request payload of its own.
#[derive(Debug, Clone, Default)]
pub struct AccessTokenRequestData;

#[derive(Debug, Clone)]
pub struct AccessTokenResponseData {
    pub access_token: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentCreateData {
    /// Total payable amount, toman denominated.
    pub amount: MinorUnit,
    pub order: PaymentOrder,
    /// URL the gateway redirects the customer back to.
    pub return_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentCreateResponseData {
    /// Token identifying this payment on the gateway, required by every
    /// subsequent lifecycle call.
    pub payment_token: Secret<String>,
    /// Hosted payment page the customer must be redirected to.
    pub payment_page_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentUpdateData {
    pub amount: MinorUnit,
    pub order: PaymentOrder,
    pub payment_token: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentUpdateResponseData {
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentVerifyData {
    pub payment_token: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentVerifyResponseData {
    pub gateway_transaction_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentSettleData {
    pub payment_token: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentSettleResponseData {
    pub gateway_transaction_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentCancelData {
    pub payment_token: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentCancelResponseData {
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EligibilityData {
    /// Amount the merchant wants to collect, toman denominated.
    pub amount: MinorUnit,
}

#[derive(Debug, Clone)]
pub struct EligibilityResponseData {
    pub eligible: bool,
    pub title_message: Option<String>,
}
