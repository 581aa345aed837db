//! Lifecycle orchestration for installment payments.
//!
//! Drives the ordered gateway sequence: authenticate, create the payment,
//! hand the customer to the hosted page, and on callback verify then settle.
//! Update, cancel and the eligibility query run as side operations. Every
//! operation mints its own access token; nothing token shaped is cached
//! between operations.

use std::marker::PhantomData;

use common_utils::{errors::CustomResult, masking::Secret, MinorUnit};
use connector_integration::connectors::Snapppay;
use domain_types::{
    connector_flow::{
        CancelPayment, CheckEligibility, CreateAccessToken, CreatePayment, FlowName,
        SettlePayment, UpdatePayment, VerifyPayment,
    },
    connector_types::{
        AccessTokenRequestData, AccessTokenResponseData, EligibilityData,
        EligibilityResponseData, OfferFlowData, PaymentCancelData, PaymentCancelResponseData,
        PaymentCreateData, PaymentCreateResponseData, PaymentFlowData, PaymentSettleData,
        PaymentSettleResponseData, PaymentUpdateData, PaymentUpdateResponseData,
        PaymentVerifyData, PaymentVerifyResponseData,
    },
    router_data::{ConnectorAuthType, ErrorResponse},
    router_data_v2::RouterDataV2,
    transaction::{CallbackParams, Transaction, TransactionState},
    types::{Connectors, Proxy},
};
use error_stack::report;
use external_services::service::execute_connector_processing_step;
use interfaces::{
    api::ConnectorCommon,
    connector_integration_v2::{BoxedConnectorIntegrationV2, ConnectorIntegrationV2},
    events::connector_api_logs::ConnectorEvent,
    records::TransactionRecordStore,
};

use crate::{
    configs::Config,
    error::{LifecycleError, ReportSwitchExt},
};

/// Orchestrates the payment lifecycle against the installment gateway.
///
/// Holds everything a gateway call needs: the connector, the merchant
/// credentials, endpoint configuration and the record store the transaction
/// state is committed to. Clones share the record store.
#[derive(Clone)]
pub struct PaymentLifecycle {
    connector: &'static Snapppay,
    auth_type: ConnectorAuthType,
    connectors: Connectors,
    proxy: Proxy,
    request_timeout: u64,
    records: Box<dyn TransactionRecordStore>,
}

impl PaymentLifecycle {
    pub fn new(config: &Config, records: Box<dyn TransactionRecordStore>) -> Self {
        Self {
            connector: Snapppay::new(),
            auth_type: config.gateway_credentials.auth_type(),
            connectors: config.connectors.clone(),
            proxy: config.proxy.clone(),
            request_timeout: config.http_client.request_timeout,
            records,
        }
    }

    /// Creates the payment on the gateway and returns the hosted payment
    /// page URL the customer must be redirected to.
    ///
    /// On success the returned payment token is persisted into the
    /// transaction metadata and the record advances to awaiting callback.
    /// Any gateway failure marks the record failed and nothing token shaped
    /// is persisted.
    #[tracing::instrument(skip(self))]
    pub async fn form_params(&self, transaction_id: &str) -> CustomResult<String, LifecycleError> {
        let mut transaction = self
            .records
            .find_transaction(transaction_id)
            .await
            .switch()?;

        match self.create_payment(&transaction).await {
            Ok(created) => {
                let PaymentCreateResponseData {
                    payment_token,
                    payment_page_url,
                } = created;
                transaction.set_payment_token(payment_token);
                transaction.set_state(TransactionState::TokenCreated);
                transaction.set_state(TransactionState::AwaitingCallback);
                self.records
                    .update_transaction(transaction.clone())
                    .await
                    .switch()?;
                tracing::info!(
                    transaction_id = %transaction.transaction_id,
                    "payment created, awaiting customer callback"
                );
                Ok(payment_page_url)
            }
            Err(error) => Err(self.fail_transaction(transaction, error).await?),
        }
    }

    /// True iff the callback reports a completed hosted payment page.
    /// Verification must not be attempted when this is false.
    pub fn can_continue_with_callback_parameters(&self, params: &CallbackParams) -> bool {
        params.indicates_success()
    }

    /// The gateway side transaction identifier carried by the callback.
    pub fn gateway_reference_id(
        &self,
        params: &CallbackParams,
    ) -> CustomResult<String, LifecycleError> {
        params.transaction_id.clone().ok_or_else(|| {
            report!(LifecycleError::Precondition {
                reason: "callback carries no gateway transaction id",
            })
        })
    }

    /// Verifies and settles the payment after the customer returned.
    ///
    /// Preconditions are checked before any gateway traffic: the record must
    /// still be verifiable, the callback must be complete and a payment
    /// token must be on file. Settle is only attempted after verify
    /// succeeds; a failure in either call marks the record failed.
    #[tracing::instrument(skip(self, params))]
    pub async fn verify_transaction(
        &self,
        transaction_id: &str,
        params: &CallbackParams,
    ) -> CustomResult<Transaction, LifecycleError> {
        let mut transaction = self
            .records
            .find_transaction(transaction_id)
            .await
            .switch()?;

        if !transaction.check_for_verify() {
            return Err(report!(LifecycleError::Precondition {
                reason: "transaction is not verifiable in its current state",
            }));
        }
        if params.transaction_id.is_none() || params.amount.is_none() || params.state.is_none() {
            return Err(report!(LifecycleError::Precondition {
                reason: "callback parameters are incomplete",
            }));
        }
        let payment_token = self.stored_payment_token(&transaction)?;

        match self.verify_then_settle(&transaction, payment_token).await {
            Ok(()) => {
                transaction.set_state(TransactionState::Verified);
                transaction.set_state(TransactionState::Settled);
                self.records
                    .update_transaction(transaction.clone())
                    .await
                    .switch()?;
                tracing::info!(
                    transaction_id = %transaction.transaction_id,
                    "payment verified and settled"
                );
                Ok(transaction)
            }
            Err(error) => Err(self.fail_transaction(transaction, error).await?),
        }
    }

    /// Cancels the payment on the gateway and moves the record to canceled.
    ///
    /// Only legal from states that may transition to canceled; a gateway
    /// failure raises without touching the record.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, transaction_id: &str) -> CustomResult<Transaction, LifecycleError> {
        let mut transaction = self
            .records
            .find_transaction(transaction_id)
            .await
            .switch()?;

        if !transaction
            .state
            .can_transition_to(TransactionState::Canceled)
        {
            return Err(report!(LifecycleError::Precondition {
                reason: "transaction state does not permit cancellation",
            }));
        }
        let payment_token = self.stored_payment_token(&transaction)?;

        let mut flow_data = self.payment_flow_data(&transaction);
        flow_data.access_token = Some(self.acquire_access_token(&flow_data).await?);

        let router_data: RouterDataV2<
            CancelPayment,
            PaymentFlowData,
            PaymentCancelData,
            PaymentCancelResponseData,
        > = RouterDataV2 {
            flow: PhantomData,
            resource_common_data: flow_data,
            connector_auth_type: self.auth_type.clone(),
            request: PaymentCancelData { payment_token },
            response: Err(ErrorResponse::default()),
        };

        let mut event = ConnectorEvent::new(
            self.connector.id(),
            FlowName::CancelPayment,
            Some(transaction.transaction_id.clone()),
        );
        let result = self.dispatch(router_data, Some(&mut event)).await;
        event.emit();
        result?;

        transaction.set_state(TransactionState::Canceled);
        self.records
            .update_transaction(transaction.clone())
            .await
            .switch()?;
        tracing::info!(
            transaction_id = %transaction.transaction_id,
            "payment canceled on gateway"
        );
        Ok(transaction)
    }

    /// Amends the payment request on the gateway using the stored payment
    /// token. The record itself does not change state.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        transaction_id: &str,
    ) -> CustomResult<PaymentUpdateResponseData, LifecycleError> {
        let transaction = self
            .records
            .find_transaction(transaction_id)
            .await
            .switch()?;
        let payment_token = self.stored_payment_token(&transaction)?;

        let mut flow_data = self.payment_flow_data(&transaction);
        flow_data.access_token = Some(self.acquire_access_token(&flow_data).await?);

        let router_data: RouterDataV2<
            UpdatePayment,
            PaymentFlowData,
            PaymentUpdateData,
            PaymentUpdateResponseData,
        > = RouterDataV2 {
            flow: PhantomData,
            resource_common_data: flow_data,
            connector_auth_type: self.auth_type.clone(),
            request: PaymentUpdateData {
                amount: transaction.amount,
                order: transaction.order.clone(),
                payment_token,
            },
            response: Err(ErrorResponse::default()),
        };

        let mut event = ConnectorEvent::new(
            self.connector.id(),
            FlowName::UpdatePayment,
            Some(transaction.transaction_id.clone()),
        );
        let result = self.dispatch(router_data, Some(&mut event)).await;
        event.emit();
        result
    }

    /// Asks the gateway whether an amount qualifies for the installment
    /// method. Runs outside any transaction lifecycle.
    #[tracing::instrument(skip(self))]
    pub async fn eligible(
        &self,
        amount: MinorUnit,
    ) -> CustomResult<EligibilityResponseData, LifecycleError> {
        // The token endpoint never reads the transaction, so the offer path
        // mints its token with a blank flow context.
        let token_flow_data = PaymentFlowData {
            transaction_id: String::new(),
            status: TransactionState::Initiated,
            access_token: None,
            connectors: self.connectors.clone(),
        };
        let access_token = self.acquire_access_token(&token_flow_data).await?;

        let router_data: RouterDataV2<
            CheckEligibility,
            OfferFlowData,
            EligibilityData,
            EligibilityResponseData,
        > = RouterDataV2 {
            flow: PhantomData,
            resource_common_data: OfferFlowData {
                access_token: Some(access_token),
                connectors: self.connectors.clone(),
            },
            connector_auth_type: self.auth_type.clone(),
            request: EligibilityData { amount },
            response: Err(ErrorResponse::default()),
        };
        self.dispatch(router_data, None).await
    }

    async fn create_payment(
        &self,
        transaction: &Transaction,
    ) -> CustomResult<PaymentCreateResponseData, LifecycleError> {
        let mut flow_data = self.payment_flow_data(transaction);
        flow_data.access_token = Some(self.acquire_access_token(&flow_data).await?);

        let router_data: RouterDataV2<
            CreatePayment,
            PaymentFlowData,
            PaymentCreateData,
            PaymentCreateResponseData,
        > = RouterDataV2 {
            flow: PhantomData,
            resource_common_data: flow_data,
            connector_auth_type: self.auth_type.clone(),
            request: PaymentCreateData {
                amount: transaction.amount,
                order: transaction.order.clone(),
                return_url: transaction.return_url.clone(),
            },
            response: Err(ErrorResponse::default()),
        };

        let mut event = ConnectorEvent::new(
            self.connector.id(),
            FlowName::CreatePayment,
            Some(transaction.transaction_id.clone()),
        );
        let result = self.dispatch(router_data, Some(&mut event)).await;
        event.emit();
        result
    }

    async fn verify_then_settle(
        &self,
        transaction: &Transaction,
        payment_token: Secret<String>,
    ) -> CustomResult<(), LifecycleError> {
        let mut flow_data = self.payment_flow_data(transaction);
        flow_data.access_token = Some(self.acquire_access_token(&flow_data).await?);

        let verify: RouterDataV2<
            VerifyPayment,
            PaymentFlowData,
            PaymentVerifyData,
            PaymentVerifyResponseData,
        > = RouterDataV2 {
            flow: PhantomData,
            resource_common_data: flow_data.clone(),
            connector_auth_type: self.auth_type.clone(),
            request: PaymentVerifyData {
                payment_token: payment_token.clone(),
            },
            response: Err(ErrorResponse::default()),
        };
        self.dispatch(verify, None).await?;

        // Settle runs on the same access and payment tokens, immediately
        // after a successful verify and never without one.
        let settle: RouterDataV2<
            SettlePayment,
            PaymentFlowData,
            PaymentSettleData,
            PaymentSettleResponseData,
        > = RouterDataV2 {
            flow: PhantomData,
            resource_common_data: flow_data,
            connector_auth_type: self.auth_type.clone(),
            request: PaymentSettleData { payment_token },
            response: Err(ErrorResponse::default()),
        };
        self.dispatch(settle, None).await?;
        Ok(())
    }

    /// One password grant round trip. Called once per lifecycle operation.
    async fn acquire_access_token(
        &self,
        flow_data: &PaymentFlowData,
    ) -> CustomResult<Secret<String>, LifecycleError> {
        let router_data: RouterDataV2<
            CreateAccessToken,
            PaymentFlowData,
            AccessTokenRequestData,
            AccessTokenResponseData,
        > = RouterDataV2 {
            flow: PhantomData,
            resource_common_data: flow_data.clone(),
            connector_auth_type: self.auth_type.clone(),
            request: AccessTokenRequestData,
            response: Err(ErrorResponse::default()),
        };
        let token_data = self.dispatch(router_data, None).await?;
        Ok(token_data.access_token)
    }

    /// Runs one connector flow and folds a gateway side rejection into the
    /// lifecycle error taxonomy.
    async fn dispatch<F, ResourceCommonData, Req, Resp>(
        &self,
        router_data: RouterDataV2<F, ResourceCommonData, Req, Resp>,
        event: Option<&mut ConnectorEvent>,
    ) -> CustomResult<Resp, LifecycleError>
    where
        Snapppay: ConnectorIntegrationV2<F, ResourceCommonData, Req, Resp>,
        F: Clone + 'static,
        ResourceCommonData: Clone + 'static,
        Req: Clone + std::fmt::Debug + 'static,
        Resp: Clone + std::fmt::Debug + 'static,
    {
        let connector_integration: BoxedConnectorIntegrationV2<
            '_,
            F,
            ResourceCommonData,
            Req,
            Resp,
        > = Box::new(self.connector);
        let router_data = execute_connector_processing_step(
            &self.proxy,
            self.request_timeout,
            connector_integration,
            router_data,
            event,
        )
        .await
        .switch()?;

        router_data
            .response
            .map_err(|error| report!(LifecycleError::from_gateway_error(error)))
    }

    /// Marks the record failed and persists it, except for precondition
    /// failures, which mean no gateway exchange was attempted.
    async fn fail_transaction(
        &self,
        mut transaction: Transaction,
        error: error_stack::Report<LifecycleError>,
    ) -> CustomResult<error_stack::Report<LifecycleError>, LifecycleError> {
        if !matches!(
            error.current_context(),
            LifecycleError::Precondition { .. }
        ) {
            transaction.set_state(TransactionState::Failed);
            self.records
                .update_transaction(transaction.clone())
                .await
                .switch()?;
            tracing::error!(
                transaction_id = %transaction.transaction_id,
                "payment lifecycle step failed, record marked failed"
            );
        }
        Ok(error)
    }

    fn stored_payment_token(
        &self,
        transaction: &Transaction,
    ) -> CustomResult<Secret<String>, LifecycleError> {
        transaction.payment_token().ok_or_else(|| {
            report!(LifecycleError::Precondition {
                reason: "no payment token is stored for this transaction",
            })
        })
    }

    fn payment_flow_data(&self, transaction: &Transaction) -> PaymentFlowData {
        PaymentFlowData {
            transaction_id: transaction.transaction_id.clone(),
            status: transaction.state,
            access_token: None,
            connectors: self.connectors.clone(),
        }
    }
}
