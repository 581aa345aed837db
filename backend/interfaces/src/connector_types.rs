use domain_types::{
    connector_flow,
    connector_types::{
        AccessTokenRequestData, AccessTokenResponseData, EligibilityData, EligibilityResponseData,
        OfferFlowData, PaymentCancelData, PaymentCancelResponseData, PaymentCreateData,
        PaymentCreateResponseData, PaymentFlowData, PaymentSettleData, PaymentSettleResponseData,
        PaymentUpdateData, PaymentUpdateResponseData, PaymentVerifyData, PaymentVerifyResponseData,
    },
};

use crate::{api::ConnectorCommon, connector_integration_v2::ConnectorIntegrationV2};

pub trait ConnectorServiceTrait:
    ConnectorCommon
    + ValidationTrait
    + PaymentAccessToken
    + PaymentCreateV2
    + PaymentUpdateV2
    + PaymentVerifyV2
    + PaymentSettleV2
    + PaymentCancelV2
    + EligibilityV2
{
}

pub trait ValidationTrait {
    fn should_do_access_token(&self) -> bool {
        false
    }
}

pub trait PaymentAccessToken:
    ConnectorIntegrationV2<
    connector_flow::CreateAccessToken,
    PaymentFlowData,
    AccessTokenRequestData,
    AccessTokenResponseData,
>
{
}

pub trait PaymentCreateV2:
    ConnectorIntegrationV2<
    connector_flow::CreatePayment,
    PaymentFlowData,
    PaymentCreateData,
    PaymentCreateResponseData,
>
{
}

pub trait PaymentUpdateV2:
    ConnectorIntegrationV2<
    connector_flow::UpdatePayment,
    PaymentFlowData,
    PaymentUpdateData,
    PaymentUpdateResponseData,
>
{
}

pub trait PaymentVerifyV2:
    ConnectorIntegrationV2<
    connector_flow::VerifyPayment,
    PaymentFlowData,
    PaymentVerifyData,
    PaymentVerifyResponseData,
>
{
}

pub trait PaymentSettleV2:
    ConnectorIntegrationV2<
    connector_flow::SettlePayment,
    PaymentFlowData,
    PaymentSettleData,
    PaymentSettleResponseData,
>
{
}

pub trait PaymentCancelV2:
    ConnectorIntegrationV2<
    connector_flow::CancelPayment,
    PaymentFlowData,
    PaymentCancelData,
    PaymentCancelResponseData,
>
{
}

pub trait EligibilityV2:
    ConnectorIntegrationV2<
    connector_flow::CheckEligibility,
    OfferFlowData,
    EligibilityData,
    EligibilityResponseData,
>
{
}
