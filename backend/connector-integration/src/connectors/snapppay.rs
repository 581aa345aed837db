pub mod transformers;

mod test;

use std::fmt::Debug;

use base64::Engine;
use common_utils::{
    consts,
    errors::CustomResult,
    ext_traits::BytesExt,
    masking::{Mask, Maskable, PeekInterface},
    request::{Method, RequestContent},
    types::{AmountConvertor, MinorUnit, RialMinorUnitForConnector},
};
use domain_types::{
    connector_flow::{
        CancelPayment, CheckEligibility, CreateAccessToken, CreatePayment, SettlePayment,
        UpdatePayment, VerifyPayment,
    },
    connector_types::{
        AccessTokenRequestData, AccessTokenResponseData, EligibilityData, EligibilityResponseData,
        OfferFlowData, PaymentCancelData, PaymentCancelResponseData, PaymentCreateData,
        PaymentCreateResponseData, PaymentFlowData, PaymentSettleData, PaymentSettleResponseData,
        PaymentUpdateData, PaymentUpdateResponseData, PaymentVerifyData, PaymentVerifyResponseData,
    },
    errors,
    router_data::ErrorResponse,
    router_data_v2::RouterDataV2,
    router_response_types::Response,
    types::Connectors,
};
use error_stack::ResultExt;
use interfaces::{
    api::ConnectorCommon, connector_integration_v2::ConnectorIntegrationV2, connector_types,
    events::connector_api_logs::ConnectorEvent,
};
use transformers::{
    self as snapppay, SnapppayAuthUpdateRequest, SnapppayAuthUpdateResponse,
    SnapppayCancelResponse, SnapppayEligibilityResponse, SnapppayPaymentTokenRequest,
    SnapppayPaymentsRequest, SnapppayPaymentsResponse, SnapppaySettleResponse,
    SnapppayUpdateRequest, SnapppayUpdateResponse, SnapppayVerifyResponse,
};

use crate::{types::ResponseRouterData, with_error_response_body, with_response_body};

pub(crate) mod headers {
    pub(crate) const CONTENT_TYPE: &str = "Content-Type";
    pub(crate) const AUTHORIZATION: &str = "Authorization";
}

pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

#[derive(Clone)]
pub struct Snapppay {
    pub(crate) amount_converter: &'static (dyn AmountConvertor<Output = MinorUnit> + Sync),
}

impl Snapppay {
    pub const fn new() -> &'static Self {
        &Self {
            amount_converter: &RialMinorUnitForConnector,
        }
    }

    pub fn build_headers_for_payments(
        &self,
        req: &RouterDataV2<impl Debug, PaymentFlowData, impl Debug, impl Debug>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        let mut header = vec![(
            headers::CONTENT_TYPE.to_string(),
            "application/json".to_string().into(),
        )];

        // Every lifecycle call runs on a freshly minted access token, set on
        // the flow data before the call is dispatched.
        let access_token = req
            .resource_common_data
            .access_token
            .as_ref()
            .ok_or(errors::ConnectorError::FailedToObtainAuthType)?;

        let auth_header = (
            headers::AUTHORIZATION.to_string(),
            format!("Bearer {}", access_token.peek()).into_masked(),
        );
        header.push(auth_header);
        Ok(header)
    }

    pub fn build_headers_for_offers(
        &self,
        req: &RouterDataV2<impl Debug, OfferFlowData, impl Debug, impl Debug>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        let mut header = vec![(
            headers::CONTENT_TYPE.to_string(),
            "application/json".to_string().into(),
        )];

        let access_token = req
            .resource_common_data
            .access_token
            .as_ref()
            .ok_or(errors::ConnectorError::FailedToObtainAuthType)?;

        let auth_header = (
            headers::AUTHORIZATION.to_string(),
            format!("Bearer {}", access_token.peek()).into_masked(),
        );
        header.push(auth_header);
        Ok(header)
    }

    pub fn connector_base_url_payments<'a, F, Req, Res>(
        &self,
        req: &'a RouterDataV2<F, PaymentFlowData, Req, Res>,
    ) -> &'a str {
        &req.resource_common_data.connectors.snapppay.base_url
    }

    pub fn connector_base_url_offers<'a, F, Req, Res>(
        &self,
        req: &'a RouterDataV2<F, OfferFlowData, Req, Res>,
    ) -> &'a str {
        &req.resource_common_data.connectors.snapppay.base_url
    }
}

// ===== CONNECTOR SERVICE TRAIT IMPLEMENTATIONS =====

impl connector_types::ConnectorServiceTrait for Snapppay {}

impl connector_types::PaymentAccessToken for Snapppay {}

impl connector_types::PaymentCreateV2 for Snapppay {}

impl connector_types::PaymentUpdateV2 for Snapppay {}

impl connector_types::PaymentVerifyV2 for Snapppay {}

impl connector_types::PaymentSettleV2 for Snapppay {}

impl connector_types::PaymentCancelV2 for Snapppay {}

impl connector_types::EligibilityV2 for Snapppay {}

// ===== VALIDATION TRAIT IMPLEMENTATIONS =====

impl connector_types::ValidationTrait for Snapppay {
    fn should_do_access_token(&self) -> bool {
        true
    }
}

// ===== CONNECTOR COMMON IMPLEMENTATION =====

impl ConnectorCommon for Snapppay {
    fn id(&self) -> &'static str {
        "snapppay"
    }

    fn base_url<'a>(&self, connectors: &'a Connectors) -> &'a str {
        &connectors.snapppay.base_url
    }

    fn build_error_response(
        &self,
        res: Response,
        event_builder: Option<&mut ConnectorEvent>,
    ) -> CustomResult<ErrorResponse, errors::ConnectorError> {
        let response: snapppay::SnapppayErrorResponse = res
            .response
            .parse_struct("SnapppayErrorResponse")
            .change_context(errors::ConnectorError::ResponseDeserializationFailed)?;

        with_error_response_body!(event_builder, response);

        let error_data = response.error_data.unwrap_or_default();
        Ok(ErrorResponse {
            status_code: res.status_code,
            code: error_data
                .error_code
                .map_or_else(|| consts::NO_ERROR_CODE.to_string(), |code| code.to_string()),
            message: error_data
                .message
                .clone()
                .unwrap_or_else(|| consts::NO_ERROR_MESSAGE.to_string()),
            reason: error_data.message,
        })
    }
}

// ===== ACCESS TOKEN FLOW IMPLEMENTATION =====

impl ConnectorIntegrationV2<CreateAccessToken, PaymentFlowData, AccessTokenRequestData, AccessTokenResponseData>
    for Snapppay
{
    fn get_headers(
        &self,
        req: &RouterDataV2<CreateAccessToken, PaymentFlowData, AccessTokenRequestData, AccessTokenResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        let auth = snapppay::SnapppayAuthType::try_from(&req.connector_auth_type)
            .change_context(errors::ConnectorError::FailedToObtainAuthType)?;

        let client_id = auth.client_id.peek();
        let client_secret = auth.client_secret.peek();

        let credentials = format!("{client_id}:{client_secret}");
        let base64_credentials = BASE64_ENGINE.encode(credentials.as_bytes());

        Ok(vec![
            (
                headers::CONTENT_TYPE.to_string(),
                "application/x-www-form-urlencoded".to_string().into(),
            ),
            (
                headers::AUTHORIZATION.to_string(),
                format!("Basic {base64_credentials}").into_masked(),
            ),
        ])
    }

    fn get_content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded"
    }

    fn get_url(
        &self,
        req: &RouterDataV2<CreateAccessToken, PaymentFlowData, AccessTokenRequestData, AccessTokenResponseData>,
    ) -> CustomResult<String, errors::ConnectorError> {
        Ok(format!(
            "{}/v1/oauth/token",
            self.connector_base_url_payments(req)
        ))
    }

    fn get_request_body(
        &self,
        req: &RouterDataV2<CreateAccessToken, PaymentFlowData, AccessTokenRequestData, AccessTokenResponseData>,
    ) -> CustomResult<Option<RequestContent>, errors::ConnectorError> {
        let connector_req = SnapppayAuthUpdateRequest::try_from(&req.connector_auth_type)?;
        Ok(Some(RequestContent::FormUrlEncoded(Box::new(connector_req))))
    }

    fn handle_response_v2(
        &self,
        data: &RouterDataV2<CreateAccessToken, PaymentFlowData, AccessTokenRequestData, AccessTokenResponseData>,
        event_builder: Option<&mut ConnectorEvent>,
        res: Response,
    ) -> CustomResult<
        RouterDataV2<CreateAccessToken, PaymentFlowData, AccessTokenRequestData, AccessTokenResponseData>,
        errors::ConnectorError,
    > {
        let response: SnapppayAuthUpdateResponse = res
            .response
            .parse_struct("SnapppayAuthUpdateResponse")
            .change_context(errors::ConnectorError::ResponseDeserializationFailed)?;

        with_response_body!(event_builder, response);

        RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data: data.clone(),
            http_code: res.status_code,
        })
    }

    fn get_error_response_v2(
        &self,
        res: Response,
        event_builder: Option<&mut ConnectorEvent>,
    ) -> CustomResult<ErrorResponse, errors::ConnectorError> {
        self.build_error_response(res, event_builder)
    }
}

// ===== CREATE PAYMENT FLOW IMPLEMENTATION =====

impl ConnectorIntegrationV2<CreatePayment, PaymentFlowData, PaymentCreateData, PaymentCreateResponseData>
    for Snapppay
{
    fn get_headers(
        &self,
        req: &RouterDataV2<CreatePayment, PaymentFlowData, PaymentCreateData, PaymentCreateResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        self.build_headers_for_payments(req)
    }

    fn get_url(
        &self,
        req: &RouterDataV2<CreatePayment, PaymentFlowData, PaymentCreateData, PaymentCreateResponseData>,
    ) -> CustomResult<String, errors::ConnectorError> {
        Ok(format!(
            "{}/payment/v1/token",
            self.connector_base_url_payments(req)
        ))
    }

    fn get_request_body(
        &self,
        req: &RouterDataV2<CreatePayment, PaymentFlowData, PaymentCreateData, PaymentCreateResponseData>,
    ) -> CustomResult<Option<RequestContent>, errors::ConnectorError> {
        let connector_router_data = snapppay::SnapppayRouterData::from((self.amount_converter, req));
        let connector_req = SnapppayPaymentsRequest::try_from(connector_router_data)?;
        Ok(Some(RequestContent::Json(Box::new(connector_req))))
    }

    fn handle_response_v2(
        &self,
        data: &RouterDataV2<CreatePayment, PaymentFlowData, PaymentCreateData, PaymentCreateResponseData>,
        event_builder: Option<&mut ConnectorEvent>,
        res: Response,
    ) -> CustomResult<
        RouterDataV2<CreatePayment, PaymentFlowData, PaymentCreateData, PaymentCreateResponseData>,
        errors::ConnectorError,
    > {
        let response: SnapppayPaymentsResponse = res
            .response
            .parse_struct("SnapppayPaymentsResponse")
            .change_context(errors::ConnectorError::ResponseDeserializationFailed)?;

        with_response_body!(event_builder, response);

        RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data: data.clone(),
            http_code: res.status_code,
        })
    }

    fn get_error_response_v2(
        &self,
        res: Response,
        event_builder: Option<&mut ConnectorEvent>,
    ) -> CustomResult<ErrorResponse, errors::ConnectorError> {
        self.build_error_response(res, event_builder)
    }
}

// ===== UPDATE PAYMENT FLOW IMPLEMENTATION =====

impl ConnectorIntegrationV2<UpdatePayment, PaymentFlowData, PaymentUpdateData, PaymentUpdateResponseData>
    for Snapppay
{
    fn get_headers(
        &self,
        req: &RouterDataV2<UpdatePayment, PaymentFlowData, PaymentUpdateData, PaymentUpdateResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        self.build_headers_for_payments(req)
    }

    fn get_url(
        &self,
        req: &RouterDataV2<UpdatePayment, PaymentFlowData, PaymentUpdateData, PaymentUpdateResponseData>,
    ) -> CustomResult<String, errors::ConnectorError> {
        Ok(format!(
            "{}/payment/v1/update",
            self.connector_base_url_payments(req)
        ))
    }

    fn get_request_body(
        &self,
        req: &RouterDataV2<UpdatePayment, PaymentFlowData, PaymentUpdateData, PaymentUpdateResponseData>,
    ) -> CustomResult<Option<RequestContent>, errors::ConnectorError> {
        let connector_router_data = snapppay::SnapppayRouterData::from((self.amount_converter, req));
        let connector_req = SnapppayUpdateRequest::try_from(connector_router_data)?;
        Ok(Some(RequestContent::Json(Box::new(connector_req))))
    }

    fn handle_response_v2(
        &self,
        data: &RouterDataV2<UpdatePayment, PaymentFlowData, PaymentUpdateData, PaymentUpdateResponseData>,
        event_builder: Option<&mut ConnectorEvent>,
        res: Response,
    ) -> CustomResult<
        RouterDataV2<UpdatePayment, PaymentFlowData, PaymentUpdateData, PaymentUpdateResponseData>,
        errors::ConnectorError,
    > {
        let response: SnapppayUpdateResponse = res
            .response
            .parse_struct("SnapppayUpdateResponse")
            .change_context(errors::ConnectorError::ResponseDeserializationFailed)?;

        with_response_body!(event_builder, response);

        RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data: data.clone(),
            http_code: res.status_code,
        })
    }

    fn get_error_response_v2(
        &self,
        res: Response,
        event_builder: Option<&mut ConnectorEvent>,
    ) -> CustomResult<ErrorResponse, errors::ConnectorError> {
        self.build_error_response(res, event_builder)
    }
}

// ===== VERIFY PAYMENT FLOW IMPLEMENTATION =====

impl ConnectorIntegrationV2<VerifyPayment, PaymentFlowData, PaymentVerifyData, PaymentVerifyResponseData>
    for Snapppay
{
    fn get_headers(
        &self,
        req: &RouterDataV2<VerifyPayment, PaymentFlowData, PaymentVerifyData, PaymentVerifyResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        self.build_headers_for_payments(req)
    }

    fn get_url(
        &self,
        req: &RouterDataV2<VerifyPayment, PaymentFlowData, PaymentVerifyData, PaymentVerifyResponseData>,
    ) -> CustomResult<String, errors::ConnectorError> {
        Ok(format!(
            "{}/payment/v1/verify",
            self.connector_base_url_payments(req)
        ))
    }

    fn get_request_body(
        &self,
        req: &RouterDataV2<VerifyPayment, PaymentFlowData, PaymentVerifyData, PaymentVerifyResponseData>,
    ) -> CustomResult<Option<RequestContent>, errors::ConnectorError> {
        let connector_req = SnapppayPaymentTokenRequest::from(&req.request);
        Ok(Some(RequestContent::Json(Box::new(connector_req))))
    }

    fn handle_response_v2(
        &self,
        data: &RouterDataV2<VerifyPayment, PaymentFlowData, PaymentVerifyData, PaymentVerifyResponseData>,
        event_builder: Option<&mut ConnectorEvent>,
        res: Response,
    ) -> CustomResult<
        RouterDataV2<VerifyPayment, PaymentFlowData, PaymentVerifyData, PaymentVerifyResponseData>,
        errors::ConnectorError,
    > {
        let response: SnapppayVerifyResponse = res
            .response
            .parse_struct("SnapppayVerifyResponse")
            .change_context(errors::ConnectorError::ResponseDeserializationFailed)?;

        with_response_body!(event_builder, response);

        RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data: data.clone(),
            http_code: res.status_code,
        })
    }

    fn get_error_response_v2(
        &self,
        res: Response,
        event_builder: Option<&mut ConnectorEvent>,
    ) -> CustomResult<ErrorResponse, errors::ConnectorError> {
        self.build_error_response(res, event_builder)
    }
}

// ===== SETTLE PAYMENT FLOW IMPLEMENTATION =====

impl ConnectorIntegrationV2<SettlePayment, PaymentFlowData, PaymentSettleData, PaymentSettleResponseData>
    for Snapppay
{
    fn get_headers(
        &self,
        req: &RouterDataV2<SettlePayment, PaymentFlowData, PaymentSettleData, PaymentSettleResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        self.build_headers_for_payments(req)
    }

    fn get_url(
        &self,
        req: &RouterDataV2<SettlePayment, PaymentFlowData, PaymentSettleData, PaymentSettleResponseData>,
    ) -> CustomResult<String, errors::ConnectorError> {
        Ok(format!(
            "{}/payment/v1/settle",
            self.connector_base_url_payments(req)
        ))
    }

    fn get_request_body(
        &self,
        req: &RouterDataV2<SettlePayment, PaymentFlowData, PaymentSettleData, PaymentSettleResponseData>,
    ) -> CustomResult<Option<RequestContent>, errors::ConnectorError> {
        let connector_req = SnapppayPaymentTokenRequest::from(&req.request);
        Ok(Some(RequestContent::Json(Box::new(connector_req))))
    }

    fn handle_response_v2(
        &self,
        data: &RouterDataV2<SettlePayment, PaymentFlowData, PaymentSettleData, PaymentSettleResponseData>,
        event_builder: Option<&mut ConnectorEvent>,
        res: Response,
    ) -> CustomResult<
        RouterDataV2<SettlePayment, PaymentFlowData, PaymentSettleData, PaymentSettleResponseData>,
        errors::ConnectorError,
    > {
        let response: SnapppaySettleResponse = res
            .response
            .parse_struct("SnapppaySettleResponse")
            .change_context(errors::ConnectorError::ResponseDeserializationFailed)?;

        with_response_body!(event_builder, response);

        RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data: data.clone(),
            http_code: res.status_code,
        })
    }

    fn get_error_response_v2(
        &self,
        res: Response,
        event_builder: Option<&mut ConnectorEvent>,
    ) -> CustomResult<ErrorResponse, errors::ConnectorError> {
        self.build_error_response(res, event_builder)
    }
}

// ===== CANCEL PAYMENT FLOW IMPLEMENTATION =====

impl ConnectorIntegrationV2<CancelPayment, PaymentFlowData, PaymentCancelData, PaymentCancelResponseData>
    for Snapppay
{
    fn get_headers(
        &self,
        req: &RouterDataV2<CancelPayment, PaymentFlowData, PaymentCancelData, PaymentCancelResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        self.build_headers_for_payments(req)
    }

    fn get_url(
        &self,
        req: &RouterDataV2<CancelPayment, PaymentFlowData, PaymentCancelData, PaymentCancelResponseData>,
    ) -> CustomResult<String, errors::ConnectorError> {
        Ok(format!(
            "{}/payment/v1/cancel",
            self.connector_base_url_payments(req)
        ))
    }

    fn get_request_body(
        &self,
        req: &RouterDataV2<CancelPayment, PaymentFlowData, PaymentCancelData, PaymentCancelResponseData>,
    ) -> CustomResult<Option<RequestContent>, errors::ConnectorError> {
        let connector_req = SnapppayPaymentTokenRequest::from(&req.request);
        Ok(Some(RequestContent::Json(Box::new(connector_req))))
    }

    fn handle_response_v2(
        &self,
        data: &RouterDataV2<CancelPayment, PaymentFlowData, PaymentCancelData, PaymentCancelResponseData>,
        event_builder: Option<&mut ConnectorEvent>,
        res: Response,
    ) -> CustomResult<
        RouterDataV2<CancelPayment, PaymentFlowData, PaymentCancelData, PaymentCancelResponseData>,
        errors::ConnectorError,
    > {
        let response: SnapppayCancelResponse = res
            .response
            .parse_struct("SnapppayCancelResponse")
            .change_context(errors::ConnectorError::ResponseDeserializationFailed)?;

        with_response_body!(event_builder, response);

        RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data: data.clone(),
            http_code: res.status_code,
        })
    }

    fn get_error_response_v2(
        &self,
        res: Response,
        event_builder: Option<&mut ConnectorEvent>,
    ) -> CustomResult<ErrorResponse, errors::ConnectorError> {
        self.build_error_response(res, event_builder)
    }
}

// ===== ELIGIBILITY FLOW IMPLEMENTATION =====

impl ConnectorIntegrationV2<CheckEligibility, OfferFlowData, EligibilityData, EligibilityResponseData>
    for Snapppay
{
    fn get_headers(
        &self,
        req: &RouterDataV2<CheckEligibility, OfferFlowData, EligibilityData, EligibilityResponseData>,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        self.build_headers_for_offers(req)
    }

    fn get_http_method(&self) -> Method {
        Method::Get
    }

    fn get_url(
        &self,
        req: &RouterDataV2<CheckEligibility, OfferFlowData, EligibilityData, EligibilityResponseData>,
    ) -> CustomResult<String, errors::ConnectorError> {
        Ok(format!(
            "{}/offer/v1/eligible?amount={}",
            self.connector_base_url_offers(req),
            req.request.amount.get_amount_as_i64()
        ))
    }

    fn handle_response_v2(
        &self,
        data: &RouterDataV2<CheckEligibility, OfferFlowData, EligibilityData, EligibilityResponseData>,
        event_builder: Option<&mut ConnectorEvent>,
        res: Response,
    ) -> CustomResult<
        RouterDataV2<CheckEligibility, OfferFlowData, EligibilityData, EligibilityResponseData>,
        errors::ConnectorError,
    > {
        let response: SnapppayEligibilityResponse = res
            .response
            .parse_struct("SnapppayEligibilityResponse")
            .change_context(errors::ConnectorError::ResponseDeserializationFailed)?;

        with_response_body!(event_builder, response);

        RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data: data.clone(),
            http_code: res.status_code,
        })
    }

    fn get_error_response_v2(
        &self,
        res: Response,
        event_builder: Option<&mut ConnectorEvent>,
    ) -> CustomResult<ErrorResponse, errors::ConnectorError> {
        self.build_error_response(res, event_builder)
    }
}
