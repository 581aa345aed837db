use common_utils::{
    consts,
    masking::Secret,
    types::{AmountConvertor, MinorUnit},
};
use domain_types::{
    connector_flow::{CreatePayment, UpdatePayment},
    connector_types::{
        AccessTokenResponseData, EligibilityResponseData, OfferFlowData, PaymentCancelData,
        PaymentCancelResponseData, PaymentCreateData, PaymentCreateResponseData, PaymentFlowData,
        PaymentSettleData, PaymentSettleResponseData, PaymentUpdateData,
        PaymentUpdateResponseData, PaymentVerifyData, PaymentVerifyResponseData,
    },
    errors,
    router_data::{ConnectorAuthType, ErrorResponse},
    router_data_v2::RouterDataV2,
    transaction::{OrderLineItem, PaymentOrder},
    utils,
};
use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::types::ResponseRouterData;

const PASSWORD: &str = "password";
const ONLINE_MERCHANT_SCOPE: &str = "online-merchant";
const MOBILE_COUNTRY_PREFIX: &str = "+98";
const DEFAULT_CART_ID: i64 = 1;
const DEFAULT_COMMISSION_TYPE: i64 = 100;

/// Pairs a router data value with the converter that scales cart item
/// amounts from toman to the rial denomination the gateway expects.
pub struct SnapppayRouterData<T> {
    pub amount_converter: &'static (dyn AmountConvertor<Output = MinorUnit> + Sync),
    pub router_data: T,
}

impl<T> From<(&'static (dyn AmountConvertor<Output = MinorUnit> + Sync), T)>
    for SnapppayRouterData<T>
{
    fn from(
        (amount_converter, router_data): (
            &'static (dyn AmountConvertor<Output = MinorUnit> + Sync),
            T,
        ),
    ) -> Self {
        Self {
            amount_converter,
            router_data,
        }
    }
}

pub struct SnapppayAuthType {
    pub(super) username: Secret<String>,
    pub(super) password: Secret<String>,
    pub(super) client_id: Secret<String>,
    pub(super) client_secret: Secret<String>,
}

impl TryFrom<&ConnectorAuthType> for SnapppayAuthType {
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(auth_type: &ConnectorAuthType) -> Result<Self, Self::Error> {
        match auth_type {
            ConnectorAuthType::MultiAuthKey {
                api_key,
                key1,
                api_secret,
                key2,
            } => Ok(Self {
                username: api_key.to_owned(),
                password: api_secret.to_owned(),
                client_id: key1.to_owned(),
                client_secret: key2.to_owned(),
            }),
            _ => Err(errors::ConnectorError::FailedToObtainAuthType.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SnapppayAuthUpdateRequest {
    grant_type: String,
    scope: String,
    username: Secret<String>,
    password: Secret<String>,
}

impl TryFrom<&ConnectorAuthType> for SnapppayAuthUpdateRequest {
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(auth_type: &ConnectorAuthType) -> Result<Self, Self::Error> {
        let auth = SnapppayAuthType::try_from(auth_type)?;
        Ok(Self {
            grant_type: PASSWORD.to_string(),
            scope: ONLINE_MERCHANT_SCOPE.to_string(),
            username: auth.username,
            password: auth.password,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapppayAuthUpdateResponse {
    pub access_token: Secret<String>,
    pub token_type: String,
    pub expires_in: i64,
}

impl<F, T> TryFrom<ResponseRouterData<SnapppayAuthUpdateResponse, Self>>
    for RouterDataV2<F, PaymentFlowData, T, AccessTokenResponseData>
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        item: ResponseRouterData<SnapppayAuthUpdateResponse, Self>,
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            response: Ok(AccessTokenResponseData {
                access_token: item.response.access_token,
            }),
            ..item.router_data
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapppayPaymentMethodType {
    Installment,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayCartItem {
    /// Unit price in rials, scaled up from the toman denominated order line.
    amount: MinorUnit,
    category: String,
    commission_type: i64,
    count: u32,
    id: i64,
    name: String,
}

impl TryFrom<(&'static (dyn AmountConvertor<Output = MinorUnit> + Sync), &OrderLineItem)>
    for SnapppayCartItem
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        (amount_converter, item): (
            &'static (dyn AmountConvertor<Output = MinorUnit> + Sync),
            &OrderLineItem,
        ),
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: utils::convert_amount(amount_converter, item.effective_unit_price())?,
            category: item.name.clone(),
            commission_type: DEFAULT_COMMISSION_TYPE,
            count: item.quantity,
            id: item.id,
            name: item.name.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayCart {
    cart_id: i64,
    cart_items: Vec<SnapppayCartItem>,
    is_shipment_included: bool,
    is_tax_included: bool,
    shipping_amount: MinorUnit,
    tax_amount: MinorUnit,
    /// Payable total plus the discount, toman denominated like the top
    /// level amount.
    total_amount: MinorUnit,
}

fn build_cart_list(
    amount_converter: &'static (dyn AmountConvertor<Output = MinorUnit> + Sync),
    amount: MinorUnit,
    order: &PaymentOrder,
) -> Result<Vec<SnapppayCart>, error_stack::Report<errors::ConnectorError>> {
    let cart_items = order
        .items
        .iter()
        .map(|item| SnapppayCartItem::try_from((amount_converter, item)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(vec![SnapppayCart {
        cart_id: DEFAULT_CART_ID,
        cart_items,
        is_shipment_included: true,
        is_tax_included: true,
        shipping_amount: MinorUnit::zero(),
        tax_amount: MinorUnit::zero(),
        total_amount: amount + order.discount_amount,
    }])
}

/// The gateway wants mobile numbers with the country prefix and no leading
/// zero, so `09123456789` is sent as `+989123456789`.
pub fn normalize_mobile(
    mobile: &str,
) -> Result<String, error_stack::Report<errors::ConnectorError>> {
    let national_number = mobile.trim().parse::<i64>().change_context(
        errors::ConnectorError::InvalidDataFormat {
            field_name: "customer_mobile",
        },
    )?;
    Ok(format!("{MOBILE_COUNTRY_PREFIX}{national_number}"))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayPaymentsRequest {
    /// Payable total, toman denominated.
    amount: MinorUnit,
    cart_list: Vec<SnapppayCart>,
    discount_amount: MinorUnit,
    external_source_amount: MinorUnit,
    mobile: String,
    payment_method_type_dto: SnapppayPaymentMethodType,
    #[serde(rename = "returnURL")]
    return_url: String,
    transaction_id: String,
}

impl
    TryFrom<
        SnapppayRouterData<
            &RouterDataV2<CreatePayment, PaymentFlowData, PaymentCreateData, PaymentCreateResponseData>,
        >,
    > for SnapppayPaymentsRequest
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        item: SnapppayRouterData<
            &RouterDataV2<CreatePayment, PaymentFlowData, PaymentCreateData, PaymentCreateResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let request = &item.router_data.request;
        Ok(Self {
            amount: request.amount,
            cart_list: build_cart_list(item.amount_converter, request.amount, &request.order)?,
            discount_amount: request.order.discount_amount,
            external_source_amount: request.order.external_source_amount,
            mobile: normalize_mobile(&request.order.customer_mobile)?,
            payment_method_type_dto: SnapppayPaymentMethodType::Installment,
            return_url: request.return_url.clone(),
            transaction_id: item.router_data.resource_common_data.transaction_id.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayUpdateRequest {
    amount: MinorUnit,
    cart_list: Vec<SnapppayCart>,
    discount_amount: MinorUnit,
    external_source_amount: MinorUnit,
    mobile: String,
    payment_method_type_dto: SnapppayPaymentMethodType,
    payment_token: Secret<String>,
}

impl
    TryFrom<
        SnapppayRouterData<
            &RouterDataV2<UpdatePayment, PaymentFlowData, PaymentUpdateData, PaymentUpdateResponseData>,
        >,
    > for SnapppayUpdateRequest
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        item: SnapppayRouterData<
            &RouterDataV2<UpdatePayment, PaymentFlowData, PaymentUpdateData, PaymentUpdateResponseData>,
        >,
    ) -> Result<Self, Self::Error> {
        let request = &item.router_data.request;
        Ok(Self {
            amount: request.amount,
            cart_list: build_cart_list(item.amount_converter, request.amount, &request.order)?,
            discount_amount: request.order.discount_amount,
            external_source_amount: request.order.external_source_amount,
            mobile: normalize_mobile(&request.order.customer_mobile)?,
            payment_method_type_dto: SnapppayPaymentMethodType::Installment,
            payment_token: request.payment_token.clone(),
        })
    }
}

/// Verify, settle and cancel all post the persisted payment token and
/// nothing else.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayPaymentTokenRequest {
    payment_token: Secret<String>,
}

impl From<&PaymentVerifyData> for SnapppayPaymentTokenRequest {
    fn from(request: &PaymentVerifyData) -> Self {
        Self {
            payment_token: request.payment_token.clone(),
        }
    }
}

impl From<&PaymentSettleData> for SnapppayPaymentTokenRequest {
    fn from(request: &PaymentSettleData) -> Self {
        Self {
            payment_token: request.payment_token.clone(),
        }
    }
}

impl From<&PaymentCancelData> for SnapppayPaymentTokenRequest {
    fn from(request: &PaymentCancelData) -> Self {
        Self {
            payment_token: request.payment_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayErrorData {
    pub error_code: Option<i64>,
    pub message: Option<String>,
}

fn get_error_response(error_data: Option<SnapppayErrorData>, status_code: u16) -> ErrorResponse {
    let error_data = error_data.unwrap_or_default();
    ErrorResponse {
        code: error_data
            .error_code
            .map_or_else(|| consts::NO_ERROR_CODE.to_string(), |code| code.to_string()),
        message: error_data
            .message
            .clone()
            .unwrap_or_else(|| consts::NO_ERROR_MESSAGE.to_string()),
        reason: error_data.message,
        status_code,
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayPaymentsResponsePayload {
    pub payment_token: Secret<String>,
    pub payment_page_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayPaymentsResponse {
    pub successful: bool,
    pub response: Option<SnapppayPaymentsResponsePayload>,
    pub error_data: Option<SnapppayErrorData>,
}

impl<F, T> TryFrom<ResponseRouterData<SnapppayPaymentsResponse, Self>>
    for RouterDataV2<F, PaymentFlowData, T, PaymentCreateResponseData>
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        item: ResponseRouterData<SnapppayPaymentsResponse, Self>,
    ) -> Result<Self, Self::Error> {
        let response = if item.response.successful {
            let payload = item
                .response
                .response
                .ok_or_else(utils::missing_field_err("response"))?;
            Ok(PaymentCreateResponseData {
                payment_token: payload.payment_token,
                payment_page_url: payload.payment_page_url,
            })
        } else {
            Err(get_error_response(item.response.error_data, item.http_code))
        };
        Ok(Self {
            response,
            ..item.router_data
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayStatusPayload {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayUpdateResponse {
    pub successful: bool,
    pub response: Option<SnapppayStatusPayload>,
    pub error_data: Option<SnapppayErrorData>,
}

impl<F, T> TryFrom<ResponseRouterData<SnapppayUpdateResponse, Self>>
    for RouterDataV2<F, PaymentFlowData, T, PaymentUpdateResponseData>
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        item: ResponseRouterData<SnapppayUpdateResponse, Self>,
    ) -> Result<Self, Self::Error> {
        let response = if item.response.successful {
            Ok(PaymentUpdateResponseData {
                status: item.response.response.and_then(|payload| payload.status),
            })
        } else {
            Err(get_error_response(item.response.error_data, item.http_code))
        };
        Ok(Self {
            response,
            ..item.router_data
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayTransactionPayload {
    pub transaction_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayVerifyResponse {
    pub successful: bool,
    pub response: Option<SnapppayTransactionPayload>,
    pub error_data: Option<SnapppayErrorData>,
}

impl<F, T> TryFrom<ResponseRouterData<SnapppayVerifyResponse, Self>>
    for RouterDataV2<F, PaymentFlowData, T, PaymentVerifyResponseData>
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        item: ResponseRouterData<SnapppayVerifyResponse, Self>,
    ) -> Result<Self, Self::Error> {
        let response = if item.response.successful {
            let payload = item.response.response;
            Ok(PaymentVerifyResponseData {
                gateway_transaction_id: payload
                    .as_ref()
                    .and_then(|payload| payload.transaction_id.clone()),
                status: payload.and_then(|payload| payload.status),
            })
        } else {
            Err(get_error_response(item.response.error_data, item.http_code))
        };
        Ok(Self {
            response,
            ..item.router_data
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppaySettleResponse {
    pub successful: bool,
    pub response: Option<SnapppayTransactionPayload>,
    pub error_data: Option<SnapppayErrorData>,
}

impl<F, T> TryFrom<ResponseRouterData<SnapppaySettleResponse, Self>>
    for RouterDataV2<F, PaymentFlowData, T, PaymentSettleResponseData>
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        item: ResponseRouterData<SnapppaySettleResponse, Self>,
    ) -> Result<Self, Self::Error> {
        let response = if item.response.successful {
            let payload = item.response.response;
            Ok(PaymentSettleResponseData {
                gateway_transaction_id: payload
                    .as_ref()
                    .and_then(|payload| payload.transaction_id.clone()),
                status: payload.and_then(|payload| payload.status),
            })
        } else {
            Err(get_error_response(item.response.error_data, item.http_code))
        };
        Ok(Self {
            response,
            ..item.router_data
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayCancelResponse {
    pub successful: bool,
    pub response: Option<SnapppayStatusPayload>,
    pub error_data: Option<SnapppayErrorData>,
}

impl<F, T> TryFrom<ResponseRouterData<SnapppayCancelResponse, Self>>
    for RouterDataV2<F, PaymentFlowData, T, PaymentCancelResponseData>
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        item: ResponseRouterData<SnapppayCancelResponse, Self>,
    ) -> Result<Self, Self::Error> {
        let response = if item.response.successful {
            Ok(PaymentCancelResponseData {
                status: item.response.response.and_then(|payload| payload.status),
            })
        } else {
            Err(get_error_response(item.response.error_data, item.http_code))
        };
        Ok(Self {
            response,
            ..item.router_data
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayEligibilityPayload {
    pub eligible: bool,
    pub title_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayEligibilityResponse {
    pub successful: bool,
    pub response: Option<SnapppayEligibilityPayload>,
    pub error_data: Option<SnapppayErrorData>,
}

impl<F, T> TryFrom<ResponseRouterData<SnapppayEligibilityResponse, Self>>
    for RouterDataV2<F, OfferFlowData, T, EligibilityResponseData>
{
    type Error = error_stack::Report<errors::ConnectorError>;
    fn try_from(
        item: ResponseRouterData<SnapppayEligibilityResponse, Self>,
    ) -> Result<Self, Self::Error> {
        let response = if item.response.successful {
            let payload = item
                .response
                .response
                .ok_or_else(utils::missing_field_err("response"))?;
            Ok(EligibilityResponseData {
                eligible: payload.eligible,
                title_message: payload.title_message,
            })
        } else {
            Err(get_error_response(item.response.error_data, item.http_code))
        };
        Ok(Self {
            response,
            ..item.router_data
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapppayErrorResponse {
    pub successful: Option<bool>,
    pub error_data: Option<SnapppayErrorData>,
}
