#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use std::marker::PhantomData;

    use common_utils::{
        masking::{PeekInterface, Secret},
        types::{AmountConvertor, MinorUnit, RialMinorUnitForConnector},
    };
    use domain_types::{
        connector_flow::{CheckEligibility, CreatePayment, UpdatePayment},
        connector_types::{
            EligibilityData, EligibilityResponseData, OfferFlowData, PaymentCreateData,
            PaymentCreateResponseData, PaymentFlowData, PaymentUpdateData,
            PaymentUpdateResponseData,
        },
        router_data::{ConnectorAuthType, ErrorResponse},
        router_data_v2::RouterDataV2,
        transaction::{OrderLineItem, PaymentOrder, TransactionState},
        types::Connectors,
    };

    use crate::{
        connectors::snapppay::transformers::{
            normalize_mobile, SnapppayAuthType, SnapppayEligibilityPayload,
            SnapppayEligibilityResponse, SnapppayErrorData, SnapppayPaymentsRequest,
            SnapppayPaymentsResponse, SnapppayPaymentsResponsePayload, SnapppayRouterData,
            SnapppayUpdateRequest,
        },
        types::ResponseRouterData,
    };

    fn converter() -> &'static (dyn AmountConvertor<Output = MinorUnit> + Sync) {
        &RialMinorUnitForConnector
    }

    fn multi_auth() -> ConnectorAuthType {
        ConnectorAuthType::MultiAuthKey {
            api_key: Secret::new("merchant_user".to_string()),
            key1: Secret::new("client_id_1".to_string()),
            api_secret: Secret::new("merchant_pass".to_string()),
            key2: Secret::new("client_secret_1".to_string()),
        }
    }

    fn order(discount: i64) -> PaymentOrder {
        PaymentOrder {
            items: vec![OrderLineItem {
                id: 7,
                name: "pizza".to_string(),
                unit_price: MinorUnit::new(60_000),
                discounted_unit_price: Some(MinorUnit::new(50_000)),
                quantity: 2,
            }],
            discount_amount: MinorUnit::new(discount),
            external_source_amount: MinorUnit::zero(),
            customer_mobile: "09123456789".to_string(),
        }
    }

    fn payment_flow_data() -> PaymentFlowData {
        PaymentFlowData {
            transaction_id: "txn_1".to_string(),
            status: TransactionState::Initiated,
            access_token: None,
            connectors: Connectors::default(),
        }
    }

    fn create_router_data(
        amount: i64,
        order: PaymentOrder,
    ) -> RouterDataV2<CreatePayment, PaymentFlowData, PaymentCreateData, PaymentCreateResponseData>
    {
        RouterDataV2 {
            flow: PhantomData,
            resource_common_data: payment_flow_data(),
            connector_auth_type: multi_auth(),
            request: PaymentCreateData {
                amount: MinorUnit::new(amount),
                order,
                return_url: "https://shop.example/callback".to_string(),
            },
            response: Err(ErrorResponse::default()),
        }
    }

    fn update_router_data(
        amount: i64,
        order: PaymentOrder,
    ) -> RouterDataV2<UpdatePayment, PaymentFlowData, PaymentUpdateData, PaymentUpdateResponseData>
    {
        RouterDataV2 {
            flow: PhantomData,
            resource_common_data: payment_flow_data(),
            connector_auth_type: multi_auth(),
            request: PaymentUpdateData {
                amount: MinorUnit::new(amount),
                order,
                payment_token: Secret::new("ptk_1".to_string()),
            },
            response: Err(ErrorResponse::default()),
        }
    }

    #[test]
    fn auth_type_conversion_maps_multi_auth_key() {
        let auth = SnapppayAuthType::try_from(&multi_auth()).unwrap();
        assert_eq!(auth.username.peek(), "merchant_user");
        assert_eq!(auth.password.peek(), "merchant_pass");
        assert_eq!(auth.client_id.peek(), "client_id_1");
        assert_eq!(auth.client_secret.peek(), "client_secret_1");
    }

    #[test]
    fn auth_type_conversion_rejects_other_variants() {
        let auth_type = ConnectorAuthType::HeaderKey {
            api_key: Secret::new("key".to_string()),
        };
        assert!(SnapppayAuthType::try_from(&auth_type).is_err());
    }

    #[test]
    fn payments_request_scales_cart_item_amounts_to_rials() {
        let router_data = create_router_data(100_000, order(0));
        let request =
            SnapppayPaymentsRequest::try_from(SnapppayRouterData::from((converter(), &router_data)))
                .unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["amount"], 100_000);
        assert_eq!(json["discountAmount"], 0);
        assert_eq!(json["externalSourceAmount"], 0);
        assert_eq!(json["mobile"], "+989123456789");
        assert_eq!(json["paymentMethodTypeDto"], "INSTALLMENT");
        assert_eq!(json["returnURL"], "https://shop.example/callback");
        assert_eq!(json["transactionId"], "txn_1");

        let cart = &json["cartList"][0];
        assert_eq!(cart["cartId"], 1);
        assert_eq!(cart["isShipmentIncluded"], true);
        assert_eq!(cart["isTaxIncluded"], true);
        assert_eq!(cart["shippingAmount"], 0);
        assert_eq!(cart["taxAmount"], 0);
        assert_eq!(cart["totalAmount"], 100_000);

        let item = &cart["cartItems"][0];
        assert_eq!(item["amount"], 500_000);
        assert_eq!(item["category"], "pizza");
        assert_eq!(item["commissionType"], 100);
        assert_eq!(item["count"], 2);
        assert_eq!(item["id"], 7);
        assert_eq!(item["name"], "pizza");
    }

    #[test]
    fn payments_request_wires_discount_into_cart_total() {
        let router_data = create_router_data(100_000, order(5_000));
        let request =
            SnapppayPaymentsRequest::try_from(SnapppayRouterData::from((converter(), &router_data)))
                .unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["discountAmount"], 5_000);
        assert_eq!(json["cartList"][0]["totalAmount"], 105_000);
    }

    #[test]
    fn update_request_replaces_redirect_fields_with_payment_token() {
        let router_data = update_router_data(100_000, order(0));
        let request =
            SnapppayUpdateRequest::try_from(SnapppayRouterData::from((converter(), &router_data)))
                .unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["paymentToken"], "ptk_1");
        assert_eq!(json["amount"], 100_000);
        assert!(json.get("returnURL").is_none());
        assert!(json.get("transactionId").is_none());
    }

    #[test]
    fn mobile_normalization_strips_leading_zero() {
        assert_eq!(normalize_mobile("09123456789").unwrap(), "+989123456789");
        assert_eq!(normalize_mobile("9123456789").unwrap(), "+989123456789");
        assert!(normalize_mobile("not-a-number").is_err());
    }

    #[test]
    fn create_response_success_maps_payment_artifacts() {
        let response = SnapppayPaymentsResponse {
            successful: true,
            response: Some(SnapppayPaymentsResponsePayload {
                payment_token: Secret::new("ptk_9".to_string()),
                payment_page_url: "https://gateway.example/pay/ptk_9".to_string(),
            }),
            error_data: None,
        };
        let result = RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data: create_router_data(100_000, order(0)),
            http_code: 200,
        })
        .unwrap();

        let data = result.response.unwrap();
        assert_eq!(data.payment_token.peek(), "ptk_9");
        assert_eq!(data.payment_page_url, "https://gateway.example/pay/ptk_9");
    }

    #[test]
    fn create_response_with_domain_failure_maps_to_error_response() {
        let response = SnapppayPaymentsResponse {
            successful: false,
            response: None,
            error_data: Some(SnapppayErrorData {
                error_code: Some(1023),
                message: Some("amount not eligible".to_string()),
            }),
        };
        let result = RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data: create_router_data(100_000, order(0)),
            http_code: 200,
        })
        .unwrap();

        let error = result.response.unwrap_err();
        assert_eq!(error.code, "1023");
        assert_eq!(error.message, "amount not eligible");
        assert_eq!(error.status_code, 200);
    }

    #[test]
    fn eligibility_response_maps_decision() {
        let router_data: RouterDataV2<
            CheckEligibility,
            OfferFlowData,
            EligibilityData,
            EligibilityResponseData,
        > = RouterDataV2 {
            flow: PhantomData,
            resource_common_data: OfferFlowData {
                access_token: None,
                connectors: Connectors::default(),
            },
            connector_auth_type: multi_auth(),
            request: EligibilityData {
                amount: MinorUnit::new(100_000),
            },
            response: Err(ErrorResponse::default()),
        };
        let response = SnapppayEligibilityResponse {
            successful: true,
            response: Some(SnapppayEligibilityPayload {
                eligible: false,
                title_message: Some("installments unavailable for this amount".to_string()),
            }),
            error_data: None,
        };
        let result = RouterDataV2::try_from(ResponseRouterData {
            response,
            router_data,
            http_code: 200,
        })
        .unwrap();

        let data = result.response.unwrap();
        assert!(!data.eligible);
        assert_eq!(
            data.title_message.as_deref(),
            Some("installments unavailable for this amount")
        );
    }
}
