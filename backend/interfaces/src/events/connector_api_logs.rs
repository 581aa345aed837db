//! Structured capture of a single outgoing gateway exchange.

use common_utils::{date_time, masking::masked_serialize, request::Method};
use domain_types::connector_flow::FlowName;
use serde_json::json;

/// Diagnostic record of one request/response exchange with the gateway.
///
/// Constructed by the caller for flows that keep durable call logs, filled
/// in by the outgoing service as the exchange progresses and emitted once
/// the call settles. Payloads are masked before they are stored.
#[derive(Debug, serde::Serialize)]
pub struct ConnectorEvent {
    connector_name: String,
    flow: String,
    transaction_id: Option<String>,
    url: Option<String>,
    method: Option<String>,
    request: Option<serde_json::Value>,
    response: Option<serde_json::Value>,
    status_code: Option<u16>,
    latency_ms: Option<u128>,
    created_at: i64,
}

impl ConnectorEvent {
    pub fn new(connector_name: &str, flow: FlowName, transaction_id: Option<String>) -> Self {
        Self {
            connector_name: connector_name.to_string(),
            flow: flow.to_string(),
            transaction_id,
            url: None,
            method: None,
            request: None,
            response: None,
            status_code: None,
            latency_ms: None,
            created_at: date_time::now_unix_timestamp(),
        }
    }

    pub fn set_request_details(&mut self, url: &str, method: Method) {
        self.url = Some(url.to_string());
        self.method = Some(method.to_string());
    }

    /// Records the masked request payload.
    pub fn set_request_body(&mut self, request: serde_json::Value) {
        self.request = Some(request);
    }

    /// Records the gateway payload with secret values masked. Used for both
    /// success and error bodies.
    pub fn set_connector_response<T: serde::Serialize>(&mut self, response: &T) {
        self.response = Some(masked_serialize(response).unwrap_or_else(
            |_| json!({"error": "failed to mask serialize connector response"}),
        ));
    }

    pub fn set_status_code(&mut self, status_code: u16) {
        self.status_code = Some(status_code);
    }

    pub fn set_latency(&mut self, latency_ms: u128) {
        self.latency_ms = Some(latency_ms);
    }

    /// Emits the completed record on the log stream.
    pub fn emit(self) {
        match serde_json::to_value(&self) {
            Ok(event) => tracing::info!(tags = "CONNECTOR_EVENT", json_value = %event),
            Err(error) => tracing::warn!(?error, "failed to serialize connector event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use common_utils::masking::Secret;

    use super::*;

    #[test]
    fn event_masks_secret_response_fields() {
        #[derive(serde::Serialize)]
        struct TokenBody {
            access_token: Secret<String>,
            expires_in: u32,
        }

        let mut event = ConnectorEvent::new("snapppay", FlowName::CreateAccessToken, None);
        event.set_connector_response(&TokenBody {
            access_token: Secret::new("top-secret".to_string()),
            expires_in: 1800,
        });

        let recorded = event.response.as_ref().and_then(|r| r.get("access_token"));
        assert_eq!(
            recorded.and_then(|v| v.as_str()),
            Some("*** alloc::string::String ***")
        );
        assert_eq!(
            event
                .response
                .as_ref()
                .and_then(|r| r.get("expires_in"))
                .and_then(|v| v.as_u64()),
            Some(1800)
        );
    }

    #[test]
    fn event_records_request_details() {
        let mut event = ConnectorEvent::new(
            "snapppay",
            FlowName::CreatePayment,
            Some("txn_01".to_string()),
        );
        event.set_request_details("https://gateway.example/payment/v1/token", Method::Post);
        event.set_status_code(200);

        assert_eq!(
            event.url.as_deref(),
            Some("https://gateway.example/payment/v1/token")
        );
        assert_eq!(event.method.as_deref(), Some("POST"));
        assert_eq!(event.status_code, Some(200));
    }
}
