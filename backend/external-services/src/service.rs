use std::{str::FromStr, time::Duration};

use common_utils::{
    masking::{ErasedMaskSerialize, Maskable},
    request::{Method, Request, RequestContent},
};
use domain_types::{
    errors::{ApiClientError, ConnectorError},
    router_data_v2::RouterDataV2,
    router_response_types::Response,
    types::Proxy,
};
use error_stack::{report, ResultExt};
use interfaces::{
    connector_integration_v2::BoxedConnectorIntegrationV2,
    events::connector_api_logs::ConnectorEvent,
};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::field::Empty;

pub type Headers = std::collections::HashSet<(String, Maskable<String>)>;

pub type CustomResult<T, E> = error_stack::Result<T, E>;

#[tracing::instrument(
    name = "execute_connector_processing_step",
    skip_all,
    fields(
        request.headers = Empty,
        request.body = Empty,
        request.url = Empty,
        request.method = Empty,
        response.body = Empty,
        response.headers = Empty,
        response.error_message = Empty,
        response.status_code = Empty,
        message_ = "Golden Log Line (outgoing)",
        latency = Empty,
    )
)]
pub async fn execute_connector_processing_step<F, ResourceCommonData, Req, Resp>(
    proxy: &Proxy,
    request_timeout: u64,
    connector: BoxedConnectorIntegrationV2<'_, F, ResourceCommonData, Req, Resp>,
    router_data: RouterDataV2<F, ResourceCommonData, Req, Resp>,
    mut event_builder: Option<&mut ConnectorEvent>,
) -> CustomResult<RouterDataV2<F, ResourceCommonData, Req, Resp>, ConnectorError>
where
    F: Clone + 'static,
    Req: Clone + 'static + std::fmt::Debug,
    Resp: Clone + 'static + std::fmt::Debug,
    ResourceCommonData: Clone + 'static,
{
    let start = tokio::time::Instant::now();
    let connector_request = connector.build_request_v2(&router_data)?;

    let masked_headers = connector_request
        .as_ref()
        .map(|connector_request| connector_request.headers.clone())
        .unwrap_or_default()
        .iter()
        .fold(serde_json::Map::new(), |mut acc, (k, v)| {
            let value = match v {
                Maskable::Masked(_) => {
                    serde_json::Value::String("*** alloc::string::String ***".to_string())
                }
                Maskable::Normal(iv) => serde_json::Value::String(iv.to_owned()),
            };
            acc.insert(k.clone(), value);
            acc
        });
    let headers_for_logging = serde_json::Value::Object(masked_headers);
    tracing::Span::current().record(
        "request.headers",
        tracing::field::display(&headers_for_logging),
    );

    let masked_request_body = connector_request.as_ref().map(|connector_request| {
        let masked_request = match connector_request.body.as_ref() {
            Some(request) => match request {
                RequestContent::Json(i) | RequestContent::FormUrlEncoded(i) => (**i)
                    .masked_serialize()
                    .unwrap_or(json!({ "error": "failed to mask serialize connector request"})),
            },
            None => serde_json::Value::Null,
        };
        tracing::Span::current().record("request.body", tracing::field::display(&masked_request));
        masked_request
    });

    let result = match connector_request {
        Some(request) => {
            let url = request.url.clone();
            let method = request.method;
            tracing::Span::current().record("request.url", tracing::field::display(&url));
            tracing::Span::current().record("request.method", tracing::field::display(method));
            if let Some(event) = event_builder.as_deref_mut() {
                event.set_request_details(&url, method);
                if let Some(masked_request) = masked_request_body.clone() {
                    event.set_request_body(masked_request);
                }
            }

            let response = call_connector_api(proxy, request, request_timeout)
                .await
                .change_context(ConnectorError::RequestEncodingFailed);
            match response {
                Ok(body) => {
                    let response = match body {
                        Ok(body) => {
                            tracing::Span::current().record(
                                "response.status_code",
                                tracing::field::display(body.status_code),
                            );
                            if let Ok(response) = parse_json_with_bom_handling(&body.response) {
                                let headers = body.headers.clone().unwrap_or_default();
                                let map = headers.iter().fold(
                                    serde_json::Map::new(),
                                    |mut acc, (left, right)| {
                                        let header_value = if right.is_sensitive() {
                                            serde_json::Value::String(
                                                "*** alloc::string::String ***".to_string(),
                                            )
                                        } else if let Ok(x) = right.to_str() {
                                            serde_json::Value::String(x.to_string())
                                        } else {
                                            return acc;
                                        };
                                        acc.insert(left.as_str().to_string(), header_value);
                                        acc
                                    },
                                );
                                let header_map = serde_json::Value::Object(map);
                                tracing::Span::current().record(
                                    "response.headers",
                                    tracing::field::display(header_map),
                                );
                                tracing::Span::current().record(
                                    "response.body",
                                    tracing::field::display(
                                        response.masked_serialize().unwrap_or(
                                            json!({ "error": "failed to mask serialize connector response"}),
                                        ),
                                    ),
                                );
                            }
                            if let Some(event) = event_builder.as_deref_mut() {
                                event.set_status_code(body.status_code);
                            }

                            connector.handle_response_v2(
                                &router_data,
                                event_builder.as_deref_mut(),
                                body,
                            )?
                        }
                        Err(body) => {
                            if let Some(event) = event_builder.as_deref_mut() {
                                event.set_status_code(body.status_code);
                            }
                            let error = match body.status_code {
                                500..=511 => connector
                                    .get_5xx_error_response(body, event_builder.as_deref_mut())?,
                                _ => connector
                                    .get_error_response_v2(body, event_builder.as_deref_mut())?,
                            };
                            tracing::Span::current().record(
                                "response.error_message",
                                tracing::field::display(&error.message),
                            );
                            tracing::Span::current().record(
                                "response.status_code",
                                tracing::field::display(error.status_code),
                            );
                            let mut updated_router_data = router_data;
                            updated_router_data.response = Err(error);
                            updated_router_data
                        }
                    };
                    Ok(response)
                }
                Err(err) => {
                    info_log(
                        "NETWORK_ERROR",
                        &json!(format!(
                            "Failed getting response from connector. Error: {:?}",
                            err
                        )),
                    );
                    Err(err.change_context(ConnectorError::ProcessingStepFailed(None)))
                }
            }
        }
        None => Ok(router_data),
    };

    let elapsed = start.elapsed().as_millis();
    if let Some(event) = event_builder.as_deref_mut() {
        event.set_latency(elapsed);
    }
    tracing::Span::current().record("latency", elapsed);
    tracing::info!(tag = ?Tag::OutgoingApi, log_type = "api", "Outgoing Request completed");
    result
}

pub async fn call_connector_api(
    proxy: &Proxy,
    request: Request,
    request_timeout: u64,
) -> CustomResult<Result<Response, Response>, ApiClientError> {
    let url =
        reqwest::Url::parse(&request.url).change_context(ApiClientError::UrlEncodingFailed)?;

    let should_bypass_proxy = proxy.bypass_proxy_urls.contains(&url.to_string());

    let client = create_client(proxy, should_bypass_proxy, request_timeout)?;

    let headers = request.headers.construct_header_map()?;

    let request = {
        match request.method {
            Method::Get => client.get(url),
            Method::Post => {
                let client = client.post(url);
                match request.body {
                    Some(RequestContent::Json(payload)) => client.json(&payload),
                    Some(RequestContent::FormUrlEncoded(payload)) => client.form(&payload),
                    None => client,
                }
            }
        }
        .add_headers(headers)
    };

    let send_request = async {
        request.send().await.map_err(|error| {
            let api_error = match error {
                error if error.is_timeout() => ApiClientError::RequestTimeoutReceived,
                _ => ApiClientError::RequestNotSent(error.to_string()),
            };
            info_log(
                "REQUEST_FAILURE",
                &json!("Unable to send request to connector."),
            );
            report!(api_error)
        })
    };

    let response = send_request.await;

    handle_response(response).await
}

pub fn create_client(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
    request_timeout: u64,
) -> CustomResult<Client, ApiClientError> {
    get_client_builder(proxy_config, should_bypass_proxy)?
        .timeout(Duration::from_secs(request_timeout))
        .build()
        .change_context(ApiClientError::ClientConstructionFailed)
        .inspect_err(|err| {
            info_log(
                "ERROR",
                &json!(format!("Failed to construct base client. Error: {:?}", err)),
            );
        })
}

fn get_client_builder(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
) -> CustomResult<reqwest::ClientBuilder, ApiClientError> {
    let mut client_builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_idle_timeout(Duration::from_secs(
            proxy_config
                .idle_pool_connection_timeout
                .unwrap_or_default(),
        ));

    if should_bypass_proxy {
        return Ok(client_builder);
    }

    // Proxy all HTTPS traffic through the configured HTTPS proxy
    if let Some(url) = proxy_config.https_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::https(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    info_log(
                        "PROXY_ERROR",
                        &json!(format!("HTTPS proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    // Proxy all HTTP traffic through the configured HTTP proxy
    if let Some(url) = proxy_config.http_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::http(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    info_log(
                        "PROXY_ERROR",
                        &json!(format!("HTTP proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    Ok(client_builder)
}

async fn handle_response(
    response: CustomResult<reqwest::Response, ApiClientError>,
) -> CustomResult<Result<Response, Response>, ApiClientError> {
    match response {
        Ok(resp) => {
            let status_code = resp.status().as_u16();
            let headers = Some(resp.headers().to_owned());
            let bytes = resp
                .bytes()
                .await
                .change_context(ApiClientError::ResponseDecodingFailed)?;
            let response = Response {
                headers,
                response: bytes,
                status_code,
            };
            // The gateway reports every handled outcome, including domain
            // rejections, with a 200 status. Anything else is a status error.
            match status_code {
                200 => Ok(Ok(response)),
                _ => Ok(Err(response)),
            }
        }
        Err(error) => Err(error),
    }
}

/// Helper function to parse JSON from response bytes with BOM handling
fn parse_json_with_bom_handling(
    response_bytes: &[u8],
) -> Result<serde_json::Value, serde_json::Error> {
    // Try direct parsing first (most common case)
    match serde_json::from_slice::<serde_json::Value>(response_bytes) {
        Ok(value) => Ok(value),
        Err(_) => {
            // If direct parsing fails, try after removing BOM
            let cleaned_response = if response_bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
                // UTF-8 BOM detected, remove it
                &response_bytes[3..]
            } else {
                response_bytes
            };
            serde_json::from_slice::<serde_json::Value>(cleaned_response)
        }
    }
}

pub(super) trait HeaderExt {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError>;
}

impl HeaderExt for Headers {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError> {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        self.into_iter().try_fold(
            HeaderMap::new(),
            |mut header_map, (header_name, header_value)| {
                let header_name = HeaderName::from_str(&header_name)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                let header_value = header_value.into_inner();
                let header_value = HeaderValue::from_str(&header_value)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                header_map.append(header_name, header_value);
                Ok(header_map)
            },
        )
    }
}

pub(super) trait RequestBuilderExt {
    fn add_headers(self, headers: reqwest::header::HeaderMap) -> Self;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn add_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self = self.headers(headers);
        self
    }
}

#[derive(Debug, Default, serde::Deserialize, Clone, strum::EnumString)]
pub enum Tag {
    /// General.
    #[default]
    General,
    /// Api Outgoing Request
    OutgoingApi,
}

#[inline]
pub fn info_log(action: &str, message: &Value) {
    tracing::info!(tags = %action, json_value= %message);
}

#[inline]
pub fn error_log(action: &str, message: &Value) {
    tracing::error!(tags = %action, json_value= %message);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn parses_json_with_leading_bom() {
        let with_bom = [&[0xEF, 0xBB, 0xBF][..], br#"{"successful":true}"#].concat();
        let parsed = parse_json_with_bom_handling(&with_bom).unwrap();
        assert_eq!(parsed["successful"], serde_json::Value::Bool(true));

        let without_bom = br#"{"successful":false}"#;
        let parsed = parse_json_with_bom_handling(without_bom).unwrap();
        assert_eq!(parsed["successful"], serde_json::Value::Bool(false));
    }

    #[test]
    fn builds_header_map_from_masked_pairs() {
        let mut headers = Headers::new();
        headers.insert(("Content-Type".to_string(), "application/json".to_string().into()));
        headers.insert((
            "Authorization".to_string(),
            Maskable::new_masked("Bearer token".to_string().into()),
        ));

        let header_map = headers.construct_header_map().unwrap();
        assert_eq!(
            header_map.get("Content-Type").and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert_eq!(
            header_map.get("Authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer token")
        );
    }

    #[test]
    fn rejects_invalid_header_names() {
        let mut headers = Headers::new();
        headers.insert(("bad header\n".to_string(), "value".to_string().into()));

        assert!(headers.construct_header_map().is_err());
    }
}
