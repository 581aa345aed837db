use common_utils::{consts, errors::CustomResult, masking::Maskable};
use domain_types::{
    errors::ConnectorError,
    router_data::{ConnectorAuthType, ErrorResponse},
    router_response_types::Response,
    types::Connectors,
};

use crate::events::connector_api_logs::ConnectorEvent;

/// Properties shared by every flow of a gateway connector.
pub trait ConnectorCommon {
    /// Name of the connector
    fn id(&self) -> &'static str;

    /// HTTP header accepted for the request
    fn common_get_content_type(&self) -> &'static str {
        "application/json"
    }

    /// The base URL of the gateway, read from configuration
    fn base_url<'a>(&self, connectors: &'a Connectors) -> &'a str;

    /// Headers carrying the merchant credentials
    fn get_auth_header(
        &self,
        _auth_type: &ConnectorAuthType,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, ConnectorError> {
        Ok(Vec::new())
    }

    /// Parse a non-success payload into a uniform error response
    fn build_error_response(
        &self,
        res: Response,
        _event_builder: Option<&mut ConnectorEvent>,
    ) -> CustomResult<ErrorResponse, ConnectorError> {
        Ok(ErrorResponse {
            status_code: res.status_code,
            code: consts::NO_ERROR_CODE.to_string(),
            message: consts::NO_ERROR_MESSAGE.to_string(),
            reason: None,
        })
    }
}
