use domain_types::{errors::ConnectorError, router_data::ErrorResponse};
use interfaces::records::RecordStoreError;

/// Allows [error_stack::Report] to change between error contexts
/// using the dependent [ErrorSwitch] trait to define relations & mappings between traits
pub trait ReportSwitchExt<T, U> {
    /// Switch to the intended report by calling switch
    /// requires error switch to be already implemented on the error type
    fn switch(self) -> Result<T, error_stack::Report<U>>;
}

impl<T, U, V> ReportSwitchExt<T, U> for Result<T, error_stack::Report<V>>
where
    V: ErrorSwitch<U> + error_stack::Context,
    U: error_stack::Context,
{
    #[track_caller]
    fn switch(self) -> Result<T, error_stack::Report<U>> {
        match self {
            Ok(i) => Ok(i),
            Err(er) => {
                let new_c = er.current_context().switch();
                Err(er.change_context(new_c))
            }
        }
    }
}

/// Allow [error_stack::Report] to convert between error types
/// This auto-implements [ReportSwitchExt] for the corresponding errors
pub trait ErrorSwitch<T> {
    /// Get the next error type that the source error can be escalated into
    /// This does not consume the source error since we need to keep it in context
    fn switch(&self) -> T;
}

/// Allow [error_stack::Report] to convert between error types
/// This serves as an alternative to [ErrorSwitch]
pub trait ErrorSwitchFrom<T> {
    /// Convert to an error type that the source can be escalated into
    /// This does not consume the source error since we need to keep it in context
    fn switch_from(error: &T) -> Self;
}

impl<T, S> ErrorSwitch<T> for S
where
    T: ErrorSwitchFrom<Self>,
{
    fn switch(&self) -> T {
        T::switch_from(self)
    }
}

/// Failures a lifecycle operation can surface to its caller.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The gateway could not be reached or the exchange broke off before a
    /// response arrived.
    #[error("Failed to exchange a request with the payment gateway")]
    Transport,
    /// The gateway answered with a non-200 status.
    #[error("Payment gateway returned status {status_code}: [{code}] {message}")]
    GatewayStatus {
        status_code: u16,
        code: String,
        message: String,
    },
    /// The gateway handled the call and declined it on business grounds.
    #[error("Payment gateway declined the call: [{code}] {message}")]
    GatewayDomain { code: String, message: String },
    /// The gateway answered but the payload did not match the expected shape.
    #[error("Failed to interpret the payment gateway response")]
    Parse,
    /// The operation was refused before any gateway call was made.
    #[error("Lifecycle precondition not met: {reason}")]
    Precondition { reason: &'static str },
    #[error("Unexpected lifecycle failure: {0}")]
    Unexpected(String),
}

impl LifecycleError {
    /// Classify a gateway error by how far the exchange got. A declined call
    /// still arrives on a 200, anything else is a status failure.
    pub fn from_gateway_error(error: ErrorResponse) -> Self {
        if error.status_code == 200 {
            Self::GatewayDomain {
                code: error.code,
                message: error.message,
            }
        } else {
            Self::GatewayStatus {
                status_code: error.status_code,
                code: error.code,
                message: error.message,
            }
        }
    }
}

impl ErrorSwitch<LifecycleError> for ConnectorError {
    fn switch(&self) -> LifecycleError {
        match self {
            ConnectorError::RequestEncodingFailed | ConnectorError::ProcessingStepFailed(_) => {
                LifecycleError::Transport
            }
            ConnectorError::ResponseDeserializationFailed
            | ConnectorError::MissingRequiredField { .. } => LifecycleError::Parse,
            ConnectorError::FailedToObtainAuthType => LifecycleError::Precondition {
                reason: "gateway credentials are not configured",
            },
            ConnectorError::InvalidDataFormat { .. } => LifecycleError::Precondition {
                reason: "transaction carries malformed data",
            },
            ConnectorError::AmountConversionFailed => LifecycleError::Precondition {
                reason: "amount cannot be represented in gateway units",
            },
            ConnectorError::NotImplemented(_) => LifecycleError::Unexpected(self.to_string()),
        }
    }
}

impl ErrorSwitch<LifecycleError> for RecordStoreError {
    fn switch(&self) -> LifecycleError {
        match self {
            RecordStoreError::NotFound => LifecycleError::Precondition {
                reason: "transaction record not found",
            },
            RecordStoreError::DuplicateTransactionId => LifecycleError::Precondition {
                reason: "transaction record already exists",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn gateway_error_with_ok_status_is_a_domain_decline() {
        let error = ErrorResponse {
            code: "1023".to_string(),
            message: "amount not eligible".to_string(),
            reason: None,
            status_code: 200,
        };
        match LifecycleError::from_gateway_error(error) {
            LifecycleError::GatewayDomain { code, message } => {
                assert_eq!(code, "1023");
                assert_eq!(message, "amount not eligible");
            }
            other => panic!("expected a domain decline, got {other:?}"),
        }
    }

    #[test]
    fn gateway_error_with_other_status_is_a_status_failure() {
        let error = ErrorResponse {
            code: "HE_00".to_string(),
            message: "Something went wrong".to_string(),
            reason: None,
            status_code: 503,
        };
        match LifecycleError::from_gateway_error(error) {
            LifecycleError::GatewayStatus { status_code, .. } => assert_eq!(status_code, 503),
            other => panic!("expected a status failure, got {other:?}"),
        }
    }

    #[test]
    fn report_switch_carries_the_connector_context_forward() {
        let result: Result<(), error_stack::Report<ConnectorError>> =
            Err(error_stack::report!(ConnectorError::ResponseDeserializationFailed));

        let switched: Result<(), error_stack::Report<LifecycleError>> = result.switch();
        let report = switched.unwrap_err();
        assert!(matches!(report.current_context(), LifecycleError::Parse));
    }
}
