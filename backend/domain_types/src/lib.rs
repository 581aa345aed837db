//! Domain model shared by the gateway integration and the lifecycle
//! orchestrator.

pub mod connector_flow;
pub mod connector_types;
pub mod errors;
pub mod router_data;
pub mod router_data_v2;
pub mod router_response_types;
pub mod transaction;
pub mod types;
pub mod utils;
