pub mod endpoint_pool;
pub mod json_rpc;

pub use endpoint_pool::{EndpointPool, DEFAULT_OBJECT_BATCH_SIZE};
pub use json_rpc::JsonRpcEndpoint;
