pub mod address;
pub mod request;

pub use address::DataAddress;
pub use request::DataFlowRequest;
