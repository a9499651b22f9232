pub mod address;
pub mod rpc;
