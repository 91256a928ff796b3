pub mod demo;
pub mod quote;
pub mod rpc;
