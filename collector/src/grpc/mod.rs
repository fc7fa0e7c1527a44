//! gRPC service implementations.

pub mod services;

pub use services::TracesServiceImpl;
