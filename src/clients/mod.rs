pub mod processing_api;
pub mod service_client;
pub mod wire;

pub use processing_api::ProcessingApi;
pub use service_client::HttpServiceClient;
pub use wire::{FinalizeResponse, HealthStatus, JobRequest, PageResponse};
