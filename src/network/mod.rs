// Network layer: connection config, REST client and run stream decoding.
pub mod api_client;
pub mod config;
pub mod sse;

// Re-export commonly used items
pub use api_client::{delete_all, ApiClient};
pub use config::{normalize_api_url, ApiConfig, EnvDefaults};
pub use sse::{SseDecoder, StreamEvent};
