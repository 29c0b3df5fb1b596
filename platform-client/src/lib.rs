pub mod adapter;
pub mod http;
pub mod request_queue;

pub use adapter::PlatformAdapter;
pub use http::HttpPlatform;
pub use request_queue::{WritePacing, WriteQueue};
