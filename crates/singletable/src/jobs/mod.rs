//! Job queue adapters living outside the core crate.

mod http_queue;

pub use http_queue::HttpJobQueue;
