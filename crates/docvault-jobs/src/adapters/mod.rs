//! HTTP clients for the external conversion and extraction services.

pub mod docd;
pub mod gotenberg;

pub use docd::DocdClient;
pub use gotenberg::GotenbergClient;
