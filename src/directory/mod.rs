//! HTTP access to the speed-test server directory.

pub mod client;
pub mod requests;

pub use client::{Client, Timing};
pub use requests::servers::DEFAULT_DIRECTORY_URL;
