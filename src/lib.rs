//! Provisions the local LLM weights used by the notes generator: ensure the
//! models directory, fetch one file over HTTP, check what landed on disk.

pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod report;
pub mod storage;
pub mod verify;

pub use config::FetchConfig;
pub use error::{FetchError, Result};
pub use fetch::{FetchOutcome, Fetcher};
