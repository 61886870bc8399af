use reqwest::blocking::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::download::download_file;
use crate::error::{FetchError, Result};
use crate::storage::ensure_dir;
use crate::verify::{check_destination, check_length, verify_sha256};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub path: PathBuf,
    pub bytes: u64,
    /// Present only when a digest was configured and matched.
    pub sha256: Option<String>,
}

pub struct Fetcher {
    config: FetchConfig,
    client: Client,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;

        // No overall timeout: a multi-gigabyte body may take as long as it takes.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|source| FetchError::Request {
                url: config.url.clone(),
                source,
            })?;

        Ok(Self { config, client })
    }

    /// Uses a caller-built client, e.g. one with custom proxy or TLS settings.
    pub fn with_client(config: FetchConfig, client: Client) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Ensures the models directory, downloads, and checks the body before it
    /// replaces the destination. A rejected body never touches an existing file.
    pub fn run(&self) -> Result<FetchOutcome> {
        log::info!("Starting model fetch");

        ensure_dir(&self.config.models_dir)?;

        let destination = self.config.destination();
        log::info!("Destination: {:?}", destination);

        let download = download_file(&self.client, &self.config.url, &destination)?;
        check_length(&destination, download.bytes(), self.config.expected_size)?;

        let sha256 = match &self.config.expected_sha256 {
            Some(expected) => Some(verify_sha256(download.path(), expected)?),
            None => {
                log::info!("No SHA256 configured, skipping integrity check");
                None
            }
        };

        download.persist(&destination)?;
        let bytes = check_destination(&destination, self.config.expected_size)?;

        log::info!("Model fetch completed: {} bytes at {:?}", bytes, destination);
        Ok(FetchOutcome {
            path: destination,
            bytes,
            sha256,
        })
    }
}
