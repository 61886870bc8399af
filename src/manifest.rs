use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{FetchError, Result};
use crate::verify::is_sha256_hex;

/// JSON descriptor of a single model artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub name: String,
    pub url: String,
    #[serde(rename = "file_name")]
    pub file_name: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl ModelManifest {
    pub fn from_url(url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;
        Self::fetch(&client, url)
    }

    pub fn fetch(client: &Client, url: &str) -> Result<Self> {
        log::info!("Fetching manifest from: {}", url);
        let response = client.get(url).send().map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let text = response.text().map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        text.parse()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        log::info!("Reading manifest from: {:?}", path);
        let text = fs::read_to_string(path)
            .map_err(|e| FetchError::io(format!("Failed to read manifest {}", path.display()), e))?;
        text.parse()
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(FetchError::Manifest("name is empty".into()));
        }

        if self.url.is_empty() {
            return Err(FetchError::Manifest("url is empty".into()));
        }

        if self.file_name.is_empty() {
            return Err(FetchError::Manifest("file_name is empty".into()));
        }

        if let Some(sha) = &self.sha256 {
            if !is_sha256_hex(sha) {
                return Err(FetchError::Manifest(format!("sha256 is not a hex digest: {sha}")));
            }
        }

        Ok(())
    }
}

impl FromStr for ModelManifest {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        let manifest: ModelManifest = serde_json::from_str(s)
            .map_err(|e| FetchError::Manifest(format!("failed to parse manifest JSON: {e}")))?;

        manifest.validate()?;
        log::info!("Manifest validated successfully: {}", manifest.name);

        Ok(manifest)
    }
}
