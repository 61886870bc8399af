use std::path::{Path, PathBuf};

use crate::error::{FetchError, Result};
use crate::manifest::ModelManifest;
use crate::verify::is_sha256_hex;

pub const DEFAULT_MODEL_URL: &str = "https://huggingface.co/bartowski/Llama-3.2-3B-Instruct-GGUF/resolve/main/Llama-3.2-3B-Instruct-Q4_K_M.gguf";
pub const DEFAULT_MODELS_DIR: &str = "models";
pub const DEFAULT_FILE_NAME: &str = "Llama-3.2-3B-Instruct-Q4_K_M.gguf";

pub const ENV_MODEL_PATH: &str = "MODEL_PATH";
pub const ENV_MODEL_URL: &str = "MODEL_URL";
pub const ENV_MODEL_SHA256: &str = "MODEL_SHA256";
pub const ENV_MODEL_SIZE: &str = "MODEL_SIZE";
pub const ENV_MODEL_MANIFEST: &str = "MODEL_MANIFEST";

/// What to fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub url: String,
    pub models_dir: PathBuf,
    pub file_name: String,
    pub expected_sha256: Option<String>,
    pub expected_size: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MODEL_URL.to_string(),
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
            expected_sha256: None,
            expected_size: None,
        }
    }
}

impl FetchConfig {
    pub fn destination(&self) -> PathBuf {
        self.models_dir.join(&self.file_name)
    }

    /// Reads the process environment. Load `.env` (see [`load_dotenv`]) first
    /// if its values should apply.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to the built-in defaults
    /// for every key it does not answer. Blank values count as unset.
    ///
    /// A manifest named by `MODEL_MANIFEST` is applied first; the individual
    /// variables override whatever it provides.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(source) = get(ENV_MODEL_MANIFEST) {
            let manifest = if is_http_url(&source) {
                ModelManifest::from_url(&source)?
            } else {
                ModelManifest::from_file(Path::new(&source))?
            };
            config.apply_manifest(manifest);
        }

        if let Some(url) = get(ENV_MODEL_URL) {
            config.url = url;
        }

        if let Some(path) = get(ENV_MODEL_PATH) {
            config.set_destination(Path::new(&path))?;
        }

        if let Some(sha) = get(ENV_MODEL_SHA256) {
            config.expected_sha256 = Some(sha.to_ascii_lowercase());
        }

        if let Some(size) = get(ENV_MODEL_SIZE) {
            let size = size.parse::<u64>().map_err(|_| {
                FetchError::InvalidConfig(format!("{ENV_MODEL_SIZE} is not a byte count: {size}"))
            })?;
            if size == 0 {
                return Err(FetchError::InvalidConfig(format!(
                    "{ENV_MODEL_SIZE} must be greater than zero"
                )));
            }
            config.expected_size = Some(size);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn apply_manifest(&mut self, manifest: ModelManifest) {
        self.url = manifest.url;
        self.file_name = manifest.file_name;
        self.expected_sha256 = manifest.sha256.map(|s| s.to_ascii_lowercase());
        self.expected_size = manifest.size;
    }

    fn set_destination(&mut self, path: &Path) -> Result<()> {
        if path.as_os_str().to_string_lossy().ends_with(['/', '\\']) {
            return Err(FetchError::InvalidConfig(format!(
                "{ENV_MODEL_PATH} must name a file, not a directory: {path:?}"
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                FetchError::InvalidConfig(format!("{ENV_MODEL_PATH} has no file name: {path:?}"))
            })?;

        self.file_name = file_name.to_string();
        self.models_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.url)
            .map_err(|e| FetchError::InvalidConfig(format!("invalid model URL {}: {e}", self.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidConfig(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        if self.file_name.is_empty() || matches!(self.file_name.as_str(), "." | "..") {
            return Err(FetchError::InvalidConfig("model file name is empty".into()));
        }

        if self.file_name.contains(['/', '\\']) {
            return Err(FetchError::InvalidConfig(format!(
                "model file name must not contain path separators: {}",
                self.file_name
            )));
        }

        if let Some(sha) = &self.expected_sha256 {
            if !is_sha256_hex(sha) {
                return Err(FetchError::InvalidConfig(format!(
                    "expected SHA256 is not a hex digest: {sha}"
                )));
            }
        }

        Ok(())
    }
}

/// Loads `.env` from the working directory or its parents, without
/// overriding variables that are already set. Returns the file used, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

fn is_http_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
