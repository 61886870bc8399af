use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::blocking::Client;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{FetchError, Result};

const BAR_TEMPLATE: &str =
    "{msg} {bar:30.cyan/blue} {bytes:>10} / {total_bytes:>10} @ {bytes_per_sec} ETA {eta}";
const SPINNER_TEMPLATE: &str = "{msg} {spinner} {bytes} @ {bytes_per_sec}";

/// A complete response body sitting in a temporary file next to its destination.
///
/// Dropping it deletes the temporary file; the destination is only touched by
/// [`Download::persist`].
#[derive(Debug)]
pub struct Download {
    file: NamedTempFile,
    bytes: u64,
}

impl Download {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Atomically replaces `output_path` with the downloaded body.
    pub fn persist(self, output_path: &Path) -> Result<()> {
        self.file
            .persist(output_path)
            .map_err(|e| FetchError::io("Failed to move download into place", e.error))?;
        log::info!("Download moved into place at {:?}", output_path);
        Ok(())
    }
}

/// Fetches `url` into a temporary file in `output_path`'s directory.
///
/// Nothing is written to `output_path` itself; the caller checks the body and
/// then calls [`Download::persist`].
pub fn download_file(client: &Client, url: &str, output_path: &Path) -> Result<Download> {
    log::info!("Downloading from {} for {:?}", url, output_path);

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

    let expected = response.content_length();
    log::debug!("Content-Length: {:?}", expected);

    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| FetchError::io("Failed to create temporary download file", e))?;

    let bar = progress_bar(expected);
    let mut reader = bar.wrap_read(response);
    let copied = io::copy(&mut reader, temp.as_file_mut());
    bar.finish_and_clear();
    let received = copied.map_err(|e| FetchError::io("Failed to write downloaded data", e))?;

    if let Some(expected) = expected {
        if expected != received {
            return Err(FetchError::Truncated { expected, received });
        }
    }

    temp.as_file_mut()
        .flush()
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| FetchError::io("Failed to flush downloaded data", e))?;

    log::info!("Download completed: {} bytes", received);
    Ok(Download {
        file: temp,
        bytes: received,
    })
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(total, ProgressDrawTarget::stderr());
    let template = if total.is_some() {
        BAR_TEMPLATE
    } else {
        SPINNER_TEMPLATE
    };
    if let Ok(style) = ProgressStyle::with_template(template) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message("downloading");
    bar
}
