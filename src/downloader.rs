//! The external download/transcode seam.
//!
//! Everything network- and codec-shaped is delegated to a `yt-dlp`
//! subprocess behind the narrow [`Fetch`] trait, so the reconciler can be
//! exercised without touching the real tool.

use std::path::Path;

use async_trait::async_trait;
use clap::ValueEnum;
use snafu::prelude::*;
use tokio::process::Command;

use crate::Track;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to run {bin}: {message}"))]
    Spawn { bin: String, message: String },
    #[snafu(display("Download failed: {message}"))]
    DownloadFailed { message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(ValueEnum, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Opus,
    Flac,
    Wav,
}

impl AudioFormat {
    /// File extension for the format, which is also the string `yt-dlp`
    /// takes for `--audio-format`.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }
}

/// One track in, one audio file out (or an error). Destination paths are
/// chosen by the caller; implementations never overwrite an existing file.
#[async_trait]
pub trait Fetch {
    async fn fetch(&self, track: &Track, dest: &Path) -> Result<()>;
}

pub struct YtDlp {
    bin: String,
    format: AudioFormat,
    quality: String,
}

pub fn new(bin: &str, format: AudioFormat, quality: &str) -> YtDlp {
    YtDlp {
        bin: bin.to_string(),
        format,
        quality: quality.to_string(),
    }
}

#[async_trait]
impl Fetch for YtDlp {
    async fn fetch(&self, track: &Track, dest: &Path) -> Result<()> {
        debug!("fetching '{}' to {}", track.title, dest.display());

        // the extract-audio postprocessor swaps the extension in, so the
        // template carries the placeholder and the final file lands at dest
        let template = dest.with_extension("%(ext)s");

        let output = Command::new(&self.bin)
            .args([
                "--extract-audio",
                "--audio-format",
                self.format.extension(),
                "--audio-quality",
                &self.quality,
                "--no-overwrites",
                "--output",
            ])
            .arg(template)
            .arg(&track.url)
            .output()
            .await
            .map_err(|error| Error::Spawn {
                bin: self.bin.clone(),
                message: error.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::DownloadFailed {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
