use snafu::prelude::*;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;

pub mod cli;
pub mod downloader;
pub mod normalize;
pub mod sync;
pub mod youtube;

/// Canonical key for one track, shared by filename generation and the
/// local-directory scan. Only [`normalize`] produces these.
#[derive(Hash, Clone, Eq, PartialEq, Debug)]
pub struct TrackKey(String);

impl TrackKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One playable remote item, as resolved from the playlist dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Playlist Error: {error}"))]
    PlaylistError { error: youtube::Error },
    #[snafu(display("Sync Error: {error}"))]
    SyncError { error: sync::Error },
}

impl From<youtube::Error> for Error {
    fn from(error: youtube::Error) -> Self {
        Error::PlaylistError { error }
    }
}

impl From<sync::Error> for Error {
    fn from(error: sync::Error) -> Self {
        Error::SyncError { error }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
