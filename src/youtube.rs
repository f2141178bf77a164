//! Playlist listing via a flat `yt-dlp` json dump.

use serde::Deserialize;
use snafu::prelude::*;
use tokio::process::Command;
use url::Url;

use crate::Track;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Failed to run {bin}: {message}"))]
    Spawn { bin: String, message: String },
    #[snafu(display("Playlist unavailable: {message}"))]
    PlaylistUnavailable { message: String },
    #[snafu(display("Failed to deserialize playlist json: {message}"))]
    InvalidPlaylist { message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Raw playlist dump as emitted by `yt-dlp --flat-playlist -J`.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct PlaylistDump {
    #[serde(rename = "_type")]
    pub dump_type: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[derive(Default, Debug, Clone, Deserialize)]
pub struct Entry {
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub webpage_url: Option<String>,
}

pub struct YouTube {
    bin: String,
}

pub fn new(bin: &str) -> YouTube {
    YouTube {
        bin: bin.to_string(),
    }
}

impl YouTube {
    pub async fn playlist(&self, url: &Url) -> Result<YouTubePlaylist> {
        debug!("downloading playlist json for {url}");

        let output = Command::new(&self.bin)
            .args(["--flat-playlist", "--skip-download", "-J"])
            .arg(url.as_str())
            .output()
            .await
            .map_err(|error| Error::Spawn {
                bin: self.bin.clone(),
                message: error.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::PlaylistUnavailable {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let dump: PlaylistDump =
            serde_json::from_slice(&output.stdout).map_err(|error| Error::InvalidPlaylist {
                message: error.to_string(),
            })?;

        if dump.dump_type.as_deref() != Some("playlist") {
            return Err(Error::PlaylistUnavailable {
                message: format!("{url} is not a playlist"),
            });
        }

        Ok(YouTubePlaylist(dump))
    }
}

pub struct YouTubePlaylist(PlaylistDump);

impl YouTubePlaylist {
    pub fn title(&self) -> Option<&str> {
        self.0.title.as_deref()
    }

    pub fn track_count(&self) -> usize {
        self.0.entries.len()
    }

    /// Resolve dump entries into tracks, in playlist order. Flat dumps carry
    /// the source url in `url`; full dumps in `webpage_url`. An entry with
    /// neither is still reachable through its id.
    pub fn tracks(&self) -> Vec<Track> {
        self.0
            .entries
            .iter()
            .map(|entry| Track {
                id: entry.id.clone(),
                title: entry.title.clone().unwrap_or_else(|| entry.id.clone()),
                url: entry
                    .webpage_url
                    .clone()
                    .or_else(|| entry.url.clone())
                    .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", entry.id)),
            })
            .collect::<Vec<Track>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT_DUMP: &str = r#"{
        "_type": "playlist",
        "id": "PL123",
        "title": "road trip",
        "entries": [
            { "id": "aaa111", "title": "Song A", "url": "https://www.youtube.com/watch?v=aaa111" },
            { "id": "bbb222", "title": "Song B" }
        ]
    }"#;

    #[test]
    fn deserializes_flat_dump() {
        let dump: PlaylistDump = serde_json::from_str(FLAT_DUMP).expect("failed to parse dump");

        assert_eq!(dump.dump_type.as_deref(), Some("playlist"));
        assert_eq!(dump.entries.len(), 2);
    }

    #[test]
    fn resolves_tracks_in_playlist_order() {
        let dump: PlaylistDump = serde_json::from_str(FLAT_DUMP).expect("failed to parse dump");
        let playlist = YouTubePlaylist(dump);
        let tracks = playlist.tracks();

        assert_eq!(playlist.track_count(), 2);
        assert_eq!(tracks[0].title, "Song A");
        assert_eq!(tracks[0].url, "https://www.youtube.com/watch?v=aaa111");
        assert_eq!(tracks[1].title, "Song B");
        // url constructed from the id when the dump omits it
        assert_eq!(tracks[1].url, "https://www.youtube.com/watch?v=bbb222");
    }

    #[test]
    fn empty_entries_is_not_an_error() {
        let dump: PlaylistDump =
            serde_json::from_str(r#"{ "_type": "playlist", "title": "empty", "entries": [] }"#)
                .expect("failed to parse dump");
        let playlist = YouTubePlaylist(dump);

        assert_eq!(playlist.track_count(), 0);
        assert!(playlist.tracks().is_empty());
    }
}
