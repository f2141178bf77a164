//! Title normalization.
//!
//! The same key names a track's output file at download time and matches it
//! against the directory listing on later runs, so the function must be
//! deterministic and idempotent. The rule: lowercase, collapse every run of
//! characters outside `[a-z0-9]` to a single hyphen, trim the ends.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Track, TrackKey};

static NON_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Normalize an arbitrary title or filename stem into a comparison key.
pub fn key(title: &str) -> TrackKey {
    TrackKey(slug(title))
}

/// Key for a track, falling back to the remote id when the title has no
/// usable characters at all.
pub fn track_key(track: &Track) -> TrackKey {
    let slugged = slug(&track.title);

    if slugged.is_empty() {
        TrackKey(slug(&track.id))
    } else {
        TrackKey(slugged)
    }
}

fn slug(input: &str) -> String {
    let lowered = input.to_lowercase();

    NON_KEY
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
