use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use nanoid::nanoid;

use mixtape_sync::downloader::{self, AudioFormat, Fetch};
use mixtape_sync::sync::{self, Reconciler, SyncConfig};
use mixtape_sync::Track;

const TEMP_PATH: &str = "/tmp/mixtape_sync_test";

pub fn setup() -> (Reconciler, PathBuf) {
    setup_with_jobs(1)
}

pub fn setup_with_jobs(jobs: usize) -> (Reconciler, PathBuf) {
    let path = PathBuf::from(format!("{}_{}", TEMP_PATH, nanoid!()));
    let reconciler = sync::new(SyncConfig {
        dir: path.clone(),
        format: AudioFormat::Mp3,
        jobs,
    })
    .expect("failed to create sync directory");

    (reconciler, path)
}

pub fn teardown(path: PathBuf) {
    std::fs::remove_dir_all(path).expect("failed to remove temp directory");
}

pub fn track(id: &str, title: &str) -> Track {
    Track {
        id: id.to_string(),
        title: title.to_string(),
        url: format!("https://www.youtube.com/watch?v={id}"),
    }
}

/// Stand-in for the external downloader: writes a marker file instead of
/// invoking yt-dlp, and can be told to fail specific titles.
#[derive(Default)]
pub struct MockFetch {
    fail: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl MockFetch {
    pub fn failing(titles: &[&str]) -> Self {
        MockFetch {
            fail: titles.iter().map(|t| t.to_string()).collect(),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("poisoned mock lock").len()
    }
}

#[async_trait]
impl Fetch for MockFetch {
    async fn fetch(&self, track: &Track, dest: &Path) -> downloader::Result<()> {
        self.calls
            .lock()
            .expect("poisoned mock lock")
            .push(track.title.clone());

        if self.fail.contains(&track.title) {
            return Err(downloader::Error::DownloadFailed {
                message: "simulated downloader failure".to_string(),
            });
        }

        std::fs::write(dest, b"audio").expect("failed to write mock file");

        Ok(())
    }
}
