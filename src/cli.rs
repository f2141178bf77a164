use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use console::Term;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::LevelFilter;
use url::Url;

use crate::downloader::{self, AudioFormat};
use crate::sync::{self, Outcome, SyncConfig};
use crate::youtube;
use crate::Result;

const TITLE: &str = r#"
╔╦╗┬─┐ ┬┌┬┐┌─┐┌─┐┌─┐
║║║│┌┴┬┘ │ ├─┤├─┘├┤
╩ ╩┴┴ └─ ┴ ┴ ┴┴  └─┘
╔═╗┬ ┬┌┐┌┌─┐
╚═╗└┬┘││││
╚═╝ ┴ ┘└┘└─┘
"#;

#[derive(Parser)]
#[clap(name = TITLE, about = "remote playlist to local directory one-way sync", long_about = None)]
struct Cli {
    /// Url of the playlist to sync from
    pub url: String,
    /// Directory to sync into (created if missing)
    #[clap(short, long, default_value = ".")]
    pub path: PathBuf,
    /// Audio format to request from the downloader
    #[clap(short, long, value_enum, default_value = "mp3")]
    pub format: AudioFormat,
    /// Audio quality to request, 0 (best) to 10 or a bitrate like 192K
    #[clap(short, long, default_value = "0")]
    pub quality: String,
    /// Number of downloads to run at once
    #[clap(short, long, default_value_t = 1)]
    pub jobs: usize,
    /// External downloader binary
    #[clap(long, env = "YTDLP_BIN", default_value = "yt-dlp")]
    pub downloader: String,
    /// Increase log detail
    #[clap(short, long, default_value_t = false)]
    pub verbose: bool,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let url = Url::parse(&cli.url).map_err(|error| youtube::Error::PlaylistUnavailable {
        message: format!("invalid playlist url {}: {error}", cli.url),
    })?;

    // fail on an unusable directory before any listing work
    let reconciler = sync::new(SyncConfig {
        dir: cli.path.clone(),
        format: cli.format,
        jobs: cli.jobs,
    })?;

    let term = Term::stdout();
    let draw_target = ProgressDrawTarget::term(term.clone(), 15);
    let prog = MultiProgress::with_draw_target(draw_target);

    println!("{TITLE}");

    let list_prog = ProgressBar::new_spinner().with_prefix("listing");
    list_prog.enable_steady_tick(Duration::from_secs(1));
    list_prog.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix} {spinner} {wide_msg}")
            .unwrap(),
    );
    prog.add(list_prog.clone());
    list_prog.set_message(format!("downloading playlist json from {url}"));

    let youtube = youtube::new(&cli.downloader);
    let playlist = youtube.playlist(&url).await?;

    list_prog.finish_and_clear();

    if let Some(title) = playlist.title() {
        info!("syncing '{title}' into {}", cli.path.display());
    }

    let tracks = playlist.tracks();

    if tracks.is_empty() {
        println!("playlist has no entries, nothing to sync");
        return Ok(());
    }

    let local = reconciler.local_keys()?;
    let missing = reconciler.plan(&tracks, &local);
    let skipped = tracks.len() - missing.len();

    println!("playlist size: {}", tracks.len());
    println!("already synced: {skipped}");
    println!("missing tracks: {}", missing.len());

    if missing.is_empty() {
        println!("there were no new entries found");
        return Ok(());
    }

    let progress = ProgressBar::new(missing.len() as u64).with_prefix("syncing");
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} {wide_bar:.cyan/blue} [{pos}/{len}]")
            .unwrap(),
    );
    prog.add(progress.clone());

    info!("starting download of {} entries", missing.len());

    let fetcher = downloader::new(&cli.downloader, cli.format, &cli.quality);
    let mut summary = reconciler.run(&fetcher, missing, |_, _| progress.inc(1)).await;
    summary.skipped = skipped;

    progress.set_style(ProgressStyle::default_bar().template("{msg}").unwrap());

    match summary.outcome() {
        Outcome::Partial => progress.finish_with_message("finished with failures"),
        _ => progress.finish_with_message("complete!"),
    }

    println!(
        "downloaded {} new track(s), {} already present",
        summary.synced.len(),
        summary.skipped
    );

    if !summary.failed.is_empty() {
        println!("{} track(s) failed to download:", summary.failed.len());

        for failed in &summary.failed {
            println!("  '{}': {}", failed.title, failed.reason);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    } else if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else {
        builder.filter_level(LevelFilter::Info);
    }

    builder.init();
}
