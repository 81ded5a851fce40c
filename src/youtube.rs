use crate::cli::Config;
use crate::process;
use crate::video::VideoCandidate;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::warn;

fn search_command(config: &Config, query: &str) -> Vec<String> {
    let mut command = config.yt_dlp.components.clone();
    command.extend([
        "--flat-playlist".to_string(),
        "--dump-json".to_string(),
        "--".to_string(),
        format!("ytsearch{}:{query}", config.search_results),
    ]);
    command
}

fn download_command(config: &Config, url: &str, stem: &Path, format: &str) -> Vec<String> {
    let mut command = config.yt_dlp.components.clone();
    command.extend([
        "-x".to_string(),
        "--audio-format".to_string(),
        format.to_string(),
        "--audio-quality".to_string(),
        "192K".to_string(),
        "-o".to_string(),
        format!("{}.%(ext)s", stem.display()),
        "--".to_string(),
        url.to_string(),
    ]);
    command
}

/// One candidate per JSON line; lines that don't parse are skipped.
fn parse_candidates(stdout: &str) -> Vec<VideoCandidate> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            serde_json::from_str(line)
                .inspect_err(|e| warn!("Skipping unreadable search result: {e}"))
                .ok()
        })
        .collect()
}

pub(crate) async fn find_videos(config: &Config, query: &str) -> Result<Vec<VideoCandidate>, anyhow::Error> {
    let work_dir = tempfile::tempdir()?;
    let command = search_command(config, query);

    let context = process::wrap_command_print_context(
        &command,
        work_dir.path(),
        |cmd| cmd.stdout(std::process::Stdio::piped()),
        process::wait_for_child_output,
    )
    .await
    .with_context(|| format!("Could not run '{}'", config.yt_dlp))?;

    if !context.exit_status.success() {
        anyhow::bail!("yt-dlp search returned a non-zero exit code: {}", context.exit_status);
    }

    Ok(parse_candidates(&String::from_utf8_lossy(&context.result.stdout)))
}

/// Download the audio of `url` to `<stem>.<format>`.
pub(crate) async fn download(config: &Config, url: &str, stem: &Path, format: &str) -> Result<PathBuf, anyhow::Error> {
    // yt-dlp runs inside the output folder, so `-o` must not be relative to ours
    let stem = std::path::absolute(stem).with_context(|| format!("Could not resolve '{}'", stem.display()))?;
    let work_dir = match stem.parent() {
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("/"),
    };
    let command = download_command(config, url, &stem, format);

    let context = process::wrap_command_print_context(&command, &work_dir, |cmd| cmd, process::wait_for_child)
        .await
        .with_context(|| format!("Could not run '{}'", config.yt_dlp))?;

    if !context.exit_status.success() {
        anyhow::bail!("yt-dlp returned a non-zero exit code: {}", context.exit_status);
    }

    let downloaded = PathBuf::from(format!("{}.{format}", stem.display()));
    if !downloaded.is_file() {
        anyhow::bail!("yt-dlp finished but '{}' was not created", downloaded.display());
    }
    Ok(downloaded)
}
