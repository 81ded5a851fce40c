use crate::cli::Config;
use crate::models::Song;
use crate::process;
use anyhow::Context;
use console::style;
use id3::TagLike;
use std::path::Path;
use tracing::{info, warn};

fn artwork_mime(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG") { "image/png" } else { "image/jpeg" }
}

pub(crate) fn tag_mp3(path: &Path, song: &Song, artwork: Option<Vec<u8>>) -> Result<(), anyhow::Error> {
    info!("Adding your tags to mp3 file: {}", path.display());

    let mut tag = id3::Tag::read_from_path(path).unwrap_or_default();
    tag.set_artist(&song.artist_name);
    tag.set_album(&song.collection_name);
    tag.set_title(&song.track_name);
    tag.set_genre(&song.primary_genre_name);
    tag.set_track(song.track_number);
    tag.set_total_tracks(song.track_count);
    tag.set_disc(song.disc_number);
    tag.set_total_discs(song.disc_count);
    if let Some(year) = song.release_year() {
        tag.set_year(year);
    }
    if let Some(album_artist) = &song.collection_artist_name {
        tag.set_album_artist(album_artist);
    }
    if let Some(data) = artwork {
        tag.add_frame(id3::frame::Picture {
            mime_type: artwork_mime(&data).to_string(),
            picture_type: id3::frame::PictureType::CoverFront,
            description: "Art".to_string(),
            data,
        });
    }

    tag.write_to_path(path, id3::Version::Id3v24)
        .with_context(|| format!("failed to write metadata to file: {}", path.display()))
}

fn ffmpeg_metadata_args(song: &Song) -> Vec<String> {
    let mut pairs = vec![
        format!("title={}", song.track_name),
        format!("artist={}", song.artist_name),
        format!("album={}", song.collection_name),
        format!("genre={}", song.primary_genre_name),
        format!("track={}/{}", song.track_number, song.track_count),
        format!("disc={}/{}", song.disc_number, song.disc_count),
        format!("date={}", song.release_date),
    ];
    if let Some(album_artist) = &song.collection_artist_name {
        pairs.push(format!("album_artist={album_artist}"));
    }
    pairs.into_iter().flat_map(|pair| ["-metadata".to_string(), pair]).collect()
}

/// Rewrite the file through ffmpeg with the song's metadata, copying the streams untouched.
pub(crate) async fn tag_m4a(config: &Config, path: &Path, song: &Song, artwork: Option<Vec<u8>>) -> Result<(), anyhow::Error> {
    info!("Adding tags to m4a file: {}", path.display());
    // ffmpeg runs inside the temp dir, so the output path must not be relative to ours
    let path = &std::path::absolute(path).with_context(|| format!("Could not resolve '{}'", path.display()))?;
    let filename = path.file_name().context("tagged file has no name")?;

    let movedir = tempfile::tempdir()?;
    let moved_filepath = movedir.path().join(filename);

    println!("{} '{}' to '{}'", style("Moving").yellow(), path.display(), moved_filepath.display());
    crate::files::move_file(path, &moved_filepath)?;

    let mut ffmpeg_cmd = vec![
        config.ffmpeg.clone(),
        "-loglevel".to_string(),
        config.ffmpeg_loglevel.clone(),
        "-i".to_string(),
        moved_filepath.display().to_string(),
    ];
    if let Some(data) = &artwork {
        let extension = if artwork_mime(data) == "image/png" { "png" } else { "jpg" };
        let artwork_path = movedir.path().join(format!("cover.{extension}"));
        std::fs::write(&artwork_path, data)?;
        let artwork_path = artwork_path.display().to_string();
        ffmpeg_cmd.extend(
            ["-i", artwork_path.as_str(), "-map", "0:a", "-map", "1", "-disposition:v:0", "attached_pic"]
                .map(str::to_string),
        );
    }
    ffmpeg_cmd.extend(ffmpeg_metadata_args(song));
    ffmpeg_cmd.extend(["-codec".to_string(), "copy".to_string(), path.display().to_string()]);

    let ffmpeg = process::wrap_command_print_context(&ffmpeg_cmd, movedir.path(), |cmd| cmd, process::wait_for_child).await;

    let failure = match ffmpeg {
        Ok(context) if context.exit_status.success() => None,
        Ok(context) => Some(anyhow::anyhow!("ffmpeg returned a non-zero exit code: {}", context.exit_status)),
        Err(e) => Some(e.context("Could not run ffmpeg")),
    };
    if let Some(e) = failure {
        // put the untagged file back where it was
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        crate::files::move_file(&moved_filepath, path)?;
        return Err(e);
    }

    println!(
        "{} '{}' to '{}' with updated metadata",
        style("Copied").yellow(),
        moved_filepath.display(),
        path.display()
    );
    Ok(())
}

/// Tag `path` by its extension. Failures are logged and reported as `false`; the file is kept either way.
pub(crate) async fn tag_file(config: &Config, artwork: Option<Vec<u8>>, path: &Path, song: &Song) -> bool {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    let tagged = match extension {
        "mp3" => tag_mp3(path, song, artwork),
        "m4a" => tag_m4a(config, path, song, artwork).await,
        other => {
            warn!("There is no tagger for '{other}' files yet. Saving file without tags.");
            return false;
        }
    };

    match tagged {
        Ok(()) => {
            info!("Your tags have been set.");
            true
        }
        Err(e) => {
            warn!("Unexpected error while tagging '{}': {e:#}", path.display());
            false
        }
    }
}
