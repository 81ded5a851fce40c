//! The main menu loop and the per-track pipeline.
//!
//! Every step reports an [`Outcome`]; only this module decides what a quit or a
//! failure means for the rest of the batch.

use crate::backend::Backend;
use crate::cli::Config;
use crate::files::{dedup_path, find_files, move_file, remove_illegal_characters};
use crate::input::{read_input, read_list, Answer, ListPrompt, Selection, NO_SELECTION, QUIT};
use crate::itunes::library_search;
use crate::metadata::{disambiguate, expand_album, print_list, Outcome};
use crate::models::{Mode, Song};
use crate::terminal::LineSource;
use crate::user::{ask_destination, confirm, Destination};
use crate::video;
use console::style;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// One queued download: the name typed (or the album track name) and metadata, if already known.
#[derive(Debug, Clone)]
pub(crate) struct Track {
    pub(crate) name: String,
    pub(crate) song: Option<Song>,
}

#[derive(Debug)]
enum Menu {
    Quit,
    SwitchMode(Mode),
    Batch(Vec<Track>),
    /// Nothing to do this round, show the menu again.
    Again,
}

pub(crate) async fn run(config: &Config, backend: &impl Backend, src: &mut impl LineSource) -> io::Result<()> {
    let mut mode = Mode::Song;

    loop {
        info!("---Songbird Main Menu v{}---", env!("CARGO_PKG_VERSION"));

        match menu(config, backend, src, mode).await? {
            Menu::Quit => {
                if confirm_quit(src)? {
                    return Ok(());
                }
            }
            Menu::SwitchMode(next) => {
                info!("Switched to {next} mode!");
                mode = next;
            }
            Menu::Batch(tracks) => run_batch(config, backend, src, tracks).await?,
            Menu::Again => {}
        }
    }
}

/// Anything but an explicit "n" quits.
fn confirm_quit(src: &mut impl LineSource) -> io::Result<bool> {
    Ok(!matches!(confirm(src, "Are you sure you want to quit?")?, Answer::Value(false)))
}

async fn menu(config: &Config, backend: &impl Backend, src: &mut impl LineSource, mode: Mode) -> io::Result<Menu> {
    match mode {
        Mode::Song => {
            let songs: Vec<String> = match read_list::<String>(
                src,
                "Please input song(s), separated by ';'. E.g. song1; song2; song3.",
                Some("; "),
                QUIT,
            )? {
                Answer::Quit => return Ok(Menu::Quit),
                Answer::Value(songs) => songs.into_iter().filter(|song| !song.is_empty()).collect(),
            };

            let Some(first) = songs.first() else {
                return Ok(Menu::Again);
            };
            if let Some(next) = Mode::switch_from(mode, first) {
                return Ok(Menu::SwitchMode(next));
            }

            Ok(Menu::Batch(songs.into_iter().map(|name| Track { name, song: None }).collect()))
        }
        Mode::Album => {
            let album_name = match read_input::<String>(src, "Enter an album name.", QUIT, None)? {
                Answer::Quit => return Ok(Menu::Quit),
                Answer::Value(name) => name.trim().to_string(),
            };
            if album_name.is_empty() {
                return Ok(Menu::Again);
            }
            if let Some(next) = Mode::switch_from(mode, &album_name) {
                return Ok(Menu::SwitchMode(next));
            }

            match expand_album(backend, src, &album_name, config.metadata_limit).await? {
                Outcome::Value(songs) => Ok(Menu::Batch(
                    songs
                        .into_iter()
                        .map(|song| Track {
                            name: song.track_name.clone(),
                            song: Some(song),
                        })
                        .collect(),
                )),
                Outcome::Quit | Outcome::Declined => Ok(Menu::Again),
                Outcome::Failed(e) => {
                    error!("Could not expand album '{album_name}': {e:#}. Try another album.");
                    Ok(Menu::Again)
                }
            }
        }
    }
}

pub(crate) async fn run_batch(
    config: &Config,
    backend: &impl Backend,
    src: &mut impl LineSource,
    tracks: Vec<Track>,
) -> io::Result<()> {
    let names: Vec<&str> = tracks.iter().map(|track| track.name.as_str()).collect();
    info!("Searching for songs: {names:?}");
    let total = tracks.len();

    for (done, track) in tracks.into_iter().enumerate() {
        let remaining = total - done - 1;
        let stopped = match run_for_song(config, backend, src, &track.name, track.song).await? {
            Outcome::Value(path) => {
                info!("Finished '{}': {}", track.name, path.display());
                false
            }
            Outcome::Declined => false,
            Outcome::Quit => true,
            Outcome::Failed(e) => {
                error!("Could not finish '{}': {e:#}", track.name);
                true
            }
        };

        if stopped && remaining > 0 {
            let prompt = format!("Continue with the remaining {remaining} queued track(s)?");
            if !matches!(confirm(src, &prompt)?, Answer::Value(true)) {
                info!("Skipping the remaining queued tracks.");
                break;
            }
        }
    }

    Ok(())
}

fn similar_files(config: &Config, name: &str, song: Option<&Song>) -> Vec<PathBuf> {
    // saved files carry the cleaned name
    let name = &remove_illegal_characters(name);
    let mut files = find_files(&config.local_dir(), name);
    if config.itunes_enabled {
        let album_artist = song.map(|song| song.artist_name.as_str());
        files.extend(library_search(&config.itunes_lib_dir(), name, album_artist));
    }
    if config.gdrive_enabled {
        files.extend(find_files(&config.gdrive_dir(), name));
    }
    files
}

/// Search, download, tag and file one song. Returns where the file ended up.
pub(crate) async fn run_for_song(
    config: &Config,
    backend: &impl Backend,
    src: &mut impl LineSource,
    name: &str,
    song: Option<Song>,
) -> io::Result<Outcome<PathBuf>> {
    info!("Searching for: {name}");
    let format = config.effective_format();

    let files = similar_files(config, name, song.as_ref());
    if !files.is_empty() {
        info!("Found the following similar files:");
        print_list(&files.iter().map(|file| file.display()).collect::<Vec<_>>());
        match confirm(src, "Do you want to proceed with download anyway?")? {
            Answer::Quit => return Ok(Outcome::Quit),
            Answer::Value(false) => return Ok(Outcome::Declined),
            Answer::Value(true) => {}
        }
    }

    let song = match song {
        Some(song) => Some(song),
        None => match disambiguate(backend, src, name, Mode::Song, config.metadata_limit, Some(NO_SELECTION)).await? {
            Outcome::Quit => return Ok(Outcome::Quit),
            Outcome::Failed(e) => return Ok(Outcome::Failed(e)),
            Outcome::Declined => None,
            Outcome::Value(record) => record.into_song(),
        },
    };

    let file_path = config
        .local_dir()
        .join(format!("{}.{format}", remove_illegal_characters(name)));
    let file_path = match dedup_path(&file_path, config.fname_dup_limit, &config.fname_dup_key) {
        Ok(deduped) => deduped,
        Err(e) => return Ok(Outcome::Failed(e.into())),
    };
    if !file_path.ends_with(format!("{}.{format}", remove_illegal_characters(name))) {
        warn!(
            "Duplicate file(s) already exist for '{name}', so the download will be saved as {}",
            file_path.display()
        );
    }

    if !config.youtube_dl_enabled {
        warn!("Downloading is disabled, nothing to do for '{name}'.");
        return Ok(Outcome::Declined);
    }

    let query = match &song {
        Some(song) => format!("{} {}", song.artist_name, song.track_name),
        None => name.to_string(),
    };
    let url = match resolve_download_target(backend, src, &query).await? {
        Outcome::Value(url) => url,
        Outcome::Quit => return Ok(Outcome::Quit),
        Outcome::Declined => return Ok(Outcome::Declined),
        Outcome::Failed(e) => return Ok(Outcome::Failed(e)),
    };

    let stem = file_path.with_extension("");
    let downloaded = match backend.download(&url, &stem, format).await {
        Ok(path) => path,
        Err(e) => return Ok(Outcome::Failed(e)),
    };

    if let Some(song) = &song {
        backend.tag(&downloaded, song).await;
    }

    save(config, backend, src, name, &downloaded).await
}

/// A url typed by the user, or a search result they picked.
async fn resolve_download_target(
    backend: &impl Backend,
    src: &mut impl LineSource,
    query: &str,
) -> io::Result<Outcome<String>> {
    let prompt = format!("Enter a URL, or hit enter to use '{query}' as a query to youtube");

    loop {
        let typed = match read_input::<String>(src, &prompt, QUIT, None)? {
            Answer::Quit => return Ok(Outcome::Quit),
            Answer::Value(typed) => typed.trim().to_string(),
        };

        if typed.is_empty() {
            break;
        }
        if let Ok(id) = video::youtube_id(&typed) {
            return Ok(Outcome::Value(format!("https://www.youtube.com/watch?v={id}")));
        }
        match url::Url::parse(&typed) {
            Ok(url) => return Ok(Outcome::Value(url.to_string())),
            Err(e) => error!("'{typed}' is not a url ({e}). Try again, or hit enter to search."),
        }
    }

    let candidates = match backend.find_videos(query).await {
        Ok(candidates) if candidates.is_empty() => {
            return Ok(Outcome::Failed(anyhow::anyhow!("no videos found for '{query}'")));
        }
        Ok(candidates) => candidates,
        Err(e) => return Ok(Outcome::Failed(e)),
    };

    print_list(&candidates);
    let prompt = ListPrompt::new("Select the song you wish to download!", 1).no_selection(NO_SELECTION);
    Ok(match prompt.pick(src, &candidates)? {
        Selection::Quit => Outcome::Quit,
        Selection::NoSelection => Outcome::Declined,
        Selection::Selected(picked) => match picked.first() {
            Some(candidate) => Outcome::Value(candidate.watch_url()),
            None => Outcome::Declined,
        },
    })
}

/// File the download where the user wants it. Quitting here leaves it in the local folder.
async fn save(
    config: &Config,
    backend: &impl Backend,
    src: &mut impl LineSource,
    name: &str,
    downloaded: &Path,
) -> io::Result<Outcome<PathBuf>> {
    let destination = match ask_destination(src, config)? {
        Answer::Quit => {
            info!("Leaving the download at {}", downloaded.display());
            return Ok(Outcome::Quit);
        }
        Answer::Value(destination) => destination,
    };

    let folder = match destination {
        Destination::Local => {
            info!("Saved locally.");
            return Ok(Outcome::Value(downloaded.to_path_buf()));
        }
        Destination::Itunes => config.itunes_dir(),
        Destination::GDrive => config.gdrive_dir(),
    };

    let Some(file_name) = downloaded.file_name() else {
        return Ok(Outcome::Failed(anyhow::anyhow!("'{}' has no file name", downloaded.display())));
    };
    let dest = match dedup_path(&folder.join(file_name), config.fname_dup_limit, &config.fname_dup_key) {
        Ok(dest) => dest,
        Err(e) => return Ok(Outcome::Failed(e.into())),
    };
    if let Err(e) = move_file(downloaded, &dest) {
        return Ok(Outcome::Failed(anyhow::Error::new(e).context(format!("Could not move the file to {destination}"))));
    }

    if destination == Destination::GDrive {
        let extension = dest.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        if let Err(e) = backend.upload(&dest, &format!("{name}.{extension}")).await {
            return Ok(Outcome::Failed(e.context(format!("Upload failed, the file stays at {}", dest.display()))));
        }
    }

    info!("Saved to {}", style(destination).green());
    Ok(Outcome::Value(dest))
}
