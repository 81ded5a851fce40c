//! Picking metadata records: single-record disambiguation and album expansion.

use crate::backend::Backend;
use crate::input::{ListPrompt, Selection, NO_SELECTION};
use crate::models::{Mode, Record, Song};
use crate::terminal::LineSource;
use console::style;
use std::fmt::Display;
use std::io;
use tracing::{error, info};

/// Result of one workflow step. Quitting, failing and declining stay distinct all the way up.
#[derive(Debug)]
pub(crate) enum Outcome<T> {
    Quit,
    Failed(anyhow::Error),
    /// The user chose to go on without a value.
    Declined,
    Value(T),
}

/// Print items top-down with the first result last, nearest to the prompt.
pub(crate) fn print_records(records: &[Record]) {
    let separator = style("------------------------").dim();
    println!("{separator}");
    for (index, record) in records.iter().enumerate().rev() {
        println!("{}", style(format!("[{index}]")).cyan().bold());
        for (name, value) in record.fields() {
            println!("\t{name} - {value}");
        }
        println!("{separator}");
    }
}

pub(crate) fn print_list(items: &[impl Display]) {
    for (index, item) in items.iter().enumerate() {
        println!("\t [{}] - {item}", style(index).cyan());
    }
}

fn print_selected(record: &Record) {
    println!("{}", style("Selected item:").green());
    for (name, value) in record.fields() {
        println!(" - {name} : {value}");
    }
}

/// Search the metadata api and let the user pick at most one record.
///
/// With a `no_selection` sentinel, [`Outcome::Declined`] means "go on with the raw
/// search term". Without one a record has to be picked, and the selector asks
/// again rather than searching again.
pub(crate) async fn disambiguate(
    backend: &impl Backend,
    src: &mut impl LineSource,
    term: &str,
    mode: Mode,
    limit: u32,
    no_selection: Option<i64>,
) -> io::Result<Outcome<Record>> {
    let records = match backend.search(term, mode, limit, false).await {
        Ok(records) => records,
        Err(e) => {
            error!("Metadata search for '{term}' failed: {e:#}");
            return Ok(Outcome::Failed(e));
        }
    };

    print_records(&records);
    info!("Searched for: {term}");

    let mut prompt = ListPrompt::new("Select the number for the properties you want", 1);
    if let Some(value) = no_selection {
        prompt = prompt.no_selection(value);
    }
    let mut selected = loop {
        match prompt.pick_indices(src, records.len())? {
            Selection::Quit => {
                info!("Quitting.");
                return Ok(Outcome::Quit);
            }
            Selection::NoSelection if no_selection.is_none() => {
                if records.is_empty() {
                    return Ok(Outcome::Declined);
                }
                error!("A {mode} has to be picked here. Try again, or quit.");
            }
            Selection::NoSelection => {
                info!("Continuing without properties.");
                return Ok(Outcome::Declined);
            }
            Selection::Selected(indices) => break indices,
        }
    };

    let Some(index) = selected.pop() else {
        return Ok(Outcome::Declined);
    };
    let Some(record) = records.into_iter().nth(index) else {
        return Ok(Outcome::Declined);
    };

    print_selected(&record);
    Ok(Outcome::Value(record))
}

/// Let the user drop tracks from an album. The sentinel (or a blank line) keeps them all.
pub(crate) fn remove_songs(src: &mut impl LineSource, songs: Vec<Song>) -> io::Result<Option<Vec<Song>>> {
    let records: Vec<Record> = songs.iter().cloned().map(Record::Song).collect();
    print_records(&records);

    let prompt = ListPrompt::new(
        "Enter song id's (1 4 5 etc.) you don't want from this album",
        songs.len().saturating_sub(1),
    )
    .separator(" ")
    .complement()
    .no_selection(NO_SELECTION);

    Ok(match prompt.pick_indices(src, songs.len())? {
        Selection::Quit => None,
        Selection::NoSelection => Some(songs),
        Selection::Selected(keep) => Some(
            songs
                .into_iter()
                .enumerate()
                .filter(|(index, _)| keep.contains(index))
                .map(|(_, song)| song)
                .collect(),
        ),
    })
}

/// Resolve an album search into the list of tracks to download.
pub(crate) async fn expand_album(
    backend: &impl Backend,
    src: &mut impl LineSource,
    query: &str,
    limit: u32,
) -> io::Result<Outcome<Vec<Song>>> {
    let album = match disambiguate(backend, src, query, Mode::Album, limit, None).await? {
        Outcome::Quit => return Ok(Outcome::Quit),
        Outcome::Failed(e) => return Ok(Outcome::Failed(e)),
        Outcome::Declined => {
            error!("No albums found for '{query}'.");
            return Ok(Outcome::Declined);
        }
        Outcome::Value(record) => match record.into_album() {
            Some(album) => album,
            None => return Ok(Outcome::Failed(anyhow::anyhow!("Album search returned a non-album record"))),
        },
    };

    let tracks = match backend
        .search(&album.collection_id.to_string(), Mode::Song, album.track_count, true)
        .await
    {
        Ok(tracks) => tracks,
        Err(e) => {
            error!("Track lookup for '{}' failed: {e:#}", album.collection_name);
            return Ok(Outcome::Failed(e));
        }
    };
    let songs: Vec<Song> = tracks.into_iter().filter_map(Record::into_song).collect();

    if songs.is_empty() {
        error!("Sorry. Can't seem to find any details for this album!");
        return Ok(Outcome::Failed(anyhow::anyhow!(
            "no tracks found for album '{}'",
            album.collection_name
        )));
    }

    Ok(match remove_songs(src, songs)? {
        None => Outcome::Quit,
        Some(songs) => Outcome::Value(songs),
    })
}
