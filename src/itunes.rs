use crate::files::remove_illegal_characters;
use crate::models::{Album, Mode, Record, Song};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const ARTWORK_SIZES: [&str; 7] = [
    "3000x3000",
    "2500x2500",
    "2000x2000",
    "1500x1500",
    "1000x1000",
    "500x500",
    "100x100",
];

pub(crate) mod response {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Clone, Debug)]
    #[serde(rename_all = "camelCase")]
    pub(crate) struct Search {
        pub(crate) result_count: usize,
        pub(crate) results: Vec<serde_json::Value>,
    }
}

pub(crate) struct ItunesClient {
    client: reqwest::Client,
    base_url: String,
}

impl ItunesClient {
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Free-text search, or an id lookup when `lookup` is set (`term` is then the collection id).
    pub(crate) async fn search(&self, term: &str, mode: Mode, limit: u32, lookup: bool) -> Result<Vec<Record>, anyhow::Error> {
        let limit = limit.to_string();
        let (endpoint, key) = if lookup { ("lookup", "id") } else { ("search", "term") };

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Searching the iTunes {endpoint} api for '{term}'"));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let response = self
            .client
            .get(format!("{}/{endpoint}", self.base_url))
            .query(&[(key, term), ("entity", mode.as_str()), ("limit", limit.as_str())])
            .send()
            .await;
        spinner.finish_and_clear();

        let response = response
            .context("Could not connect to the iTunes api")?
            .error_for_status()
            .context("The iTunes api refused the request")?;
        info!("Connected to {}", response.url());

        let data: response::Search = response.json().await.context("Unexpected iTunes api response")?;
        debug!("The iTunes api returned {} result(s)", data.result_count);
        Ok(parse_results(data, mode))
    }

    /// Artwork bytes at the largest size the store serves, if any.
    pub(crate) async fn fetch_artwork(&self, artwork_url100: &str) -> Option<Vec<u8>> {
        let sizes: &[&str] = if artwork_url100.contains("100x100") { &ARTWORK_SIZES } else { &["original"] };
        for size in sizes {
            let url = artwork_url100.replace("100x100", size);
            let response = match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => response,
                _ => {
                    info!("- Size not found -- Trying a smaller one than {size}");
                    continue;
                }
            };
            if let Ok(bytes) = response.bytes().await {
                info!("Found art at size: {size}");
                return Some(bytes.to_vec());
            }
        }

        info!("Couldn't find album art. Your file won't have the art.");
        None
    }
}

fn parse_results(data: response::Search, mode: Mode) -> Vec<Record> {
    let wanted = match mode {
        Mode::Song => "track",
        Mode::Album => "collection",
    };

    data.results
        .into_iter()
        .enumerate()
        // lookups include the collection itself ahead of its tracks
        .filter(|(_, raw)| raw.get("wrapperType").and_then(|w| w.as_str()).is_none_or(|w| w == wanted))
        .filter_map(|(index, raw)| {
            let parsed = match mode {
                Mode::Song => serde_json::from_value::<Song>(raw).map(|mut song| {
                    song.release_date = song.release_date.split('-').next().unwrap_or_default().to_string();
                    Record::Song(song)
                }),
                Mode::Album => serde_json::from_value::<Album>(raw).map(Record::Album),
            };
            parsed
                .inspect_err(|e| {
                    warn!("Skipping the result at index [{index}] as it could not be loaded into the expected format: {e}")
                })
                .ok()
        })
        .collect()
}

/// Songs in a `<lib>/<artist>/<album>/<file>` library matching `term`.
///
/// Without `album_artist` the term is matched against "song album artist"; with it, the
/// artist folder must contain the album artist and the file name must contain the term.
pub(crate) fn library_search(lib: &Path, term: &str, album_artist: Option<&str>) -> Vec<PathBuf> {
    let normalize = |s: &str| remove_illegal_characters(&s.to_lowercase());
    let term = normalize(term);

    let mut matches: Vec<PathBuf> = walkdir::WalkDir::new(lib)
        .min_depth(3)
        .max_depth(3)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let path = entry.path();
            let component = |p: Option<&Path>| {
                p.and_then(Path::file_name)
                    .map(|name| normalize(&name.to_string_lossy()))
                    .unwrap_or_default()
            };
            let song = component(Some(path));
            let album = component(path.parent());
            let artist = component(path.parent().and_then(Path::parent));

            match album_artist {
                None => format!("{song} {album} {artist}").contains(&term),
                Some(album_artist) => artist.contains(&normalize(album_artist)) && song.contains(&term),
            }
        })
        .map(|entry| entry.into_path())
        .collect();

    matches.sort();
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_response(results: serde_json::Value) -> response::Search {
        serde_json::from_value(serde_json::json!({
            "resultCount": results.as_array().map(Vec::len).unwrap_or(0),
            "results": results,
        }))
        .unwrap()
    }

    fn track(name: &str) -> serde_json::Value {
        serde_json::json!({
            "wrapperType": "track",
            "trackName": name,
            "artistName": "Billy Joel",
            "collectionName": "The Stranger",
            "artworkUrl100": "https://is1.example/100x100bb.jpg",
            "primaryGenreName": "Rock",
            "trackNumber": 1,
            "trackCount": 9,
            "collectionId": 7,
            "discNumber": 1,
            "discCount": 1,
            "releaseDate": "1977-09-29T07:00:00Z"
        })
    }

    #[test]
    fn lookup_skips_collection_wrapper_and_cuts_year() {
        let data = search_response(serde_json::json!([
            {"wrapperType": "collection", "collectionName": "The Stranger", "artistName": "Billy Joel", "trackCount": 9, "collectionId": 7},
            track("Movin' Out"),
            track("Vienna"),
        ]));
        let records = parse_results(data, Mode::Song);
        assert_eq!(records.len(), 2);
        let Record::Song(song) = &records[1] else { panic!("expected a song") };
        assert_eq!(song.track_name, "Vienna");
        assert_eq!(song.release_date, "1977");
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let data = search_response(serde_json::json!([
            {"wrapperType": "track", "trackName": "missing everything"},
            track("Vienna"),
        ]));
        assert_eq!(parse_results(data, Mode::Song).len(), 1);
    }

    #[test]
    fn albums_parse_from_collections() {
        let data = search_response(serde_json::json!([
            {"wrapperType": "collection", "collectionName": "The Stranger", "artistName": "Billy Joel", "trackCount": 9, "collectionId": 7},
        ]));
        let records = parse_results(data, Mode::Album);
        assert_eq!(records, vec![Record::Album(Album {
            artist_name: "Billy Joel".to_string(),
            collection_name: "The Stranger".to_string(),
            track_count: 9,
            collection_id: 7,
        })]);
    }

    #[test]
    fn library_search_matches_any_path_component() {
        let lib = tempfile::tempdir().unwrap();
        let album = lib.path().join("Billy Joel").join("The Stranger");
        std::fs::create_dir_all(&album).unwrap();
        std::fs::write(album.join("02 Vienna.m4a"), b"").unwrap();
        std::fs::write(album.join("01 Movin' Out.m4a"), b"").unwrap();
        std::fs::write(lib.path().join("Billy Joel").join("stray vienna.m4a"), b"").unwrap();

        assert_eq!(library_search(lib.path(), "vienna", None), vec![album.join("02 Vienna.m4a")]);
        assert_eq!(library_search(lib.path(), "billy joel", None).len(), 2);
        assert_eq!(library_search(lib.path(), "Movin' Out", None), vec![album.join("01 Movin' Out.m4a")]);
    }

    #[test]
    fn library_search_by_album_artist_matches_file_name_only() {
        let lib = tempfile::tempdir().unwrap();
        let album = lib.path().join("Billy Joel").join("The Stranger");
        std::fs::create_dir_all(&album).unwrap();
        std::fs::write(album.join("02 Vienna.m4a"), b"").unwrap();

        assert_eq!(library_search(lib.path(), "vienna", Some("Billy Joel")).len(), 1);
        assert!(library_search(lib.path(), "stranger", Some("Billy Joel")).is_empty());
        assert!(library_search(lib.path(), "vienna", Some("Dolly Parton")).is_empty());
    }
}
