use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Song,
    Album,
}

impl Mode {
    /// Entity name used by the search api and typed by the user to switch modes.
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Mode::Song => "song",
            Mode::Album => "album",
        }
    }

    /// The mode `input` names, if it names one other than `current`.
    pub(crate) fn switch_from(current: Mode, input: &str) -> Option<Mode> {
        input.parse::<Mode>().ok().filter(|mode| *mode != current)
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a mode")]
pub(crate) struct UnknownMode(String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "song" => Ok(Mode::Song),
            "album" => Ok(Mode::Album),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Song {
    pub(crate) track_name: String,
    pub(crate) artist_name: String,
    pub(crate) collection_name: String,
    pub(crate) artwork_url100: String,
    pub(crate) primary_genre_name: String,
    pub(crate) track_number: u32,
    pub(crate) track_count: u32,
    #[serde(default)]
    pub(crate) collection_id: Option<u64>,
    #[serde(default)]
    pub(crate) collection_artist_name: Option<String>,
    pub(crate) disc_number: u32,
    pub(crate) disc_count: u32,
    /// Full timestamp from the api, cut down to the year after parsing.
    pub(crate) release_date: String,
}

impl Song {
    pub(crate) fn release_year(&self) -> Option<i32> {
        self.release_date.split('-').next()?.parse().ok()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Album {
    pub(crate) artist_name: String,
    pub(crate) collection_name: String,
    pub(crate) track_count: u32,
    pub(crate) collection_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Record {
    Song(Song),
    Album(Album),
}

impl Record {
    /// Ordered name/value pairs shown to the user.
    pub(crate) fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Record::Song(song) => {
                let mut fields = vec![
                    ("trackName", song.track_name.clone()),
                    ("artistName", song.artist_name.clone()),
                    ("collectionName", song.collection_name.clone()),
                    ("primaryGenreName", song.primary_genre_name.clone()),
                    ("trackNumber", format!("{}/{}", song.track_number, song.track_count)),
                    ("discNumber", format!("{}/{}", song.disc_number, song.disc_count)),
                    ("releaseDate", song.release_date.clone()),
                ];
                if let Some(collection_artist) = &song.collection_artist_name {
                    fields.push(("collectionArtistName", collection_artist.clone()));
                }
                fields.push(("artworkUrl100", song.artwork_url100.clone()));
                fields
            }
            Record::Album(album) => vec![
                ("artistName", album.artist_name.clone()),
                ("collectionName", album.collection_name.clone()),
                ("trackCount", album.track_count.to_string()),
                ("collectionId", album.collection_id.to_string()),
            ],
        }
    }

    pub(crate) fn into_song(self) -> Option<Song> {
        match self {
            Record::Song(song) => Some(song),
            Record::Album(_) => None,
        }
    }

    pub(crate) fn into_album(self) -> Option<Album> {
        match self {
            Record::Album(album) => Some(album),
            Record::Song(_) => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn song(name: &str) -> Song {
        Song {
            track_name: name.to_string(),
            artist_name: "Dolly Parton".to_string(),
            collection_name: "Jolene".to_string(),
            artwork_url100: "https://example.invalid/art/100x100bb.jpg".to_string(),
            primary_genre_name: "Country".to_string(),
            track_number: 1,
            track_count: 10,
            collection_id: Some(42),
            collection_artist_name: None,
            disc_number: 1,
            disc_count: 1,
            release_date: "1974".to_string(),
        }
    }

    pub(crate) fn album(name: &str, track_count: u32) -> Album {
        Album {
            artist_name: "Billy Joel".to_string(),
            collection_name: name.to_string(),
            track_count,
            collection_id: 7,
        }
    }

    #[test]
    fn mode_switch_only_for_other_mode() {
        assert_eq!(Mode::switch_from(Mode::Song, "album"), Some(Mode::Album));
        assert_eq!(Mode::switch_from(Mode::Song, "song"), None);
        assert_eq!(Mode::switch_from(Mode::Album, "song"), Some(Mode::Song));
        assert_eq!(Mode::switch_from(Mode::Album, "Album"), None);
        assert_eq!(Mode::switch_from(Mode::Song, "jolene"), None);
    }

    #[test]
    fn song_deserializes_from_api_shape() {
        let raw = r#"{
            "wrapperType": "track",
            "trackName": "Jolene",
            "artistName": "Dolly Parton",
            "collectionName": "Jolene",
            "artworkUrl100": "https://is1.example/100x100bb.jpg",
            "primaryGenreName": "Country",
            "trackNumber": 1,
            "trackCount": 10,
            "collectionId": 1,
            "discNumber": 1,
            "discCount": 1,
            "releaseDate": "1973-10-15T07:00:00Z"
        }"#;
        let song: Song = serde_json::from_str(raw).unwrap();
        assert_eq!(song.release_year(), Some(1973));
        assert_eq!(song.collection_artist_name, None);
    }

    #[test]
    fn fields_keep_display_order() {
        let names: Vec<_> = Record::Album(album("The Stranger", 9)).fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["artistName", "collectionName", "trackCount", "collectionId"]);
        assert_eq!(Record::Song(song("Jolene")).fields()[0], ("trackName", "Jolene".to_string()));
    }
}
