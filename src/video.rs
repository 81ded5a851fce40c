use std::fmt;
use std::fmt::{Display, Formatter};
use url::Url;

/// One entry of `yt-dlp --flat-playlist --dump-json` output.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct VideoCandidate {
    pub(crate) id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) url: Option<String>,
    #[serde(default)]
    pub(crate) channel: Option<String>,
    #[serde(default)]
    pub(crate) duration: Option<f64>,
}

impl VideoCandidate {
    pub(crate) fn watch_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("https://www.youtube.com/watch?v={}", self.id),
        }
    }
}

impl Display for VideoCandidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(channel) = &self.channel {
            write!(f, " - {channel}")?;
        }
        if let Some(duration) = self.duration {
            let seconds = duration.round() as u64;
            write!(f, " [{}:{:02}]", seconds / 60, seconds % 60)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub(crate) enum VideoUrlError {
    #[error("'{0}' is not a url")]
    NotAUrl(String),
    #[error("don't know how to find a video id in '{0}'")]
    UnknownUrlKind(Url),
}

/// Extract the video id from the usual youtube url shapes.
pub(crate) fn youtube_id(raw: &str) -> Result<String, VideoUrlError> {
    let youtube_url: Url = raw.trim().parse().map_err(|_| VideoUrlError::NotAUrl(raw.to_string()))?;
    let Some(host) = youtube_url.host_str() else {
        return Err(VideoUrlError::UnknownUrlKind(youtube_url));
    };
    let segments: Vec<&str> = youtube_url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let id = if host.ends_with("youtube.com") || host.ends_with("youtube-nocookie.com") {
        static SEGMENTS_2: [&str; 5] = ["watch", "v", "embed", "e", "shorts"];

        if segments == ["watch"] {
            // ...youtube.com/watch?v=XXXXXXXXXXX&foo=bar
            youtube_url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.to_string())
        } else if segments.len() == 2 && SEGMENTS_2.contains(&segments[0]) {
            Some(segments[1].to_string())
        } else {
            None
        }
    } else if host.ends_with("youtu.be") && segments.len() == 1 {
        Some(segments[0].to_string())
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
        .ok_or(VideoUrlError::UnknownUrlKind(youtube_url))
}
