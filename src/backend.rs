use crate::cli::Config;
use crate::itunes::ItunesClient;
use crate::models::{Mode, Record, Song};
use crate::video::VideoCandidate;
use crate::{gdrive, tagging, youtube};
use std::path::{Path, PathBuf};

/// Everything the workflow needs from the outside world.
pub(crate) trait Backend {
    async fn search(&self, term: &str, mode: Mode, limit: u32, lookup: bool) -> Result<Vec<Record>, anyhow::Error>;

    async fn find_videos(&self, query: &str) -> Result<Vec<VideoCandidate>, anyhow::Error>;

    /// Returns the path of the downloaded `<stem>.<format>` file.
    async fn download(&self, url: &str, stem: &Path, format: &str) -> Result<PathBuf, anyhow::Error>;

    async fn tag(&self, path: &Path, song: &Song) -> bool;

    /// Returns the id of the uploaded file.
    async fn upload(&self, path: &Path, name: &str) -> Result<String, anyhow::Error>;
}

pub(crate) struct LiveBackend {
    config: Config,
    itunes: ItunesClient,
    http: reqwest::Client,
}

impl LiveBackend {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            itunes: ItunesClient::new(&config.itunes_api_url),
            http: reqwest::Client::new(),
            config,
        }
    }
}

impl Backend for LiveBackend {
    async fn search(&self, term: &str, mode: Mode, limit: u32, lookup: bool) -> Result<Vec<Record>, anyhow::Error> {
        self.itunes.search(term, mode, limit, lookup).await
    }

    async fn find_videos(&self, query: &str) -> Result<Vec<VideoCandidate>, anyhow::Error> {
        youtube::find_videos(&self.config, query).await
    }

    async fn download(&self, url: &str, stem: &Path, format: &str) -> Result<PathBuf, anyhow::Error> {
        youtube::download(&self.config, url, stem, format).await
    }

    async fn tag(&self, path: &Path, song: &Song) -> bool {
        let artwork = self.itunes.fetch_artwork(&song.artwork_url100).await;
        tagging::tag_file(&self.config, artwork, path, song).await
    }

    async fn upload(&self, path: &Path, name: &str) -> Result<String, anyhow::Error> {
        let folder = self.config.gdrive_dir();
        gdrive::save_song(
            &self.http,
            &self.config.gdrive_folder_id,
            &folder.join("credentials.json"),
            &folder.join("token.json"),
            name,
            path,
        )
        .await
    }
}
