pub(crate) use clap::Parser;
use clap::ArgAction;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct CliArgs {
    #[command(flatten)]
    pub(crate) config: Config,
}

#[derive(clap::Args, Debug, Clone)]
pub(crate) struct Config {
    #[arg(long, env = "SONGBIRD_LOG_LEVEL", default_value = "info", help = "Log level used when RUST_LOG is not set")]
    pub(crate) log_level: String,
    #[arg(long, env = "SONGBIRD_RUN_LOCAL", default_value_t = false, action = ArgAction::Set, help = "Create missing folders and treat library paths as absolute. When false, folders are expected to be provided (e.g. bind mounts) under /app")]
    pub(crate) run_local: bool,
    #[arg(long, env = "SONGBIRD_ROOT_PATH", default_value = ".", help = "Root path holding the data folder, only honored when running locally")]
    pub(crate) root_path: PathBuf,
    #[arg(long, env = "SONGBIRD_DATA_PATH", default_value = "data")]
    pub(crate) data_path: PathBuf,
    #[arg(long, env = "SONGBIRD_LOCAL_SONG_STORE", default_value = "dump", help = "Folder (inside the data path) where downloads land")]
    pub(crate) local_store: PathBuf,
    #[arg(long, env = "SONGBIRD_ITUNES_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub(crate) itunes_enabled: bool,
    #[arg(long, env = "SONGBIRD_ITUNES_FOLDER_PATH", default_value = "itunesauto", help = "Folder the music library imports from automatically")]
    pub(crate) itunes_folder: PathBuf,
    #[arg(long, env = "SONGBIRD_ITUNES_LIB_PATH", default_value = "ituneslib", help = "Root of the music library, laid out as <artist>/<album>/<song>")]
    pub(crate) itunes_lib: PathBuf,
    #[arg(long, env = "SONGBIRD_GDRIVE_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub(crate) gdrive_enabled: bool,
    #[arg(long, env = "SONGBIRD_GDRIVE_FOLDER_PATH", default_value = "gdrive", help = "Folder holding credentials.json, token.json and songs synced to the cloud")]
    pub(crate) gdrive_folder: PathBuf,
    #[arg(long, env = "SONGBIRD_GDRIVE_FOLDER_ID", default_value = "")]
    pub(crate) gdrive_folder_id: String,
    #[arg(long, env = "SONGBIRD_FNAME_DUP_KEY", default_value = "_dup")]
    pub(crate) fname_dup_key: String,
    #[arg(long, env = "SONGBIRD_FNAME_DUP_LIMIT", default_value_t = 8)]
    pub(crate) fname_dup_limit: u32,
    #[arg(long, env = "SONGBIRD_YOUTUBE_DL_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub(crate) youtube_dl_enabled: bool,
    #[arg(long, visible_alias("yt-dlp-command"), env = "SONGBIRD_YT_DLP", value_parser = parse_yt_dlp, default_value = "yt-dlp", help = "yt-dlp command to execute. Search and download arguments are appended to it")]
    pub(crate) yt_dlp: PosixCommand,
    #[arg(long, env = "SONGBIRD_FFMPEG", default_value = "ffmpeg")]
    pub(crate) ffmpeg: String,
    #[arg(long, env = "SONGBIRD_FFMPEG_LOGLEVEL", default_value = "warning", help = "-loglevel to pass to ffmpeg commands")]
    pub(crate) ffmpeg_loglevel: String,
    #[arg(long, env = "SONGBIRD_SEARCH_RESULTS", default_value_t = 10, help = "Number of video candidates offered per search")]
    pub(crate) search_results: u32,
    #[arg(long, env = "SONGBIRD_METADATA_LIMIT", default_value_t = 20)]
    pub(crate) metadata_limit: u32,
    #[arg(long, env = "SONGBIRD_FILE_FORMAT", default_value = "mp3", help = "Audio format to extract. Forced to m4a when the library is enabled")]
    pub(crate) file_format: String,
    #[arg(long, env = "SONGBIRD_ITUNES_API_URL", default_value = "https://itunes.apple.com")]
    pub(crate) itunes_api_url: String,
}

impl Config {
    fn root(&self) -> PathBuf {
        if self.run_local {
            self.root_path.clone()
        } else {
            PathBuf::from("/app")
        }
    }

    pub(crate) fn data_dir(&self) -> PathBuf {
        self.root().join(&self.data_path)
    }

    pub(crate) fn local_dir(&self) -> PathBuf {
        self.data_dir().join(&self.local_store)
    }

    pub(crate) fn itunes_dir(&self) -> PathBuf {
        if self.run_local {
            self.itunes_folder.clone()
        } else {
            self.data_dir().join(&self.itunes_folder)
        }
    }

    pub(crate) fn itunes_lib_dir(&self) -> PathBuf {
        if self.run_local {
            self.itunes_lib.clone()
        } else {
            self.data_dir().join(&self.itunes_lib)
        }
    }

    pub(crate) fn gdrive_dir(&self) -> PathBuf {
        self.data_dir().join(&self.gdrive_folder)
    }

    /// The library only imports m4a files.
    pub(crate) fn effective_format(&self) -> &str {
        if self.itunes_enabled { "m4a" } else { &self.file_format }
    }
}

fn parse_yt_dlp(raw: &str) -> Result<PosixCommand, ConfigError> {
    PosixCommand::from_raw(raw).ok_or_else(|| ConfigError::YtDlpCommand {
        erroneous_command: raw.to_string(),
    })
}

#[derive(Debug, Clone, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("The provided yt-dlp command is malformed: {erroneous_command}")]
    YtDlpCommand { erroneous_command: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PosixCommand {
    pub(crate) components: Vec<String>,
}

impl PosixCommand {
    fn new(args: Vec<String>) -> Self {
        Self { components: args }
    }

    pub(crate) fn from_raw(raw: &str) -> Option<Self> {
        shlex::split(raw).filter(|parts| !parts.is_empty()).map(Self::new)
    }
}

impl Display for PosixCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join(" "))
    }
}
