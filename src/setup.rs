use crate::cli::Config;
use console::style;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub(crate) fn name_plate() {
    let border = style("===============================").cyan();
    println!("{border}");
    println!("{}", style("=-----Welcome to songbird-----=").cyan().bold());
    println!("{border}");
    println!("--cli {}", env!("CARGO_PKG_VERSION"));
}

pub(crate) fn dirs(config: &Config) -> [PathBuf; 5] {
    [
        config.data_dir(),
        config.itunes_dir(),
        config.itunes_lib_dir(),
        config.gdrive_dir(),
        config.local_dir(),
    ]
}

pub(crate) fn initialize_dirs(dirs: &[PathBuf]) -> std::io::Result<()> {
    for dir in dirs {
        if !dir.exists() {
            info!("Creating dir: {}", dir.display());
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

fn require(path: &Path, feature: &str) -> bool {
    if path.exists() {
        return true;
    }
    error!(
        "You must create the path {} to use the {feature} feature! If using docker, use bind mounts.",
        path.display()
    );
    false
}

/// Check the folders every enabled destination needs. Every problem is logged, not just the first.
pub(crate) fn validate_essentials(config: &Config) -> bool {
    let mut success = true;

    if config.gdrive_enabled {
        success &= require(&config.gdrive_dir(), "google drive");
        let credentials = config.gdrive_dir().join("credentials.json");
        if !credentials.exists() {
            error!(
                "You must provide a credentials.json file inside of {} to use the google drive feature!",
                config.gdrive_dir().display()
            );
            success = false;
        }
    }

    if config.itunes_enabled {
        success &= require(&config.itunes_dir(), "itunes");
        success &= require(&config.itunes_lib_dir(), "itunes");
    }

    if !config.data_dir().exists() {
        error!(
            "At minimum, you need path {} configured to run the app. If using docker, use bind mounts.",
            config.data_dir().display()
        );
        success = false;
    }

    success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::config_in;

    #[test]
    fn initialized_dirs_validate_except_credentials() {
        let root = tempfile::tempdir().unwrap();
        let config = config_in(root.path());
        assert!(!validate_essentials(&config));

        initialize_dirs(&dirs(&config)).unwrap();
        assert!(dirs(&config).iter().all(|dir| dir.is_dir()));
        assert!(!validate_essentials(&config));

        std::fs::write(config.gdrive_dir().join("credentials.json"), b"{}").unwrap();
        assert!(validate_essentials(&config));
    }

    #[test]
    fn disabled_destinations_are_not_required() {
        let root = tempfile::tempdir().unwrap();
        let mut config = config_in(root.path());
        config.itunes_enabled = false;
        config.gdrive_enabled = false;
        std::fs::create_dir_all(config.data_dir()).unwrap();
        assert!(validate_essentials(&config));
    }
}
