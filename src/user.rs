use crate::cli::Config;
use crate::input::{read_choice, Answer, QUIT};
use crate::terminal::LineSource;
use std::fmt::{Display, Formatter};
use std::io;

/// Where a finished download can be filed.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq)]
pub(crate) enum Destination {
    GDrive,
    Itunes,
    Local,
}

impl Destination {
    pub(crate) const fn key(&self) -> &'static str {
        match self {
            Destination::GDrive => "g",
            Destination::Itunes => "i",
            Destination::Local => "l",
        }
    }

    /// Destinations offered for the given enabled stores. Local is always available.
    pub(crate) const fn offered(itunes_enabled: bool, gdrive_enabled: bool) -> &'static [Self] {
        match (itunes_enabled, gdrive_enabled) {
            (true, true) => &[Destination::GDrive, Destination::Itunes, Destination::Local],
            (true, false) => &[Destination::Itunes, Destination::Local],
            (false, true) => &[Destination::GDrive, Destination::Local],
            (false, false) => &[Destination::Local],
        }
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::GDrive => {
                write!(f, "gdrive")
            }
            Destination::Itunes => {
                write!(f, "itunes")
            }
            Destination::Local => {
                write!(f, "locally")
            }
        }
    }
}

/// Ask where to save the file; skips the prompt when local is the only option.
pub(crate) fn ask_destination(src: &mut impl LineSource, config: &Config) -> io::Result<Answer<Destination>> {
    let offered = Destination::offered(config.itunes_enabled, config.gdrive_enabled);
    if let [only] = offered {
        return Ok(Answer::Value(*only));
    }

    let described: Vec<String> = offered.iter().map(|dest| format!("{dest} ({})", dest.key())).collect();
    let prompt = match described.split_last() {
        Some((last, rest)) => format!("Would you like to save your file to {}, or {last}", rest.join(", ")),
        None => "Would you like to save your file".to_string(),
    };
    let keys: Vec<&str> = offered.iter().map(Destination::key).collect();

    Ok(match read_choice(src, &prompt, QUIT, &keys)? {
        Answer::Quit => Answer::Quit,
        Answer::Value(key) => Answer::Value(
            offered
                .iter()
                .copied()
                .find(|dest| dest.key() == key)
                .unwrap_or(Destination::Local),
        ),
    })
}

/// A y/n question. Quit is reported separately from "n".
pub(crate) fn confirm(src: &mut impl LineSource, prompt: &str) -> io::Result<Answer<bool>> {
    Ok(match read_choice(src, prompt, QUIT, &["y", "n"])? {
        Answer::Quit => Answer::Quit,
        Answer::Value(yes_no) => Answer::Value(yes_no == "y"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::config_in;
    use crate::terminal::ScriptedLines;

    #[test]
    fn offered_follows_enabled_stores() {
        assert_eq!(Destination::offered(true, true).len(), 3);
        assert_eq!(Destination::offered(true, false), &[Destination::Itunes, Destination::Local]);
        assert_eq!(Destination::offered(false, true), &[Destination::GDrive, Destination::Local]);
        assert_eq!(Destination::offered(false, false), &[Destination::Local]);
    }

    #[test]
    fn asks_with_every_enabled_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let mut src = ScriptedLines::new(["x", "i"]);
        assert_eq!(ask_destination(&mut src, &config).unwrap(), Answer::Value(Destination::Itunes));
        assert_eq!(
            src.prompts[0],
            "Would you like to save your file to gdrive (g), itunes (i), or locally (l), choices=[\"g\", \"i\", \"l\"] ['q' quits]"
        );
    }

    #[test]
    fn local_only_needs_no_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.itunes_enabled = false;
        config.gdrive_enabled = false;
        let mut src = ScriptedLines::new(Vec::<&str>::new());
        assert_eq!(ask_destination(&mut src, &config).unwrap(), Answer::Value(Destination::Local));
        assert!(src.prompts.is_empty());
    }

    #[test]
    fn confirm_keeps_quit_apart_from_no() {
        let mut src = ScriptedLines::new(["n", "q", "y"]);
        assert_eq!(confirm(&mut src, "sure?").unwrap(), Answer::Value(false));
        assert_eq!(confirm(&mut src, "sure?").unwrap(), Answer::Quit);
        assert_eq!(confirm(&mut src, "sure?").unwrap(), Answer::Value(true));
    }
}
