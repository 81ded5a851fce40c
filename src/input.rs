//! Prompt primitives: typed single values, typed lists and bounded list selection.
//!
//! Every reader checks the quit token before any parsing, so quitting is always
//! possible. Malformed input is reported and asked again, it never escapes as an
//! error; the only errors returned are I/O failures of the line source.

use crate::terminal::LineSource;
use std::fmt::Debug;
use std::io;
use std::str::FromStr;
use tracing::{error, info, warn};

pub(crate) const QUIT: &str = "q";
pub(crate) const NO_SELECTION: i64 = -1;

/// After this many rejected attempts the selector starts nagging.
const PATIENCE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Answer<T> {
    Quit,
    Value(T),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Selection<T> {
    Quit,
    /// Blank input, or the no-selection sentinel outside complement mode.
    NoSelection,
    Selected(Vec<T>),
}

impl<T> Selection<T> {
    pub(crate) fn map<U>(self, f: impl FnMut(T) -> U) -> Selection<U> {
        match self {
            Selection::Quit => Selection::Quit,
            Selection::NoSelection => Selection::NoSelection,
            Selection::Selected(items) => Selection::Selected(items.into_iter().map(f).collect()),
        }
    }
}

fn quit_hint(prompt: &str, quit: &str) -> String {
    format!("{prompt} ['{quit}' quits]")
}

/// Ask until the line parses as `T` (and is one of `choices`, when given).
pub(crate) fn read_input<T>(
    src: &mut impl LineSource,
    prompt: &str,
    quit: &str,
    choices: Option<&[T]>,
) -> io::Result<Answer<T>>
where
    T: FromStr + PartialEq + Debug,
{
    let prompt = match choices {
        Some(choices) => quit_hint(&format!("{prompt}, choices={choices:?}"), quit),
        None => quit_hint(prompt, quit),
    };

    loop {
        let line = src.read_line(&prompt)?;
        if line == quit {
            return Ok(Answer::Quit);
        }

        let Ok(typed) = line.trim().parse::<T>() else {
            error!(
                "Invalid input '{line}'. Try again, inputting a {}",
                std::any::type_name::<T>()
            );
            continue;
        };

        match choices {
            Some(choices) if !choices.contains(&typed) => {
                error!("You must input one of {choices:?}");
            }
            _ => return Ok(Answer::Value(typed)),
        }
    }
}

/// [`read_input`] restricted to a fixed set of literal answers.
pub(crate) fn read_choice(
    src: &mut impl LineSource,
    prompt: &str,
    quit: &str,
    choices: &[&str],
) -> io::Result<Answer<String>> {
    let choices: Vec<String> = choices.iter().map(|choice| choice.to_string()).collect();
    read_input(src, prompt, quit, Some(choices.as_slice()))
}

/// Ask for a `sep`-separated list where every token must parse as `T`.
///
/// `None` splits on any run of whitespace. A blank line is an empty list. One
/// bad token rejects the whole line.
pub(crate) fn read_list<T: FromStr>(
    src: &mut impl LineSource,
    prompt: &str,
    sep: Option<&str>,
    quit: &str,
) -> io::Result<Answer<Vec<T>>> {
    let prompt = quit_hint(prompt, quit);

    loop {
        let line = src.read_line(&prompt)?;
        if line == quit {
            return Ok(Answer::Quit);
        }
        if line.trim().is_empty() {
            return Ok(Answer::Value(Vec::new()));
        }

        let parsed: Result<Vec<T>, _> = match sep {
            None => line.split_whitespace().map(str::parse).collect(),
            Some(sep) => line.split(sep).map(|token| token.trim().parse()).collect(),
        };

        match parsed {
            Ok(items) => return Ok(Answer::Value(items)),
            Err(_) => error!(
                "Invalid input '{line}', expected a list of {} separated by {:?}",
                std::any::type_name::<T>(),
                sep.unwrap_or("whitespace")
            ),
        }
    }
}

/// Index selection over an ordered list.
#[derive(Debug, Clone)]
pub(crate) struct ListPrompt<'p> {
    prompt: &'p str,
    max_choices: usize,
    separator: Option<&'p str>,
    quit: &'p str,
    complement: bool,
    no_selection: Option<i64>,
}

impl<'p> ListPrompt<'p> {
    pub(crate) fn new(prompt: &'p str, max_choices: usize) -> Self {
        Self {
            prompt,
            max_choices,
            separator: None,
            quit: QUIT,
            complement: false,
            no_selection: None,
        }
    }

    pub(crate) fn separator(mut self, separator: &'p str) -> Self {
        self.separator = Some(separator);
        self
    }

    pub(crate) fn quit(mut self, quit: &'p str) -> Self {
        self.quit = quit;
        self
    }

    /// Return everything except what the user typed.
    pub(crate) fn complement(mut self) -> Self {
        self.complement = true;
        self
    }

    pub(crate) fn no_selection(mut self, value: i64) -> Self {
        self.no_selection = Some(value);
        self
    }

    fn decorated_prompt(&self, len: usize) -> String {
        let range = match len {
            0 => String::new(),
            1 => " (choose 0)".to_string(),
            _ => format!(" (choose 0 to {})", len - 1),
        };
        let sentinel = match self.no_selection {
            None => String::new(),
            Some(value) if self.complement => format!(" [{value} select all]"),
            Some(value) => format!(" [{value} continue without selection]"),
        };
        format!("{}{range}{sentinel}", self.prompt)
    }

    /// Selected indices, always within `0..len`.
    ///
    /// Plain selections keep the typed order. Complement selections come back in
    /// ascending list order; the sentinel in complement mode selects everything.
    pub(crate) fn pick_indices(&self, src: &mut impl LineSource, len: usize) -> io::Result<Selection<usize>> {
        let prompt = self.decorated_prompt(len);
        let mut tries = 0u32;

        loop {
            tries += 1;
            if tries > PATIENCE {
                warn!("{tries} tries so far? Just get it right!");
            }

            let typed: Vec<i64> = match read_list(src, &prompt, self.separator, self.quit)? {
                Answer::Quit => return Ok(Selection::Quit),
                Answer::Value(typed) => typed,
            };

            if typed.is_empty() {
                info!("You selected nothing.");
                return Ok(Selection::NoSelection);
            }

            if self.no_selection == Some(typed[0]) {
                return Ok(if self.complement {
                    Selection::Selected((0..len).collect())
                } else {
                    Selection::NoSelection
                });
            }

            if typed.len() > self.max_choices {
                error!("You're only allowed {} choice(s) here. Try again.", self.max_choices);
                continue;
            }

            let out_of_bounds: Vec<i64> = typed
                .iter()
                .copied()
                .filter(|value| usize::try_from(*value).map_or(true, |index| index >= len))
                .collect();
            if !out_of_bounds.is_empty() {
                for value in out_of_bounds {
                    error!(
                        "Sorry, the value {value} is out of bounds. Please enter within the interval [0, {}]",
                        len as i64 - 1
                    );
                }
                continue;
            }

            let typed: Vec<usize> = typed.into_iter().map(|value| value as usize).collect();
            let selected = if self.complement {
                (0..len).filter(|index| !typed.contains(index)).collect()
            } else {
                typed
            };

            return Ok(Selection::Selected(selected));
        }
    }

    pub(crate) fn pick<'a, T>(&self, src: &mut impl LineSource, items: &'a [T]) -> io::Result<Selection<&'a T>> {
        Ok(self.pick_indices(src, items.len())?.map(|index| &items[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::ScriptedLines;

    const OPTIONS: [&str; 2] = ["option1", "option2"];

    fn pick_with<'a>(prompt: &ListPrompt, answers: &[&str], items: &'a [&'a str]) -> Selection<&'a &'a str> {
        let mut src = ScriptedLines::new(answers);
        prompt.pick(&mut src, items).unwrap()
    }

    #[test]
    fn read_input_returns_raw_string() {
        let mut src = ScriptedLines::new(["0"]);
        assert_eq!(read_input::<String>(&mut src, "hello", QUIT, None).unwrap(), Answer::Value("0".to_string()));

        let mut src = ScriptedLines::new([""]);
        assert_eq!(read_input::<String>(&mut src, "hello", QUIT, None).unwrap(), Answer::Value(String::new()));
    }

    #[test]
    fn read_input_quits_before_checking_choices_or_type() {
        let mut src = ScriptedLines::new(["q"]);
        assert_eq!(read_choice(&mut src, "hello", QUIT, &["y", "n"]).unwrap(), Answer::Quit);

        let mut src = ScriptedLines::new(["q"]);
        assert_eq!(read_input::<i32>(&mut src, "hello", QUIT, None).unwrap(), Answer::Quit);
    }

    #[test]
    fn read_input_retries_until_valid() {
        let mut src = ScriptedLines::new(["two", "7", "1"]);
        let answer = read_input(&mut src, "number", QUIT, Some(&[0, 1][..])).unwrap();
        assert_eq!(answer, Answer::Value(1));
        assert_eq!(src.remaining(), 0);
        assert_eq!(src.prompts.len(), 3);
        assert!(src.prompts[0].ends_with("['q' quits]"));
        assert!(src.prompts[0].contains("choices=[0, 1]"));
    }

    #[test]
    fn read_input_accepts_a_choice() {
        let mut src = ScriptedLines::new(["maybe", "y"]);
        assert_eq!(read_choice(&mut src, "sure?", QUIT, &["y", "n"]).unwrap(), Answer::Value("y".to_string()));
    }

    #[test]
    fn read_input_surfaces_closed_stream() {
        let mut src = ScriptedLines::new(Vec::<&str>::new());
        let err = read_input::<String>(&mut src, "hello", QUIT, None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn read_list_splits_strings() {
        let mut src = ScriptedLines::new(["hi;there"]);
        let answer = read_list::<String>(&mut src, "hello", Some(";"), QUIT).unwrap();
        assert_eq!(answer, Answer::Value(vec!["hi".to_string(), "there".to_string()]));

        let mut src = ScriptedLines::new(["q"]);
        assert_eq!(read_list::<String>(&mut src, "hello", Some(";"), QUIT).unwrap(), Answer::Quit);
    }

    #[test]
    fn read_list_rejects_whole_line_on_one_bad_token() {
        let mut src = ScriptedLines::new(["1;x;3", "3;1;1"]);
        let answer = read_list::<i64>(&mut src, "numbers", Some(";"), QUIT).unwrap();
        assert_eq!(answer, Answer::Value(vec![3, 1, 1]));
        assert_eq!(src.prompts.len(), 2);
    }

    #[test]
    fn read_list_defaults_to_whitespace() {
        let mut src = ScriptedLines::new(["  4   2 "]);
        assert_eq!(read_list::<i64>(&mut src, "numbers", None, QUIT).unwrap(), Answer::Value(vec![4, 2]));
    }

    #[test]
    fn select_values_in_input_order() {
        let prompt = ListPrompt::new("pick", 2).separator(";");
        assert_eq!(pick_with(&prompt, &["0;1"], &OPTIONS), Selection::Selected(vec![&"option1", &"option2"]));
        assert_eq!(pick_with(&prompt, &["1;0"], &OPTIONS), Selection::Selected(vec![&"option2", &"option1"]));
    }

    #[test]
    fn complement_of_everything_is_empty() {
        let prompt = ListPrompt::new("pick", 2).separator(";").complement();
        assert_eq!(pick_with(&prompt, &["0;1"], &OPTIONS), Selection::Selected(vec![]));
    }

    #[test]
    fn sentinel_declines_selection() {
        let prompt = ListPrompt::new("pick", 2).separator(";").no_selection(NO_SELECTION);
        assert_eq!(pick_with(&prompt, &["-1"], &OPTIONS), Selection::NoSelection);
    }

    #[test]
    fn blank_line_is_no_selection() {
        let prompt = ListPrompt::new("pick", 1).no_selection(NO_SELECTION);
        assert_eq!(pick_with(&prompt, &[""], &OPTIONS), Selection::NoSelection);
    }

    #[test]
    fn sentinel_in_complement_mode_keeps_everything_in_order() {
        let items = ["a", "b", "c", "d"];
        let prompt = ListPrompt::new("drop", 3).complement().no_selection(NO_SELECTION);
        assert_eq!(pick_with(&prompt, &["-1"], &items), Selection::Selected(vec![&"a", &"b", &"c", &"d"]));
    }

    #[test]
    fn complement_indices_ascend_regardless_of_input_order() {
        let prompt = ListPrompt::new("drop", 3).complement();
        let mut src = ScriptedLines::new(["3 0"]);
        assert_eq!(prompt.pick_indices(&mut src, 5).unwrap(), Selection::Selected(vec![1, 2, 4]));
    }

    #[test]
    fn too_many_choices_asks_again_instead_of_truncating() {
        let prompt = ListPrompt::new("pick", 1);
        let mut src = ScriptedLines::new(["0 1", "1"]);
        assert_eq!(prompt.pick_indices(&mut src, 2).unwrap(), Selection::Selected(vec![1]));
        assert_eq!(src.prompts.len(), 2);
    }

    #[test]
    fn out_of_bounds_asks_again() {
        let prompt = ListPrompt::new("pick", 2);
        let mut src = ScriptedLines::new(["2", "-3", "0 5", "1 0"]);
        assert_eq!(prompt.pick_indices(&mut src, 2).unwrap(), Selection::Selected(vec![1, 0]));
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn retries_past_patience_still_accept_a_valid_answer() {
        let prompt = ListPrompt::new("pick", 1);
        let mut answers = vec!["9"; PATIENCE as usize + 1];
        answers.push("1");
        let mut src = ScriptedLines::new(answers);
        assert_eq!(prompt.pick_indices(&mut src, 2).unwrap(), Selection::Selected(vec![1]));
        assert_eq!(src.prompts.len(), PATIENCE as usize + 2);
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn sentinel_is_checked_before_cardinality() {
        let prompt = ListPrompt::new("pick", 1).no_selection(NO_SELECTION);
        let mut src = ScriptedLines::new(["-1 0 1"]);
        assert_eq!(prompt.pick_indices(&mut src, 2).unwrap(), Selection::NoSelection);
    }

    #[test]
    fn quit_wins_over_everything() {
        let prompt = ListPrompt::new("pick", 1).no_selection(NO_SELECTION);
        let mut src = ScriptedLines::new(["q"]);
        assert_eq!(prompt.pick_indices(&mut src, 2).unwrap(), Selection::Quit);

        let prompt = ListPrompt::new("pick", 1).quit("exit");
        let mut src = ScriptedLines::new(["q", "exit"]);
        assert_eq!(prompt.pick_indices(&mut src, 2).unwrap(), Selection::Quit);
        assert!(src.prompts[0].ends_with("['exit' quits]"));
    }

    #[test]
    fn empty_list_only_accepts_opt_outs() {
        let prompt = ListPrompt::new("pick", 1).no_selection(NO_SELECTION);
        let mut src = ScriptedLines::new(["0", "-1"]);
        assert_eq!(prompt.pick_indices(&mut src, 0).unwrap(), Selection::NoSelection);
        assert_eq!(src.prompts.len(), 2);
    }

    #[test]
    fn prompt_describes_range_and_sentinel() {
        let prompt = ListPrompt::new("Select", 1).no_selection(NO_SELECTION);
        let mut src = ScriptedLines::new(["q"]);
        prompt.pick_indices(&mut src, 3).unwrap();
        assert_eq!(src.prompts[0], "Select (choose 0 to 2) [-1 continue without selection] ['q' quits]");

        let prompt = ListPrompt::new("Drop", 0).complement().no_selection(NO_SELECTION);
        let mut src = ScriptedLines::new(["q"]);
        prompt.pick_indices(&mut src, 1).unwrap();
        assert_eq!(src.prompts[0], "Drop (choose 0) [-1 select all] ['q' quits]");
    }

    #[test]
    fn selected_indices_stay_in_bounds() {
        for len in 1..6usize {
            let answers: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            let prompt = ListPrompt::new("pick", len).separator(",");
            let mut src = ScriptedLines::new([answers.join(",")]);
            let Selection::Selected(indices) = prompt.pick_indices(&mut src, len).unwrap() else {
                panic!("expected a selection");
            };
            assert!(indices.iter().all(|index| *index < len));
        }
    }
}
