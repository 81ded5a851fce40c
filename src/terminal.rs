use std::io;
use std::io::{BufRead, Write};

/// Line-based conversation with the user: show a prompt, get one line back.
///
/// Implementations only fail for environment problems (closed stream,
/// interrupted terminal); callers treat any error as fatal.
pub(crate) trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Reads from the real terminal, falling back to plain stdin when not attached to a tty.
pub(crate) struct Terminal {
    term: console::Term,
}

impl Terminal {
    pub(crate) fn new() -> Self {
        Self {
            term: console::Term::stdout(),
        }
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        if self.term.is_term() {
            dialoguer::Input::<String>::with_theme(&dialoguer::theme::ColorfulTheme::default())
                .with_prompt(prompt)
                .allow_empty(true)
                .report(false)
                .interact_text()
                .map_err(io::Error::other)
        } else {
            print!("{prompt} ");
            io::stdout().flush()?;

            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line)? == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin was closed"));
            }
            Ok(line.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

/// Replays canned answers; running out of answers behaves like a closed stdin.
#[cfg(test)]
pub(crate) struct ScriptedLines {
    answers: std::collections::VecDeque<String>,
    pub(crate) prompts: Vec<String>,
}

#[cfg(test)]
impl ScriptedLines {
    pub(crate) fn new<S: AsRef<str>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: answers.into_iter().map(|s| s.as_ref().to_string()).collect(),
            prompts: Vec::new(),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(test)]
impl LineSource for ScriptedLines {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}
