//! Reading answers from the user and printing back

use dialoguer::Input;
use std::io::{self, BufRead, Write};

/// Where the menu asks its questions
pub trait Prompter {
    /// Ask for one line of input. `None` means input is exhausted.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Print one line
    fn say(&mut self, message: &str) -> io::Result<()>;
}

/// Line-oriented prompter over any reader/writer pair.
///
/// Used when stdin is piped, and by tests.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }
}

/// Terminal prompter with line editing, backed by dialoguer
#[derive(Default)]
pub struct TermPrompter;

impl TermPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TermPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map(Some)
            .map_err(io::Error::other)
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        println!("{}", message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_prompter_reads_lines() {
        let mut prompter = LinePrompter::new("first\r\nsecond\n".as_bytes(), Vec::new());

        assert_eq!(prompter.ask("One").unwrap().as_deref(), Some("first"));
        assert_eq!(prompter.ask("Two").unwrap().as_deref(), Some("second"));
        assert_eq!(prompter.ask("Three").unwrap(), None);

        let output = String::from_utf8(prompter.into_output()).unwrap();
        assert!(output.starts_with("One: Two: Three: "));
    }

    #[test]
    fn test_line_prompter_says() {
        let mut prompter = LinePrompter::new(&b""[..], Vec::new());
        prompter.say("hello").unwrap();
        assert_eq!(prompter.into_output(), b"hello\n");
    }
}
