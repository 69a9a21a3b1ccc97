//! The interactive menu loop

use crate::prompt::Prompter;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use xzmenu_core::utils::format_size;
use xzmenu_core::{resolve_path, OperationReport, Pipeline, Request};

const MENU: &str = "\nChoose an operation:
1. Compress a file
2. Compress a directory
3. Decompress a file
4. Decompress a directory
Type 'q' or 'quit' to exit.";

const INVALID_CHOICE: &str =
    "Invalid choice! Please enter a number between 1 and 4 or 'q' to quit.";

/// An entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CompressFile,
    CompressDirectory,
    DecompressFile,
    DecompressDirectory,
    Quit,
}

impl MenuChoice {
    /// Parse what the user typed at the main prompt
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" => Some(Self::CompressFile),
            "2" => Some(Self::CompressDirectory),
            "3" => Some(Self::DecompressFile),
            "4" => Some(Self::DecompressDirectory),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum MenuState {
    AwaitingChoice,
    CollectingArgs(MenuChoice),
    Executing(Request),
    Exit,
}

/// Drives the menu until the user quits or input runs out
pub struct Menu<'a, P> {
    prompter: P,
    pipeline: Pipeline<'a>,
    show_progress: bool,
}

impl<'a, P: Prompter> Menu<'a, P> {
    pub fn new(prompter: P, pipeline: Pipeline<'a>) -> Self {
        Self {
            prompter,
            pipeline,
            show_progress: false,
        }
    }

    /// Show a spinner while an operation runs
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Run the loop. Operation failures are reported and the loop goes on;
    /// only failing to talk to the user ends it with an error.
    pub fn run(&mut self) -> io::Result<()> {
        let mut state = MenuState::AwaitingChoice;
        loop {
            debug!("Menu state: {:?}", state);
            state = match state {
                MenuState::AwaitingChoice => self.await_choice()?,
                MenuState::CollectingArgs(choice) => self.collect_args(choice)?,
                MenuState::Executing(request) => self.execute(request)?,
                MenuState::Exit => return Ok(()),
            };
        }
    }

    fn await_choice(&mut self) -> io::Result<MenuState> {
        self.prompter.say(MENU)?;
        let Some(input) = self.prompter.ask("Enter your choice")? else {
            return self.quit();
        };

        match MenuChoice::parse(&input) {
            Some(MenuChoice::Quit) => self.quit(),
            Some(choice) => Ok(MenuState::CollectingArgs(choice)),
            None => {
                self.prompter.say(INVALID_CHOICE)?;
                Ok(MenuState::AwaitingChoice)
            }
        }
    }

    fn collect_args(&mut self, choice: MenuChoice) -> io::Result<MenuState> {
        let request = match choice {
            MenuChoice::CompressFile => {
                let Some(source) = self.ask_path("Enter the file path to compress")? else {
                    return Ok(MenuState::Exit);
                };
                Request::CompressFile { source }
            }
            MenuChoice::CompressDirectory => {
                let Some(source) = self.ask_path("Enter the directory path to compress")? else {
                    return Ok(MenuState::Exit);
                };
                let Some(output_dir) =
                    self.ask_path("Enter the directory to save the compressed file")?
                else {
                    return Ok(MenuState::Exit);
                };
                Request::CompressDirectory { source, output_dir }
            }
            MenuChoice::DecompressFile | MenuChoice::DecompressDirectory => {
                let Some(archive) = self.ask_path("Enter the path of the .xz archive to decompress")?
                else {
                    return Ok(MenuState::Exit);
                };
                Request::Decompress { archive }
            }
            MenuChoice::Quit => return self.quit(),
        };

        Ok(MenuState::Executing(request))
    }

    /// Ask until a usable path is typed. `None` means input ran out.
    fn ask_path(&mut self, prompt: &str) -> io::Result<Option<PathBuf>> {
        loop {
            let Some(raw) = self.prompter.ask(prompt)? else {
                return Ok(None);
            };
            match resolve_path(&raw) {
                Ok(path) => return Ok(Some(path)),
                Err(e) => self.prompter.say(&format!("{}: {}", e.kind(), e))?,
            }
        }
    }

    fn execute(&mut self, request: Request) -> io::Result<MenuState> {
        self.prompter.say(&describe(&request))?;

        let spinner = self.spinner(&request);
        let result = self.pipeline.execute(&request);
        spinner.finish_and_clear();

        match result {
            Ok(report) => self.print_report(&request, &report)?,
            Err(e) => {
                debug!("Operation failed: {:?}", e);
                self.prompter.say(&format!("{}: {}", e.kind(), e))?;
            }
        }

        match self.prompter.ask("Press enter to return to the main menu")? {
            Some(_) => Ok(MenuState::AwaitingChoice),
            None => Ok(MenuState::Exit),
        }
    }

    fn spinner(&self, request: &Request) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
            spinner.set_style(style);
        }
        let verb = match request {
            Request::Decompress { .. } => "Decompressing",
            _ => "Compressing",
        };
        spinner.set_message(format!("{} with {}", verb, self.pipeline.compressor_name()));
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    fn print_report(&mut self, request: &Request, report: &OperationReport) -> io::Result<()> {
        match request {
            Request::Decompress { .. } => {
                self.prompter.say(&format!(
                    "Decompressed and extracted {} item(s) ({}):",
                    report.outputs.len(),
                    format_size(report.bytes)
                ))?;
                for output in &report.outputs {
                    self.prompter.say(&format!("  {}", output.display()))?;
                }
                for removed in &report.removed {
                    self.prompter.say(&format!("Deleted {}", removed.display()))?;
                }
            }
            _ => {
                for output in &report.outputs {
                    self.prompter.say(&format!(
                        "Compressed file saved as {} ({})",
                        output.display(),
                        format_size(report.bytes)
                    ))?;
                }
            }
        }
        Ok(())
    }

    fn quit(&mut self) -> io::Result<MenuState> {
        self.prompter.say("Exiting. Goodbye!")?;
        Ok(MenuState::Exit)
    }
}

fn describe(request: &Request) -> String {
    match request {
        Request::CompressFile { source } => format!("Compressing file {}", source.display()),
        Request::CompressDirectory { source, output_dir } => format!(
            "Compressing directory {} into {}",
            source.display(),
            output_dir.display()
        ),
        Request::Decompress { archive } => format!("Decompressing {}", archive.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::LinePrompter;
    use std::fs;
    use tempfile::TempDir;
    use xzmenu_core::XzCodec;

    fn run_menu(input: &str) -> String {
        let codec = XzCodec::new();
        let prompter = LinePrompter::new(input.as_bytes(), Vec::new());
        let mut menu = Menu::new(prompter, Pipeline::new(&codec));
        menu.run().unwrap();
        String::from_utf8(menu.into_prompter().into_output()).unwrap()
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::CompressFile));
        assert_eq!(MenuChoice::parse(" 4 "), Some(MenuChoice::DecompressDirectory));
        assert_eq!(MenuChoice::parse("Q"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("QUIT"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("9"), None);
        assert_eq!(MenuChoice::parse(""), None);
        assert_eq!(MenuChoice::parse("quitter"), None);
    }

    #[test]
    fn test_quit_immediately() {
        let output = run_menu("q\n");
        assert!(output.contains("Goodbye"));
        assert!(!output.contains("Press enter"));
    }

    #[test]
    fn test_invalid_choice_reprompts() {
        let output = run_menu("9\nq\n");
        assert!(output.contains(INVALID_CHOICE));
        assert_eq!(output.matches("Enter your choice").count(), 2);
    }

    #[test]
    fn test_end_of_input_quits() {
        let output = run_menu("");
        assert!(output.contains("Goodbye"));
    }

    #[test]
    fn test_error_returns_to_menu() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.txt");
        let input = format!("1\n{}\n\nq\n", missing.display());

        let output = run_menu(&input);
        assert!(output.contains("invalid path"));
        assert_eq!(output.matches("Enter your choice").count(), 2);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_path_is_asked_again() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a.txt");
        fs::write(&source, b"abc").unwrap();
        let input = format!("1\n\"\"\n\"{}\"\n\nq\n", source.display());

        let output = run_menu(&input);
        assert!(output.contains("no path given"));
        assert!(output.contains("Compressed file saved as"));
        assert!(temp_dir.path().join("a.tar.xz").exists());
    }

    #[test]
    fn test_compress_then_decompress_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("photos");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("cat.jpg"), b"\xFF\xD8meow").unwrap();
        let out = temp_dir.path().join("out");

        let archive = out.join("photos.tar.xz");
        let input = format!(
            "2\n{}\n{}\n\n4\n{}\n\nquit\n",
            source.display(),
            out.display(),
            archive.display()
        );

        let output = run_menu(&input);
        assert!(output.contains("Compressed file saved as"));
        assert!(output.contains("Decompressed and extracted 1 item(s)"));
        assert!(output.contains("Deleted"));
        assert_eq!(fs::read(out.join("photos/cat.jpg")).unwrap(), b"\xFF\xD8meow");
        assert!(!archive.exists());
        assert!(!out.join("photos.tar").exists());
    }
}
