// UI layer: everything that talks to the person at the keyboard.
// The workflow only sees the `Terminal` trait, so the same flow runs
// against a real TTY (dialoguer + indicatif), piped stdin, or a test
// buffer.

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

/// Line-oriented console used by the workflow.
pub trait Terminal {
    /// Show `prompt` and block for one line of input, without the line ending.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Print one line of output.
    fn say(&mut self, line: &str) -> io::Result<()>;

    /// Print a non-fatal notice with the `Info:` prefix.
    fn info(&mut self, message: &str) -> io::Result<()> {
        self.say(&format!("Info: {}", message))
    }

    /// Indicate that a slow operation is running until the guard drops.
    fn busy(&self, _message: &str) -> Busy {
        Busy::idle()
    }
}

/// Guard returned by [`Terminal::busy`]. Clears the spinner when dropped.
pub struct Busy(Option<ProgressBar>);

impl Busy {
    pub fn idle() -> Self {
        Busy(None)
    }

    fn spinner(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Busy(Some(spinner))
    }
}

impl Drop for Busy {
    fn drop(&mut self) {
        if let Some(spinner) = self.0.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Interactive terminal built on `dialoguer`. Used when stdin is a TTY.
pub struct DialoguerTerminal {
    color: bool,
}

impl DialoguerTerminal {
    pub fn new() -> Self {
        DialoguerTerminal {
            color: io::stdout().is_terminal(),
        }
    }
}

impl Default for DialoguerTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for DialoguerTerminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        // `allow_empty` so a bare Enter reaches us, the save prompt relies on it.
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        println!("{}", line);
        Ok(())
    }

    fn info(&mut self, message: &str) -> io::Result<()> {
        if self.color {
            println!("{} {}", "Info:".cyan(), message);
        } else {
            println!("Info: {}", message);
        }
        Ok(())
    }

    fn busy(&self, message: &str) -> Busy {
        Busy::spinner(message)
    }
}

/// Plain reader/writer terminal. Used for piped stdin and in tests.
pub struct LineTerminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineTerminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LineTerminal { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Terminal for LineTerminal<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("input closed while waiting for {}", prompt),
            ));
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }
}

/// Report a fatal error on stderr with the `Error:` prefix.
pub fn print_error(err: &anyhow::Error) {
    if io::stderr().is_terminal() {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
    } else {
        eprintln!("Error: {:#}", err);
    }
}
