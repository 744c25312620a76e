use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, ErrorKind, Write};

/// Where the interpreter gets its input from, one line at a time.
pub trait LineSource {
    /// Show `prompt` and return the next line, or `None` at end of input.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive input with line editing and history.
pub struct EditorSource {
    editor: DefaultEditor,
    prompt: bool,
}

impl EditorSource {
    pub fn new(prompt: bool) -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            prompt,
        })
    }
}

impl LineSource for EditorSource {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let prompt = if self.prompt { prompt } else { "" };
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.editor.add_history_entry(line.as_str())?;
                    }
                    return Ok(Some(line));
                }
                // Ctrl-C drops the line being edited
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(ReadlineError::Io(err)) if err.kind() == ErrorKind::InvalidData => {
                    log::warn!("dropped a line that is not valid UTF-8");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Plain line reading from any buffered reader, for pipes and files.
///
/// The prompt goes to `out` unless prompting is turned off. Bytes that are
/// not valid UTF-8 are replaced with U+FFFD rather than ending the input.
pub struct ReaderSource<R, W> {
    reader: R,
    out: W,
    prompt: bool,
}

impl<R: BufRead, W: Write> ReaderSource<R, W> {
    pub fn new(reader: R, out: W, prompt: bool) -> Self {
        Self { reader, out, prompt }
    }
}

impl<R: BufRead, W: Write> LineSource for ReaderSource<R, W> {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.prompt {
            write!(self.out, "{}", prompt)?;
            self.out.flush()?;
        }
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}
