//! Line-oriented operator I/O.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The operator closed the input stream (EOF).
    #[error("input closed")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Prompt/print pair over any reader and writer.
///
/// Production wires stdin/stdout; tests feed a scripted byte slice and capture
/// the output buffer.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `label` (no newline) and read one answer line.
    ///
    /// The trailing line terminator is stripped; other whitespace is kept so
    /// callers decide what blank means. Bytes that are not valid UTF-8 are
    /// replaced with U+FFFD instead of failing the read.
    pub fn prompt(&mut self, label: &str) -> Result<String, ConsoleError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Err(ConsoleError::InputClosed);
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    pub fn say(&mut self, line: impl Display) -> Result<(), ConsoleError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Raw writer, for table rendering.
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
