//! Terminator translation primitives.
//!
//! Two views of the same state machine live here: [`Translator::step`] feeds a
//! single byte and tells the caller what to emit, which is what the file engine
//! drives; [`Translator::translate_chunk`] runs the identical rules over a whole
//! buffer with `memchr`, which is what the in-memory helpers and the async
//! engine use.
use std::{fmt, str::FromStr};

pub mod crlf;
pub mod lf;

pub const CR: u8 = b'\r';
pub const LF: u8 = b'\n';

/// Error type for chunk translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The provided output buffer was too small.
    ///
    /// `required` is the number of bytes necessary to hold the worst-case
    /// expansion of the input for the active direction.
    OutputBufferTooSmall { required: usize },
}

impl Error {
    #[must_use]
    pub fn required_size(&self) -> usize {
        match self {
            Error::OutputBufferTooSmall { required } => *required,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutputBufferTooSmall { required } => {
                write!(f, "output buffer is too small; required {required} bytes")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for chunk translation.
pub type Result<T> = std::result::Result<T, Error>;

/// Which way line terminators are rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Expand every LF into CR LF.
    #[default]
    EmitCrlf,
    /// Drop every CR together with its role as a terminator; the byte after it
    /// is passed through without being inspected.
    StripCr,
}

impl Direction {
    /// Worst-case output size for translating `chunk_size` bytes.
    #[must_use]
    pub fn max_output_size_for_chunk(self, chunk_size: usize) -> usize {
        match self {
            Direction::EmitCrlf => chunk_size * 2,
            Direction::StripCr => chunk_size,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::EmitCrlf => f.write_str("crlf"),
            Direction::StripCr => f.write_str("lf"),
        }
    }
}

/// Error returned when a direction name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError(String);

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown direction `{}`; expected `crlf` or `lf`", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crlf" | "dos" | "ltod" => Ok(Direction::EmitCrlf),
            "lf" | "unix" | "dtol" => Ok(Direction::StripCr),
            _ => Err(ParseDirectionError(s.to_owned())),
        }
    }
}

/// What the caller has to do after feeding one byte to [`Translator::step`].
///
/// The order is significant: write `prefix`, then record the line event, then
/// write `byte`. A failed write aborts the remaining actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    pub prefix: Option<u8>,
    pub line: bool,
    pub byte: Option<u8>,
}

impl Step {
    fn pass(byte: u8) -> Self {
        Self {
            byte: Some(byte),
            ..Self::default()
        }
    }
}

/// Status returned by chunk translation describing how many bytes were
/// written, how many terminator events were seen and whether the chunk ended
/// with a pending `\r`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateChunkStatus {
    output_len: usize,
    lines: u64,
    ended_with_cr: bool,
}

impl TranslateChunkStatus {
    #[must_use]
    pub(crate) fn new(output_len: usize, lines: u64, ended_with_cr: bool) -> Self {
        Self {
            output_len,
            lines,
            ended_with_cr,
        }
    }

    /// Number of bytes written into the output buffer for this chunk.
    #[must_use]
    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// Number of terminator events in this chunk.
    #[must_use]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Whether the chunk ended with a `\r` still waiting for its successor.
    ///
    /// Only ever `true` when stripping. Pass it as `preceded_by_cr` for the
    /// next chunk; at end of stream the pending `\r` is dropped.
    #[must_use]
    pub fn ended_with_cr(&self) -> bool {
        self.ended_with_cr
    }
}

/// Stateful terminator translator for one stream.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    direction: Direction,
    pending_cr: bool,
}

impl Translator {
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            pending_cr: false,
        }
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether a `\r` has been consumed and its successor not seen yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_cr
    }

    /// Feed a single input byte.
    pub fn step(&mut self, byte: u8) -> Step {
        match self.direction {
            Direction::EmitCrlf if byte == LF => Step {
                prefix: Some(CR),
                line: true,
                byte: Some(LF),
            },
            Direction::EmitCrlf => Step::pass(byte),
            Direction::StripCr if self.pending_cr => {
                self.pending_cr = false;
                Step {
                    line: true,
                    ..Step::pass(byte)
                }
            }
            Direction::StripCr if byte == CR => {
                self.pending_cr = true;
                Step::default()
            }
            Direction::StripCr => Step::pass(byte),
        }
    }

    /// Translate a buffer, continuing from the state left by previous calls.
    ///
    /// # Errors
    ///
    /// Returns `Err(Error::OutputBufferTooSmall { required })` if `output` is
    /// smaller than [`Direction::max_output_size_for_chunk`]. The translator
    /// state is left untouched in that case.
    pub fn translate_chunk(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<TranslateChunkStatus> {
        let status = match self.direction {
            Direction::EmitCrlf => crlf::translate_chunk(input, output)?,
            Direction::StripCr => lf::translate_chunk(input, output, self.pending_cr)?,
        };
        self.pending_cr = status.ended_with_cr();
        Ok(status)
    }
}

/// Translate a whole byte slice, returning an owned `Vec<u8>`.
///
/// A trailing `\r` under [`Direction::StripCr`] has no successor and is
/// dropped, exactly as the streaming engine does at end of input.
#[must_use]
pub fn convert(direction: Direction, input: &[u8]) -> Vec<u8> {
    let mut output = vec![0u8; direction.max_output_size_for_chunk(input.len())];
    let status = Translator::new(direction)
        .translate_chunk(input, &mut output)
        .unwrap_or_else(|err| unreachable!("{err} (should be impossible)"));
    output.truncate(status.output_len());
    output
}

/// Translate a UTF-8 string and return an owned `String`.
///
/// Only ASCII `\r` bytes are removed or inserted, so UTF-8 validity is kept.
#[must_use]
pub fn convert_str(direction: Direction, input: &str) -> String {
    String::from_utf8(convert(direction, input.as_bytes()))
        .unwrap_or_else(|_| unreachable!("translation produced invalid UTF-8 (should be impossible)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_steps(direction: Direction, input: &[u8]) -> (Vec<u8>, u64) {
        let mut translator = Translator::new(direction);
        let mut out = Vec::new();
        let mut lines = 0;
        for &b in input {
            let step = translator.step(b);
            out.extend(step.prefix);
            lines += u64::from(step.line);
            out.extend(step.byte);
        }
        (out, lines)
    }

    #[test]
    fn emit_crlf_steps() {
        assert_eq!(run_steps(Direction::EmitCrlf, b"a\nb\r\n"), (b"a\r\nb\r\r\n".to_vec(), 2));
    }

    #[test]
    fn strip_cr_steps_keep_quirk() {
        assert_eq!(run_steps(Direction::StripCr, b"a\r\nb\rxc\r"), (b"a\nbxc".to_vec(), 2));
        assert_eq!(run_steps(Direction::StripCr, b"\r\r\n"), (b"\r\n".to_vec(), 1));
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("CRLF".parse(), Ok(Direction::EmitCrlf));
        assert_eq!("ltod".parse(), Ok(Direction::EmitCrlf));
        assert_eq!("dtol".parse(), Ok(Direction::StripCr));
        assert!("mac".parse::<Direction>().is_err());
    }

    #[test]
    fn chunk_buffer_too_small_leaves_state() {
        let mut translator = Translator::new(Direction::StripCr);
        let mut out = [0u8; 1];
        translator.translate_chunk(b"\r", &mut out).unwrap();
        assert!(translator.is_pending());
        let err = translator.translate_chunk(b"abc", &mut out).unwrap_err();
        assert_eq!(err.required_size(), 3);
        assert!(translator.is_pending());
    }
}
