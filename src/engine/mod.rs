//! The conversion lifecycle: open, copy, close, then optionally overwrite the
//! input and hand back the counters.
//!
//! [`run`] is the single scope that owns both streams. Whatever stops the copy
//! loop (end of input, an I/O error, cancellation) the streams are closed once
//! before the outcome is propagated.
use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
};

use tracing::{debug, warn};

use crate::{
    core::{Direction, Translator},
    error::{ConvertError, OverwriteError},
    options::Settings,
    report::Statistics,
    signal::CancelFlag,
    stream::{FileInput, FileOutput, InputStream, OutputStream},
};

mod overwrite;

pub use overwrite::overwrite_input;

/// Result of a conversion that did not fail.
#[derive(Debug)]
pub struct Report {
    pub statistics: Statistics,
    /// `None` unless overwrite mode was requested.
    pub overwrite: Option<Result<(), OverwriteError>>,
}

/// Run a full conversion as described by `settings`.
///
/// # Errors
///
/// Open, read and write failures as well as cancellation abort the run. The
/// streams are closed before the error is returned, and in overwrite mode the
/// partial temp output is removed. Overwrite failures are
/// not errors here; they are carried in [`Report::overwrite`].
pub fn run(settings: &Settings, cancel: &CancelFlag) -> Result<Report, ConvertError> {
    let mut input = FileInput::new(settings.input.clone());
    let mut output = FileOutput::new(settings.output.clone());

    let copied = input
        .open()
        .and_then(|()| output.open())
        .and_then(|()| copy(&mut input, &mut output, settings.direction, cancel));
    let closed = close(&mut input, &mut output, copied);
    if closed.is_err() && settings.overwrite_input {
        if let Some(temp) = output.name() {
            discard_temp(temp);
        }
    }
    closed?;

    let statistics = Statistics {
        input: input.counters(),
        output: output.counters(),
    };
    debug!(?statistics, "conversion finished");

    let overwrite = match (settings.overwrite_input, input.name(), output.name()) {
        (true, Some(original), Some(temp)) => Some(overwrite_input(original, temp)),
        (true, _, _) => {
            warn!("overwrite needs both an input and an output file name; skipped");
            None
        }
        (false, _, _) => None,
    };

    Ok(Report {
        statistics,
        overwrite,
    })
}

/// Copy `input` to `output` and close both, regardless of how copying ended.
///
/// # Errors
///
/// The first error wins: a copy failure is reported even if closing then
/// fails as well.
pub fn process<R: BufRead, W: Write>(
    input: &mut InputStream<R>,
    output: &mut OutputStream<W>,
    direction: Direction,
    cancel: &CancelFlag,
) -> Result<(), ConvertError> {
    let copied = copy(input, output, direction, cancel);
    close(input, output, copied)
}

/// Remove the partial output of a failed overwrite run.
fn discard_temp(temp: &Path) {
    match fs::remove_file(temp) {
        Ok(()) => debug!(path = %temp.display(), "removed partial output"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %temp.display(), %err, "unable to remove partial output"),
    }
}

fn close<R: BufRead, W: Write>(
    input: &mut InputStream<R>,
    output: &mut OutputStream<W>,
    outcome: Result<(), ConvertError>,
) -> Result<(), ConvertError> {
    let flushed = output.close();
    input.close();
    outcome.and(flushed)
}

/// The byte loop: read, translate, write until end of input or failure.
fn copy<R: BufRead, W: Write>(
    input: &mut InputStream<R>,
    output: &mut OutputStream<W>,
    direction: Direction,
    cancel: &CancelFlag,
) -> Result<(), ConvertError> {
    let mut translator = Translator::new(direction);
    loop {
        if cancel.is_cancelled() {
            warn!(bytes = input.counters().bytes, "conversion cancelled");
            return Err(ConvertError::Interrupted);
        }

        let Some(byte) = input.read_byte()? else {
            // A signal may have landed while the last read was blocked.
            if cancel.is_cancelled() {
                warn!(bytes = input.counters().bytes, "conversion cancelled at end of input");
                return Err(ConvertError::Interrupted);
            }
            if translator.is_pending() {
                debug!("dropping trailing carriage return");
            }
            return Ok(());
        };

        let step = translator.step(byte);
        if let Some(prefix) = step.prefix {
            output.write_byte(prefix)?;
        }
        if step.line {
            let lines = input.record_line();
            output.set_lines(lines);
        }
        if let Some(byte) = step.byte {
            output.write_byte(byte)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn convert_bytes(direction: Direction, data: &[u8]) -> (Vec<u8>, Statistics) {
        let mut out = Vec::new();
        let mut input = InputStream::from_reader(None, Cursor::new(data.to_vec()));
        let mut output = OutputStream::from_writer(None, &mut out);
        process(&mut input, &mut output, direction, &CancelFlag::new()).unwrap();
        let stats = Statistics {
            input: input.counters(),
            output: output.counters(),
        };
        drop(output);
        (out, stats)
    }

    #[test]
    fn process_closes_both_sides() {
        let mut input = InputStream::from_reader(None, Cursor::new(b"a\n".to_vec()));
        let mut output = OutputStream::from_writer(None, Vec::new());
        process(&mut input, &mut output, Direction::EmitCrlf, &CancelFlag::new()).unwrap();
        assert!(!input.is_open());
        assert!(!output.is_open());
    }

    #[test]
    fn emit_counts() {
        let (out, stats) = convert_bytes(Direction::EmitCrlf, b"x\ny\n");
        assert_eq!(out, b"x\r\ny\r\n");
        assert_eq!(stats.input.lines, 2);
        assert_eq!(stats.output.lines, 2);
        assert_eq!(stats.input.bytes, 4);
        assert_eq!(stats.output.bytes, 6);
    }

    #[test]
    fn strip_trailing_cr_is_dropped() {
        let (out, stats) = convert_bytes(Direction::StripCr, b"a\r\nb\r");
        assert_eq!(out, b"a\nb");
        assert_eq!(stats.input.bytes, 5);
        assert_eq!(stats.output.bytes, 2);
        assert_eq!(stats.input.lines, 1);
    }

    /// Raises the flag from inside `read`, then reports end of input.
    struct CancelAtEof(CancelFlag);

    impl io::Read for CancelAtEof {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            self.0.cancel();
            Ok(0)
        }
    }

    #[test]
    fn cancel_during_final_read_fails() {
        let cancel = CancelFlag::new();
        let reader = io::BufReader::new(CancelAtEof(cancel.clone()));
        let mut input = InputStream::from_reader(None, reader);
        let mut output = OutputStream::from_writer(None, Vec::new());
        let err = process(&mut input, &mut output, Direction::StripCr, &cancel).unwrap_err();
        assert!(matches!(err, ConvertError::Interrupted), "{err}");
        assert!(!output.is_open());
    }

    #[test]
    fn cancelled_before_start_reads_nothing() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut input = InputStream::from_reader(None, Cursor::new(b"abc".to_vec()));
        let mut output = OutputStream::from_writer(None, Vec::new());
        let err = process(&mut input, &mut output, Direction::EmitCrlf, &cancel).unwrap_err();
        assert!(matches!(err, ConvertError::Interrupted));
        assert_eq!(input.counters().bytes, 0);
        assert!(!input.is_open());
        assert!(!output.is_open());
    }
}
