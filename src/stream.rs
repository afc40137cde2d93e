//! One side of a conversion: a name, an exclusively owned handle and its
//! counters.
//!
//! Handles go through `None -> Some -> None` exactly once. The byte counters
//! only move when a read or write actually succeeded.
use std::{
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::{ConvertError, Side},
    report::Counters,
};

/// Input side opened by the engine itself: a file or locked stdin.
pub type FileInput = InputStream<Box<dyn BufRead>>;

/// Output side opened by the engine itself: a file or locked stdout.
pub type FileOutput = OutputStream<Box<dyn Write>>;

fn display_name(name: Option<&Path>, side: Side) -> String {
    match (name, side) {
        (Some(path), _) => path.display().to_string(),
        (None, Side::Input) => "<stdin>".to_owned(),
        (None, Side::Output) => "<stdout>".to_owned(),
    }
}

fn not_open() -> io::Error {
    io::Error::new(ErrorKind::NotConnected, "stream is not open")
}

pub struct InputStream<R> {
    name: Option<PathBuf>,
    reader: Option<R>,
    counters: Counters,
}

impl<R: BufRead> InputStream<R> {
    /// Wrap an already open reader.
    pub fn from_reader(name: Option<PathBuf>, reader: R) -> Self {
        Self {
            name,
            reader: Some(reader),
            counters: Counters::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&Path> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Fetch the next byte; `Ok(None)` is a clean end of stream.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Read` on any failure other than `Interrupted`,
    /// without touching the counters.
    pub fn read_byte(&mut self) -> Result<Option<u8>, ConvertError> {
        let Self {
            name,
            reader,
            counters,
        } = self;
        let read_error = |source| ConvertError::Read {
            name: display_name(name.as_deref(), Side::Input),
            source,
        };
        let reader = reader.as_mut().ok_or_else(|| read_error(not_open()))?;

        loop {
            match reader.fill_buf() {
                Ok([]) => return Ok(None),
                Ok(buf) => {
                    let byte = buf[0];
                    reader.consume(1);
                    counters.bytes += 1;
                    return Ok(Some(byte));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(read_error(err)),
            }
        }
    }

    pub(crate) fn record_line(&mut self) -> u64 {
        self.counters.lines += 1;
        self.counters.lines
    }

    /// Release the handle. Safe to call on a stream that never opened.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(name = %display_name(self.name(), Side::Input), "closed input");
        }
    }
}

impl FileInput {
    /// An unopened input; an empty or missing name selects stdin.
    #[must_use]
    pub fn new(name: Option<PathBuf>) -> Self {
        Self {
            name: name.filter(|p| !p.as_os_str().is_empty()),
            reader: None,
            counters: Counters::default(),
        }
    }

    /// Open the named file read-only, or bind to stdin.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Open` with the path and OS error.
    pub fn open(&mut self) -> Result<(), ConvertError> {
        let reader: Box<dyn BufRead> = match &self.name {
            Some(path) => {
                let file = File::open(path).map_err(|source| ConvertError::Open {
                    side: Side::Input,
                    path: path.clone(),
                    source,
                })?;
                Box::new(BufReader::new(file))
            }
            None => Box::new(io::stdin().lock()),
        };
        debug!(name = %display_name(self.name(), Side::Input), "opened input");
        self.reader = Some(reader);
        Ok(())
    }
}

pub struct OutputStream<W: Write> {
    name: Option<PathBuf>,
    writer: Option<W>,
    counters: Counters,
}

impl<W: Write> OutputStream<W> {
    /// Wrap an already open writer.
    pub fn from_writer(name: Option<PathBuf>, writer: W) -> Self {
        Self {
            name,
            writer: Some(writer),
            counters: Counters::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&Path> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn write_error(&self, source: io::Error) -> ConvertError {
        ConvertError::Write {
            name: display_name(self.name(), Side::Output),
            source,
        }
    }

    /// Write one byte.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Write` without touching the counters.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), ConvertError> {
        let result = match self.writer.as_mut() {
            Some(writer) => writer.write_all(&[byte]),
            None => Err(not_open()),
        };
        match result {
            Ok(()) => {
                self.counters.bytes += 1;
                Ok(())
            }
            Err(err) => Err(self.write_error(err)),
        }
    }

    pub(crate) fn set_lines(&mut self, lines: u64) {
        self.counters.lines = lines;
    }

    /// Flush and release the handle. Safe to call on a stream that never
    /// opened or was already closed.
    ///
    /// # Errors
    ///
    /// A failed flush is a write error: buffered bytes were lost.
    pub fn close(&mut self) -> Result<(), ConvertError> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        let flushed = writer.flush();
        drop(writer);
        debug!(name = %display_name(self.name(), Side::Output), "closed output");
        flushed.map_err(|err| self.write_error(err))
    }
}

impl FileOutput {
    /// An unopened output; an empty or missing name selects stdout.
    #[must_use]
    pub fn new(name: Option<PathBuf>) -> Self {
        Self {
            name: name.filter(|p| !p.as_os_str().is_empty()),
            writer: None,
            counters: Counters::default(),
        }
    }

    /// Create or truncate the named file for read/write, or bind to stdout.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Open` with the path and OS error.
    pub fn open(&mut self) -> Result<(), ConvertError> {
        let writer: Box<dyn Write> = match &self.name {
            Some(path) => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|source| ConvertError::Open {
                        side: Side::Output,
                        path: path.clone(),
                        source,
                    })?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };
        debug!(name = %display_name(self.name(), Side::Output), "opened output");
        self.writer = Some(writer);
        Ok(())
    }
}

impl<W: Write> Drop for OutputStream<W> {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}
