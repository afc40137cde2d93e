#![allow(dead_code)]

use std::io::{self, BufReader, Cursor, Read, Write};

use eolconv::{
    engine,
    stream::{InputStream, OutputStream},
    CancelFlag, ConvertError, Direction, Statistics,
};

/// Reads from each inner reader in turn, so callers control read boundaries.
pub struct TestReader<R, I> {
    readers: I,
    current: Option<R>,
}

impl<R: Read, I: Iterator<Item = R>> TestReader<R, I> {
    pub fn new(mut readers: I) -> TestReader<R, I> {
        let current = readers.next();
        TestReader { readers, current }
    }
}

impl<R: Read, I: Iterator<Item = R>> Read for TestReader<R, I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.current {
                Some(ref mut r) => {
                    let n = r.read(buf)?;
                    if n > 0 {
                        return Ok(n);
                    }
                }
                None => return Ok(0),
            }
            self.current = self.readers.next();
        }
    }
}

/// Yields `data`, then fails every read after it.
pub struct FailingReader {
    data: Cursor<Vec<u8>>,
}

impl FailingReader {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: Cursor::new(data.to_vec()),
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::other("injected read failure")),
            n => Ok(n),
        }
    }
}

/// Accepts `limit` bytes, then fails every write.
pub struct FailingWriter {
    pub written: Vec<u8>,
    limit: usize,
}

impl FailingWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            written: Vec::new(),
            limit,
        }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.written.len();
        if room == 0 {
            return Err(io::Error::other("injected write failure"));
        }
        let n = buf.len().min(room);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Outcome of running the byte engine over in-memory streams.
pub struct Run {
    pub result: Result<(), ConvertError>,
    pub stats: Statistics,
}

pub fn process<R: Read, W: Write>(direction: Direction, reader: R, writer: &mut W) -> Run {
    let mut input = InputStream::from_reader(None, BufReader::new(reader));
    let mut output = OutputStream::from_writer(None, writer);
    let result = engine::process(&mut input, &mut output, direction, &CancelFlag::new());
    let stats = Statistics {
        input: input.counters(),
        output: output.counters(),
    };
    Run { result, stats }
}

/// Run the byte engine over `data`, asserting success.
pub fn process_bytes(direction: Direction, data: &[u8]) -> (Vec<u8>, Statistics) {
    let mut out = Vec::new();
    let run = process(direction, data, &mut out);
    assert!(run.result.is_ok(), "conversion failed: {:?}", run.result);
    (out, run.stats)
}
