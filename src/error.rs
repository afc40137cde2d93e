//! Error types for the conversion engine.
//!
//! Every message carries the stream name and the OS error code, which is what
//! ends up on the console after the `error-> ` prefix.
use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Which end of the conversion a stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Input,
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Input => f.write_str("input"),
            Side::Output => f.write_str("output"),
        }
    }
}

/// Fatal errors: any of these discards the current run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unable to open {side} file: {} ({})", .path.display(), os_code(.source))]
    Open {
        side: Side,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to read from input file: {name} ({})", os_code(.source))]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to write to output file: {name} ({})", os_code(.source))]
    Write {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("signal detected, conversion interrupted")]
    Interrupted,
}

/// Failures while replacing the input file. The conversion itself already
/// succeeded when one of these is reported.
#[derive(Debug, Error)]
pub enum OverwriteError {
    /// The input file is still in place and the converted copy is orphaned.
    #[error("unable to remove input file: {} ({})", .path.display(), os_code(.source))]
    Remove {
        path: PathBuf,
        temp: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input file is gone; the converted content only exists under `from`.
    #[error("unable to rename output file as input file: {} ({})", .from.display(), os_code(.source))]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn os_code(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => code.to_string(),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_message_has_path_and_code() {
        let err = ConvertError::Open {
            side: Side::Output,
            path: PathBuf::from("out.txt"),
            source: io::Error::from_raw_os_error(13),
        };
        assert_eq!(err.to_string(), "unable to open output file: out.txt (13)");
    }

    #[test]
    fn non_os_error_falls_back_to_message() {
        let err = ConvertError::Read {
            name: "<stdin>".into(),
            source: io::Error::other("boom"),
        };
        assert_eq!(err.to_string(), "unable to read from input file: <stdin> (boom)");
    }
}
