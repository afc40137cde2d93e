#![doc = include_str!("../README.md")]

pub mod core;
pub mod engine;
pub mod error;
pub mod options;
pub mod report;
pub mod signal;
pub mod stream;

#[cfg(feature = "tokio")]
pub mod tokio;

pub use crate::core::{convert, convert_str, Direction, Step, TranslateChunkStatus, Translator};
pub use crate::error::{ConvertError, OverwriteError, Side};
pub use crate::options::Settings;
pub use crate::report::{Counters, Statistics};
pub use crate::signal::CancelFlag;
