//! LF to CRLF translation.
//!
//! Every `\n` is written as `\r\n`. Nothing else is inspected: an existing
//! `\r\n` therefore becomes `\r\r\n`, because only the `\n` is a trigger.
use memchr::memchr;

use crate::core::{Direction, Error, Result, TranslateChunkStatus, CR, LF};

/// Translate a single chunk of input into the provided `output` buffer.
///
/// Parameters:
/// - `input`: bytes to translate
/// - `output`: destination buffer. Worst-case required size is `input.len() * 2`.
///
/// This direction carries no state between chunks, so chunk boundaries may
/// fall anywhere.
///
/// # Errors
///
/// Returns `Err(Error::OutputBufferTooSmall { required })` if `output`
/// is too small to hold the worst-case expansion of `input`.
pub fn translate_chunk(input: &[u8], output: &mut [u8]) -> Result<TranslateChunkStatus> {
    let output_required = Direction::EmitCrlf.max_output_size_for_chunk(input.len());
    if output.len() < output_required {
        return Err(Error::OutputBufferTooSmall {
            required: output_required,
        });
    }

    let mut read_pos = 0;
    let mut write_pos = 0;
    let mut lines = 0;

    while let Some(i) = memchr(LF, &input[read_pos..]).map(|i| i + read_pos) {
        // Copy the run before the LF, then the expanded terminator.
        let bytes_now = i - read_pos;
        output[write_pos..write_pos + bytes_now].copy_from_slice(&input[read_pos..i]);
        write_pos += bytes_now;
        output[write_pos] = CR;
        output[write_pos + 1] = LF;
        write_pos += 2;
        read_pos = i + 1;
        lines += 1;
    }

    let bytes_now = input.len() - read_pos;
    output[write_pos..write_pos + bytes_now].copy_from_slice(&input[read_pos..]);
    Ok(TranslateChunkStatus::new(write_pos + bytes_now, lines, false))
}
