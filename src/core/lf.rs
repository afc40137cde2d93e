//! CRLF to LF translation.
//!
//! A `\r` is dropped and the byte right after it is copied through untouched,
//! even when that byte is another `\r`. For well-formed CRLF input this
//! collapses every pair into `\n`; for a lone `\r` it silently swallows the
//! `\r`. Each such pair counts as one line.
use memchr::memchr;

use crate::core::{Direction, Error, Result, TranslateChunkStatus, CR};

/// Translate a single chunk of input into the provided `output` buffer.
///
/// Parameters:
/// - `input`: bytes to translate
/// - `output`: destination buffer. Worst-case required size is `input.len()`.
/// - `preceded_by_cr`: set to `true` if the previous chunk ended with a pending `\r`.
///
/// Returns a `TranslateChunkStatus` which tells how many bytes were written,
/// how many CR pairs were collapsed and whether a `\r` is still pending.
///
/// # Errors
///
/// Returns `Err(Error::OutputBufferTooSmall { required })` if `output`
/// is smaller than `input`.
pub fn translate_chunk(
    input: &[u8],
    output: &mut [u8],
    preceded_by_cr: bool,
) -> Result<TranslateChunkStatus> {
    let output_required = Direction::StripCr.max_output_size_for_chunk(input.len());
    if output.len() < output_required {
        return Err(Error::OutputBufferTooSmall {
            required: output_required,
        });
    }

    let mut read_pos = 0;
    let mut write_pos = 0;
    let mut lines = 0;

    if preceded_by_cr {
        match input.first() {
            // The successor of the previous chunk's CR, taken as-is.
            Some(&b) => {
                output[0] = b;
                read_pos = 1;
                write_pos = 1;
                lines += 1;
            }
            None => return Ok(TranslateChunkStatus::new(0, 0, true)),
        }
    }

    while let Some(i) = memchr(CR, &input[read_pos..]).map(|i| i + read_pos) {
        let bytes_now = i - read_pos;
        output[write_pos..write_pos + bytes_now].copy_from_slice(&input[read_pos..i]);
        write_pos += bytes_now;

        match input.get(i + 1) {
            Some(&next) => {
                output[write_pos] = next;
                write_pos += 1;
                read_pos = i + 2;
                lines += 1;
            }
            None => return Ok(TranslateChunkStatus::new(write_pos, lines, true)),
        }
    }

    let bytes_now = input.len() - read_pos;
    output[write_pos..write_pos + bytes_now].copy_from_slice(&input[read_pos..]);
    Ok(TranslateChunkStatus::new(write_pos + bytes_now, lines, false))
}
