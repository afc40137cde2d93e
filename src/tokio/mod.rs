//! Async conversion over tokio's `AsyncRead` / `AsyncWrite`.
//!
//! Same translation rules and counters as the file engine, but driven chunk
//! by chunk through [`Translator::translate_chunk`].
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::{
    core::{Direction, Translator},
    error::ConvertError,
    report::Statistics,
    signal::CancelFlag,
};

const READER_NAME: &str = "<async reader>";
const WRITER_NAME: &str = "<async writer>";

/// Convert everything `reader` yields into `writer`, then flush `writer`.
///
/// # Errors
///
/// Read and write failures and cancellation abort the copy. `writer` is still
/// flushed before the first error is returned.
pub async fn convert<R, W>(
    reader: R,
    writer: W,
    direction: Direction,
    cancel: &CancelFlag,
) -> Result<Statistics, ConvertError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    convert_with_size(reader, writer, direction, cancel, 8192).await
}

/// Like [`convert`] with an explicit input chunk size.
///
/// # Errors
///
/// See [`convert`].
pub async fn convert_with_size<R, W>(
    mut reader: R,
    mut writer: W,
    direction: Direction,
    cancel: &CancelFlag,
    buf_size: usize,
) -> Result<Statistics, ConvertError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let buf_size = buf_size.max(1);
    let mut translator = Translator::new(direction);
    let mut input_buf = vec![0u8; buf_size].into_boxed_slice();
    let mut output_buf = vec![0u8; direction.max_output_size_for_chunk(buf_size)].into_boxed_slice();
    let mut stats = Statistics::default();

    let copied = loop {
        if cancel.is_cancelled() {
            warn!(bytes = stats.input.bytes, "conversion cancelled");
            break Err(ConvertError::Interrupted);
        }

        let bytes_read = match reader.read(&mut input_buf).await {
            Ok(0) if cancel.is_cancelled() => {
                warn!(bytes = stats.input.bytes, "conversion cancelled at end of input");
                break Err(ConvertError::Interrupted);
            }
            Ok(0) => break Ok(()),
            Ok(n) => n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                break Err(ConvertError::Read {
                    name: READER_NAME.to_owned(),
                    source,
                })
            }
        };
        stats.input.bytes += bytes_read as u64;

        let status = translator
            .translate_chunk(&input_buf[..bytes_read], &mut output_buf)
            .unwrap_or_else(|err| unreachable!("{err} (should be impossible)"));
        stats.input.lines += status.lines();
        stats.output.lines = stats.input.lines;

        let chunk = &output_buf[..status.output_len()];
        if let Err(err) = write_counted(&mut writer, chunk, &mut stats).await {
            break Err(err);
        }
    };

    let flushed = writer.flush().await.map_err(|source| ConvertError::Write {
        name: WRITER_NAME.to_owned(),
        source,
    });
    copied.and(flushed)?;
    debug!(?stats, "async conversion finished");
    Ok(stats)
}

/// `write_all` that keeps `stats.output.bytes` exact even when a write fails
/// partway through `buf`.
async fn write_counted<W>(
    writer: &mut W,
    mut buf: &[u8],
    stats: &mut Statistics,
) -> Result<(), ConvertError>
where
    W: AsyncWrite + Unpin,
{
    while !buf.is_empty() {
        let written = match writer.write(buf).await {
            Ok(0) => Err(std::io::ErrorKind::WriteZero.into()),
            Ok(n) => Ok(n),
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => Err(err),
        }
        .map_err(|source| ConvertError::Write {
            name: WRITER_NAME.to_owned(),
            source,
        })?;
        stats.output.bytes += written as u64;
        buf = &buf[written..];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        pin::Pin,
        task::{Context, Poll},
    };

    use super::*;

    /// Accepts `limit` bytes, one per call, then fails.
    struct ShortWriter {
        written: Vec<u8>,
        limit: usize,
    }

    impl AsyncWrite for ShortWriter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if self.written.len() >= self.limit {
                return Poll::Ready(Err(io::Error::other("disk full")));
            }
            self.written.push(buf[0]);
            Poll::Ready(Ok(1))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn partial_write_is_counted() {
        let mut writer = ShortWriter {
            written: Vec::new(),
            limit: 3,
        };
        let mut stats = Statistics::default();
        let err = write_counted(&mut writer, b"a\r\nb\r\n", &mut stats)
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Write { .. }), "{err}");
        assert_eq!(writer.written, b"a\r\n");
        assert_eq!(stats.output.bytes, 3);
    }
}
