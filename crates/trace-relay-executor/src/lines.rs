//! Lossy line decoding of a job's output stream.

use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Lazy, finite stream of output lines, ending at end-of-input.
pub type OutputLines = BoxStream<'static, std::io::Result<String>>;

/// Split a byte stream into lines.
///
/// Invalid UTF-8 is replaced with U+FFFD instead of failing. The line
/// terminator (`\n` or `\r\n`) is removed; a final line without one is still
/// yielded. A read error ends the stream after being yielded.
pub fn lossy_lines<R>(reader: R) -> OutputLines
where
    R: AsyncRead + Send + Unpin + 'static,
{
    stream::unfold(Some(BufReader::new(reader)), |state| async move {
        let mut reader = state?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => Some((Ok(decode_line(&buf)), Some(reader))),
            Err(e) => Some((Err(e), None)),
        }
    })
    .boxed()
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
