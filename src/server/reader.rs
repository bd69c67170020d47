//! Reading a request off the connection.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::parser::Error as ParserError;
use crate::server::error::Error;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Read one request from `stream` and decode it as UTF-8.
///
/// Reads `read_buffer_size` bytes at a time until the blank line that ends the
/// header block arrives or the peer stops sending. Body bytes that arrive after
/// the header block's read are not waited for. Returns `Ok(None)` when the
/// peer closes without sending anything.
///
/// # Errors
///
/// [`Error::RequestTooLarge`] once more than `max_request_size` bytes are
/// buffered, a malformed-request error for invalid UTF-8, or the I/O error.
pub async fn read_request<R>(
    stream: &mut R,
    read_buffer_size: usize,
    max_request_size: usize,
) -> Result<Option<String>, Error>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buffer = Vec::with_capacity(read_buffer_size);
    let mut chunk = vec![0; read_buffer_size];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        if buffer.len() + n > max_request_size {
            return Err(Error::RequestTooLarge(max_request_size));
        }

        // The terminator may straddle two reads.
        let search_from = buffer.len().saturating_sub(HEADER_TERMINATOR.len() - 1);
        buffer.extend_from_slice(&chunk[..n]);
        if buffer[search_from..]
            .windows(HEADER_TERMINATOR.len())
            .any(|window| window == HEADER_TERMINATOR)
        {
            break;
        }
    }

    if buffer.is_empty() {
        return Ok(None);
    }

    String::from_utf8(buffer)
        .map(Some)
        .map_err(|_| Error::MalformedRequest(ParserError::InvalidUtf8))
}
