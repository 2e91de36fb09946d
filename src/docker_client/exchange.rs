// Minimal HTTP/1.1 request/response over an already open stream.
// The status code is ignored and chunked bodies are passed through undecoded.

use super::error::ExchangeError;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a full response (headers + body).
pub const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

const READ_CHUNK: usize = 4096;
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Request line, Host header and `Connection: close`; no body.
pub fn format_request(method: &str, path: &str, host: &str) -> String {
    format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        method, path, host
    )
}

pub async fn exchange<S>(stream: &mut S, request: &str) -> Result<String, ExchangeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(ExchangeError::Write)?;
    stream.flush().await.map_err(ExchangeError::Write)?;

    let raw = read_until_close(stream, MAX_RESPONSE_BYTES).await?;
    Ok(extract_body(&raw))
}

/// Reads until EOF. A read error after the first byte ends the response early
/// and keeps what was received.
pub(crate) async fn read_until_close<R>(reader: &mut R, limit: usize) -> Result<BytesMut, ExchangeError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    loop {
        buf.reserve(READ_CHUNK);
        match reader.read_buf(&mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if buf.len() > limit {
                    return Err(ExchangeError::ResponseTooLarge { limit });
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) if buf.is_empty() => return Err(ExchangeError::Read(e)),
            Err(e) => {
                tracing::debug!(error = %e, received = buf.len(), "read failed mid-response");
                break;
            }
        }
    }
    if buf.is_empty() {
        return Err(ExchangeError::EmptyResponse);
    }
    Ok(buf)
}

/// Text after the first blank line. Without one, the raw response is returned
/// verbatim and left for the decoder to reject.
pub fn extract_body(raw: &[u8]) -> String {
    match raw
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
    {
        Some(pos) => {
            if let Some(status) = raw[..pos].split(|b| *b == b'\n').next() {
                tracing::trace!(status = %String::from_utf8_lossy(status).trim_end(), "response");
            }
            String::from_utf8_lossy(&raw[pos + HEADER_TERMINATOR.len()..]).into_owned()
        }
        None => {
            tracing::debug!(len = raw.len(), "response has no header/body boundary");
            String::from_utf8_lossy(raw).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_minimal_and_closes() {
        let req = format_request("GET", "/containers/json", "localhost");
        assert_eq!(
            req,
            "GET /containers/json HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn body_follows_first_blank_line() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n[]\r\n\r\nrest";
        assert_eq!(extract_body(raw), "[]\r\n\r\nrest");
    }

    #[test]
    fn missing_boundary_returns_raw() {
        let raw = b"HTTP/1.1 200 OK\r\nno-body";
        assert_eq!(extract_body(raw), "HTTP/1.1 200 OK\r\nno-body");
    }

    #[test]
    fn error_status_is_not_distinguished() {
        let raw = b"HTTP/1.1 404 Not Found\r\n\r\n{\"message\":\"no such container\"}";
        assert_eq!(extract_body(raw), "{\"message\":\"no such container\"}");
    }

    #[tokio::test]
    async fn exchange_writes_request_and_reads_to_eof() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let server_task = tokio::spawn(async move {
            let mut req = vec![0u8; 256];
            let n = server.read(&mut req).await.unwrap();
            let req = String::from_utf8_lossy(&req[..n]).into_owned();
            server
                .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n{\"a\":1}")
                .await
                .unwrap();
            drop(server);
            req
        });
        let body = exchange(&mut client, &format_request("GET", "/x", "localhost"))
            .await
            .unwrap();
        assert_eq!(body, "{\"a\":1}");
        let req = server_task.await.unwrap();
        assert!(req.starts_with("GET /x HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn empty_response_is_an_error() {
        let (mut client, server) = tokio::io::duplex(64);
        drop(server);
        let mut buf: &[u8] = &[];
        let err = read_until_close(&mut buf, 1024).await.unwrap_err();
        assert!(matches!(err, ExchangeError::EmptyResponse));
        // Writing to a closed duplex fails before anything is read.
        let err = exchange(&mut client, "GET / HTTP/1.1\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Write(_)));
    }

    /// Yields `data` once, then fails every read.
    struct FailingReader {
        data: Option<Vec<u8>>,
    }

    impl AsyncRead for FailingReader {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            match self.data.take() {
                Some(data) => {
                    buf.put_slice(&data);
                    std::task::Poll::Ready(Ok(()))
                }
                None => std::task::Poll::Ready(Err(std::io::ErrorKind::ConnectionReset.into())),
            }
        }
    }

    #[tokio::test]
    async fn read_error_after_data_keeps_partial_response() {
        let mut reader = FailingReader {
            data: Some(b"HTTP/1.1 200 OK\r\n\r\n[{\"Id\"".to_vec()),
        };
        let raw = read_until_close(&mut reader, 4096).await.unwrap();
        assert_eq!(extract_body(&raw), "[{\"Id\"");
    }

    #[tokio::test]
    async fn read_error_before_data_is_an_error() {
        let mut reader = FailingReader { data: None };
        let err = read_until_close(&mut reader, 4096).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Read(_)));
    }

    #[tokio::test]
    async fn oversized_response_is_rejected() {
        let data = vec![b'x'; 10_000];
        let mut reader: &[u8] = &data;
        let err = read_until_close(&mut reader, 4096).await.unwrap_err();
        assert!(matches!(err, ExchangeError::ResponseTooLarge { limit: 4096 }));
    }
}
