// src/pipeline/fetch.rs

//! Listings document fetcher.
//!
//! One GET per run, no retries; retry policy belongs to the driver
//! loop. Failures are classified, never fatal: the caller turns any
//! [`FetchError`] into an empty run.

use reqwest::Client;
use thiserror::Error;

/// Classified fetch failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// The request never produced a usable response
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Fetch the raw listings document.
pub async fn fetch_document(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a loopback port.
    async fn one_shot_server(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn classifies_server_error_status() {
        let url = one_shot_server(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let err = fetch_document(&Client::new(), &url).await.unwrap_err();
        assert_eq!(err, FetchError::Status(500));
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let url = one_shot_server(
            "HTTP/1.1 200 OK\r\nContent-Length: 15\r\nConnection: close\r\n\r\n<table></table>",
        )
        .await;

        let body = fetch_document(&Client::new(), &url).await.unwrap();
        assert_eq!(body, "<table></table>");
    }

    #[tokio::test]
    async fn classifies_transport_failure() {
        // Nothing listens on this port once the listener is dropped.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let err = fetch_document(&Client::new(), &url).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
