//! In-process HTTP server for exercising the clients against canned responses.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve `responses` to successive connections, one response per connection,
/// then stop. The handle yields the request heads that were received.
pub(crate) async fn mock_sequence(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = format!("http://127.0.0.1:{port}/api");

    let handle = tokio::spawn(async move {
        let mut requests = Vec::with_capacity(responses.len());
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let mut buf = vec![0u8; 8192];
            let read = stream.read(&mut buf).await.unwrap_or(0);
            requests.push(String::from_utf8_lossy(&buf[..read]).into_owned());

            let resp = format!(
                "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(resp.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        requests
    });

    (url, handle)
}

/// Serve a single response. The handle yields the request head.
pub(crate) async fn mock_server(status: u16, body: &str) -> (String, JoinHandle<String>) {
    let (url, handle) = mock_sequence(vec![(status, body.to_string())]).await;
    let handle = tokio::spawn(async move { handle.await.unwrap().into_iter().next().unwrap_or_default() });
    (url, handle)
}
