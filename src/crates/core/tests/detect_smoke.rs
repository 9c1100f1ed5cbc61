use stockpilot_core::{ApiConfig, ClientError, DetectionClient, DetectionResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.expect("read request");
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
        if let Some(header_end) = find_subsequence(&request, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&request).to_string()
}

/// One-connection detect stub answering with a fixed raw response.
/// Resolves to the raw request it saw.
async fn spawn_detect_server(response: Vec<u8>) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");
        let request = read_request(&mut socket).await;
        socket.write_all(&response).await.expect("write response");
        request
    });

    (format!("http://{addr}"), server)
}

fn annotated_response(count: &str, body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nX-Object-Count: {count}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

#[tokio::test]
async fn detect_round_trip() {
    let body = b"\xff\xd8fake-annotated-jpeg";
    let (base_url, server) = spawn_detect_server(annotated_response("12", body)).await;

    let client = DetectionClient::new(ApiConfig::new(&base_url)).expect("client builds");
    let result = client
        .detect("shelf.jpg", b"raw-shelf-photo".to_vec())
        .await
        .expect("detection succeeds");

    assert_eq!(result.object_count, 12);
    assert_eq!(result.annotated_image, body);

    let request = server.await.expect("server task completes");
    assert!(request.to_lowercase().contains("post /detect"));
    assert!(request.contains(r#"name="file""#));
    assert!(request.contains(r#"filename="shelf.jpg""#));
    assert!(request.contains("image/jpeg"));
    assert!(request.contains("raw-shelf-photo"));
}

#[tokio::test]
async fn missing_count_header_fails_and_previous_result_survives() {
    let body = b"annotated-but-uncounted";
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    let (base_url, _server) = spawn_detect_server(response).await;

    // A result from an earlier, successful request.
    let mut latest = Some(DetectionResult {
        annotated_image: b"previous".to_vec(),
        object_count: 3,
    });

    let client = DetectionClient::new(ApiConfig::new(&base_url)).expect("client builds");
    match client.detect("shelf.jpg", b"photo".to_vec()).await {
        Ok(result) => latest = Some(result),
        Err(e) => assert!(matches!(e, ClientError::MissingCount)),
    }

    let previous = latest.expect("previous result kept");
    assert_eq!(previous.object_count, 3);
    assert_eq!(previous.annotated_image, b"previous");
}

#[tokio::test]
async fn malformed_count_header_is_missing_metadata() {
    let (base_url, _server) = spawn_detect_server(annotated_response("many", b"body")).await;

    let client = DetectionClient::new(ApiConfig::new(&base_url)).expect("client builds");
    let err = client
        .detect("shelf.jpg", b"photo".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MissingCount));
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let response = b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec();
    let (base_url, _server) = spawn_detect_server(response).await;

    let client = DetectionClient::new(ApiConfig::new(&base_url)).expect("client builds");
    let err = client
        .detect("shelf.jpg", b"photo".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 503 }));
}
