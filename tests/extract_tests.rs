use std::time::Duration;

use pdf_summarizer::core::models::DocumentLocator;
use pdf_summarizer::errors::ExtractionError;
use pdf_summarizer::extract::{Extractor, PdfExtractor};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FAKE_PDF: &[u8] = b"%PDF-1.4\nthis is not a real document body";
const HELLO_PDF: &[u8] = include_bytes!("fixtures/hello.pdf");
const HELLO_TEXT: &str = "Hello PDF summarizer";

fn extractor() -> PdfExtractor {
    PdfExtractor::new(Duration::from_secs(5), 1024).unwrap()
}

/// Reached the PDF parser rather than being rejected up front.
fn reached_parser(result: &Result<String, ExtractionError>) -> bool {
    matches!(
        result,
        Err(ExtractionError::Unreadable(_) | ExtractionError::Empty)
    )
}

#[tokio::test]
async fn test_non_200_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let locator = DocumentLocator::Url(format!("{}/missing.pdf", server.uri()));
    let result = extractor().extract(&locator).await;

    assert!(matches!(result, Err(ExtractionError::Status(404))));
}

#[tokio::test]
async fn test_html_content_is_not_a_pdf() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>hi</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let locator = DocumentLocator::Url(format!("{}/page", server.uri()));
    let result = extractor().extract(&locator).await;

    match result {
        Err(ExtractionError::NotPdf(content_type)) => assert!(content_type.starts_with("text/html")),
        other => panic!("expected NotPdf, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pdf_suffix_is_accepted_despite_generic_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/paper.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_string("garbage"),
        )
        .mount(&server)
        .await;

    let locator = DocumentLocator::Url(format!("{}/paper.pdf", server.uri()));
    assert!(reached_parser(&extractor().extract(&locator).await));
}

#[tokio::test]
async fn test_magic_bytes_identify_pdf() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_bytes(FAKE_PDF),
        )
        .mount(&server)
        .await;

    let locator = DocumentLocator::Url(format!("{}/download", server.uri()));
    assert!(reached_parser(&extractor().extract(&locator).await));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(vec![b'a'; 4096]),
        )
        .mount(&server)
        .await;

    let locator = DocumentLocator::Url(format!("{}/big.pdf", server.uri()));
    let result = extractor().extract(&locator).await;

    assert!(matches!(
        result,
        Err(ExtractionError::TooLarge { size: 4096, limit: 1024 })
    ));
}

#[tokio::test]
async fn test_non_http_url_is_invalid_source() {
    let locator = DocumentLocator::Url("ftp://example.com/a.pdf".to_string());
    let result = extractor().extract(&locator).await;

    assert!(matches!(result, Err(ExtractionError::InvalidSource(_))));
}

#[tokio::test]
async fn test_garbage_bytes_are_unreadable() {
    let locator = DocumentLocator::Bytes(FAKE_PDF.to_vec());
    assert!(reached_parser(&extractor().extract(&locator).await));
}

#[tokio::test]
async fn test_real_pdf_from_bytes_yields_trimmed_text() {
    let text = extractor()
        .extract(&DocumentLocator::Bytes(HELLO_PDF.to_vec()))
        .await
        .unwrap();

    assert!(text.contains(HELLO_TEXT), "unexpected text: {text:?}");
    assert_eq!(text, text.trim());
}

#[tokio::test]
async fn test_real_pdf_from_url_yields_trimmed_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hello"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(HELLO_PDF),
        )
        .mount(&server)
        .await;

    let locator = DocumentLocator::Url(format!("{}/hello", server.uri()));
    let text = extractor().extract(&locator).await.unwrap();

    assert!(text.contains(HELLO_TEXT), "unexpected text: {text:?}");
    assert_eq!(text, text.trim());
}

/// Serves a chunked PDF response with no Content-Length that never finishes.
async fn endless_chunked_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;

        let head = "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nTransfer-Encoding: chunked\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        let chunk = [b'a'; 512];
        for _ in 0..8 {
            let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
            frame.extend_from_slice(&chunk);
            frame.extend_from_slice(b"\r\n");
            if socket.write_all(&frame).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
        }
        // Keep the body open so only an early size check can finish the download.
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    format!("http://{addr}/stream.pdf")
}

#[tokio::test]
async fn test_chunked_body_is_capped_while_streaming() {
    let locator = DocumentLocator::Url(endless_chunked_server().await);

    let result = tokio::time::timeout(Duration::from_secs(3), extractor().extract(&locator))
        .await
        .expect("download should stop at the size cap");

    assert!(
        matches!(result, Err(ExtractionError::TooLarge { limit: 1024, .. })),
        "unexpected result: {result:?}"
    );
}
