//! HTTP endpoint exposing the benchmark metrics.

use std::net::SocketAddr;
use std::sync::Arc;

use prometheus::{Encoder, TextEncoder};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::recorder::{BenchMetrics, MetricsError};

/// Prometheus text exporter served from a dedicated port.
///
/// `GET /metrics` encodes the benchmark registry, `GET /debug/metrics` the
/// process-global default registry, and `GET /health` a small status body.
/// Every response closes the connection.
pub struct MetricsExporter {
    local_addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl MetricsExporter {
    /// Bind the endpoint and start serving in a background task.
    pub async fn bind(metrics: Arc<BenchMetrics>, port: u16) -> Result<Self, MetricsError> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        let local_addr = listener.local_addr()?;
        info!("Metrics endpoint listening on {}", local_addr);

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(serve(listener, metrics, token));

        Ok(Self {
            local_addr,
            cancel,
            handle,
        })
    }

    /// Address the exporter is bound to (useful when the port is 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for the server task to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

async fn serve(listener: TcpListener, metrics: Arc<BenchMetrics>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    if let Err(e) = handle_connection(stream, &metrics).await {
                        warn!("Error handling metrics request from {}: {}", addr, e);
                    }
                }
                Err(e) => {
                    error!("Error accepting metrics connection: {}", e);
                }
            },
        }
    }
}

/// Handle one request on its own connection.
async fn handle_connection(
    mut stream: TcpStream,
    metrics: &BenchMetrics,
) -> Result<(), MetricsError> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    // Read request line
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    // Drain headers; none of the routes carries a request body
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    // Route the request
    let (status, content_type, body) = if request_line.starts_with("GET /metrics") {
        let (content_type, body) = encode_families(metrics.registry().gather())?;
        ("200 OK", content_type, body)
    } else if request_line.starts_with("GET /debug/metrics") {
        let (content_type, body) = encode_families(prometheus::gather())?;
        ("200 OK", content_type, body)
    } else if request_line.starts_with("GET /health") {
        (
            "200 OK",
            "application/json".to_string(),
            br#"{"status":"healthy"}"#.to_vec(),
        )
    } else {
        (
            "404 Not Found",
            "application/json".to_string(),
            br#"{"error":"not found"}"#.to_vec(),
        )
    };

    // Send response
    let header = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    write_half.write_all(header.as_bytes()).await?;
    write_half.write_all(&body).await?;
    write_half.flush().await?;

    Ok(())
}

/// Encode metric families in the Prometheus text format.
fn encode_families(
    families: Vec<prometheus::proto::MetricFamily>,
) -> Result<(String, Vec<u8>), MetricsError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MetricsSink;
    use tokio::io::AsyncReadExt;

    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n").as_bytes())
            .await
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_benchmark_series() {
        let metrics = Arc::new(BenchMetrics::new().unwrap());
        metrics.inc_sent(11, 7);
        metrics.inc_error();

        let exporter = MetricsExporter::bind(metrics.clone(), 0).await.unwrap();
        let response = http_get(exporter.local_addr(), "/metrics").await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("messages_sent_total 1"));
        assert!(response.contains("messages_failed_total 1"));
        assert!(response.contains("bytes_sent_payload 11"));

        exporter.stop().await;
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_healthy() {
        let metrics = Arc::new(BenchMetrics::new().unwrap());
        let exporter = MetricsExporter::bind(metrics, 0).await.unwrap();

        let response = http_get(exporter.local_addr(), "/health").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains(r#"{"status":"healthy"}"#));

        exporter.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let metrics = Arc::new(BenchMetrics::new().unwrap());
        let exporter = MetricsExporter::bind(metrics, 0).await.unwrap();

        let response = http_get(exporter.local_addr(), "/nope").await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found"));

        exporter.stop().await;
    }
}
