// ═══════════════════════════════════════════════════════════════════
// Provider Tests: wire format decoding, HttpSnapshotSource
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use trader_dashboard_core::errors::CoreError;
use trader_dashboard_core::models::settings::MonitorSettings;
use trader_dashboard_core::providers::http::HttpSnapshotSource;
use trader_dashboard_core::providers::traits::SnapshotSource;
use trader_dashboard_core::providers::wire::{parse_history, parse_latest, parse_timestamp};

// ═══════════════════════════════════════════════════════════════════
// Test Helpers: a tiny canned-response HTTP server
// ═══════════════════════════════════════════════════════════════════

/// Serves `(status, body)` per request path until the test ends.
async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: HashMap<&'static str, (u16, &'static str)> = routes
        .into_iter()
        .map(|(path, status, body)| (path, (status, body)))
        .collect();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf);
                let target = request.split_whitespace().nth(1).unwrap_or("/");
                let path = target.split('?').next().unwrap_or("/");
                let (status, body) = routes.get(path).copied().unwrap_or((404, "{}"));
                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

const HISTORY_BODY: &str = r#"[
    {"timestamp": "2025-01-15T12:00:00", "total": "5200.00", "available": "4100.00"},
    {"timestamp": "2025-01-15T12:05:00", "total": "4800.00", "available": "3900.00"},
    {"timestamp": "2025-01-15T12:10:00", "total": "5300.00", "available": "4000.00"}
]"#;

const LATEST_BODY: &str =
    r#"{"timestamp": "2025-01-15T12:10:00", "total": "5300.00", "available": "4000.00"}"#;

// ═══════════════════════════════════════════════════════════════════
// Wire format
// ═══════════════════════════════════════════════════════════════════

mod wire {
    use super::*;

    #[test]
    fn timestamp_rfc3339() {
        let t = parse_timestamp("2025-01-15T17:30:00+05:30").unwrap();
        assert_eq!(t.to_rfc3339(), "2025-01-15T12:00:00+00:00");
    }

    #[test]
    fn timestamp_naive_is_utc() {
        let t = parse_timestamp("2025-01-15T12:00:00.123456").unwrap();
        assert_eq!(t, parse_timestamp("2025-01-15T12:00:00.123456Z").unwrap());
    }

    #[test]
    fn timestamp_space_separated() {
        let t = parse_timestamp("2025-01-15 12:00:00").unwrap();
        assert_eq!(t, parse_timestamp("2025-01-15T12:00:00Z").unwrap());
    }

    #[test]
    fn timestamp_garbage_rejected() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(CoreError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn history_numeric_strings() {
        let history = parse_history(HISTORY_BODY).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].total, 5200.0);
        assert_eq!(history[1].available, 3900.0);
        assert!(history[0].timestamp < history[2].timestamp);
    }

    #[test]
    fn history_plain_numbers() {
        let body = r#"[{"timestamp": "2025-01-15T12:00:00Z", "total": 5012.5, "available": 4000}]"#;
        let history = parse_history(body).unwrap();
        assert_eq!(history[0].total, 5012.5);
        assert_eq!(history[0].available, 4000.0);
    }

    #[test]
    fn empty_history() {
        assert!(parse_history("[]").unwrap().is_empty());
    }

    #[test]
    fn history_not_an_array() {
        assert!(matches!(
            parse_history(r#"{"detail": "oops"}"#),
            Err(CoreError::MalformedPayload(_))
        ));
    }

    #[test]
    fn history_not_json() {
        assert!(matches!(
            parse_history("<html>502</html>"),
            Err(CoreError::MalformedPayload(_))
        ));
    }

    #[test]
    fn one_bad_entry_rejects_history() {
        let body = r#"[
            {"timestamp": "2025-01-15T12:00:00Z", "total": "5000", "available": "1"},
            {"timestamp": "2025-01-15T12:05:00Z", "total": "lots", "available": "1"}
        ]"#;
        let err = parse_history(body).unwrap_err();
        assert!(matches!(err, CoreError::MalformedPayload(ref m) if m.contains("entry 1")));
    }

    #[test]
    fn negative_total_rejected() {
        let body = r#"[{"timestamp": "2025-01-15T12:00:00Z", "total": "-5", "available": "1"}]"#;
        assert!(parse_history(body).is_err());
    }

    #[test]
    fn missing_total_rejected() {
        let body = r#"[{"timestamp": "2025-01-15T12:00:00Z", "available": "1"}]"#;
        assert!(parse_history(body).is_err());
    }

    #[test]
    fn latest_snapshot() {
        let latest = parse_latest(LATEST_BODY).unwrap().unwrap();
        assert_eq!(latest.total, 5300.0);
    }

    #[test]
    fn latest_placeholder_is_none() {
        let body = r#"{"timestamp": null, "total": 0, "available": 0}"#;
        assert!(parse_latest(body).unwrap().is_none());
    }

    #[test]
    fn latest_null_is_none() {
        assert!(parse_latest("null").unwrap().is_none());
    }

    #[test]
    fn latest_bad_total_rejected() {
        let body = r#"{"timestamp": "2025-01-15T12:00:00Z", "total": "n/a", "available": 0}"#;
        assert!(matches!(parse_latest(body), Err(CoreError::MalformedPayload(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
// HttpSnapshotSource
// ═══════════════════════════════════════════════════════════════════

mod http_source {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn builds_endpoint_urls() {
        let src = HttpSnapshotSource::new("http://localhost:8000/", TIMEOUT, None).unwrap();
        assert_eq!(
            src.history_url().as_str(),
            "http://localhost:8000/api/portfolio/history"
        );
        assert_eq!(
            src.latest_url().as_str(),
            "http://localhost:8000/api/portfolio/latest"
        );
        assert_eq!(src.name(), "PortfolioApi");
    }

    #[test]
    fn history_limit_in_query() {
        let src = HttpSnapshotSource::new("http://localhost:8000", TIMEOUT, Some(50)).unwrap();
        assert_eq!(
            src.history_url().as_str(),
            "http://localhost:8000/api/portfolio/history?limit=50"
        );
        assert!(src.latest_url().query().is_none());
    }

    #[test]
    fn base_url_with_prefix() {
        let src = HttpSnapshotSource::new("https://example.com/trader", TIMEOUT, None).unwrap();
        assert_eq!(
            src.latest_url().as_str(),
            "https://example.com/trader/api/portfolio/latest"
        );
    }

    #[test]
    fn empty_base_rejected() {
        assert!(matches!(
            HttpSnapshotSource::new("", TIMEOUT, None),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn non_http_scheme_rejected() {
        assert!(matches!(
            HttpSnapshotSource::new("ftp://example.com", TIMEOUT, None),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn from_settings() {
        let settings = MonitorSettings {
            api_base_url: "http://10.1.2.3:9000".into(),
            history_limit: Some(10),
            ..MonitorSettings::default()
        };
        let src = HttpSnapshotSource::from_settings(&settings).unwrap();
        assert_eq!(
            src.history_url().as_str(),
            "http://10.1.2.3:9000/api/portfolio/history?limit=10"
        );
    }

    #[tokio::test]
    async fn fetches_history_and_latest() {
        let base = serve(vec![
            ("/api/portfolio/history", 200, HISTORY_BODY),
            ("/api/portfolio/latest", 200, LATEST_BODY),
        ])
        .await;
        let src = HttpSnapshotSource::new(&base, TIMEOUT, Some(3)).unwrap();

        let history = src.fetch_history().await.unwrap();
        assert_eq!(history.len(), 3);
        let latest = src.fetch_latest().await.unwrap().unwrap();
        assert_eq!(latest.total, 5300.0);
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let base = serve(vec![("/api/portfolio/history", 500, r#"{"detail": "db locked"}"#)]).await;
        let src = HttpSnapshotSource::new(&base, TIMEOUT, None).unwrap();

        let err = src.fetch_history().await.unwrap_err();
        assert!(matches!(err, CoreError::HttpStatus { status: 500, .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn bad_body_is_malformed() {
        let base = serve(vec![("/api/portfolio/latest", 200, "not json")]).await;
        let src = HttpSnapshotSource::new(&base, TIMEOUT, None).unwrap();

        let err = src.fetch_latest().await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let src = HttpSnapshotSource::new(&format!("http://{addr}"), TIMEOUT, None).unwrap();
        let err = src.fetch_history().await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
        assert!(err.is_transport());
    }
}
