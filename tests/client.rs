//! HTTP backend client against a local one-shot server.

mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use common::teams;
use padel_draw::{
    BackendError, DrawBackend, DrawRequest, DrawType, HttpBackend, SessionFailure, SessionGate,
    SessionState, TournamentRecord,
};
use std::collections::HashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// What the server saw of the single request it served.
#[derive(Debug)]
struct Captured {
    request_line: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Captured {
    fn json_body(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Serve exactly one request with `status` and `reply`, returning the base URL.
async fn serve_once(status: &'static str, reply: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8(raw[..header_end].to_vec()).unwrap();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap().to_string();
        let headers: HashMap<String, String> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        let content_length = headers
            .get("content-length")
            .map(|v| v.parse::<usize>().unwrap())
            .unwrap_or(0);
        let mut body = raw[header_end + 4..].to_vec();
        while body.len() < content_length {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before body");
            body.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{reply}",
            reply.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        Captured {
            request_line,
            headers,
            body,
        }
    });

    (base_url, handle)
}

fn draw_request() -> DrawRequest {
    DrawRequest {
        draw_type: DrawType::Rodeo,
        date_start: Utc.with_ymd_and_hms(2025, 6, 14, 0, 0, 0).unwrap(),
        teams: teams(6),
        total_rounds: 3,
        available_courts: 2,
    }
}

#[tokio::test]
async fn credential_exchange_posts_init_data_and_reads_numeric_id() {
    let (base_url, server) = serve_once("200 OK", r#"{"token":"jwt-abc","id":123456789}"#).await;
    let backend = HttpBackend::new(base_url);

    let grant = backend.exchange_credential("query_id=1&hash=abc").await.unwrap();
    assert_eq!(grant.token, "jwt-abc");
    assert_eq!(grant.id, "123456789");

    let seen = server.await.unwrap();
    assert_eq!(seen.request_line, "POST /auth HTTP/1.1");
    assert_eq!(seen.headers["content-type"], "application/json");
    assert_eq!(
        seen.json_body(),
        serde_json::json!({ "initDataRaw": "query_id=1&hash=abc" })
    );
}

#[tokio::test]
async fn gate_over_http_becomes_ready() {
    let (base_url, server) = serve_once("200 OK", r#"{"token":"jwt-abc","id":7}"#).await;
    let backend = HttpBackend::new(base_url);
    let mut gate = SessionGate::new();

    let state = gate.authenticate(&backend, Some("cred")).await;
    assert_eq!(state, &SessionState::Ready("jwt-abc".to_string()));
    server.await.unwrap();
}

#[tokio::test]
async fn forbidden_exchange_is_access_denied() {
    let (base_url, server) = serve_once("403 Forbidden", r#"{"error":"forbidden"}"#).await;
    let backend = HttpBackend::new(base_url);
    let mut gate = SessionGate::new();

    let state = gate.authenticate(&backend, Some("cred")).await;
    assert_eq!(state, &SessionState::Failed(SessionFailure::AccessDenied));
    server.await.unwrap();
}

#[tokio::test]
async fn unauthorized_exchange_is_status_401() {
    let (base_url, server) = serve_once("401 Unauthorized", r#"{"error":"bad hash"}"#).await;
    let backend = HttpBackend::new(base_url.clone());
    assert_eq!(
        backend.exchange_credential("cred").await.unwrap_err(),
        BackendError::Status(401)
    );
    server.await.unwrap();

    let (base_url, server) = serve_once("401 Unauthorized", r#"{"error":"bad hash"}"#).await;
    let backend = HttpBackend::new(base_url);
    let mut gate = SessionGate::new();
    let state = gate.authenticate(&backend, Some("cred")).await;
    assert!(matches!(
        state,
        SessionState::Failed(SessionFailure::AuthTransportError(_))
    ));
    server.await.unwrap();
}

#[tokio::test]
async fn create_draw_sends_query_bearer_and_roster() {
    let (base_url, server) = serve_once("200 OK", "{}").await;
    let backend = HttpBackend::new(format!("{base_url}/"));
    let request = draw_request();

    backend.create_draw("tok-1", &request).await.unwrap();

    let seen = server.await.unwrap();
    assert_eq!(
        seen.request_line,
        "POST /api/create-tournament?tournamentType=Rodeo\
         &dateStart=2025-06-14T00%3A00%3A00.000Z&totalRounds=3&availableCourts=2 HTTP/1.1"
    );
    assert_eq!(seen.headers["authorization"], "Bearer tok-1");
    assert_eq!(seen.json_body(), serde_json::to_value(&request.teams).unwrap());

    let first = &seen.json_body()[0];
    assert_eq!(first["person1"]["id"], "p0");
    assert_eq!(first["person2"]["id"], "p1");
    assert_eq!(first["gender"], 2);
}

#[tokio::test]
async fn create_draw_failure_status_is_reported() {
    let (base_url, server) = serve_once("500 Internal Server Error", "{}").await;
    let backend = HttpBackend::new(base_url);
    assert_eq!(
        backend.create_draw("tok-1", &draw_request()).await.unwrap_err(),
        BackendError::Status(500)
    );
    server.await.unwrap();
}

#[tokio::test]
async fn listing_with_null_tournaments_is_empty() {
    let (base_url, server) =
        serve_once("200 OK", r#"{"date":"2025-06-14","tournaments":null}"#).await;
    let backend = HttpBackend::new(base_url);
    let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();

    let listing = backend.tournaments_by_date("tok-1", date).await.unwrap();
    assert_eq!(listing.date, date);
    assert!(listing.tournaments.is_empty());

    let seen = server.await.unwrap();
    assert_eq!(
        seen.request_line,
        "GET /api/tournaments?date=2025-06-14 HTTP/1.1"
    );
    assert_eq!(seen.headers["authorization"], "Bearer tok-1");
}

#[tokio::test]
async fn listing_decodes_backend_records() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"date":"2025-06-14","tournaments":[{
            "name":"Rodeo",
            "date":"2025-06-14T00:00:00Z",
            "teams":[{"person1":{"id":"a"},"person2":{"id":"b"},"gender":1}],
            "rounds":null
        }]}"#,
    )
    .await;
    let backend = HttpBackend::new(base_url);
    let date = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();

    let listing = backend.tournaments_by_date("tok-1", date).await.unwrap();
    assert_eq!(listing.tournaments.len(), 1);
    let record = &listing.tournaments[0];
    assert_eq!(record.teams.len(), 1);
    assert!(record.rounds.is_empty());
    assert_eq!(record.artifact_name(), "2025-06-14_Rodeo.pdf");
    server.await.unwrap();
}

#[tokio::test]
async fn download_token_posts_record_and_builds_url() {
    let (base_url, server) = serve_once("200 OK", r#"{"token":"abc"}"#).await;
    let backend = HttpBackend::new(base_url.clone());
    let record = TournamentRecord {
        name: "Rodeo".to_string(),
        date: Utc.with_ymd_and_hms(2025, 6, 14, 0, 0, 0).unwrap(),
        teams: teams(2),
        rounds: Vec::new(),
    };

    let token = backend.download_token("tok-1", &record).await.unwrap();
    assert_eq!(token, "abc");
    assert_eq!(
        backend.download_url(&token),
        format!("{base_url}/api/tournament/download?token=abc")
    );

    let seen = server.await.unwrap();
    assert_eq!(
        seen.request_line,
        "POST /api/tournament/generate-link HTTP/1.1"
    );
    assert_eq!(seen.headers["authorization"], "Bearer tok-1");
    assert_eq!(seen.json_body()["name"], "Rodeo");
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let (base_url, server) = serve_once("200 OK", r#"{"token":42}"#).await;
    let backend = HttpBackend::new(base_url);
    assert!(matches!(
        backend.exchange_credential("cred").await,
        Err(BackendError::Decode(_))
    ));
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let backend = HttpBackend::new(base_url);
    assert!(matches!(
        backend.exchange_credential("cred").await,
        Err(BackendError::Transport(_))
    ));
}
