use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use chrono::Utc;
use expense_core::{
    assist::{match_category, AssistError, ExpenseParser, GeminiParser},
    config::AssistConfig,
    domain::{Category, CategoryKind, NewCategory},
};
use serde_json::{json, Value};
use uuid::Uuid;

struct CapturedRequest {
    request_line: String,
    api_key: Option<String>,
    body: Value,
}

/// Serves a single canned HTTP response and hands back what the client sent.
fn serve_once(status: &'static str, body: String) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake server");
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut content_length = 0usize;
        let mut api_key = None;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                match name.trim().to_ascii_lowercase().as_str() {
                    "content-length" => content_length = value.trim().parse().unwrap(),
                    "x-goog-api-key" => api_key = Some(value.trim().to_string()),
                    _ => {}
                }
            }
        }
        let mut raw_body = vec![0u8; content_length];
        reader.read_exact(&mut raw_body).unwrap();

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let mut stream = stream;
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        let _ = sender.send(CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            api_key,
            body: serde_json::from_slice(&raw_body).unwrap_or(Value::Null),
        });
    });

    (endpoint, receiver)
}

fn categories() -> Vec<Category> {
    ["Groceries", "Transport", "Uncategorized"]
        .into_iter()
        .map(|name| {
            Category::create(
                Uuid::new_v4(),
                NewCategory::new(name, "•", "#000000", CategoryKind::Expense),
                Utc::now(),
            )
        })
        .collect()
}

fn config_for(endpoint: String) -> AssistConfig {
    AssistConfig {
        api_key: Some("test-key".into()),
        endpoint,
        request_timeout_secs: Some(5),
        ..AssistConfig::default()
    }
}

fn candidate_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn parses_expense_from_service_response() {
    let (endpoint, captured) = serve_once(
        "200 OK",
        candidate_body(r#"{"description":"Taxi to airport","amount":23.4,"categorySuggestion":"Transport"}"#),
    );
    let parser = GeminiParser::new(config_for(endpoint)).unwrap();
    let categories = categories();

    let parsed = parser
        .parse_expense("taxi to airport 23.40", &categories)
        .await
        .expect("parsed expense");
    assert_eq!(parsed.description, "Taxi to airport");
    assert_eq!(parsed.amount, 23.4);
    assert_eq!(match_category(&parsed, &categories), Some(categories[1].id));

    let request = captured.recv().expect("request captured");
    assert!(request.request_line.starts_with("POST /models/gemini-2.5-flash:generateContent"));
    assert_eq!(request.api_key.as_deref(), Some("test-key"));
    let prompt = request.body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(prompt.contains("taxi to airport 23.40"));
    assert!(prompt.contains("[Groceries, Transport, Uncategorized]"));
    assert_eq!(
        request.body["generationConfig"]["responseMimeType"],
        "application/json"
    );
}

#[tokio::test]
async fn service_errors_become_none() {
    let (endpoint, _captured) = serve_once(
        "500 Internal Server Error",
        json!({"error": {"code": 500, "message": "backend unavailable"}}).to_string(),
    );
    let parser = GeminiParser::new(config_for(endpoint)).unwrap();
    assert_eq!(parser.parse_expense("coffee 3", &categories()).await, None);
}

#[tokio::test]
async fn service_errors_keep_status_for_callers_that_ask() {
    let (endpoint, _captured) = serve_once("429 Too Many Requests", "{}".to_string());
    let parser = GeminiParser::new(config_for(endpoint)).unwrap();
    let err = parser.try_parse("coffee 3", &categories()).await.unwrap_err();
    assert!(matches!(err, AssistError::Service { status: 429, .. }));
}

#[tokio::test]
async fn non_json_candidate_text_becomes_none() {
    let (endpoint, _captured) = serve_once("200 OK", candidate_body("I think it was a taxi."));
    let parser = GeminiParser::new(config_for(endpoint)).unwrap();
    assert_eq!(parser.parse_expense("taxi", &categories()).await, None);
}
