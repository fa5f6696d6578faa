/**
 * End-to-end tests for `Transport` against a throwaway collector bound to
 * localhost. The collector accepts one request, records it, and answers
 * with a canned status.
 */
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use serde_json::json;
use uamp::{Hit, HitError, HitOptions, StaticContext, Transport, TransportError, TransportOptions};

struct Recorded {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Spawns a one-shot collector. Returns its URL and a receiver for the
/// request it saw.
fn collector(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind collector");
    let url = format!("http://{}/collect", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
        }

        let length: usize = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        let mut raw = vec![0; length];
        reader.read_exact(&mut raw).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();

        let _ = tx.send(Recorded {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(raw).unwrap(),
        });
    });

    (url, rx)
}

fn transport(endpoint: String) -> Transport {
    Transport::new(TransportOptions {
        endpoint,
        ..Default::default()
    })
    .expect("valid endpoint")
}

fn event_hit() -> Hit {
    Hit::with_options(
        [
            ("tid", json!("UA-1-1")),
            ("cid", json!("35009a79-1a05-49d7-b876-2b884d0f825b")),
            ("t", json!("event")),
            ("ec", json!("video")),
            ("ea", json!("play")),
            ("el", json!("holiday clip")),
            ("ev", json!(300)),
        ],
        HitOptions {
            context: Arc::new(StaticContext::new("Mozilla/5.0 (uamp tests)")),
            ..Default::default()
        },
    )
}

#[test]
fn test_post_sends_payload_with_user_agent() {
    let (url, rx) = collector("HTTP/1.1 200 OK", "");
    let hit = event_hit();

    let status = transport(url).try_post(&hit).expect("delivered");
    assert_eq!(status, 200);

    let request = rx.recv().expect("collector saw a request");
    assert_eq!(request.request_line, "POST /collect HTTP/1.1");
    assert_eq!(request.header("user-agent"), Some("Mozilla/5.0 (uamp tests)"));
    assert_eq!(
        request.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        request.body,
        "v=1&tid=UA-1-1&cid=35009a79-1a05-49d7-b876-2b884d0f825b&t=event\
         &ec=video&ea=play&el=holiday+clip&ev=300"
    );
}

#[test]
fn test_non_success_status_is_an_error() {
    let (url, rx) = collector("HTTP/1.1 503 Service Unavailable", "busy");

    let err = transport(url).try_post(&event_hit()).unwrap_err();
    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "busy");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
    assert!(rx.recv().is_ok());
}

#[test]
fn test_post_swallows_non_success_status() {
    let (url, rx) = collector("HTTP/1.1 500 Internal Server Error", "oops");

    transport(url).post(&event_hit());
    assert!(rx.recv().is_ok());
}

#[test]
fn test_unreachable_collector() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let transport = transport(format!("http://127.0.0.1:{port}/collect"));

    assert!(matches!(
        transport.try_post(&event_hit()),
        Err(TransportError::Request(_))
    ));

    transport.post(&event_hit());
}

#[test]
fn test_incomplete_hit_is_reported_not_sent() {
    let transport = transport("http://127.0.0.1:9/collect".into());
    let mut hit = event_hit();
    hit.set("t", "item").unwrap();

    match transport.try_post(&hit) {
        Err(TransportError::Hit(HitError::MissingRequiredForType { key, .. })) => {
            assert_eq!(key, "ti");
        }
        other => panic!("expected a build error, got {other:?}"),
    }

    transport.post(&hit);
}
