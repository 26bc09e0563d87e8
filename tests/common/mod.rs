#![allow(dead_code)]

use eaflood_rs::{Client, FloodError, Transport};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;

pub const BASE: &str = "http://fixture.test/flood-monitoring";

/// Canned responses keyed by full URL; anything else answers 404.
#[derive(Default)]
pub struct FixtureTransport {
    responses: HashMap<String, Value>,
    requests: RefCell<Vec<String>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` for `path`, relative to [`BASE`] unless absolute.
    pub fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(url(path), body);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for FixtureTransport {
    fn get_json(&self, url: &str) -> eaflood_rs::Result<Value> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FloodError::HttpStatus {
                url: url.to_string(),
                code: 404,
            })
    }
}

pub fn url(path: &str) -> String {
    if path.starts_with("http") {
        path.to_string()
    } else {
        format!("{BASE}/{path}")
    }
}

pub fn client(transport: FixtureTransport) -> Client<FixtureTransport> {
    Client::with_transport(BASE, transport)
}

pub fn envelope(items: Value) -> Value {
    json!({ "@context": "http://fixture.test/meta/context.jsonld", "items": items })
}

pub fn station(id: &str, label: &str) -> Value {
    json!({
        "@id": format!("{BASE}/id/stations/{id}"),
        "stationReference": id,
        "notation": id,
        "label": label,
        "riverName": "River Test",
    })
}

pub fn measure_endpoint(id: &str, parameter: &str, qualifier: &str) -> String {
    format!("{BASE}/id/measures/{id}-{parameter}-{qualifier}-i-15_min")
}

pub fn measure(id: &str, parameter: &str, qualifier: &str, unit: &str) -> Value {
    let ep = measure_endpoint(id, parameter, qualifier);
    json!({
        "@id": ep,
        "parameter": parameter,
        "qualifier": qualifier,
        "unitName": unit,
        "latestReading": { "measure": ep, "value": 1.0 },
    })
}

pub fn readings(points: &[(&str, f64)]) -> Value {
    let items: Vec<Value> = points
        .iter()
        .map(|(t, v)| json!({ "dateTime": t, "value": v }))
        .collect();
    envelope(Value::Array(items))
}

/// A station with lookup and measure catalog registered.
pub fn with_station(
    t: FixtureTransport,
    id: &str,
    label: &str,
    measures: &[(&str, &str, &str)],
) -> FixtureTransport {
    let catalog: Vec<Value> = measures
        .iter()
        .map(|(p, q, u)| measure(id, p, q, u))
        .collect();
    t.with(
        &format!("id/stations/?stationReference={id}"),
        envelope(json!([station(id, label)])),
    )
    .with(
        &format!("id/stations/{id}/measures"),
        envelope(Value::Array(catalog)),
    )
}

/// Serve fixed `(path_and_query, status, body)` routes on a local port and
/// return the base URL to point a client at. Unknown paths answer 404.
pub fn serve(routes: Vec<(String, u16, String)>) -> String {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    std::thread::spawn(move || {
        for req in server.incoming_requests() {
            let (status, body) = routes
                .iter()
                .find(|(path, _, _)| *path == req.url())
                .map(|(_, s, b)| (*s, b.clone()))
                .unwrap_or((404, "{}".to_string()));
            let resp = tiny_http::Response::from_string(body)
                .with_status_code(tiny_http::StatusCode::from(status))
                .with_header(
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .unwrap(),
                );
            let _ = req.respond(resp);
        }
    });
    format!("http://127.0.0.1:{port}/flood-monitoring")
}
