//! Test Helper Utilities
//!
//! Mock npm endpoints (downloads range + registry search) and settings
//! builders shared by the integration tests.

#![allow(dead_code)]

use clap::Parser;
use npmdl_common::config::TomlConfig;
use npmdl_ingest::cli::Args;
use npmdl_ingest::config::IngestSettings;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::{
    matchers::{method, path, path_regex, query_param},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

/// Arrival times of requests seen by a [`RecordingRange`] responder
#[derive(Clone, Default)]
pub struct ArrivalLog(Arc<Mutex<Vec<Instant>>>);

impl ArrivalLog {
    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    /// Most requests held open at once, given each is held for `delay`
    pub fn max_in_flight(&self, delay: Duration) -> usize {
        let arrivals = self.0.lock().unwrap().clone();
        arrivals
            .iter()
            .map(|&at| {
                arrivals
                    .iter()
                    .filter(|&&other| other <= at && other + delay > at)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }
}

/// Answers any single-name range request with one point, after `delay`
struct RecordingRange {
    arrivals: ArrivalLog,
    delay: Duration,
}

impl Respond for RecordingRange {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals.0.lock().unwrap().push(Instant::now());
        let name = request
            .url
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string();
        ResponseTemplate::new(200)
            .set_body_json(package_body(&name, &[("2023-03-15", 1)]))
            .set_delay(self.delay)
    }
}

/// One mock server answering both API roots
pub struct MockNpm {
    server: MockServer,
}

impl MockNpm {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Answer every range request for `period`, logging when each arrives
    pub async fn mount_range_recorded(&self, period: &str, delay: Duration) -> ArrivalLog {
        let arrivals = ArrivalLog::default();
        Mock::given(method("GET"))
            .and(path_regex(format!("^/downloads/range/{}/[^/,]+$", period)))
            .respond_with(RecordingRange {
                arrivals: arrivals.clone(),
                delay,
            })
            .mount(&self.server)
            .await;
        arrivals
    }

    /// Answer `GET /downloads/range/{period}/{names}` with `body`
    pub async fn mount_range(&self, period: &str, names: &str, status: u16, body: Value) {
        self.mount_range_delayed(period, names, status, body, Duration::ZERO)
            .await;
    }

    pub async fn mount_range_delayed(
        &self,
        period: &str,
        names: &str,
        status: u16,
        body: Value,
        delay: Duration,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/downloads/range/{}/{}", period, names)))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(body)
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Answer the same range request `times` times
    pub async fn mount_range_repeated(&self, period: &str, names: &str, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/downloads/range/{}/{}", period, names)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Answer one search page for `text` at offset `from`
    pub async fn mount_search_page(&self, text: &str, from: usize, hits: &[String]) {
        self.mount_search_page_delayed(text, from, hits, Duration::ZERO)
            .await;
    }

    pub async fn mount_search_page_delayed(
        &self,
        text: &str,
        from: usize,
        hits: &[String],
        delay: Duration,
    ) {
        Mock::given(method("GET"))
            .and(path("/-/v1/search"))
            .and(query_param("text", text))
            .and(query_param("from", from.to_string()))
            .and(query_param("size", "250"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(search_body(hits))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Fail one search page for `text` at offset `from`
    pub async fn mount_search_failure(&self, text: &str, from: usize, status: u16) {
        Mock::given(method("GET"))
            .and(path("/-/v1/search"))
            .and(query_param("text", text))
            .and(query_param("from", from.to_string()))
            .respond_with(ResponseTemplate::new(status).set_body_string("registry unavailable"))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Assert a search page is never requested
    pub async fn forbid_search_page(&self, text: &str, from: usize) {
        Mock::given(method("GET"))
            .and(path("/-/v1/search"))
            .and(query_param("text", text))
            .and(query_param("from", from.to_string()))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

/// Per-package range body
pub fn package_body(name: &str, points: &[(&str, u64)]) -> Value {
    let (start, end) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => ("2023-03-15", "2023-03-15"),
    };
    json!({
        "start": start,
        "end": end,
        "package": name,
        "downloads": points
            .iter()
            .map(|(day, downloads)| json!({"downloads": downloads, "day": day}))
            .collect::<Vec<_>>(),
    })
}

/// Search response body with one object per name
pub fn search_body(names: &[String]) -> Value {
    json!({
        "objects": names
            .iter()
            .map(|name| json!({
                "package": {
                    "name": name,
                    "version": "1.0.0",
                    "description": format!("Test package {name}"),
                    "keywords": [],
                    "links": {"npm": format!("https://www.npmjs.com/package/{name}")},
                },
                "score": {
                    "final": 0.5,
                    "detail": {"quality": 0.5, "popularity": 0.5, "maintenance": 0.5},
                },
                "searchScore": 0.001,
            }))
            .collect::<Vec<_>>(),
        "total": names.len(),
        "time": "Wed Mar 15 2023 00:00:00 GMT+0000 (Coordinated Universal Time)",
    })
}

/// `count` distinct names with a common prefix
pub fn names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}-{i:03}")).collect()
}

/// Settings pointing both API roots at `mock`
pub fn settings_for(mock: &MockNpm, extra: &[&str]) -> IngestSettings {
    let url = mock.url();
    let mut argv = vec![
        "npmdl-ingest",
        "--downloads-api",
        url.as_str(),
        "--registry-api",
        url.as_str(),
        "--database",
        "unused.sqlite3",
    ];
    argv.extend_from_slice(extra);
    let args = Args::parse_from(argv);
    IngestSettings::resolve(&args, &TomlConfig::default()).expect("valid test settings")
}
