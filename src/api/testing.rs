// src/api/testing.rs
//! Scripted in-memory transport for unit tests.

use super::client::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::AppError;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use std::collections::{HashMap, VecDeque};

/// One scripted reply.
#[derive(Clone)]
pub enum Reply {
    Status {
        status: u16,
        headers: Vec<(&'static str, String)>,
        body: String,
    },
    TransportError {
        transient: bool,
    },
}

impl Reply {
    pub fn ok(body: serde_json::Value) -> Self {
        Self::status(200, body.to_string())
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Reply::Status {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn throttled(retry_after: Option<u64>) -> Self {
        let mut headers = vec![("x-ratelimit-remaining", "0".to_string())];
        if let Some(secs) = retry_after {
            headers.push(("x-ratelimit-retry-after", secs.to_string()));
        }
        Reply::Status {
            status: 429,
            headers,
            body: "{}".to_string(),
        }
    }

    pub fn network_down() -> Self {
        Reply::TransportError { transient: true }
    }

    pub fn with_header(mut self, name: &'static str, value: impl ToString) -> Self {
        if let Reply::Status { headers, .. } = &mut self {
            headers.push((name, value.to_string()));
        }
        self
    }
}

/// Replies are queued per `METHOD path`; the last reply of a queue repeats.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<(Method, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.scripts
            .lock()
            .entry(format!("{} {}", method, path))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }
}

fn path_of(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AppError> {
        let path = path_of(&request.url);
        self.calls.lock().push((request.method.clone(), path.clone()));
        let key = format!("{} {}", request.method, path);

        let mut scripts = self.scripts.lock();
        let queue = scripts.get_mut(&key).ok_or_else(|| AppError::Transport {
            message: format!("no script for {}", key),
            transient: false,
        })?;
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        match reply {
            Some(Reply::Status {
                status,
                headers,
                body,
            }) => {
                let mut map = HeaderMap::new();
                for (name, value) in headers {
                    map.insert(
                        HeaderName::from_static(name),
                        HeaderValue::from_str(&value).map_err(|e| AppError::Transport {
                            message: e.to_string(),
                            transient: false,
                        })?,
                    );
                }
                Ok(HttpResponse {
                    status: StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
                    headers: map,
                    url: request.url.clone(),
                    body,
                })
            }
            Some(Reply::TransportError { transient }) => Err(AppError::Transport {
                message: "connection reset by peer".to_string(),
                transient,
            }),
            None => Err(AppError::Transport {
                message: format!("script for {} is empty", key),
                transient: false,
            }),
        }
    }
}
