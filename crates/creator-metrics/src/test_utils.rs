//! Scripted transport for unit tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::client::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::FetchFault;

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Scripted {
    Response { status: u16, body: String },
    NetworkError(String),
}

impl Scripted {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::Response {
            status,
            body: body.to_string(),
        }
    }

    pub fn network(message: &str) -> Self {
        Self::NetworkError(message.to_string())
    }
}

/// Replays scripted outcomes in order, then repeats the fallback forever.
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn always(outcome: Scripted) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Play `outcomes` once; afterwards every call fails with a 503.
    pub fn sequence(outcomes: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            fallback: Scripted::status(503, "script exhausted"),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchFault> {
        self.requests.lock().push(request);
        let outcome = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match outcome {
            Scripted::Response { status, body } => Ok(HttpResponse {
                status: StatusCode::from_u16(status).unwrap(),
                body,
            }),
            Scripted::NetworkError(message) => Err(FetchFault::Network(message)),
        }
    }
}
