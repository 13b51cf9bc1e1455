//! Scripted transport for downloader tests

use crate::crawler::{HttpResponse, Transport, TransportError, TransportErrorKind};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// One scripted reply
#[derive(Debug, Clone)]
pub struct Step {
    delay: Duration,
    result: Result<HttpResponse, TransportError>,
}

impl Step {
    pub fn ok(body: &[u8]) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(HttpResponse {
                status: 200,
                body: body.to_vec(),
            }),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(HttpResponse {
                status,
                body: Vec::new(),
            }),
        }
    }

    pub fn connect_error() -> Self {
        Self::error(TransportErrorKind::Connect)
    }

    pub fn timeout() -> Self {
        Self::error(TransportErrorKind::Timeout)
    }

    pub fn invalid() -> Self {
        Self::error(TransportErrorKind::Invalid)
    }

    fn error(kind: TransportErrorKind) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(TransportError::new(kind, "scripted failure")),
        }
    }

    /// Holds the reply back for `delay`
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Replays scripted steps per URL and records every call
///
/// URLs without a script (or with an exhausted one) get the fallback step, a 404
/// unless set otherwise.
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<HashMap<String, Vec<Instant>>>,
    fallback: Step,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::with_fallback(Step::status(404))
    }

    pub fn with_fallback(fallback: Step) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            fallback,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn script(&self, url: &str, steps: Vec<Step>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), steps.into());
    }

    pub fn call_times(&self, url: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.call_times(url).len()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().map(Vec::len).sum()
    }

    /// Highest number of concurrent calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push(Instant::now());

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| self.fallback.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        step.result
    }
}
