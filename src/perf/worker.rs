//! Background worker hosting one engine off the caller's thread
//!
//! Requests go in over a channel and responses come back over another,
//! correlated by the caller's request id. The worker owns its engine, so the
//! cache needs no locking.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::protocol::{RequestEnvelope, Response};

/// Requests that can be sent to the background worker
pub enum WorkerRequest {
    /// Run one request through the engine
    Dispatch(RequestEnvelope),
    /// Shutdown the worker
    Shutdown,
}

/// Background worker that processes requests off the caller's thread
pub struct EngineWorker {
    tx: Sender<WorkerRequest>,
    rx: Receiver<Response>,
    handle: Option<JoinHandle<()>>,
    /// Responses that arrived while `wait_for` waited on a different id,
    /// queued per id in arrival order
    parked: HashMap<String, VecDeque<Response>>,
    /// Late responses still owed for requests whose wait timed out
    abandoned: HashMap<String, usize>,
}

impl EngineWorker {
    /// Spawn a worker thread that owns `engine`
    pub fn spawn(engine: Engine) -> Result<Self> {
        let (req_tx, req_rx) = channel::<WorkerRequest>();
        let (res_tx, res_rx) = channel::<Response>();

        let handle = thread::Builder::new()
            .name("curve-engine-worker".to_string())
            .spawn(move || Self::worker_loop(engine, req_rx, res_tx))
            .map_err(EngineError::WorkerSpawn)?;

        Ok(Self {
            tx: req_tx,
            rx: res_rx,
            handle: Some(handle),
            parked: HashMap::new(),
            abandoned: HashMap::new(),
        })
    }

    fn worker_loop(mut engine: Engine, rx: Receiver<WorkerRequest>, tx: Sender<Response>) {
        log::info!("engine worker started");
        while let Ok(request) = rx.recv() {
            let response = match request {
                WorkerRequest::Dispatch(req) => engine.dispatch(req),
                WorkerRequest::Shutdown => break,
            };

            if tx.send(response).is_err() {
                break;
            }
        }
        log::info!("engine worker stopped");
    }

    /// Send a request to the worker (non-blocking)
    pub fn submit(&self, request: RequestEnvelope) -> Result<()> {
        self.tx
            .send(WorkerRequest::Dispatch(request))
            .map_err(|_| EngineError::WorkerDisconnected)
    }

    /// Poll for a completed response (non-blocking)
    pub fn poll(&mut self) -> Option<Response> {
        if let Some(id) = self.parked.keys().next().cloned() {
            return self.unpark(&id);
        }
        loop {
            match self.rx.try_recv() {
                Ok(response) if self.discard_if_abandoned(&response) => continue,
                Ok(response) => return Some(response),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Wait up to `timeout` for the next response, whatever its id
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Response> {
        if let Some(response) = self.poll() {
            return Ok(response);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(response) if self.discard_if_abandoned(&response) => {}
                Ok(response) => return Ok(response),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(EngineError::Timeout {
                        id: String::new(),
                        waited: timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(EngineError::WorkerDisconnected),
            }
        }
    }

    /// Submit a request and wait for the response carrying its id.
    ///
    /// Responses to other requests that arrive meanwhile are kept for later
    /// `poll`/`call`. A timeout does not cancel the request, but its late
    /// response is discarded, so the id can be reused straight away.
    pub fn call(&mut self, request: RequestEnvelope, timeout: Duration) -> Result<Response> {
        let id = request.id.clone();
        self.submit(request)?;
        self.wait_for(&id, timeout)
    }

    /// Wait for the response to an already-submitted request
    pub fn wait_for(&mut self, id: &str, timeout: Duration) -> Result<Response> {
        if let Some(response) = self.unpark(id) {
            return Ok(response);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(response) if self.discard_if_abandoned(&response) => {}
                Ok(response) if response.id == id => return Ok(response),
                Ok(other) => {
                    self.parked
                        .entry(other.id.clone())
                        .or_default()
                        .push_back(other);
                }
                Err(RecvTimeoutError::Timeout) => {
                    *self.abandoned.entry(id.to_string()).or_default() += 1;
                    return Err(EngineError::Timeout {
                        id: id.to_string(),
                        waited: timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(EngineError::WorkerDisconnected),
            }
        }
    }

    fn unpark(&mut self, id: &str) -> Option<Response> {
        let queue = self.parked.get_mut(id)?;
        let response = queue.pop_front();
        if queue.is_empty() {
            self.parked.remove(id);
        }
        response
    }

    /// The worker answers in submission order, so the first response seen for
    /// an abandoned id is always the stale one
    fn discard_if_abandoned(&mut self, response: &Response) -> bool {
        let Some(owed) = self.abandoned.get_mut(&response.id) else {
            return false;
        };
        *owed -= 1;
        if *owed == 0 {
            self.abandoned.remove(&response.id);
        }
        log::debug!(
            "discarded late response for timed-out request '{}' ({})",
            response.id,
            response.kind
        );
        true
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
