// SPDX-FileCopyrightText: 2026 The proofscope developers
// SPDX-License-Identifier: MIT

//! Channel bridge between a session and the reasoning engine.
//!
//! The engine runs elsewhere (a worker, a subprocess, a socket pump); this
//! module only owns the two queues in between. [`pair`] yields the session
//! side ([`EngineLink`]) and the engine side ([`EngineEndpoint`]); the link
//! drives one request/response round trip at a time with a bounded wait.

use std::fmt;
use std::time::Duration;

use log::warn;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::query::{QueryEnvelope, ResponseEnvelope};
use crate::session::{Session, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    /// The other side of the bridge is gone.
    Closed,
    /// No usable response arrived within the deadline.
    TimedOut,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("engine connection closed"),
            Self::TimedOut => f.write_str("engine did not answer in time"),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Session side of the bridge.
#[derive(Debug)]
pub struct EngineLink {
    requests: mpsc::Sender<QueryEnvelope>,
    responses: mpsc::Receiver<ResponseEnvelope>,
}

/// Engine side of the bridge.
#[derive(Debug)]
pub struct EngineEndpoint {
    requests: mpsc::Receiver<QueryEnvelope>,
    responses: mpsc::Sender<ResponseEnvelope>,
}

/// Creates a connected link/endpoint pair with the given queue depth.
pub fn pair(buffer: usize) -> (EngineLink, EngineEndpoint) {
    let (request_tx, request_rx) = mpsc::channel(buffer);
    let (response_tx, response_rx) = mpsc::channel(buffer);
    (
        EngineLink {
            requests: request_tx,
            responses: response_rx,
        },
        EngineEndpoint {
            requests: request_rx,
            responses: response_tx,
        },
    )
}

impl EngineLink {
    /// Sends `request` and waits for the response that settles it.
    ///
    /// Stale responses (late answers to superseded requests) are digested and
    /// skipped; the deadline applies to each wait on the response queue. On
    /// timeout or disconnect the session's pending request is aborted so it
    /// accepts input again.
    pub async fn exchange(
        &mut self,
        session: &mut Session,
        request: QueryEnvelope,
        deadline: Duration,
    ) -> Result<SessionEvent, BridgeError> {
        let request_id = request.request_id;
        if self.requests.send(request).await.is_err() {
            session.abort_pending();
            return Err(BridgeError::Closed);
        }

        loop {
            let response = match timeout(deadline, self.responses.recv()).await {
                Ok(Some(response)) => response,
                Ok(None) => {
                    session.abort_pending();
                    return Err(BridgeError::Closed);
                }
                Err(_) => {
                    warn!("request {request_id} timed out after {deadline:?}");
                    session.abort_pending();
                    return Err(BridgeError::TimedOut);
                }
            };
            match session.handle_response(response) {
                SessionEvent::StaleResponseIgnored => continue,
                event => return Ok(event),
            }
        }
    }
}

impl EngineEndpoint {
    /// Next request from the session, `None` once the link is dropped.
    pub async fn next_request(&mut self) -> Option<QueryEnvelope> {
        self.requests.recv().await
    }

    pub async fn respond(&mut self, response: ResponseEnvelope) -> Result<(), BridgeError> {
        self.responses
            .send(response)
            .await
            .map_err(|_| BridgeError::Closed)
    }
}
