//! Per-connection session state.
//!
//! Each client connection owns one `Session`: the generated identifier used
//! in the greeting, the client name registered via `HI, I AM <name>`, the
//! moment the conversation started, and the terminal flag. Sessions are
//! private to their connection thread and need no synchronization.

use std::time::Instant;

use ulid::Ulid;

use crate::error::{GraphError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Commands are accepted.
    Active,
    /// Terminal: goodbye sent or connection torn down.
    Closed,
}

/// Conversational state for one client connection.
#[derive(Debug)]
pub struct Session {
    id: Ulid,
    client_name: Option<String>,
    started: Instant,
    state: SessionState,
}

impl Session {
    /// Start a new session; the timer starts now.
    pub fn new() -> Self {
        Self {
            id: Ulid::new(),
            client_name: None,
            started: Instant::now(),
            state: SessionState::Active,
        }
    }

    /// Generated identifier, used as the default name in the greeting.
    pub fn id(&self) -> Ulid {
        self.id
    }

    /// Record the client's name. Overwrites any previously registered name.
    pub fn register_name(&mut self, name: &str) {
        self.client_name = Some(name.to_string());
    }

    /// The registered client name, or `ClientNameNotRegistered` if the
    /// client never introduced itself. Goodbye and timeout messages cannot
    /// be formed without it.
    pub fn client_name(&self) -> Result<&str> {
        self.client_name
            .as_deref()
            .ok_or(GraphError::ClientNameNotRegistered)
    }

    /// Milliseconds since the session started.
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
