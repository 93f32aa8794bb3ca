//! Scripted transport for tests.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

use crate::fault::RemoteFault;
use crate::session::Authenticator;
use crate::transport::{RestRequest, Transport};

/// An RPC call received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub token: String,
    pub operation: String,
    pub params: Vec<Value>,
}

type Reply = Result<Value, RemoteFault>;

/// Transport returning queued replies and recording everything it receives.
///
/// Unscripted logins and calls fail with an operation fault.
#[derive(Debug, Default)]
pub struct MockTransport {
    logins: Mutex<VecDeque<Result<String, RemoteFault>>>,
    login_count: Mutex<usize>,
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
    rest_replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<RestRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue tokens returned by successive logins.
    pub fn with_logins(self, tokens: &[&str]) -> Self {
        self.logins
            .lock()
            .extend(tokens.iter().map(|t| Ok((*t).to_string())));
        self
    }

    /// Queue a reply for the named RPC call.
    pub fn reply(&self, operation: &str, value: Value) {
        self.push_reply(operation, Ok(value));
    }

    /// Queue a fault for the named RPC call.
    pub fn fail(&self, operation: &str, fault: RemoteFault) {
        self.push_reply(operation, Err(fault));
    }

    /// Queue a reply for the next REST request.
    pub fn reply_rest(&self, value: Value) {
        self.rest_replies.lock().push_back(Ok(value));
    }

    pub fn login_count(&self) -> usize {
        *self.login_count.lock()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn requests(&self) -> Vec<RestRequest> {
        self.requests.lock().clone()
    }

    fn push_reply(&self, operation: &str, reply: Reply) {
        self.replies
            .lock()
            .entry(operation.to_string())
            .or_default()
            .push_back(reply);
    }
}

impl Authenticator for MockTransport {
    fn login(&self, _username: &str, _password: &str) -> Result<String, RemoteFault> {
        *self.login_count.lock() += 1;
        self.logins
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteFault::operation("unexpected call to login")))
    }
}

impl Transport for MockTransport {
    fn call(&self, token: &str, operation: &str, params: Vec<Value>) -> Result<Value, RemoteFault> {
        self.calls.lock().push(RecordedCall {
            token: token.to_string(),
            operation: operation.to_string(),
            params,
        });

        self.replies
            .lock()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(RemoteFault::operation(format!("unexpected call to {operation}"))))
    }

    fn request(&self, request: RestRequest) -> Result<Value, RemoteFault> {
        let resource = request.resource.clone();
        self.requests.lock().push(request);

        self.rest_replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteFault::operation(format!("unexpected request to {resource}"))))
    }
}
