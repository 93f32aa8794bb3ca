//! jiralink-client: Session handling and remote services for jiralink.
//!
//! - `Session`: token cache with lazy login and a single re-login on rejected tokens
//! - `Transport`: RPC and REST channel to the server, `HttpTransport` over HTTP
//! - `JiraClient`: issue, user and component operations

pub mod cache;
pub mod client;
pub mod components;
pub mod config;
pub mod error;
pub mod fault;
pub mod fs;
pub mod http;
pub mod session;
pub mod transport;
pub mod users;

#[cfg(test)]
mod mock;

pub use client::{IssueFieldResolver, JiraClient};
pub use components::ProjectComponents;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use fault::{classify_fault, FaultKind, RemoteFault};
pub use fs::{FileSystem, StdFileSystem};
pub use http::HttpTransport;
pub use session::{Authenticator, Credentials, Session};
pub use transport::{Method, RestRequest, Transport};
pub use users::UserService;
