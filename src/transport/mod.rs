//! Transport abstraction for talking to the toolbox service.
//!
//! The client core only needs `get` (manifest fetch) and `post` (tool
//! invocation) semantics; everything else about HTTP, including timeouts, is
//! a property of the concrete transport.

mod http;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::utils::error::ToolboxResult;

pub use http::HttpTransport;

/// Request/response collaborator used for manifest fetches and tool
/// invocations.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches the body at `url` as text. A non-2xx status is an error.
    async fn get(&self, url: &Url) -> ToolboxResult<String>;

    /// Posts `body` as JSON to `url` with the given headers and parses the
    /// response body as JSON. A non-2xx status is an error.
    async fn post(
        &self,
        url: &Url,
        body: &Value,
        headers: &HashMap<String, String>,
    ) -> ToolboxResult<Value>;

    /// Releases any underlying session. Called at most once, by the owner.
    async fn close(&self) {}
}
