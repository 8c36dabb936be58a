//! Client entry point for a toolbox service.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::auth::{AuthRequirements, CredentialRegistry};
use crate::model::InputModel;
use crate::schema::ManifestSchema;
use crate::tool::ToolboxTool;
use crate::transport::{HttpTransport, Transport};
use crate::utils::error::{ToolboxError, ToolboxResult};

/// Client for one toolbox service instance.
///
/// The client owns the credential registry and the authentication
/// requirement map; every tool it loads holds handles onto both, so a
/// credential registered after loading immediately applies to already-loaded
/// tools. Manifests themselves are not cached: each load call fetches a
/// fresh one and re-derives auth state from it.
pub struct ToolboxClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    owns_transport: bool,
    closed: AtomicBool,
    credentials: CredentialRegistry,
    requirements: AuthRequirements,
}

impl fmt::Debug for ToolboxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolboxClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .field("requirements", &self.requirements)
            .finish_non_exhaustive()
    }
}

impl ToolboxClient {
    /// Creates a client for the toolbox service at `url`, with a transport
    /// of its own.
    ///
    /// The created transport is owned by this client and released by
    /// [`close`](Self::close).
    pub fn new(url: &str) -> ToolboxResult<Self> {
        let transport = HttpTransport::new()?;
        let mut client = Self::with_transport(url, Arc::new(transport))?;
        client.owns_transport = true;
        Ok(client)
    }

    /// Creates a client over a caller-supplied transport.
    ///
    /// The caller keeps ownership of the transport's lifecycle;
    /// [`close`](Self::close) will not touch it.
    pub fn with_transport(url: &str, transport: Arc<dyn Transport>) -> ToolboxResult<Self> {
        let base_url = Url::parse(url)
            .map_err(|e| ToolboxError::Connection(format!("Invalid base URL `{}`: {}", url, e)))?;

        Ok(Self {
            base_url,
            transport,
            owns_transport: false,
            closed: AtomicBool::new(false),
            credentials: CredentialRegistry::new(),
            requirements: AuthRequirements::new(),
        })
    }

    /// Registers a token getter for the authentication source `name`.
    ///
    /// Registering an already-registered source replaces its getter; last
    /// write wins.
    pub fn register_credential_source<F>(&self, name: &str, getter: F) -> ToolboxResult<()>
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.credentials.register(name, getter)
    }

    /// Loads the tool named `tool_name` from the service.
    pub async fn load_tool(&self, tool_name: &str) -> ToolboxResult<ToolboxTool> {
        let url = self.manifest_url(&["api", "tool", tool_name])?;
        let manifest = self.fetch_manifest(&url).await?;

        let mut tools = self.build_tools(manifest)?;
        tools.remove(tool_name).ok_or_else(|| {
            ToolboxError::ManifestValidation(vec![format!(
                "manifest does not contain tool `{}`",
                tool_name
            )])
        })
    }

    /// Loads every tool of the named toolset, or all tools the service
    /// exposes when `toolset_name` is `None`.
    pub async fn load_toolset(
        &self,
        toolset_name: Option<&str>,
    ) -> ToolboxResult<Vec<ToolboxTool>> {
        let url = self.manifest_url(&["api", "toolset", toolset_name.unwrap_or("")])?;
        let manifest = self.fetch_manifest(&url).await?;

        let tools = self.build_tools(manifest)?;
        Ok(tools.into_values().collect())
    }

    /// Releases the transport if this client created it.
    ///
    /// Safe to call more than once; only the first call closes. A transport
    /// supplied by the caller is never closed here.
    pub async fn close(&self) {
        if self.owns_transport && !self.closed.swap(true, Ordering::SeqCst) {
            debug!("Closing owned transport for {}", self.base_url);
            self.transport.close().await;
        }
    }

    async fn fetch_manifest(&self, url: &Url) -> ToolboxResult<ManifestSchema> {
        debug!("Fetching manifest from {}", url);
        let raw = self.transport.get(url).await?;
        let manifest = ManifestSchema::parse(&raw)?;
        info!(
            "Loaded manifest (server version {}, {} tool(s))",
            manifest.server_version,
            manifest.tools.len()
        );
        Ok(manifest)
    }

    /// Runs the shared load pipeline: extract auth requirements out of the
    /// manifest, then wrap each remaining tool schema into an invocable
    /// handle over the client's shared state.
    fn build_tools(
        &self,
        mut manifest: ManifestSchema,
    ) -> ToolboxResult<HashMap<String, ToolboxTool>> {
        self.requirements
            .extract(&mut manifest, &self.credentials)?;

        let mut tools = HashMap::new();
        for (name, schema) in manifest.tools {
            let model = InputModel::new(&name, &schema.parameters);
            let tool = ToolboxTool::new(
                name.clone(),
                schema.description,
                self.base_url.clone(),
                Arc::clone(&self.transport),
                model,
                self.credentials.clone(),
                self.requirements.clone(),
            );
            tools.insert(name, tool);
        }
        Ok(tools)
    }

    fn manifest_url(&self, segments: &[&str]) -> ToolboxResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ToolboxError::Internal(format!("base URL `{}` cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
