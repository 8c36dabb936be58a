//! Invocable tool handles produced from a loaded manifest.
//!
//! A [`ToolboxTool`] closes over one tool's input model, the shared
//! credential registry and requirement map, and the transport. Parameter
//! values can be pre-bound before invocation; binding is copy-on-write, so a
//! bound tool is a new value and the original stays usable. The same tool
//! value can be invoked any number of times, concurrently.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::auth::{AuthRequirements, CredentialRegistry};
use crate::model::InputModel;
use crate::transport::Transport;
use crate::utils::error::{ToolboxError, ToolboxResult};

/// A parameter value fixed at bind time.
///
/// `Literal` freezes the value when the binding is created; `Deferred` holds
/// a producer that runs at every invocation, so values like "current
/// timestamp" stay fresh per call.
#[derive(Clone)]
pub enum BoundValue {
    /// A fixed JSON value
    Literal(Value),
    /// A producer invoked with no arguments at call time
    Deferred(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl BoundValue {
    /// Creates a literal binding.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates a lazily-evaluated binding.
    pub fn deferred<F>(producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(producer))
    }

    fn resolve(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Deferred(producer) => producer(),
        }
    }
}

impl fmt::Debug for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Deferred(_) => f.debug_tuple("Deferred").field(&"<fn>").finish(),
        }
    }
}

impl From<Value> for BoundValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

/// An invocable handle onto one remote tool.
#[derive(Clone)]
pub struct ToolboxTool {
    name: String,
    description: String,
    base_url: Url,
    transport: Arc<dyn Transport>,
    model: InputModel,
    bound: HashMap<String, BoundValue>,
    credentials: CredentialRegistry,
    requirements: AuthRequirements,
}

impl fmt::Debug for ToolboxTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolboxTool")
            .field("name", &self.name)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

impl ToolboxTool {
    pub(crate) fn new(
        name: String,
        description: String,
        base_url: Url,
        transport: Arc<dyn Transport>,
        model: InputModel,
        credentials: CredentialRegistry,
        requirements: AuthRequirements,
    ) -> Self {
        Self {
            name,
            description,
            base_url,
            transport,
            model,
            bound: HashMap::new(),
            credentials,
            requirements,
        }
    }

    /// The tool's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tool's description from the manifest.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The caller-facing input model (plain parameters only).
    pub fn input_model(&self) -> &InputModel {
        &self.model
    }

    /// Returns a new tool with `values` added to its bound parameters.
    ///
    /// The original tool is never mutated. Binding fails with
    /// [`ToolboxError::AlreadyAuthenticated`] for parameters resolved through
    /// the credential registry, and with [`ToolboxError::AlreadyBound`] for
    /// parameters bound earlier on this instance. Keys the tool does not
    /// declare fail with [`ToolboxError::UnknownParameter`] when `strict`,
    /// and otherwise take effect with a warning; a freshly loaded manifest on
    /// the server side may declare parameters a stale local view does not.
    pub fn bind_params(
        &self,
        values: HashMap<String, BoundValue>,
        strict: bool,
    ) -> ToolboxResult<Self> {
        let mut unknown: Vec<String> = Vec::new();

        for name in values.keys() {
            if self.requirements.is_auth_param(&self.name, name)? {
                return Err(ToolboxError::AlreadyAuthenticated {
                    tool: self.name.clone(),
                    name: name.clone(),
                });
            }
            if self.bound.contains_key(name) {
                return Err(ToolboxError::AlreadyBound {
                    tool: self.name.clone(),
                    name: name.clone(),
                });
            }
            if !self.model.has_field(name) {
                unknown.push(name.clone());
            }
        }

        if !unknown.is_empty() {
            unknown.sort();
            if strict {
                return Err(ToolboxError::UnknownParameter {
                    tool: self.name.clone(),
                    names: unknown,
                });
            }
            warn!(
                "Parameter(s) `{}` are not defined by tool `{}` and will be sent as-is.",
                unknown.join(", "),
                self.name
            );
        }

        let mut tool = self.clone();
        tool.bound.extend(values);
        Ok(tool)
    }

    /// Single-parameter convenience form of [`bind_params`](Self::bind_params).
    pub fn bind_param(
        &self,
        name: &str,
        value: impl Into<BoundValue>,
        strict: bool,
    ) -> ToolboxResult<Self> {
        let mut values = HashMap::new();
        values.insert(name.to_string(), value.into());
        self.bind_params(values, strict)
    }

    /// Invokes the tool with `args` and returns the service's JSON response.
    ///
    /// Bound parameters are merged in (deferred producers run now), the
    /// merged map is validated against the input model, authentication
    /// requirements are checked, and credentials for the tool's required
    /// sources are injected as `{source}_token` headers. An unmet
    /// authentication requirement fails with
    /// [`ToolboxError::PermissionDenied`] before any network call. No
    /// retries: a failed call surfaces immediately.
    ///
    /// Caller arguments the tool does not declare never reach the wire; in
    /// particular, a caller cannot smuggle a value for an authenticated
    /// parameter into the request body. Only parameters bound through a
    /// non-strict bind are transmitted in addition to the declared ones.
    pub async fn invoke(&self, args: Map<String, Value>) -> ToolboxResult<Value> {
        // Bound parameters are fixed at bind time and cannot be re-supplied.
        for name in args.keys() {
            if self.bound.contains_key(name) {
                return Err(ToolboxError::DuplicateArgument {
                    tool: self.name.clone(),
                    name: name.clone(),
                });
            }
        }

        let mut merged = args;
        for (name, value) in &self.bound {
            merged.insert(name.clone(), value.resolve());
        }

        let mut body = self.model.validate(&merged)?;

        // Validation keeps declared parameters only. Re-attach undeclared
        // keys that were bound non-strictly; undeclared caller arguments
        // stay dropped.
        for name in self.bound.keys() {
            if !self.model.has_field(name) {
                if let Some(value) = merged.get(name) {
                    let value = match value {
                        Value::Null => Value::String(String::new()),
                        other => other.clone(),
                    };
                    body.insert(name.clone(), value);
                }
            }
        }

        let missing = self
            .requirements
            .unsatisfied_params(&self.name, &self.credentials)?;
        if !missing.is_empty() {
            return Err(ToolboxError::PermissionDenied {
                tool: self.name.clone(),
                params: missing,
            });
        }

        let sources = self.requirements.required_sources(&self.name)?;
        let tokens = self.credentials.resolve(&sources)?;
        let headers: HashMap<String, String> = tokens
            .into_iter()
            .map(|(source, token)| (format!("{}_token", source), token))
            .collect();

        if !headers.is_empty() && self.base_url.scheme() != "https" {
            warn!(
                "Sending ID token over HTTP. User data may be exposed. \
                 Use HTTPS for secure communication."
            );
        }

        let url = self.invoke_url()?;
        debug!("Invoking tool `{}`", self.name);
        self.transport
            .post(&url, &Value::Object(body), &headers)
            .await
    }

    fn invoke_url(&self) -> ToolboxResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ToolboxError::Internal(format!("base URL `{}` cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "tool", self.name.as_str(), "invoke"]);
        Ok(url)
    }
}
