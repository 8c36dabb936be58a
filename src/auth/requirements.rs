//! Extraction and tracking of per-tool authentication requirements.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::auth::registry::CredentialRegistry;
use crate::schema::ManifestSchema;
use crate::utils::error::{ToolboxError, ToolboxResult};

/// Per-parameter acceptable authentication sources for one tool.
pub type ToolRequirements = HashMap<String, Vec<String>>;

/// Shared map of tool name to that tool's authentication requirements.
///
/// Grows monotonically: a tool's entry is written once, when its manifest is
/// first processed, and never removed. Like the [`CredentialRegistry`],
/// clones are handles onto the same underlying map.
#[derive(Clone, Default)]
pub struct AuthRequirements {
    tools: Arc<RwLock<HashMap<String, ToolRequirements>>>,
}

impl fmt::Debug for AuthRequirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.tools.read().map(|t| t.len()).unwrap_or(0);
        f.debug_struct("AuthRequirements")
            .field("tool_count", &count)
            .finish_non_exhaustive()
    }
}

impl AuthRequirements {
    /// Creates an empty requirement map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strips authenticated parameters out of every tool in `manifest` and
    /// records their acceptable sources.
    ///
    /// The surviving parameter lists contain exactly the plain parameters, in
    /// their original order, so downstream input-model construction never
    /// sees an authenticated parameter. Tools whose requirements are not yet
    /// satisfied by `registry` produce a warning, not an error: a tool may
    /// still be inspected or bound before credentials are registered, and
    /// only invocation fails hard.
    pub fn extract(
        &self,
        manifest: &mut ManifestSchema,
        registry: &CredentialRegistry,
    ) -> ToolboxResult<()> {
        for (tool_name, tool) in &mut manifest.tools {
            let mut requirements = ToolRequirements::new();

            tool.parameters.retain(|param| {
                if param.requires_auth() {
                    let sources = param.auth_sources.clone().unwrap_or_default();
                    requirements.insert(param.name.clone(), sources);
                    false
                } else {
                    true
                }
            });

            {
                let mut tools = self.tools.write().map_err(|_| {
                    ToolboxError::Internal("auth requirement lock poisoned".to_string())
                })?;
                // Written once per tool; a reload never rewrites the entry.
                tools
                    .entry(tool_name.clone())
                    .or_insert_with(|| requirements);
            }

            let missing = self.unsatisfied_params(tool_name, registry)?;
            if !missing.is_empty() {
                warn!(
                    "Parameter(s) `{}` of tool {} require authentication, but no valid \
                     authentication sources are registered. Please register the required \
                     sources before use.",
                    missing.join(", "),
                    tool_name
                );
            }
        }

        Ok(())
    }

    /// Returns true when every required parameter of `tool` has at least one
    /// acceptable source registered, or when the tool requires nothing.
    pub fn is_satisfied(&self, tool: &str, registry: &CredentialRegistry) -> ToolboxResult<bool> {
        Ok(self.unsatisfied_params(tool, registry)?.is_empty())
    }

    /// The required parameters of `tool` whose source lists have no overlap
    /// with the registered credential sources.
    pub fn unsatisfied_params(
        &self,
        tool: &str,
        registry: &CredentialRegistry,
    ) -> ToolboxResult<Vec<String>> {
        let requirements = self.required_params(tool)?;

        let mut missing: Vec<String> = requirements
            .iter()
            .filter(|(_, sources)| !sources.iter().any(|source| registry.contains(source)))
            .map(|(param, _)| param.clone())
            .collect();
        missing.sort();

        Ok(missing)
    }

    /// Snapshot of `tool`'s requirement entry (param name to source list).
    pub fn required_params(&self, tool: &str) -> ToolboxResult<ToolRequirements> {
        let tools = self
            .tools
            .read()
            .map_err(|_| ToolboxError::Internal("auth requirement lock poisoned".to_string()))?;
        Ok(tools.get(tool).cloned().unwrap_or_default())
    }

    /// Every acceptable source name across `tool`'s required parameters,
    /// deduplicated.
    pub fn required_sources(&self, tool: &str) -> ToolboxResult<Vec<String>> {
        let requirements = self.required_params(tool)?;
        let mut sources: Vec<String> = Vec::new();
        for list in requirements.values() {
            for source in list {
                if !sources.contains(source) {
                    sources.push(source.clone());
                }
            }
        }
        Ok(sources)
    }

    /// Returns true when `name` is a required-auth parameter of `tool`.
    pub fn is_auth_param(&self, tool: &str, name: &str) -> ToolboxResult<bool> {
        Ok(self.required_params(tool)?.contains_key(name))
    }
}
