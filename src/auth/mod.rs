//! Authentication state shared between a client and its tools.
//!
//! Two pieces of process-held state live here: the [`CredentialRegistry`],
//! mapping authentication source names to token getters, and
//! [`AuthRequirements`], tracking which parameters of which tools must be
//! resolved through those sources. Both are cheaply cloneable handles onto
//! lock-guarded maps owned by the enclosing client.

mod registry;
mod requirements;

pub use registry::{CredentialRegistry, TokenGetter};
pub use requirements::{AuthRequirements, ToolRequirements};
