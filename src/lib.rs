#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
#![deny(clippy::missing_panics_doc)]

//! Toolbox-Client turns a remote toolbox service's manifest into
//! strongly-typed, invocable tool handles. It separates parameters the
//! caller supplies from parameters resolved through registered credentials,
//! supports pre-binding parameter values before invocation, and fails closed
//! when a tool's authentication requirements are unmet.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use serde_json::{json, Map};
//! use toolbox_client::ToolboxClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ToolboxClient::new("https://toolbox.example.com")?;
//!
//!     // Credentials registered on the client apply to every loaded tool.
//!     client.register_credential_source("my-google-source", || "id-token".to_string())?;
//!
//!     let tool = client.load_tool("search").await?;
//!
//!     // Pre-bind a parameter, then invoke with the rest.
//!     let tool = tool.bind_param("limit", json!(10), true)?;
//!     let mut args = Map::new();
//!     args.insert("query".to_string(), json!("rust"));
//!     let result = tool.invoke(args).await?;
//!     println!("{}", result);
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```

/// Authentication requirement tracking and the credential registry.
pub mod auth;

/// The toolbox client: manifest loading and credential registration.
pub mod client;

/// Dynamic input models derived from manifest parameter lists.
pub mod model;

/// Manifest schema types and scalar type mapping.
pub mod schema;

/// Invocable tool handles with parameter binding.
pub mod tool;

/// Transport abstraction and the reqwest-backed HTTP transport.
pub mod transport;

/// Utility modules for error handling.
pub mod utils;

pub use auth::{AuthRequirements, CredentialRegistry, TokenGetter};
pub use client::ToolboxClient;
pub use model::{FieldSpec, InputModel};
pub use schema::{ManifestSchema, ParameterSchema, ParameterType, ToolSchema};
pub use tool::{BoundValue, ToolboxTool};
pub use transport::{HttpTransport, Transport};
pub use utils::error::{ToolboxError, ToolboxResult};
