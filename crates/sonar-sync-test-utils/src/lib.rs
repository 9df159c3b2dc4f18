//! Shared test utilities for the sonar-sync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fake`]: [`FakeCodacy`], an in-memory [`CodacyApi`](sonar_sync_core::CodacyApi)
//! - [`mock_http`]: [`MockServer`], a canned-response HTTP server for client tests
//! - [`profile`]: [`ProfileBuilder`] for SonarQube XML exports
//! - [`workspace`]: [`TestWorkspace`], a temp directory laid out for the CLI

pub mod fake;
pub mod mock_http;
pub mod profile;
pub mod workspace;

pub use fake::{ApiCall, FakeCodacy, Operation};
pub use mock_http::{MockServer, RecordedRequest};
pub use profile::ProfileBuilder;
pub use workspace::TestWorkspace;
