// Sastsync Kernel
//
// Reconciles an organization's SAST setting against the remote
// settings API and tracks what the server reports back.

pub mod adapters;
pub mod lifecycle;
pub mod reconciler;
pub mod record;
pub mod schema;
pub mod state;

pub use adapters::cloudapi::client::HttpSettingsClient;
pub use adapters::cloudapi::config::ClientConfig;
pub use adapters::remote::{RemoteSettingsClient, TransportError};
pub use reconciler::{ReconcileError, SettingsReconciler};
pub use record::{SettingsRecord, DEFAULT_RESOURCE_TYPE};
