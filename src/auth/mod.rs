//! Signed-session authentication gate.

pub mod context;
pub mod gate;
pub mod middleware;
pub mod verify;

pub use context::{AccessContext, QueryParams};
pub use gate::{authenticate, AuthenticatedSession, GatePolicy};
pub use middleware::{require_signature, AppState};
pub use verify::{sign_request, verify_signature, SignatureScheme};
