/// Middleware module
///
/// Request authentication for every non-public route.

mod auth_gate;

pub use auth_gate::{AuthGate, AuthGateService, PublicRoutes};
