/// Authentication module
///
/// Password hashing, token signing/verification, the per-request identity
/// and the refresh exchange.

mod claims;
mod identity;
mod jwt;
mod password;
mod refresh;

pub use claims::{AccessClaims, Expiring, RefreshClaims};
pub use identity::RequestIdentity;
pub use jwt::TokenCodec;
pub use password::{hash_password, verify_password, MAX_SECRET_BYTES};
pub use refresh::{exchange_refresh_token, issue_token_pair, TokenPair};
