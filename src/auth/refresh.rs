/// Token Pair Issuance and Refresh Exchange
///
/// Login and refresh both end by minting a fresh access/refresh pair for a
/// resolved user. The exchange itself is stateless: no session table is read
/// or written, and a refresh token stays usable until its own expiry.
///
/// # Subject binding
/// Refresh tokens carry no subject. The caller names the account to reissue
/// for (`identity_hint`) and only the token's signature and expiry are
/// checked, so any live refresh token can mint tokens for any existing id.
/// Every exchange is logged with the hinted id so this can be audited.

use uuid::Uuid;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::auth::jwt::TokenCodec;
use crate::error::AppError;
use crate::users::{UserRecord, UserStore};

/// A freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mint both tokens for `user`, or nothing
pub fn issue_token_pair(codec: &TokenCodec, user: &UserRecord) -> Result<TokenPair, AppError> {
    let access = AccessClaims::new(user.id, &user.name, &user.email, codec.access_ttl());
    let refresh = RefreshClaims::new(codec.refresh_ttl());

    let access_token = codec.issue_access(&access)?;
    let refresh_token = codec.issue_refresh(&refresh)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Exchange a refresh token for a new pair
///
/// # Errors
/// - `TokenInvalid` (401) if the refresh token does not verify; the user
///   store is not consulted in that case
/// - `NotFound` (404) if `identity_hint` names no user
pub async fn exchange_refresh_token(
    codec: &TokenCodec,
    users: &dyn UserStore,
    identity_hint: Uuid,
    refresh_token: &str,
) -> Result<TokenPair, AppError> {
    let presented = codec.parse_refresh(refresh_token)?;

    let user = users
        .find_user_by_id(identity_hint)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let pair = issue_token_pair(codec, &user)?;

    tracing::info!(
        user_id = %user.id,
        presented_iat = presented.iat,
        "Refresh token exchanged for hinted user"
    );

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::JwtSettings;
    use crate::error::{AuthError, DatabaseError};
    use crate::users::NewUser;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SingleUser {
        user: UserRecord,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl UserStore for SingleUser {
        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok((self.user.id == id).then(|| self.user.clone()))
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
            Ok((self.user.email == email).then(|| self.user.clone()))
        }

        async fn create_user(&self, _: NewUser) -> Result<UserRecord, AppError> {
            Err(AppError::Internal("read-only store".to_string()))
        }
    }

    fn store() -> SingleUser {
        let now = chrono::Utc::now();
        SingleUser {
            user: UserRecord {
                id: Uuid::new_v4(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: String::new(),
                avatar: None,
                online: false,
                created_at: now,
                updated_at: now,
            },
            lookups: AtomicUsize::new(0),
        }
    }

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(&JwtSettings {
            access_secret: format!("{}-access-secret-padding-to-32-bytes", secret),
            refresh_secret: Some(format!("{}-refresh-secret-padding-to-32-bytes", secret)),
            access_token_expiry: 900,
            refresh_token_expiry: 604_800,
        })
        .unwrap()
    }

    #[test]
    fn test_issue_token_pair_carries_identity() {
        let codec = codec("a");
        let store = store();

        let pair = issue_token_pair(&codec, &store.user).unwrap();
        let access = codec.parse_access(&pair.access_token).unwrap();
        let refresh = codec.parse_refresh(&pair.refresh_token).unwrap();

        assert_eq!(access.sub, store.user.id.to_string());
        assert_eq!(access.name, "Ada");
        assert_eq!(access.email, "ada@example.com");
        assert_eq!(access.exp - access.iat, 900);
        assert_eq!(refresh.exp - refresh.iat, 604_800);
    }

    #[tokio::test]
    async fn test_exchange_mints_new_pair() {
        let codec = codec("a");
        let store = store();
        let original = issue_token_pair(&codec, &store.user).unwrap();
        let original_access = codec.parse_access(&original.access_token).unwrap();

        let pair = exchange_refresh_token(&codec, &store, store.user.id, &original.refresh_token)
            .await
            .unwrap();

        let access = codec.parse_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, store.user.id.to_string());
        assert!(access.exp > original_access.iat);
        assert!(codec.parse_refresh(&pair.refresh_token).is_ok());
    }

    #[tokio::test]
    async fn test_presented_token_stays_valid_after_exchange() {
        let codec = codec("a");
        let store = store();
        let original = issue_token_pair(&codec, &store.user).unwrap();

        for _ in 0..2 {
            exchange_refresh_token(&codec, &store, store.user.id, &original.refresh_token)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_foreign_signature_is_rejected_before_lookup() {
        let store = store();
        let foreign = codec("b")
            .issue_refresh(&RefreshClaims::new(604_800))
            .unwrap();

        let result = exchange_refresh_token(&codec("a"), &store, store.user.id, &foreign).await;

        assert!(matches!(result, Err(AppError::Auth(AuthError::TokenInvalid))));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_access_token_is_not_a_refresh_token() {
        let codec = codec("a");
        let store = store();
        let pair = issue_token_pair(&codec, &store.user).unwrap();

        let result = exchange_refresh_token(&codec, &store, store.user.id, &pair.access_token).await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::TokenInvalid))));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let codec = codec("a");
        let store = store();
        let pair = issue_token_pair(&codec, &store.user).unwrap();

        let result = exchange_refresh_token(&codec, &store, Uuid::new_v4(), &pair.refresh_token).await;
        assert!(matches!(result, Err(AppError::Database(DatabaseError::NotFound(_)))));
    }
}
