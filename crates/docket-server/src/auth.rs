//! Identity from the authenticating proxy.
//!
//! The server never talks to the OAuth provider. A reverse proxy in front of
//! it (oauth2-proxy or similar) completes the login and forwards the result
//! as request headers. The proxy proves itself with a shared secret that is
//! checked against an argon2 hash; without it the identity headers are
//! ignored.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use docket_core::{
  identity::{self, Actor, Profile, Role, User},
  store::RecordStore,
};

use crate::{AppState, error::ApiError};

/// Stable external id of the signed-in user.
pub const USER_HEADER: &str = "x-auth-request-user";
pub const USERNAME_HEADER: &str = "x-auth-request-preferred-username";
pub const AVATAR_HEADER: &str = "x-auth-request-avatar";
/// Shared secret presented by the proxy on every request.
pub const PROXY_SECRET_HEADER: &str = "x-proxy-secret";

/// How identity headers are trusted and what new users become.
#[derive(Clone)]
pub struct AuthConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub proxy_secret_hash: String,
  pub default_role:      Role,
}

/// The signed-in user, upserted on every authenticated request.
pub struct CurrentUser(pub User);

impl CurrentUser {
  pub fn actor(&self) -> Actor { Actor::from(&self.0) }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
}

/// Check the proxy secret and read the asserted profile. `None` means the
/// request carries no identity we trust.
pub fn verify_proxy(headers: &HeaderMap, config: &AuthConfig) -> Option<Profile> {
  let secret = header(headers, PROXY_SECRET_HEADER)?;
  let parsed_hash = PasswordHash::new(&config.proxy_secret_hash).ok()?;
  Argon2::default()
    .verify_password(secret.as_bytes(), &parsed_hash)
    .ok()?;

  let external_id = header(headers, USER_HEADER)?.to_owned();
  let username = header(headers, USERNAME_HEADER)
    .map(str::to_owned)
    .unwrap_or_else(|| external_id.clone());
  let avatar = header(headers, AVATAR_HEADER).map(str::to_owned);

  Some(Profile { external_id, username, avatar })
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: RecordStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(profile) = verify_proxy(&parts.headers, &state.auth) else {
      tracing::debug!(path = %parts.uri.path(), "request without trusted identity");
      return Err(ApiError::Unauthenticated {
        entry_point: state.config.entry_point.clone(),
      });
    };

    let user = identity::sign_in(state.store.as_ref(), profile, state.auth.default_role).await?;
    Ok(CurrentUser(user))
  }
}
