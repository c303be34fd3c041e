//! Authentication context handed explicitly to every collaborator call.
//!
//! Lifecycle: anonymous on start, set by a successful login, cleared by
//! logout. Everything else only reads it.

use std::fmt;

use crate::error::{ClientError, ClientResult};

#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
  token: Option<String>,
}

impl AuthContext {
  pub fn anonymous() -> Self {
    Self::default()
  }

  /// Context for a token obtained elsewhere (CLI flag, env var).
  /// Blank tokens are treated as no token.
  pub fn with_token(token: impl Into<String>) -> Self {
    let mut ctx = Self::default();
    ctx.set_token(token);
    ctx
  }

  pub(crate) fn set_token(&mut self, token: impl Into<String>) {
    let token = token.into();
    self.token = if token.trim().is_empty() { None } else { Some(token.trim().to_string()) };
  }

  pub fn clear(&mut self) {
    self.token = None;
  }

  pub fn is_authenticated(&self) -> bool {
    self.token.is_some()
  }

  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  /// `Authorization` header value, or `NotAuthenticated` without a token.
  pub fn bearer(&self) -> ClientResult<String> {
    self
      .token
      .as_deref()
      .map(|t| format!("Bearer {}", t))
      .ok_or_else(|| ClientError::NotAuthenticated("no session token; log in first".into()))
  }
}

impl fmt::Debug for AuthContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AuthContext")
      .field("token", &self.token.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}
