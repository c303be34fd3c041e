//! Error taxonomy for collaborator calls and client-side validation.

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced at the operation boundary (`load`, `submit`, forms).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
  #[error("Not authenticated: {0}")]
  NotAuthenticated(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Network failure: {0}")]
  Network(String),

  #[error("Malformed response: {0}")]
  Validation(String),

  #[error("Request rejected (HTTP {status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("Invalid input: {0}")]
  InvalidInput(String),
}

impl ClientError {
  /// Map a non-success HTTP status plus the server's `detail` text.
  pub fn from_status(status: u16, message: String) -> Self {
    match status {
      401 | 403 => ClientError::NotAuthenticated(message),
      404 => ClientError::NotFound(message),
      _ => ClientError::Rejected { status, message },
    }
  }

  /// Text shown to the user in place of the failed view.
  pub fn user_message(&self) -> String {
    match self {
      ClientError::NotAuthenticated(_) => "Please log in to continue.".into(),
      ClientError::NotFound(detail) if detail.is_empty() => "The requested item was not found.".into(),
      ClientError::NotFound(detail) => format!("Not found: {}", detail),
      ClientError::Network(_) => "Could not reach the server. Please try again later.".into(),
      ClientError::Validation(_) => "The server sent an unexpected response.".into(),
      ClientError::Rejected { message, .. } if !message.is_empty() => message.clone(),
      ClientError::Rejected { status, .. } => format!("The server rejected the request (HTTP {}).", status),
      ClientError::InvalidInput(msg) => msg.clone(),
    }
  }
}

impl From<reqwest::Error> for ClientError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      ClientError::Validation(err.to_string())
    } else if let Some(status) = err.status() {
      ClientError::from_status(status.as_u16(), err.to_string())
    } else {
      ClientError::Network(err.to_string())
    }
  }
}

impl From<serde_json::Error> for ClientError {
  fn from(err: serde_json::Error) -> Self {
    ClientError::Validation(err.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_mapping() {
    assert_eq!(ClientError::from_status(401, "Token missing".into()), ClientError::NotAuthenticated("Token missing".into()));
    assert_eq!(ClientError::from_status(403, String::new()), ClientError::NotAuthenticated(String::new()));
    assert_eq!(ClientError::from_status(404, "quiz".into()), ClientError::NotFound("quiz".into()));
    assert_eq!(
      ClientError::from_status(400, "Quiz already exists".into()),
      ClientError::Rejected { status: 400, message: "Quiz already exists".into() }
    );
  }

  #[test]
  fn test_user_message_hides_transport_detail() {
    let e = ClientError::Network("error trying to connect: tcp connect error".into());
    assert_eq!(e.user_message(), "Could not reach the server. Please try again later.");

    let e = ClientError::Rejected { status: 400, message: "Username already exists".into() };
    assert_eq!(e.user_message(), "Username already exists");

    let e = ClientError::Rejected { status: 500, message: String::new() };
    assert!(e.user_message().contains("500"));
  }
}
