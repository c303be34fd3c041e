//! PDF chatbot session: the transcript, the list of chat-ready PDFs and the
//! currently selected one.

use tracing::{debug, error, info, instrument};

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::session::AuthContext;

pub const CHAT_FAILURE_REPLY: &str = "Something went wrong. Please try again!";
pub const CHAT_GREETING: &str =
  "I am a chatbot designed to answer questions about the PDF you have provided. Ask me anything about it.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
  User,
  Bot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
  pub sender: Sender,
  pub text: String,
}

impl ChatMessage {
  /// Text to render; an empty bot message shows the greeting.
  pub fn display_text(&self) -> &str {
    if self.sender == Sender::Bot && self.text.trim().is_empty() {
      CHAT_GREETING
    } else {
      &self.text
    }
  }
}

#[derive(Clone, Debug, Default)]
pub struct ChatSession {
  messages: Vec<ChatMessage>,
  pdfs: Vec<String>,
  selected_pdf: Option<String>,
}

impl ChatSession {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn messages(&self) -> &[ChatMessage] {
    &self.messages
  }

  pub fn pdfs(&self) -> &[String] {
    &self.pdfs
  }

  pub fn selected_pdf(&self) -> Option<&str> {
    self.selected_pdf.as_deref()
  }

  /// Reload the PDF list; the previous list stays on failure.
  #[instrument(level = "info", skip_all)]
  pub async fn refresh_pdfs(&mut self, api: &ApiClient, auth: &AuthContext) -> ClientResult<()> {
    match api.list_chat_pdfs(auth).await {
      Ok(pdfs) => {
        info!(target: "chat", count = pdfs.len(), "Chat PDF list refreshed");
        self.replace_pdfs(pdfs);
        Ok(())
      }
      Err(e) => {
        error!(target: "chat", error = %e, "Failed to load chat PDF list");
        Err(e)
      }
    }
  }

  // A selection that vanished from the list is dropped.
  fn replace_pdfs(&mut self, pdfs: Vec<String>) {
    if self.selected_pdf.as_ref().is_some_and(|sel| !pdfs.contains(sel)) {
      debug!(target: "chat", "Selected PDF no longer listed; selection cleared");
      self.selected_pdf = None;
    }
    self.pdfs = pdfs;
  }

  /// Select a PDF from the list; unknown names are rejected.
  pub fn select_pdf(&mut self, name: &str) -> bool {
    if self.pdfs.iter().any(|p| p == name) {
      self.selected_pdf = Some(name.to_string());
      true
    } else {
      false
    }
  }

  pub fn clear_selection(&mut self) {
    self.selected_pdf = None;
  }

  /// Send one query. Blank input is ignored (`Ok(None)`). On failure the
  /// transcript gets an apology message and the error is returned.
  #[instrument(level = "info", skip(self, api, auth, input), fields(input_len = input.len()))]
  pub async fn send(&mut self, api: &ApiClient, auth: &AuthContext, input: &str) -> ClientResult<Option<&ChatMessage>> {
    let query = input.trim();
    if query.is_empty() {
      return Ok(None);
    }
    self.messages.push(ChatMessage { sender: Sender::User, text: query.to_string() });

    match api.chat(auth, query, self.selected_pdf.as_deref()).await {
      Ok(reply) => {
        self.messages.push(ChatMessage { sender: Sender::Bot, text: reply.text });
        Ok(self.messages.last())
      }
      Err(e) => {
        error!(target: "chat", error = %e, "Chat request failed");
        self.messages.push(ChatMessage { sender: Sender::Bot, text: CHAT_FAILURE_REPLY.to_string() });
        Err(e)
      }
    }
  }
}
