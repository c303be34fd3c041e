//! HTTP client for the quiz/PDF collaborator API.
//!
//! Every operation is one request/response exchange with no retry. Calls are
//! instrumented and log quiz names, payload sizes and statuses (not contents).
//!
//! NOTE: We never log the bearer token or passwords.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::domain::{AttemptRecord, GradeResult, Quiz};
use crate::error::{ClientError, ClientResult};
use crate::protocol::*;
use crate::session::AuthContext;
use crate::util::trunc_for_log;

/// The two collaborator calls the attempt view depends on.
pub trait QuizBackend: Send + Sync {
  fn fetch_quiz(&self, auth: &AuthContext, quiz_name: &str) -> impl Future<Output = ClientResult<Quiz>> + Send;

  /// `answers` is index-aligned to the quiz questions, in the legacy string encoding.
  fn submit_attempt(
    &self,
    auth: &AuthContext,
    quiz_name: &str,
    answers: &[String],
  ) -> impl Future<Output = ClientResult<GradeResult>> + Send;
}

impl<T: QuizBackend> QuizBackend for Arc<T> {
  fn fetch_quiz(&self, auth: &AuthContext, quiz_name: &str) -> impl Future<Output = ClientResult<Quiz>> + Send {
    (**self).fetch_quiz(auth, quiz_name)
  }

  fn submit_attempt(
    &self,
    auth: &AuthContext,
    quiz_name: &str,
    answers: &[String],
  ) -> impl Future<Output = ClientResult<GradeResult>> + Send {
    (**self).submit_attempt(auth, quiz_name, answers)
  }
}

/// A PDF ready to be sent as multipart form data.
#[derive(Clone, Debug)]
pub struct PdfFile {
  pub filename: String,
  pub bytes: Vec<u8>,
}

impl PdfFile {
  pub async fn read(path: impl AsRef<Path>) -> ClientResult<Self> {
    let path = path.as_ref();
    let filename = path
      .file_name()
      .and_then(|n| n.to_str())
      .map(str::to_string)
      .ok_or_else(|| ClientError::InvalidInput(format!("not a file path: {}", path.display())))?;
    let bytes = tokio::fs::read(path)
      .await
      .map_err(|e| ClientError::InvalidInput(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(Self { filename, bytes })
  }

  // Multipart forms are single-use, so each request builds its own.
  fn form(&self) -> ClientResult<Form> {
    let part = Part::bytes(self.bytes.clone())
      .file_name(self.filename.clone())
      .mime_str("application/pdf")
      .map_err(|e| ClientError::InvalidInput(e.to_string()))?;
    Ok(Form::new().part("file", part).text("filename", self.filename.clone()))
  }
}

/// Bot answer from the PDF chat endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
  pub text: String,
  /// Number of knowledge-base matches the answer was grounded on.
  pub source_count: usize,
}

#[derive(Clone)]
pub struct ApiClient {
  client: reqwest::Client,
  base_url: Url,
  user_agent: String,
}

impl ApiClient {
  pub fn new(cfg: &ClientConfig) -> ClientResult<Self> {
    let base_url = Url::parse(&cfg.base_url)
      .map_err(|e| ClientError::InvalidInput(format!("invalid base URL '{}': {}", cfg.base_url, e)))?;
    if base_url.cannot_be_a_base() {
      return Err(ClientError::InvalidInput(format!("invalid base URL '{}'", cfg.base_url)));
    }

    let client = reqwest::Client::builder()
      .timeout(cfg.timeout())
      .build()
      .map_err(|e| ClientError::Network(e.to_string()))?;

    Ok(Self { client, base_url, user_agent: cfg.user_agent.clone() })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// Base URL plus percent-encoded path segments (quiz names may hold spaces or slashes).
  fn url(&self, segments: &[&str]) -> ClientResult<Url> {
    let mut url = self.base_url.clone();
    {
      let mut path = url
        .path_segments_mut()
        .map_err(|_| ClientError::InvalidInput("base URL cannot carry a path".into()))?;
      path.pop_if_empty().extend(segments);
    }
    Ok(url)
  }

  fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
    Ok(self.client.request(method, self.url(segments)?).header(USER_AGENT, &self.user_agent))
  }

  /// Request with the bearer header; fails before any I/O without a token.
  fn authed(&self, method: Method, segments: &[&str], auth: &AuthContext) -> ClientResult<RequestBuilder> {
    let bearer = auth.bearer()?;
    Ok(self.request(method, segments)?.header(AUTHORIZATION, bearer))
  }

  async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
    let res = req.send().await?;
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
      let msg = extract_detail(&body).unwrap_or_else(|| trunc_for_log(body.trim(), 200));
      warn!(target: "quizdesk", status = status.as_u16(), detail = %msg, "Collaborator returned an error status");
      return Err(ClientError::from_status(status.as_u16(), msg));
    }

    serde_json::from_str::<T>(&body).map_err(|e| {
      warn!(target: "quizdesk", error = %e, body_len = body.len(), "Response body has an unexpected shape");
      ClientError::Validation(e.to_string())
    })
  }

  // --- Accounts ---

  #[instrument(level = "info", skip(self, form), fields(username = %form.username))]
  pub async fn register(&self, form: &Registration) -> ClientResult<String> {
    if form.username.trim().is_empty() || form.password.is_empty() || form.profile.email.trim().is_empty() {
      return Err(ClientError::InvalidInput("Please fill in username, password and email.".into()));
    }
    let out: MessageOut = self.send_json(self.request(Method::POST, &["api", "register"])?.json(form)).await?;
    info!(target: "quizdesk", username = %form.username, "Account registered");
    Ok(out.message)
  }

  /// Exchange credentials for a session token.
  #[instrument(level = "info", skip(self, password))]
  pub async fn login(&self, username: &str, password: &str) -> ClientResult<AuthContext> {
    if username.trim().is_empty() || password.is_empty() {
      return Err(ClientError::InvalidInput("Please fill in both username and password.".into()));
    }
    let body = LoginIn { username, password };
    let out: TokenOut = self.send_json(self.request(Method::POST, &["api", "login"])?.json(&body)).await?;

    let mut auth = AuthContext::anonymous();
    auth.set_token(out.token);
    if !auth.is_authenticated() {
      return Err(ClientError::Validation("login response carried an empty token".into()));
    }
    info!(target: "quizdesk", %username, "Logged in");
    Ok(auth)
  }

  /// The local context is cleared even when the server call fails.
  #[instrument(level = "info", skip_all)]
  pub async fn logout(&self, auth: &mut AuthContext) -> ClientResult<()> {
    let result = match self.request(Method::POST, &["api", "logout"]) {
      Ok(req) => self.send_json::<MessageOut>(req).await.map(|_| ()),
      Err(e) => Err(e),
    };
    auth.clear();
    result
  }

  // --- Quizzes ---

  #[instrument(level = "info", skip_all)]
  pub async fn list_quizzes(&self, auth: &AuthContext) -> ClientResult<Vec<Quiz>> {
    let wire: Vec<QuizWire> = self.send_json(self.authed(Method::GET, &["api", "quizzes"], auth)?).await?;
    debug!(target: "quizdesk", count = wire.len(), "Quiz list received");
    Ok(wire.into_iter().map(Quiz::from).collect())
  }

  #[instrument(level = "info", skip(self, auth))]
  pub async fn get_quiz(&self, auth: &AuthContext, quiz_name: &str) -> ClientResult<Quiz> {
    let wire: QuizWire = self.send_json(self.authed(Method::GET, &["api", "quizzes", quiz_name], auth)?).await?;
    let quiz = Quiz::from(wire);
    info!(target: "quizdesk", %quiz_name, questions = quiz.questions.len(), "Quiz fetched");
    Ok(quiz)
  }

  #[instrument(level = "info", skip(self, auth, quiz), fields(quiz_name = %quiz.name, questions = quiz.questions.len()))]
  pub async fn create_quiz(&self, auth: &AuthContext, quiz: &Quiz) -> ClientResult<Quiz> {
    let body = QuizWire::from(quiz);
    let wire: QuizWire = self.send_json(self.authed(Method::POST, &["api", "quizzes"], auth)?.json(&body)).await?;
    Ok(Quiz::from(wire))
  }

  /// Replace the questions of an existing quiz.
  #[instrument(level = "info", skip(self, auth, quiz), fields(questions = quiz.questions.len()))]
  pub async fn update_quiz(&self, auth: &AuthContext, quiz_name: &str, quiz: &Quiz) -> ClientResult<Quiz> {
    let body = QuizWire::from(quiz);
    let req = self.authed(Method::PUT, &["api", "quizzes", quiz_name], auth)?.json(&body);
    let wire: QuizWire = self.send_json(req).await?;
    Ok(Quiz::from(wire))
  }

  #[instrument(level = "info", skip(self, auth))]
  pub async fn delete_quiz(&self, auth: &AuthContext, quiz_name: &str) -> ClientResult<String> {
    let out: MessageOut = self.send_json(self.authed(Method::DELETE, &["api", "quizzes", quiz_name], auth)?).await?;
    info!(target: "quizdesk", %quiz_name, "Quiz deleted");
    Ok(out.message)
  }

  #[instrument(level = "info", skip(self, auth, answers), fields(answer_count = answers.len()))]
  pub async fn post_attempt(&self, auth: &AuthContext, quiz_name: &str, answers: &[String]) -> ClientResult<GradeResult> {
    let req = self.authed(Method::POST, &["api", "quizzes", quiz_name, "attempt"], auth)?.json(answers);
    let wire: GradeWire = self.send_json(req).await?;
    let grade = GradeResult::from(wire);
    info!(target: "attempt", %quiz_name, score = grade.score, total = grade.total, "Attempt graded");
    Ok(grade)
  }

  #[instrument(level = "info", skip(self, auth))]
  pub async fn quiz_history(&self, auth: &AuthContext, quiz_name: &str) -> ClientResult<Vec<AttemptRecord>> {
    let wire: Vec<AttemptRecordWire> =
      self.send_json(self.authed(Method::GET, &["api", "quizzes", quiz_name, "history"], auth)?).await?;
    Ok(wire.into_iter().map(AttemptRecord::from).collect())
  }

  // --- PDFs ---

  #[instrument(level = "info", skip(self, pdf), fields(filename = %pdf.filename, size = pdf.bytes.len()))]
  pub async fn upload_pdf(&self, pdf: &PdfFile) -> ClientResult<UploadOut> {
    self.send_json(self.request(Method::POST, &["upload"])?.multipart(pdf.form()?)).await
  }

  /// Generate a quiz from an uploaded PDF; returns the server's CSV file name.
  #[instrument(level = "info", skip(self, auth, pdf), fields(filename = %pdf.filename))]
  pub async fn process_pdf(&self, auth: &AuthContext, pdf: &PdfFile) -> ClientResult<String> {
    let out: ProcessPdfOut =
      self.send_json(self.authed(Method::POST, &["process-pdf"], auth)?.multipart(pdf.form()?)).await?;
    Ok(out.csv_filename)
  }

  /// Upload, then turn the PDF into a quiz once the upload names a file.
  #[instrument(level = "info", skip(self, auth, pdf), fields(filename = %pdf.filename))]
  pub async fn generate_quiz_from_pdf(&self, auth: &AuthContext, pdf: &PdfFile) -> ClientResult<String> {
    auth.bearer()?;
    let uploaded = self.upload_pdf(pdf).await?;
    match uploaded.filename.as_deref() {
      Some(name) if !name.is_empty() => {
        debug!(target: "quizdesk", %name, location = ?uploaded.file_location, "PDF uploaded");
        let csv = self.process_pdf(auth, pdf).await?;
        info!(target: "quizdesk", %csv, "Quiz generated from PDF");
        Ok(csv)
      }
      _ => Err(ClientError::Validation("upload response did not name a file".into())),
    }
  }

  // --- Chat ---

  #[instrument(level = "info", skip_all)]
  pub async fn list_chat_pdfs(&self, auth: &AuthContext) -> ClientResult<Vec<String>> {
    let out: PdfListOut = self.send_json(self.authed(Method::GET, &["user-pdfs-chat"], auth)?).await?;
    Ok(out.pdfs)
  }

  #[instrument(level = "info", skip(self, auth, query), fields(query_len = query.len()))]
  pub async fn chat(&self, auth: &AuthContext, query: &str, pdf: Option<&str>) -> ClientResult<ChatReply> {
    let body = ChatIn { query, pdf };
    let out: ChatOut = self.send_json(self.authed(Method::POST, &["chat"], auth)?.json(&body)).await?;
    if let Some(message) = out.error {
      return Err(ClientError::Rejected { status: 200, message });
    }
    let text = out
      .response
      .ok_or_else(|| ClientError::Validation("chat response has neither `response` nor `error`".into()))?;
    let source_count = match &out.search_results {
      Some(Value::Array(items)) => items.len(),
      _ => 0,
    };
    debug!(target: "chat", reply_len = text.len(), source_count, "Chat reply received");
    Ok(ChatReply { text, source_count })
  }
}

impl QuizBackend for ApiClient {
  async fn fetch_quiz(&self, auth: &AuthContext, quiz_name: &str) -> ClientResult<Quiz> {
    self.get_quiz(auth, quiz_name).await
  }

  async fn submit_attempt(&self, auth: &AuthContext, quiz_name: &str, answers: &[String]) -> ClientResult<GradeResult> {
    self.post_attempt(auth, quiz_name, answers).await
  }
}

/// Pull a readable message out of a FastAPI error body.
fn extract_detail(body: &str) -> Option<String> {
  let parsed = serde_json::from_str::<ErrorBody>(body).ok()?;
  match parsed.detail {
    Value::String(s) => Some(s),
    Value::Array(items) => {
      let msgs: Vec<String> = items
        .iter()
        .filter_map(|i| i.get("msg").and_then(Value::as_str).map(str::to_string))
        .collect();
      if msgs.is_empty() { None } else { Some(msgs.join("; ")) }
    }
    Value::Null => None,
    other => Some(other.to_string()),
  }
}
