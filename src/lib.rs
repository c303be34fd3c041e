//! Quizdesk · client for the quiz-authoring and PDF-chatbot service
//!
//! - Typed REST client for the collaborator API (`api`)
//! - Explicit authentication context instead of a global token (`session`)
//! - Quiz attempt reducer and the mounted view that drives it (`attempt`, `view`)
//! - Quiz authoring draft and PDF chat session (`draft`, `chat`)
//!
//! Important env variables:
//!   QUIZDESK_BASE_URL     : collaborator base URL (default "http://localhost:8000")
//!   QUIZDESK_TIMEOUT_SECS : per-request timeout (default 20)
//!   QUIZDESK_CONFIG_PATH  : optional TOML file with the same settings
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default), "compact" or "json"

pub mod api;
pub mod attempt;
pub mod chat;
pub mod config;
pub mod domain;
pub mod draft;
pub mod error;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod util;
pub mod view;

pub use api::{ApiClient, ChatReply, PdfFile, QuizBackend};
pub use attempt::{AttemptEvent, AttemptState, Correctness, Phase};
pub use config::ClientConfig;
pub use domain::{Answer, AttemptRecord, GradeResult, Question, QuestionKind, Quiz};
pub use error::{ClientError, ClientResult};
pub use session::AuthContext;
pub use view::{QuizView, SubmitOutcome, SubmitTicket};
