//! Mounted quiz view: loads one quiz, feeds user selections into the attempt
//! reducer, submits once and applies the server's verdict.
//!
//! Each mount gets a fresh instance id. Submissions carry a ticket tied to
//! that instance, so a grade arriving after a remount (or after a newer
//! submission) is dropped instead of being applied to the wrong quiz.

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::api::QuizBackend;
use crate::attempt::{AttemptEvent, AttemptState, Correctness, Phase};
use crate::domain::{Answer, GradeResult, Quiz};
use crate::error::{ClientError, ClientResult};
use crate::session::AuthContext;

/// Captured at submit time; required to apply the response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitTicket {
  id: Uuid,
  instance: Uuid,
  quiz_name: String,
  answers: Vec<String>,
}

impl SubmitTicket {
  pub fn quiz_name(&self) -> &str {
    &self.quiz_name
  }

  pub fn answers(&self) -> &[String] {
    &self.answers
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
  Applied,
  Failed(ClientError),
  /// The ticket no longer matches this view; state untouched.
  Discarded,
}

pub struct QuizView<B: QuizBackend> {
  backend: B,
  instance: Uuid,
  quiz_name: String,
  loaded: Option<(Quiz, AttemptState)>,
  pending: Option<Uuid>,
  error: Option<String>,
}

impl<B: QuizBackend> QuizView<B> {
  /// Mount a view for the quiz named by the route. Nothing is fetched yet.
  pub fn mount(backend: B, quiz_name: impl Into<String>) -> Self {
    let quiz_name = quiz_name.into();
    let instance = Uuid::new_v4();
    info!(target: "attempt", %quiz_name, %instance, "Quiz view mounted");
    Self { backend, instance, quiz_name, loaded: None, pending: None, error: None }
  }

  /// Navigate to another quiz: all state is dropped and in-flight results become stale.
  pub fn remount(&mut self, quiz_name: impl Into<String>) {
    self.quiz_name = quiz_name.into();
    self.instance = Uuid::new_v4();
    self.loaded = None;
    self.pending = None;
    self.error = None;
    info!(target: "attempt", quiz_name = %self.quiz_name, instance = %self.instance, "Quiz view remounted");
  }

  pub fn instance_id(&self) -> Uuid {
    self.instance
  }

  pub fn quiz_name(&self) -> &str {
    &self.quiz_name
  }

  pub fn quiz(&self) -> Option<&Quiz> {
    self.loaded.as_ref().map(|(q, _)| q)
  }

  pub fn attempt(&self) -> Option<&AttemptState> {
    self.loaded.as_ref().map(|(_, a)| a)
  }

  /// None until a quiz is loaded.
  pub fn phase(&self) -> Option<Phase> {
    self.attempt().map(AttemptState::phase)
  }

  /// Last displayable error from `load` or `submit`.
  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn is_submitting(&self) -> bool {
    self.pending.is_some()
  }

  /// Fetch the quiz and start a fresh attempt. On failure nothing stays loaded.
  /// A quiz is fetched once per mount: once loaded this is a no-op, and only
  /// `remount` starts a new attempt.
  #[instrument(level = "info", skip(self, auth), fields(quiz_name = %self.quiz_name, instance = %self.instance))]
  pub async fn load(&mut self, auth: &AuthContext) -> ClientResult<()> {
    if let Some((_, attempt)) = &self.loaded {
      debug!(target: "attempt", phase = ?attempt.phase(), "Quiz already loaded for this mount; load ignored");
      return Ok(());
    }
    self.pending = None;
    match self.backend.fetch_quiz(auth, &self.quiz_name).await {
      Ok(quiz) => {
        let attempt = AttemptState::new(quiz.questions.len());
        info!(target: "attempt", quiz_name = %quiz.name, questions = quiz.questions.len(), "Quiz loaded");
        self.loaded = Some((quiz, attempt));
        self.error = None;
        Ok(())
      }
      Err(e) => {
        error!(target: "attempt", quiz_name = %self.quiz_name, error = %e, "Quiz load failed");
        self.error = Some(e.user_message());
        Err(e)
      }
    }
  }

  /// Record a selection. Returns false when it was ignored (not loaded,
  /// already graded, or the question or option index is outside the quiz).
  pub fn select_answer(&mut self, question_index: usize, option_value: &str, option_index: usize) -> bool {
    let Some((quiz, attempt)) = self.loaded.take() else {
      return false;
    };
    let in_range = quiz.questions.get(question_index).is_some_and(|q| option_index < q.options.len());
    let accepted = attempt.phase() == Phase::Answering && in_range;
    let attempt = if in_range {
      attempt.reduce(AttemptEvent::Select {
        question_index,
        option_value: option_value.to_string(),
        option_index,
      })
    } else {
      debug!(target: "attempt", question_index, option_index, "Selection outside the quiz ignored");
      attempt
    };
    self.loaded = Some((quiz, attempt));
    accepted
  }

  /// Snapshot the answers for submission. None if not loaded or already graded.
  /// A newer ticket supersedes any older one still in flight.
  pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
    let (_, attempt) = self.loaded.as_ref()?;
    if attempt.phase() != Phase::Answering {
      return None;
    }
    if self.pending.is_some() {
      warn!(target: "attempt", quiz_name = %self.quiz_name, "Superseding an in-flight submission");
    }
    let ticket = SubmitTicket {
      id: Uuid::new_v4(),
      instance: self.instance,
      quiz_name: self.quiz_name.clone(),
      answers: attempt.wire_answers(),
    };
    self.pending = Some(ticket.id);
    Some(ticket)
  }

  /// Apply a grading response. Either the full result lands and the phase
  /// becomes Graded, or the attempt is left exactly as it was.
  pub fn apply_submission(&mut self, ticket: SubmitTicket, result: ClientResult<GradeResult>) -> SubmitOutcome {
    if ticket.instance != self.instance || self.pending != Some(ticket.id) {
      warn!(target: "attempt", ticket_instance = %ticket.instance, instance = %self.instance, "Stale submission response discarded");
      return SubmitOutcome::Discarded;
    }
    self.pending = None;

    match result {
      Ok(grade) => {
        let Some((quiz, attempt)) = self.loaded.take() else {
          return SubmitOutcome::Discarded;
        };
        if attempt.phase() != Phase::Answering {
          self.loaded = Some((quiz, attempt));
          return SubmitOutcome::Discarded;
        }
        info!(target: "attempt", quiz_name = %quiz.name, score = grade.score, total = grade.total, "Attempt graded");
        self.loaded = Some((quiz, attempt.reduce(AttemptEvent::Graded(grade))));
        self.error = None;
        SubmitOutcome::Applied
      }
      Err(e) => {
        error!(target: "attempt", quiz_name = %ticket.quiz_name, error = %e, "Submission failed; answers kept for resubmission");
        self.error = Some(e.user_message());
        SubmitOutcome::Failed(e)
      }
    }
  }

  /// Submit the current answers. Empty answers are allowed.
  #[instrument(level = "info", skip(self, auth), fields(quiz_name = %self.quiz_name))]
  pub async fn submit(&mut self, auth: &AuthContext) -> SubmitOutcome {
    let Some(ticket) = self.begin_submit() else {
      return SubmitOutcome::Discarded;
    };
    let result = self.backend.submit_attempt(auth, ticket.quiz_name(), ticket.answers()).await;
    self.apply_submission(ticket, result)
  }

  pub fn correctness(&self, question_index: usize) -> Correctness {
    self.attempt().map(|a| a.correctness(question_index)).unwrap_or(Correctness::NotApplicable)
  }

  pub fn option_correctness(&self, question_index: usize, option_index: usize) -> Correctness {
    let Some((quiz, attempt)) = self.loaded.as_ref() else {
      return Correctness::NotApplicable;
    };
    match quiz.questions.get(question_index).and_then(|q| q.options.get(option_index)) {
      Some(value) => attempt.option_correctness(question_index, value, option_index),
      None => Correctness::NotApplicable,
    }
  }

  /// Text of the correct answer for display: the option text for index
  /// answers (the bare index if out of range), "True"/"False" for booleans.
  pub fn correct_answer_label(&self, question_index: usize) -> Option<String> {
    let (quiz, attempt) = self.loaded.as_ref()?;
    let answer = attempt.correct_answer(question_index)?;
    Some(match answer {
      Answer::Index(i) => quiz
        .questions
        .get(question_index)
        .and_then(|q| q.options.get(i))
        .cloned()
        .unwrap_or_else(|| answer.to_wire()),
      Answer::Bool(_) => answer.to_wire(),
    })
  }
}

#[cfg(test)]
mod tests {
  use std::collections::VecDeque;
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::domain::Question;

  /// Scripted collaborator: pops one canned result per call and records submissions.
  #[derive(Default)]
  struct FakeBackend {
    quizzes: Mutex<VecDeque<ClientResult<Quiz>>>,
    grades: Mutex<VecDeque<ClientResult<GradeResult>>>,
    submitted: Mutex<Vec<(String, Vec<String>)>>,
  }

  impl FakeBackend {
    fn with_quiz(quiz: ClientResult<Quiz>) -> Arc<Self> {
      let fake = Arc::new(FakeBackend::default());
      fake.quizzes.lock().unwrap().push_back(quiz);
      fake
    }

    fn push_grade(&self, g: ClientResult<GradeResult>) {
      self.grades.lock().unwrap().push_back(g);
    }
  }

  impl QuizBackend for FakeBackend {
    async fn fetch_quiz(&self, auth: &AuthContext, _quiz_name: &str) -> ClientResult<Quiz> {
      auth.bearer()?;
      self.quizzes.lock().unwrap().pop_front().unwrap_or_else(|| Err(ClientError::Network("no script".into())))
    }

    async fn submit_attempt(&self, auth: &AuthContext, quiz_name: &str, answers: &[String]) -> ClientResult<GradeResult> {
      auth.bearer()?;
      self.submitted.lock().unwrap().push((quiz_name.to_string(), answers.to_vec()));
      self.grades.lock().unwrap().pop_front().unwrap_or_else(|| Err(ClientError::Network("no script".into())))
    }
  }

  fn auth() -> AuthContext {
    AuthContext::with_token("jwt")
  }

  fn question(options: &[&str]) -> Question {
    Question { prompt: "q".into(), options: options.iter().map(|s| s.to_string()).collect(), answer: None }
  }

  fn quiz(questions: Vec<Question>) -> Quiz {
    Quiz { name: "Colors".into(), questions }
  }

  #[tokio::test]
  async fn test_load_creates_fresh_attempt() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["True", "False"]), question(&["A", "B", "C", "D"])])));
    let mut view = QuizView::mount(backend, "Colors");
    assert_eq!(view.phase(), None);

    view.load(&auth()).await.unwrap();
    assert_eq!(view.phase(), Some(Phase::Answering));
    assert_eq!(view.attempt().unwrap().answers().len(), 2);
    assert_eq!(view.error(), None);
  }

  #[tokio::test]
  async fn test_out_of_range_selection_is_ignored() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["A", "B"])])));
    let mut view = QuizView::mount(backend, "Colors");
    view.load(&auth()).await.unwrap();

    assert!(!view.select_answer(3, "A", 0));
    assert!(!view.select_answer(0, "Z", 5));
    assert_eq!(view.attempt().unwrap().answer(0), None);
    assert!(view.select_answer(0, "B", 1));
    assert_eq!(view.attempt().unwrap().answer(0), Some(Answer::Index(1)));
  }

  #[tokio::test]
  async fn test_load_not_found_leaves_nothing_loaded() {
    let backend = FakeBackend::with_quiz(Err(ClientError::NotFound("Quiz not found".into())));
    let mut view = QuizView::mount(backend, "missing");
    let err = view.load(&auth()).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(view.quiz().is_none());
    assert!(view.attempt().is_none());
    assert!(view.error().is_some());
    assert!(!view.select_answer(0, "A", 0));
    assert!(view.begin_submit().is_none());
  }

  #[tokio::test]
  async fn test_load_without_token() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["True", "False"])])));
    let mut view = QuizView::mount(backend, "Colors");
    let err = view.load(&AuthContext::anonymous()).await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated(_)));
    assert_eq!(view.error(), Some("Please log in to continue."));
  }

  #[tokio::test]
  async fn test_boolean_scenario_wrong_answer() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["True", "False"])])));
    backend.push_grade(Ok(GradeResult { score: 0, total: 1, answers: vec![Some(Answer::Bool(true))] }));
    let mut view = QuizView::mount(backend.clone(), "Colors");
    view.load(&auth()).await.unwrap();

    assert!(view.select_answer(0, "False", 1));
    assert_eq!(view.attempt().unwrap().wire_answers(), vec!["False".to_string()]);

    assert_eq!(view.submit(&auth()).await, SubmitOutcome::Applied);
    assert_eq!(view.phase(), Some(Phase::Graded));
    assert_eq!(view.option_correctness(0, 1), Correctness::SelectedAndWrong);
    assert_eq!(view.option_correctness(0, 0), Correctness::NotApplicable);
    assert_eq!(view.correct_answer_label(0), Some("True".to_string()));
    assert_eq!(backend.submitted.lock().unwrap()[0], ("Colors".to_string(), vec!["False".to_string()]));
  }

  #[tokio::test]
  async fn test_multiple_choice_scenario_correct_answer() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["A", "B", "C", "D"])])));
    backend.push_grade(Ok(GradeResult { score: 1, total: 1, answers: vec![Some(Answer::Index(2))] }));
    let mut view = QuizView::mount(backend, "Colors");
    view.load(&auth()).await.unwrap();

    view.select_answer(0, "C", 2);
    assert_eq!(view.attempt().unwrap().wire_answers(), vec!["2".to_string()]);
    assert_eq!(view.submit(&auth()).await, SubmitOutcome::Applied);
    assert_eq!(view.correctness(0), Correctness::SelectedAndCorrect);
    assert_eq!(view.correct_answer_label(0), Some("C".to_string()));
  }

  #[tokio::test]
  async fn test_submit_failure_then_resubmit() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["A", "B", "C", "D"]), question(&["True", "False"])])));
    backend.push_grade(Err(ClientError::Network("connection refused".into())));
    backend.push_grade(Ok(GradeResult { score: 1, total: 2, answers: vec![Some(Answer::Index(1)), Some(Answer::Bool(true))] }));
    let mut view = QuizView::mount(backend.clone(), "Colors");
    view.load(&auth()).await.unwrap();
    view.select_answer(0, "B", 1);

    let outcome = view.submit(&auth()).await;
    assert!(matches!(outcome, SubmitOutcome::Failed(ClientError::Network(_))));
    assert_eq!(view.phase(), Some(Phase::Answering));
    assert_eq!(view.attempt().unwrap().wire_answers(), vec!["1".to_string(), String::new()]);
    assert!(view.error().is_some());
    assert!(!view.is_submitting());

    assert_eq!(view.submit(&auth()).await, SubmitOutcome::Applied);
    assert_eq!(view.phase(), Some(Phase::Graded));
    assert_eq!(view.error(), None);
    assert_eq!(view.correctness(1), Correctness::NotApplicable);

    let submitted = backend.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0].1, submitted[1].1);
  }

  #[tokio::test]
  async fn test_selection_and_submit_ignored_after_grading() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["A", "B"])])));
    backend.push_grade(Ok(GradeResult { score: 1, total: 1, answers: vec![Some(Answer::Index(0))] }));
    let mut view = QuizView::mount(backend, "Colors");
    view.load(&auth()).await.unwrap();
    view.select_answer(0, "A", 0);
    view.submit(&auth()).await;

    let snapshot = view.attempt().cloned();
    assert!(!view.select_answer(0, "B", 1));
    assert_eq!(view.attempt().cloned(), snapshot);
    assert!(view.begin_submit().is_none());
    assert_eq!(view.submit(&auth()).await, SubmitOutcome::Discarded);
  }

  #[tokio::test]
  async fn test_load_after_grading_keeps_graded_attempt() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["A", "B"])])));
    backend.quizzes.lock().unwrap().push_back(Ok(quiz(vec![question(&["A", "B"])])));
    backend.push_grade(Ok(GradeResult { score: 1, total: 1, answers: vec![Some(Answer::Index(0))] }));
    let mut view = QuizView::mount(backend.clone(), "Colors");
    view.load(&auth()).await.unwrap();
    view.select_answer(0, "A", 0);
    assert_eq!(view.submit(&auth()).await, SubmitOutcome::Applied);
    let instance = view.instance_id();

    view.load(&auth()).await.unwrap();
    assert_eq!(view.phase(), Some(Phase::Graded));
    assert_eq!(view.instance_id(), instance);
    assert!(!view.select_answer(0, "B", 1));
    assert_eq!(view.correctness(0), Correctness::SelectedAndCorrect);
    assert_eq!(backend.quizzes.lock().unwrap().len(), 1);

    view.remount("Colors");
    view.load(&auth()).await.unwrap();
    assert_eq!(view.phase(), Some(Phase::Answering));
    assert_ne!(view.instance_id(), instance);
  }

  #[tokio::test]
  async fn test_stale_response_after_remount_is_discarded() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["A", "B"])])));
    backend.quizzes.lock().unwrap().push_back(Ok(Quiz { name: "Other".into(), questions: vec![question(&["True", "False"])] }));
    let mut view = QuizView::mount(backend, "Colors");
    view.load(&auth()).await.unwrap();
    view.select_answer(0, "A", 0);
    let ticket = view.begin_submit().unwrap();

    view.remount("Other");
    view.load(&auth()).await.unwrap();
    let grade = GradeResult { score: 1, total: 1, answers: vec![Some(Answer::Index(0))] };
    assert_eq!(view.apply_submission(ticket, Ok(grade)), SubmitOutcome::Discarded);
    assert_eq!(view.phase(), Some(Phase::Answering));
    assert_eq!(view.quiz().unwrap().name, "Other");
  }

  #[tokio::test]
  async fn test_superseded_ticket_is_discarded() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["A", "B"])])));
    let mut view = QuizView::mount(backend, "Colors");
    view.load(&auth()).await.unwrap();

    let old = view.begin_submit().unwrap();
    let new = view.begin_submit().unwrap();
    let grade = GradeResult { score: 0, total: 1, answers: vec![Some(Answer::Index(1))] };
    assert_eq!(view.apply_submission(old, Ok(grade.clone())), SubmitOutcome::Discarded);
    assert!(view.is_submitting());
    assert_eq!(view.apply_submission(new, Ok(grade)), SubmitOutcome::Applied);
  }

  #[tokio::test]
  async fn test_malformed_grade_answers_show_unknown() {
    let backend = FakeBackend::with_quiz(Ok(quiz(vec![question(&["A", "B"])])));
    backend.push_grade(Ok(GradeResult { score: 0, total: 1, answers: vec![] }));
    let mut view = QuizView::mount(backend, "Colors");
    view.load(&auth()).await.unwrap();
    view.select_answer(0, "B", 1);
    view.submit(&auth()).await;
    assert_eq!(view.correctness(0), Correctness::Unknown);
    assert_eq!(view.correct_answer_label(0), None);
  }
}
