//! Quiz attempt state and its transition function.
//!
//! `AttemptState::reduce` is the only way state changes: selections while
//! answering, then exactly one `Graded` transition. Nothing here talks to the
//! network; `view::QuizView` drives it from collaborator results.

use tracing::debug;

use crate::domain::{Answer, GradeResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
  Answering,
  Graded,
}

/// Display verdict for one question (or one option) after grading.
/// Never used for scoring; the server's score is authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correctness {
  SelectedAndCorrect,
  SelectedAndWrong,
  NotApplicable,
  /// The server's answer for this position is missing or unreadable.
  Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptEvent {
  Select {
    question_index: usize,
    option_value: String,
    option_index: usize,
  },
  Graded(GradeResult),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptState {
  /// One slot per question; `None` is unanswered. Length is fixed at creation.
  answers: Vec<Option<Answer>>,
  result: Option<GradeResult>,
  phase: Phase,
}

impl AttemptState {
  pub fn new(question_count: usize) -> Self {
    Self { answers: vec![None; question_count], result: None, phase: Phase::Answering }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn result(&self) -> Option<&GradeResult> {
    self.result.as_ref()
  }

  pub fn answers(&self) -> &[Option<Answer>] {
    &self.answers
  }

  pub fn answer(&self, question_index: usize) -> Option<Answer> {
    self.answers.get(question_index).copied().flatten()
  }

  /// Submission payload: legacy strings, empty string for unanswered.
  pub fn wire_answers(&self) -> Vec<String> {
    self.answers.iter().map(|a| a.map(|a| a.to_wire()).unwrap_or_default()).collect()
  }

  pub fn reduce(mut self, event: AttemptEvent) -> Self {
    match (self.phase, event) {
      (Phase::Answering, AttemptEvent::Select { question_index, option_value, option_index }) => {
        match self.answers.get_mut(question_index) {
          Some(slot) => *slot = Some(Answer::from_selection(&option_value, option_index)),
          None => debug!(target: "attempt", question_index, len = self.answers.len(), "Selection outside the quiz ignored"),
        }
      }
      (Phase::Answering, AttemptEvent::Graded(result)) => {
        self.result = Some(result);
        self.phase = Phase::Graded;
      }
      (Phase::Graded, event) => {
        debug!(target: "attempt", ?event, "Attempt already graded; event ignored");
      }
    }
    self
  }

  /// Verdict for the user's selection on one question.
  pub fn correctness(&self, question_index: usize) -> Correctness {
    let Some(result) = self.result.as_ref().filter(|_| self.phase == Phase::Graded) else {
      return Correctness::NotApplicable;
    };
    let Some(selected) = self.answer(question_index) else {
      return Correctness::NotApplicable;
    };
    match result.correct_answer(question_index) {
      None => Correctness::Unknown,
      Some(correct) if correct == selected => Correctness::SelectedAndCorrect,
      Some(_) => Correctness::SelectedAndWrong,
    }
  }

  /// Verdict for rendering one option: only the selected option gets a mark.
  pub fn option_correctness(&self, question_index: usize, option_value: &str, option_index: usize) -> Correctness {
    if self.answer(question_index) != Some(Answer::from_selection(option_value, option_index)) {
      return Correctness::NotApplicable;
    }
    self.correctness(question_index)
  }

  /// The server's answer for a question, once graded.
  pub fn correct_answer(&self, question_index: usize) -> Option<Answer> {
    self.result.as_ref().and_then(|r| r.correct_answer(question_index))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn select(q: usize, value: &str, idx: usize) -> AttemptEvent {
    AttemptEvent::Select { question_index: q, option_value: value.into(), option_index: idx }
  }

  fn graded(score: u32, answers: Vec<Option<Answer>>) -> AttemptEvent {
    AttemptEvent::Graded(GradeResult { score, total: answers.len() as u32, answers })
  }

  #[test]
  fn test_fresh_state() {
    for n in [0, 1, 7] {
      let s = AttemptState::new(n);
      assert_eq!(s.answers().len(), n);
      assert_eq!(s.phase(), Phase::Answering);
      assert!(s.result().is_none());
      assert!(s.wire_answers().iter().all(String::is_empty));
    }
  }

  #[test]
  fn test_selection_encoding() {
    let s = AttemptState::new(2).reduce(select(0, "True", 0)).reduce(select(1, "Blue", 2));
    assert_eq!(s.wire_answers(), vec!["True".to_string(), "2".to_string()]);
  }

  #[test]
  fn test_reselect_overwrites_and_never_resizes() {
    let s = AttemptState::new(1).reduce(select(0, "A", 0)).reduce(select(0, "D", 3)).reduce(select(4, "X", 1));
    assert_eq!(s.wire_answers(), vec!["3".to_string()]);
  }

  #[test]
  fn test_selection_after_grading_is_noop() {
    let s = AttemptState::new(1).reduce(select(0, "A", 0)).reduce(graded(1, vec![Some(Answer::Index(0))]));
    let after = s.clone().reduce(select(0, "B", 1));
    assert_eq!(after, s);
  }

  #[test]
  fn test_graded_transition_happens_once() {
    let first = GradeResult { score: 1, total: 1, answers: vec![Some(Answer::Bool(true))] };
    let s = AttemptState::new(1)
      .reduce(AttemptEvent::Graded(first.clone()))
      .reduce(graded(0, vec![Some(Answer::Bool(false))]));
    assert_eq!(s.phase(), Phase::Graded);
    assert_eq!(s.result(), Some(&first));
  }

  #[test]
  fn test_boolean_wrong_answer() {
    let s = AttemptState::new(1).reduce(select(0, "False", 1));
    assert_eq!(s.wire_answers(), vec!["False".to_string()]);
    let s = s.reduce(graded(0, vec![Some(Answer::Bool(true))]));
    assert_eq!(s.correctness(0), Correctness::SelectedAndWrong);
    assert_eq!(s.option_correctness(0, "False", 1), Correctness::SelectedAndWrong);
    assert_eq!(s.option_correctness(0, "True", 0), Correctness::NotApplicable);
    assert_eq!(s.correct_answer(0).map(|a| a.to_wire()), Some("True".to_string()));
  }

  #[test]
  fn test_multiple_choice_correct_answer() {
    let s = AttemptState::new(1).reduce(select(0, "C", 2));
    assert_eq!(s.wire_answers(), vec!["2".to_string()]);
    let s = s.reduce(graded(1, vec![Some(Answer::Index(2))]));
    assert_eq!(s.correctness(0), Correctness::SelectedAndCorrect);
    assert_eq!(s.option_correctness(0, "C", 2), Correctness::SelectedAndCorrect);
  }

  #[test]
  fn test_correctness_before_grading_and_unanswered() {
    let s = AttemptState::new(2).reduce(select(0, "A", 0));
    assert_eq!(s.correctness(0), Correctness::NotApplicable);
    let s = s.reduce(graded(0, vec![Some(Answer::Index(1)), Some(Answer::Index(1))]));
    assert_eq!(s.correctness(1), Correctness::NotApplicable);
  }

  #[test]
  fn test_missing_server_answers_degrade_to_unknown() {
    let s = AttemptState::new(2)
      .reduce(select(0, "A", 0))
      .reduce(select(1, "True", 0))
      .reduce(graded(0, vec![None]));
    assert_eq!(s.correctness(0), Correctness::Unknown);
    assert_eq!(s.correctness(1), Correctness::Unknown);
  }
}
