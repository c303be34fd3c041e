//! Domain models: quizzes, questions, the dual-encoded answer, grade results.

use std::fmt;

use serde_json::Value;

pub const TRUE_LITERAL: &str = "True";
pub const FALSE_LITERAL: &str = "False";

/// A selected or revealed answer.
///
/// Boolean questions are graded by value, multiple-choice questions by option
/// position. On the wire both travel as strings: `"True"`/`"False"` or the
/// decimal option index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Answer {
  Bool(bool),
  Index(usize),
}

impl Answer {
  /// Normalize a radio selection: the literal "True"/"False" option text is
  /// kept as a boolean, anything else is recorded by its position.
  pub fn from_selection(option_value: &str, option_index: usize) -> Self {
    match option_value {
      TRUE_LITERAL => Answer::Bool(true),
      FALSE_LITERAL => Answer::Bool(false),
      _ => Answer::Index(option_index),
    }
  }

  /// Legacy string form expected by the grading endpoint.
  pub fn to_wire(&self) -> String {
    match self {
      Answer::Bool(true) => TRUE_LITERAL.to_string(),
      Answer::Bool(false) => FALSE_LITERAL.to_string(),
      Answer::Index(i) => i.to_string(),
    }
  }

  pub fn parse_wire(s: &str) -> Option<Self> {
    let s = s.trim();
    match s {
      TRUE_LITERAL => Some(Answer::Bool(true)),
      FALSE_LITERAL => Some(Answer::Bool(false)),
      _ if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok().map(Answer::Index),
      _ => None,
    }
  }

  /// The grading endpoint echoes stored answers, which may be JSON booleans,
  /// integers or strings depending on how the quiz was authored.
  pub fn from_json(v: &Value) -> Option<Self> {
    match v {
      Value::Bool(b) => Some(Answer::Bool(*b)),
      Value::Number(n) => n.as_u64().and_then(|i| usize::try_from(i).ok()).map(Answer::Index),
      Value::String(s) => Self::parse_wire(s),
      _ => None,
    }
  }
}

impl fmt::Display for Answer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_wire())
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionKind {
  TrueFalse,
  MultipleChoice,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
  pub prompt: String,
  /// Display order is the server's order; correctness is keyed on position.
  pub options: Vec<String>,
  /// Authored answer as an opaque string. Only the editor reads it; the
  /// attempt view relies on the grade result instead.
  pub answer: Option<String>,
}

impl Question {
  pub fn kind(&self) -> QuestionKind {
    if self.options.len() == 2 && self.options[0] == TRUE_LITERAL && self.options[1] == FALSE_LITERAL {
      QuestionKind::TrueFalse
    } else {
      QuestionKind::MultipleChoice
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quiz {
  /// Unique, human-chosen identifier; also the route key.
  pub name: String,
  pub questions: Vec<Question>,
}

/// Server verdict for one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradeResult {
  pub score: u32,
  pub total: u32,
  /// Canonical answer per question, positionally aligned with the quiz.
  /// `None` marks an entry that could not be interpreted.
  pub answers: Vec<Option<Answer>>,
}

impl GradeResult {
  pub fn correct_answer(&self, question_index: usize) -> Option<Answer> {
    self.answers.get(question_index).copied().flatten()
  }
}

/// One past attempt as stored by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRecord {
  pub username: String,
  pub answers: Vec<String>,
  pub score: u32,
}
