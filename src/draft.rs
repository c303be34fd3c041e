//! Editable quiz draft backing the add/edit quiz forms.

use crate::domain::{Answer, Question, QuestionKind, Quiz, FALSE_LITERAL, TRUE_LITERAL};
use crate::error::{ClientError, ClientResult};

const MULTIPLE_CHOICE_OPTIONS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftQuestion {
  pub prompt: String,
  pub kind: QuestionKind,
  pub options: Vec<String>,
  /// "True"/"False" for boolean questions, a 0-based option index otherwise.
  pub answer: String,
}

impl DraftQuestion {
  pub fn multiple_choice() -> Self {
    Self {
      prompt: String::new(),
      kind: QuestionKind::MultipleChoice,
      options: vec![String::new(); MULTIPLE_CHOICE_OPTIONS],
      answer: String::new(),
    }
  }

  fn reset_kind(&mut self, kind: QuestionKind) {
    self.kind = kind;
    self.options = match kind {
      QuestionKind::TrueFalse => vec![TRUE_LITERAL.to_string(), FALSE_LITERAL.to_string()],
      QuestionKind::MultipleChoice => vec![String::new(); MULTIPLE_CHOICE_OPTIONS],
    };
    self.answer.clear();
  }
}

/// A single form edit on one question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftEdit {
  Prompt(String),
  Kind(QuestionKind),
  OptionText(usize, String),
  Answer(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizDraft {
  pub name: String,
  pub questions: Vec<DraftQuestion>,
}

impl Default for QuizDraft {
  fn default() -> Self {
    Self { name: String::new(), questions: vec![DraftQuestion::multiple_choice()] }
  }
}

impl QuizDraft {
  pub fn new() -> Self {
    Self::default()
  }

  /// Load an existing quiz into the edit form.
  pub fn from_quiz(quiz: &Quiz) -> Self {
    Self {
      name: quiz.name.clone(),
      questions: quiz
        .questions
        .iter()
        .map(|q| DraftQuestion {
          prompt: q.prompt.clone(),
          kind: q.kind(),
          options: q.options.clone(),
          answer: q.answer.clone().unwrap_or_default(),
        })
        .collect(),
    }
  }

  pub fn add_question(&mut self) {
    self.questions.push(DraftQuestion::multiple_choice());
  }

  pub fn remove_question(&mut self, index: usize) -> bool {
    if index < self.questions.len() {
      self.questions.remove(index);
      true
    } else {
      false
    }
  }

  /// Apply one edit; false if the question or option index does not exist.
  /// Changing the kind resets options and clears the answer.
  pub fn edit(&mut self, index: usize, edit: DraftEdit) -> bool {
    let Some(q) = self.questions.get_mut(index) else {
      return false;
    };
    match edit {
      DraftEdit::Prompt(text) => q.prompt = text,
      DraftEdit::Kind(kind) => q.reset_kind(kind),
      DraftEdit::Answer(text) => q.answer = text,
      DraftEdit::OptionText(i, text) => match q.options.get_mut(i) {
        Some(opt) => *opt = text,
        None => return false,
      },
    }
    true
  }

  /// Check the form and build the quiz to send.
  pub fn validate(&self) -> ClientResult<Quiz> {
    let name = self.name.trim();
    if name.is_empty() {
      return Err(ClientError::InvalidInput("Quiz name is required.".into()));
    }
    if self.questions.is_empty() {
      return Err(ClientError::InvalidInput("A quiz needs at least one question.".into()));
    }

    let mut questions = Vec::with_capacity(self.questions.len());
    for (i, q) in self.questions.iter().enumerate() {
      let n = i + 1;
      if q.prompt.trim().is_empty() {
        return Err(ClientError::InvalidInput(format!("Question {} has no text.", n)));
      }
      if q.options.iter().any(|o| o.trim().is_empty()) {
        return Err(ClientError::InvalidInput(format!("Question {} has an empty option.", n)));
      }
      let answer = match (q.kind, Answer::parse_wire(&q.answer)) {
        (QuestionKind::TrueFalse, Some(a @ Answer::Bool(_))) => a,
        (QuestionKind::MultipleChoice, Some(a @ Answer::Index(idx))) if idx < q.options.len() => a,
        (QuestionKind::TrueFalse, _) => {
          return Err(ClientError::InvalidInput(format!("Question {}: answer must be True or False.", n)));
        }
        (QuestionKind::MultipleChoice, _) => {
          return Err(ClientError::InvalidInput(format!(
            "Question {}: answer must be an option number from 0 to {}.",
            n,
            q.options.len().saturating_sub(1)
          )));
        }
      };
      questions.push(Question {
        prompt: q.prompt.trim().to_string(),
        options: q.options.clone(),
        answer: Some(answer.to_wire()),
      });
    }

    Ok(Quiz { name: name.to_string(), questions })
  }
}
