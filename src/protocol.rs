//! Wire structs for the collaborator REST API (serde ready).
//! Field names follow the backend's JSON exactly; conversions into the domain
//! types live here so the rest of the crate never sees raw wire shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Answer, AttemptRecord, GradeResult, Question, Quiz};

//
// Quizzes
//

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuizWire {
    pub quiz_name: String,
    #[serde(default)]
    pub questions: Vec<QuestionWire>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuestionWire {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// String, boolean or integer depending on who authored the quiz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Value>,
}

/// Opaque string form of a stored answer.
fn answer_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(Answer::Bool(*b).to_wire()),
        other => Some(other.to_string()),
    }
}

impl From<QuizWire> for Quiz {
    fn from(w: QuizWire) -> Self {
        Quiz {
            name: w.quiz_name,
            questions: w
                .questions
                .into_iter()
                .map(|q| Question {
                    prompt: q.question,
                    options: q.options,
                    answer: q.answer.as_ref().and_then(answer_text),
                })
                .collect(),
        }
    }
}

impl From<&Quiz> for QuizWire {
    fn from(q: &Quiz) -> Self {
        QuizWire {
            quiz_name: q.name.clone(),
            questions: q
                .questions
                .iter()
                .map(|qq| QuestionWire {
                    question: qq.prompt.clone(),
                    options: qq.options.clone(),
                    answer: Some(Value::String(qq.answer.clone().unwrap_or_default())),
                })
                .collect(),
            id: None,
        }
    }
}

//
// Grading
//

#[derive(Debug, Deserialize)]
pub struct GradeWire {
    pub score: u32,
    pub total: u32,
    /// Kept loose: a missing or malformed list degrades to "unknown".
    #[serde(default)]
    pub answers: Option<Value>,
}

impl From<GradeWire> for GradeResult {
    fn from(w: GradeWire) -> Self {
        let answers = match w.answers {
            Some(Value::Array(items)) => items.iter().map(Answer::from_json).collect(),
            _ => Vec::new(),
        };
        GradeResult { score: w.score, total: w.total, answers }
    }
}

#[derive(Debug, Deserialize)]
pub struct AttemptRecordWire {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub score: u32,
}

impl From<AttemptRecordWire> for AttemptRecord {
    fn from(w: AttemptRecordWire) -> Self {
        AttemptRecord { username: w.username, answers: w.answers, score: w.score }
    }
}

//
// Accounts
//

#[derive(Debug, Serialize)]
pub struct LoginIn<'a> {
    pub username: &'a str,
    pub password: &'a str,
}
#[derive(Debug, Deserialize)]
pub struct TokenOut {
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Profile {
    pub email: String,
    pub birthday: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub profile: Profile,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Deserialize)]
pub struct MessageOut {
    #[serde(default)]
    pub message: String,
}

/// FastAPI error body. `detail` is a string for HTTPException and a list
/// of objects for request validation errors.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Value,
}

//
// PDFs and chat
//

#[derive(Debug, Deserialize)]
pub struct UploadOut {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessPdfOut {
    #[serde(rename = "csvFilename")]
    pub csv_filename: String,
}

#[derive(Debug, Deserialize)]
pub struct PdfListOut {
    #[serde(default)]
    pub pdfs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatIn<'a> {
    pub query: &'a str,
    pub pdf: Option<&'a str>,
}

/// The chat endpoint answers 200 with either a response or an `error` field.
#[derive(Debug, Deserialize)]
pub struct ChatOut {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub search_results: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quiz_wire_answer_shapes() {
        let w: QuizWire = serde_json::from_value(json!({
            "_id": "65f0",
            "quiz_name": "Colors",
            "questions": [
                {"question": "Sky is blue", "options": ["True", "False"], "answer": true},
                {"question": "Pick C", "options": ["A", "B", "C", "D"], "answer": 2},
                {"question": "Pick A", "options": ["A", "B", "C", "D"], "answer": "0"},
                {"question": "No answer", "options": ["A", "B"]}
            ]
        }))
        .unwrap();
        let quiz = Quiz::from(w);
        assert_eq!(quiz.name, "Colors");
        let answers: Vec<Option<String>> = quiz.questions.iter().map(|q| q.answer.clone()).collect();
        assert_eq!(answers, vec![Some("True".into()), Some("2".into()), Some("0".into()), None]);
    }

    #[test]
    fn test_quiz_wire_out_sends_string_answers() {
        let quiz = Quiz {
            name: "Q".into(),
            questions: vec![Question { prompt: "p".into(), options: vec!["True".into(), "False".into()], answer: Some("False".into()) }],
        };
        let v = serde_json::to_value(QuizWire::from(&quiz)).unwrap();
        assert_eq!(v, json!({"quiz_name": "Q", "questions": [{"question": "p", "options": ["True", "False"], "answer": "False"}]}));
    }

    #[test]
    fn test_grade_wire_degrades_malformed_answers() {
        let g: GradeResult = serde_json::from_value::<GradeWire>(json!({"score": 1, "total": 3, "answers": [true, "x", 3]}))
            .unwrap()
            .into();
        assert_eq!(g.answers, vec![Some(Answer::Bool(true)), None, Some(Answer::Index(3))]);

        let g: GradeResult = serde_json::from_value::<GradeWire>(json!({"score": 0, "total": 1, "answers": "oops"}))
            .unwrap()
            .into();
        assert!(g.answers.is_empty());

        let g: GradeResult = serde_json::from_value::<GradeWire>(json!({"score": 0, "total": 1})).unwrap().into();
        assert!(g.answers.is_empty());
    }

    #[test]
    fn test_grade_wire_requires_score() {
        assert!(serde_json::from_value::<GradeWire>(json!({"total": 1, "answers": []})).is_err());
    }
}
