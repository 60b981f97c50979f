use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::category::Category;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    /// Reserved: no exposed operation transitions into this state.
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }
}

/// One graded answer, embedded in its session. The correct categories are
/// snapshotted at grading time so later edits to the catalog item do not
/// rewrite history.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Answer {
    pub question_id: String,
    pub question_text: String,
    pub selected_categories: Vec<Category>,
    pub correct_categories: Vec<Category>,
    pub is_correct: bool,
    pub time_spent: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Performance {
    pub accuracy: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_time_per_question: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastest_answer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slowest_answer: Option<i64>,
}

impl Performance {
    /// Answers with a zero or negative time are treated as "time unknown"
    /// and excluded from the timing metrics.
    fn from_answers(answers: &[Answer]) -> Self {
        if answers.is_empty() {
            return Performance::default();
        }

        let correct = answers.iter().filter(|a| a.is_correct).count();
        let accuracy = round_percentage(correct as u32, answers.len() as u32);

        let times: Vec<i64> = answers
            .iter()
            .map(|a| a.time_spent)
            .filter(|t| *t > 0)
            .collect();

        if times.is_empty() {
            return Performance {
                accuracy,
                ..Performance::default()
            };
        }

        let sum: i64 = times.iter().sum();
        Performance {
            accuracy,
            average_time_per_question: Some(
                (sum as f64 / times.len() as f64).round() as i64
            ),
            fastest_answer: times.iter().min().copied(),
            slowest_answer: times.iter().max().copied(),
        }
    }
}

/// One student's attempt at a level's question set.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameSession {
    pub id: String,
    pub student_id: String,
    pub student_identifier: String,
    pub level: u8,
    pub status: SessionStatus,
    pub answers: Vec<Answer>,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub time_taken_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
    #[serde(default)]
    pub performance: Performance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn start(
        student_id: &str,
        student_identifier: &str,
        level: u8,
        total_questions: u32,
    ) -> Self {
        GameSession {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            student_identifier: student_identifier.to_string(),
            level,
            status: SessionStatus::InProgress,
            answers: Vec::new(),
            score: 0,
            total_questions,
            percentage: 0,
            start_time: Utc::now(),
            end_time: None,
            time_taken_seconds: 0,
            feedback_text: None,
            performance: Performance::default(),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    /// Appends a graded answer and maintains the derived fields.
    ///
    /// `percentage` and `performance` are kept consistent with
    /// `score`/`answers` here, before the session is ever persisted or
    /// read, rather than being recomputed lazily by readers.
    pub fn push_answer(&mut self, answer: Answer) {
        if answer.is_correct {
            self.score += 1;
        }
        self.answers.push(answer);
        self.recompute_derived();
    }

    /// Marks the session completed, stamping the end time and feedback.
    pub fn finalize(&mut self, feedback_text: Option<String>) {
        let end = Utc::now();
        self.time_taken_seconds = ((end - self.start_time).num_milliseconds() as f64 / 1000.0)
            .round() as i64;
        self.end_time = Some(end);
        self.feedback_text = feedback_text;
        self.status = SessionStatus::Completed;
        self.updated_at = Some(end);
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback_text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }

    fn recompute_derived(&mut self) {
        self.percentage = round_percentage(self.score, self.total_questions);
        self.performance = Performance::from_answers(&self.answers);
        self.updated_at = Some(Utc::now());
    }
}

pub(crate) fn round_percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

#[cfg(test)]
impl GameSession {
    pub fn test_session(student_id: &str, level: u8, total_questions: u32) -> Self {
        GameSession::start(student_id, "0712345678", level, total_questions)
    }
}
