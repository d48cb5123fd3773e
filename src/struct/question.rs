use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::r#struct::alias::QuestionId;
use crate::r#struct::book::Book;
use crate::utils::{lenient_string, value_to_f64, value_to_string};

/// 后端没有给出分值时每题的默认分数
pub const DEFAULT_POINTS: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub book: Book,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: f64,
}

// getQuestions返回的原始行
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(default)]
    pub options: Vec<Value>,
    #[serde(default)]
    pub correct_answer: Value,
    #[serde(default)]
    pub points: Value,
}

impl QuestionRow {
    pub fn into_question(self, id: QuestionId, book: Book) -> Question {
        // 缺失、为0或无法解析的分值都按默认分值处理
        let points = value_to_f64(&self.points)
            .filter(|p| p.is_finite() && *p != 0.0)
            .unwrap_or(DEFAULT_POINTS);
        Question {
            id,
            book,
            text: self.text,
            options: self.options.iter().map(value_to_string).collect(),
            correct_answer: value_to_string(&self.correct_answer),
            points,
        }
    }
}
