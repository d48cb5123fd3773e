use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::r#struct::alias::{ParticipantId, QuestionId};
use crate::r#struct::book::Book;
use crate::utils::{lenient_books, lenient_f64, lenient_scores, lenient_status, lenient_string};

/// 报名时填写的身份信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub full_name: String,
    pub national_id: String,
    pub phone: String,
    pub center: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

/// 单本书的成绩记录，开始答题时为空，答题结束后写入选择题部分，作文结束后写入作文部分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookScore {
    #[serde(deserialize_with = "lenient_f64")]
    pub mcq_score: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub essay_score: f64,
    #[serde(deserialize_with = "lenient_string")]
    pub ai_feedback: String,
    pub answers: BTreeMap<QuestionId, String>,
    #[serde(deserialize_with = "lenient_string")]
    pub essay: String,
}

impl BookScore {
    pub fn total(&self) -> f64 {
        self.mcq_score + self.essay_score
    }
}

/// 两本已选书目中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSlot {
    First,
    Second,
}

impl BookSlot {
    pub fn index(self) -> usize {
        match self {
            BookSlot::First => 0,
            BookSlot::Second => 1,
        }
    }

    pub fn next(self) -> Option<BookSlot> {
        match self {
            BookSlot::First => Some(BookSlot::Second),
            BookSlot::Second => None,
        }
    }
}

/// 通过报名但尚未选书的参赛者
#[derive(Debug, Clone, PartialEq)]
pub struct Registrant {
    pub id: ParticipantId,
    pub identity: Identity,
    pub registration_date: String,
}

/// 当前会话中正在参赛的选手，由会话独占并顺序修改
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub identity: Identity,
    pub books: [Book; 2],
    pub scores: [Option<BookScore>; 2],
    pub total_score: f64,
    pub status: Status,
    pub registration_date: String,
}

impl Participant {
    pub fn new(registrant: Registrant, books: [Book; 2]) -> Self {
        Participant {
            id: registrant.id,
            identity: registrant.identity,
            books,
            scores: [None, None],
            total_score: 0.0,
            status: Status::Pending,
            registration_date: registrant.registration_date,
        }
    }

    pub fn book(&self, slot: BookSlot) -> Book {
        self.books[slot.index()]
    }

    pub fn score(&self, slot: BookSlot) -> Option<&BookScore> {
        self.scores[slot.index()].as_ref()
    }

    /// 写入选择题成绩，同一本书之前的记录会被覆盖
    pub fn record_quiz(&mut self, slot: BookSlot, answers: BTreeMap<QuestionId, String>, mcq_score: f64) {
        self.scores[slot.index()] = Some(BookScore {
            mcq_score,
            answers,
            ..BookScore::default()
        });
        self.recompute_total();
    }

    pub fn record_essay(&mut self, slot: BookSlot, essay: String, essay_score: f64, ai_feedback: String) {
        let record = self.scores[slot.index()].get_or_insert_with(BookScore::default);
        record.essay = essay;
        record.essay_score = essay_score;
        record.ai_feedback = ai_feedback;
        self.recompute_total();
    }

    pub fn complete(&mut self) {
        self.status = Status::Completed;
    }

    /// 所有已完成书目的选择题与作文分数之和
    pub fn recompute_total(&mut self) {
        self.total_score = self.scores.iter().flatten().map(BookScore::total).sum();
    }

    pub fn mcq_total(&self) -> f64 {
        self.scores.iter().flatten().map(|s| s.mcq_score).sum()
    }
}

/// 后端返回的参赛者概要，字段缺失时使用默认值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub national_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub center: String,
    #[serde(deserialize_with = "lenient_books")]
    pub selected_books: Vec<Book>,
    #[serde(deserialize_with = "lenient_string")]
    pub registration_date: String,
    #[serde(deserialize_with = "lenient_status")]
    pub status: Status,
    #[serde(deserialize_with = "lenient_scores")]
    pub scores: BTreeMap<Book, BookScore>,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_score: f64,
}

impl ParticipantSummary {
    /// 用于选中参赛者的键，后端没有给出id时退回到身份证号
    pub fn key(&self) -> &str {
        if self.id.is_empty() {
            &self.national_id
        } else {
            &self.id
        }
    }
}
