use serde::Serialize;

use crate::r#struct::book::{Book, MAX_TOTAL_SCORE};
use crate::r#struct::participant::{BookScore, Participant, ParticipantSummary, Status};

pub const SAVED_NOTICE: &str = "تم تسجيل وحفظ نتائجك بنجاح في سجلات مؤسسة حياة كريمة بالغربية. سيتم عرض النتائج النهائية بعد اكتمال مراجعة الأقسام المقالية من قبل لجنة التحكيم المختصة.";
pub const NO_FEEDBACK_YET: &str = "لم يتم استلام تقييم آلي بعد.";

/// 参赛者成绩页，公开版本只展示选择题总分
#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub full_name: String,
    pub center: String,
    pub books: Vec<Book>,
    pub status: Status,
    pub mcq_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminDetail>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminDetail {
    pub national_id: String,
    pub phone: String,
    pub registration_date: String,
    pub total_score: f64,
    pub max_score: f64,
    pub breakdown: Vec<BookBreakdown>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookBreakdown {
    pub book: Book,
    pub mcq_score: f64,
    pub essay_score: f64,
    pub essay: String,
    pub ai_feedback: String,
}

impl BookBreakdown {
    fn new(book: Book, score: &BookScore) -> Self {
        let ai_feedback = if score.ai_feedback.trim().is_empty() {
            NO_FEEDBACK_YET.to_string()
        } else {
            score.ai_feedback.clone()
        };
        BookBreakdown {
            book,
            mcq_score: score.mcq_score,
            essay_score: score.essay_score,
            essay: score.essay.clone(),
            ai_feedback,
        }
    }
}

impl ProfileView {
    pub fn public(participant: &Participant) -> Self {
        ProfileView {
            full_name: participant.identity.full_name.clone(),
            center: participant.identity.center.clone(),
            books: participant.books.to_vec(),
            status: participant.status,
            mcq_total: participant.mcq_total(),
            notice: Some(SAVED_NOTICE),
            admin: None,
        }
    }

    /// 管理员查看的详细版本，按参赛者选书顺序列出每本书的成绩
    pub fn admin(summary: &ParticipantSummary) -> Self {
        let breakdown = summary
            .selected_books
            .iter()
            .filter_map(|book| summary.scores.get(book).map(|score| BookBreakdown::new(*book, score)))
            .collect();
        ProfileView {
            full_name: summary.full_name.clone(),
            center: summary.center.clone(),
            books: summary.selected_books.clone(),
            status: summary.status,
            mcq_total: summary.scores.values().map(|s| s.mcq_score).sum(),
            notice: None,
            admin: Some(AdminDetail {
                national_id: summary.national_id.clone(),
                phone: summary.phone.clone(),
                registration_date: summary.registration_date.clone(),
                total_score: summary.total_score,
                max_score: MAX_TOTAL_SCORE,
                breakdown,
            }),
        }
    }
}
