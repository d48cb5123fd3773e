use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::r#struct::book::Book;
use crate::r#struct::participant::Participant;

// submitResult动作提交给后端的内容
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub full_name: String,
    pub national_id: String,
    pub phone: String,
    pub center: String,
    pub total_score: f64,
    pub scores: Vec<SubmittedScore>,
    pub registration_date: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedScore {
    pub book: Book,
    pub mcq_score: f64,
    pub essay: String,
    pub essay_score: f64,
    pub ai_feedback: String,
}

impl From<&Participant> for SubmitResult {
    fn from(participant: &Participant) -> Self {
        let scores = participant
            .books
            .iter()
            .zip(participant.scores.iter())
            .filter_map(|(book, score)| {
                score.as_ref().map(|s| SubmittedScore {
                    book: *book,
                    mcq_score: s.mcq_score,
                    essay: s.essay.clone(),
                    essay_score: s.essay_score,
                    ai_feedback: s.ai_feedback.clone(),
                })
            })
            .collect();
        SubmitResult {
            full_name: participant.identity.full_name.clone(),
            national_id: participant.identity.national_id.clone(),
            phone: participant.identity.phone.clone(),
            center: participant.identity.center.clone(),
            total_score: participant.total_score,
            scores,
            registration_date: participant.registration_date.clone(),
        }
    }
}

// submitResult和adminLogin的响应
#[derive(Deserialize, Debug)]
pub struct SuccessResponse {
    #[serde(default, deserialize_with = "truthy")]
    pub success: bool,
}

// 脚本后端有时会把布尔值写成字符串
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}
