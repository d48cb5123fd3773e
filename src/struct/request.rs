use serde::{Deserialize, Deserializer};

use crate::r#struct::alias::QuestionId;
use crate::r#struct::book::Book;
use crate::r#struct::participant::Identity;

// 报名表单，缺失的字段交给校验逻辑处理
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub full_name: String,
    pub national_id: String,
    pub phone: String,
    pub center: String,
}

impl From<RegisterRequest> for Identity {
    fn from(req: RegisterRequest) -> Self {
        Identity {
            full_name: req.full_name,
            national_id: req.national_id,
            phone: req.phone,
            center: req.center,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ToggleBookRequest {
    pub book: Book,
}

// 选择答案，option为选项下标
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_id: Option<QuestionId>,
    pub option: usize,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct EssayRequest {
    pub essay: String,
}

#[derive(Deserialize, Debug)]
pub struct AdminLoginRequest {
    #[serde(alias = "username")]
    pub user: String,
    #[serde(alias = "password")]
    pub pass: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SelectParticipantRequest {
    pub participant_id: String,
}

// 管理面板的筛选条件，空字符串表示不过滤
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardQuery {
    pub search: String,
    pub center: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub book: Option<Book>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<Book>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Book::deserialize(serde::de::value::StrDeserializer::<D::Error>::new(s)).map(Some),
    }
}
