use serde::Serialize;

use crate::dashboard::DashboardView;
use crate::profile::ProfileView;
use crate::quiz::QuizView;
use crate::r#struct::alias::SessionId;
use crate::r#struct::book::Book;

#[derive(Serialize, Debug)]
pub struct Respond {
    pub(crate) code: u16,
    pub(crate) msg: String,
}

/// 会话当前所处步骤的完整视图
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: SessionId,
    // 客户端据此决定是否拦截离开页面
    pub exam_in_progress: bool,
    #[serde(flatten)]
    pub step: StepView,
}

#[derive(Serialize, Debug)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepView {
    Register,
    #[serde(rename_all = "camelCase")]
    SelectBooks {
        selected: Vec<Book>,
        can_confirm: bool,
    },
    #[serde(rename_all = "camelCase")]
    Quiz {
        book_number: usize,
        book: Book,
        quiz: QuizView,
    },
    #[serde(rename_all = "camelCase")]
    Essay {
        book_number: usize,
        book: Book,
        error: Option<String>,
    },
    // 成绩提交中，客户端稍后重新获取
    Saving,
    Completed {
        profile: ProfileView,
    },
    AdminLogin,
    AdminDashboard {
        dashboard: DashboardView,
    },
    Fatal {
        message: String,
    },
}
