use futures::future::BoxFuture;

use crate::error::GatewayError;
use crate::r#struct::book::Book;
use crate::r#struct::participant::ParticipantSummary;
use crate::r#struct::question::Question;
use crate::r#struct::submit::SubmitResult;

/// 表格后端提供的四个动作
pub trait DataGateway: Send + Sync {
    /// 读取某本书的题目，id按返回顺序从1开始
    fn get_questions(&self, book: Book) -> BoxFuture<'_, Result<Vec<Question>, GatewayError>>;

    /// 保存参赛结果，返回后端是否确认成功
    fn submit_result<'a>(&'a self, result: &'a SubmitResult) -> BoxFuture<'a, Result<bool, GatewayError>>;

    fn admin_login<'a>(&'a self, user: &'a str, pass: &'a str) -> BoxFuture<'a, Result<bool, GatewayError>>;

    fn get_participants(&self) -> BoxFuture<'_, Result<Vec<ParticipantSummary>, GatewayError>>;
}
