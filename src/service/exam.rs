use actix_web::{web, HttpResponse};

use crate::error::PortalError;
use crate::r#struct::alias::SessionId;
use crate::r#struct::request::{AnswerRequest, EssayRequest};
use crate::service::{locked, view};
use crate::session_server::SessionServerHandle;

// 题目读取失败后手动重试
pub(crate) async fn retry_quiz(
    path: web::Path<SessionId>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.retry_quiz().await?;
    Ok(view(&session))
}

pub(crate) async fn answer(
    path: web::Path<SessionId>,
    req_body: web::Json<AnswerRequest>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.answer(req_body.question_id, req_body.option)?;
    Ok(view(&session))
}

// 提交作文并等待AI评分
pub(crate) async fn submit_essay(
    path: web::Path<SessionId>,
    req_body: web::Json<EssayRequest>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.submit_essay(req_body.into_inner().essay).await?;
    Ok(view(&session))
}

pub(crate) async fn skip_essay(
    path: web::Path<SessionId>,
    req_body: Option<web::Json<EssayRequest>>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let essay = req_body.map(|body| body.into_inner().essay).unwrap_or_default();
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.skip_essay(essay).await?;
    Ok(view(&session))
}
