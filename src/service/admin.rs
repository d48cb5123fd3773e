use actix_web::{web, HttpResponse};

use crate::error::PortalError;
use crate::r#struct::alias::SessionId;
use crate::r#struct::request::{AdminLoginRequest, DashboardQuery, SelectParticipantRequest};
use crate::service::{locked, view};
use crate::session_server::SessionServerHandle;

// 管理员登录，成功后读取参赛者列表
pub(crate) async fn login(
    path: web::Path<SessionId>,
    req_body: web::Json<AdminLoginRequest>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.admin_login(&req_body.user, &req_body.pass).await?;
    Ok(view(&session))
}

// 按姓名、身份证号、中心和书目筛选
pub(crate) async fn participants(
    path: web::Path<SessionId>,
    query: web::Query<DashboardQuery>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let session = locked(&sessions, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session.dashboard(&query)?))
}

pub(crate) async fn refresh(
    path: web::Path<SessionId>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.refresh_dashboard().await?;
    Ok(view(&session))
}

pub(crate) async fn select(
    path: web::Path<SessionId>,
    req_body: web::Json<SelectParticipantRequest>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.select_participant(&req_body.participant_id)?;
    Ok(view(&session))
}
