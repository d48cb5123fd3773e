use actix_web::{web, HttpResponse};

use crate::error::PortalError;
use crate::r#struct::alias::SessionId;
use crate::r#struct::request::{RegisterRequest, ToggleBookRequest};
use crate::service::{locked, view};
use crate::session_server::SessionServerHandle;

// 新访客进入报名页
pub(crate) async fn create(sessions: web::Data<SessionServerHandle>) -> Result<HttpResponse, PortalError> {
    let session = sessions.create().await?;
    let session = session.lock().await;
    Ok(HttpResponse::Created().json(session.view()))
}

pub(crate) async fn current(
    path: web::Path<SessionId>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let session = locked(&sessions, path.into_inner()).await?;
    Ok(view(&session))
}

// 提交报名表单
pub(crate) async fn register(
    path: web::Path<SessionId>,
    req_body: web::Json<RegisterRequest>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.register(req_body.into_inner().into())?;
    Ok(view(&session))
}

pub(crate) async fn open_admin(
    path: web::Path<SessionId>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.open_admin_login()?;
    Ok(view(&session))
}

pub(crate) async fn toggle_book(
    path: web::Path<SessionId>,
    req_body: web::Json<ToggleBookRequest>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.toggle_book(req_body.book)?;
    Ok(view(&session))
}

pub(crate) async fn back(
    path: web::Path<SessionId>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.back_to_register()?;
    Ok(view(&session))
}

// 确认选书并读取第一本书的题目
pub(crate) async fn confirm_books(
    path: web::Path<SessionId>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let mut session = locked(&sessions, path.into_inner()).await?;
    session.confirm_books().await?;
    Ok(view(&session))
}

pub(crate) async fn profile(
    path: web::Path<SessionId>,
    sessions: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, PortalError> {
    let session = locked(&sessions, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session.profile()?))
}
