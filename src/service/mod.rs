use actix_web::error::InternalError;
use actix_web::{web, HttpResponse};
use tokio::sync::OwnedMutexGuard;

use crate::controller::Session;
use crate::error::PortalError;
use crate::r#struct::alias::SessionId;
use crate::r#struct::respond::Respond;
use crate::session_server::SessionServerHandle;

pub mod admin;
pub mod catalog;
pub mod exam;
pub mod proxy;
pub mod session;

/// 取出会话并独占，同一会话的请求依次处理
pub(crate) async fn locked(
    sessions: &SessionServerHandle,
    id: SessionId,
) -> Result<OwnedMutexGuard<Session>, PortalError> {
    let session = sessions.get(id).await?;
    let mut session = session.lock_owned().await;
    session.touch();
    Ok(session)
}

pub(crate) fn view(session: &Session) -> HttpResponse {
    HttpResponse::Ok().json(session.view())
}

/// 注册所有路由
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default().error_handler(|err, _req| {
        let body = Respond {
            code: 400,
            msg: err.to_string(),
        };
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    });

    cfg.app_data(json)
        .service(
            web::scope("/api")
                .route("/books", web::get().to(catalog::books))
                .route("/centers", web::get().to(catalog::centers))
                .route("/session", web::post().to(session::create))
                .service(
                    web::scope("/session/{id}")
                        .route("", web::get().to(session::current))
                        .route("/register", web::post().to(session::register))
                        .route("/admin", web::post().to(session::open_admin))
                        .route("/books/toggle", web::post().to(session::toggle_book))
                        .route("/books/back", web::post().to(session::back))
                        .route("/books/confirm", web::post().to(session::confirm_books))
                        .route("/profile", web::get().to(session::profile))
                        .route("/quiz/retry", web::post().to(exam::retry_quiz))
                        .route("/quiz/answer", web::post().to(exam::answer))
                        .route("/essay/submit", web::post().to(exam::submit_essay))
                        .route("/essay/skip", web::post().to(exam::skip_essay))
                        .route("/admin/login", web::post().to(admin::login))
                        .route("/admin/participants", web::get().to(admin::participants))
                        .route("/admin/refresh", web::post().to(admin::refresh))
                        .route("/admin/select", web::post().to(admin::select)),
                ),
        )
        .service(
            web::resource("/proxy")
                .route(web::get().to(proxy::forward))
                .route(web::post().to(proxy::forward))
                .route(web::method(actix_web::http::Method::OPTIONS).to(proxy::preflight)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r#struct::book::Book;
    use crate::service::proxy::ProxyTarget;
    use crate::session_server::SessionServer;
    use crate::testing::{backends, questions, FakeGateway, FakeGrader};
    use actix_web::http::StatusCode;
    use actix_web::{test, App, HttpServer};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn registry() -> SessionServerHandle {
        let gateway = FakeGateway::with_questions(vec![
            (Book::Tharthara, questions(Book::Tharthara, 3, 2.5)),
            (Book::AkherAyam, questions(Book::AkherAyam, 3, 2.5)),
        ]);
        let grader = FakeGrader::returning(20.0, "جيد");
        let (server, handle) = SessionServer::new(backends(&gateway, &grader), Duration::from_secs(600));
        tokio::spawn(server.run());
        handle
    }

    fn proxy_target(url: &str) -> ProxyTarget {
        ProxyTarget::new(url, Duration::from_secs(5)).unwrap()
    }

    macro_rules! portal {
        ($sessions:expr, $target:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($sessions))
                    .app_data(web::Data::new($target))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn register_select_and_answer() {
        let app = portal!(registry(), proxy_target("http://127.0.0.1:1/exec"));

        let created: Value = test::call_and_read_body_json(&app, test::TestRequest::post().uri("/api/session").to_request()).await;
        assert_eq!(created["step"], "register");
        assert_eq!(created["examInProgress"], false);
        let id = created["sessionId"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/session/{id}/register"))
            .set_json(json!({
                "fullName": "سارة محمود عبد الرحمن",
                "nationalId": "29901011234567",
                "phone": "01012345678",
                "center": "طنطا"
            }))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["step"], "select_books");

        for book in ["nile_chitchat", "november_days"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/session/{id}/books/toggle"))
                .set_json(json!({ "book": book }))
                .to_request();
            let _: Value = test::call_and_read_body_json(&app, req).await;
        }

        let req = test::TestRequest::post().uri(&format!("/api/session/{id}/books/confirm")).to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["step"], "quiz");
        assert_eq!(view["examInProgress"], true);
        assert_eq!(view["bookNumber"], 1);
        assert_eq!(view["quiz"]["status"], "question");
        assert_eq!(view["quiz"]["total"], 3);

        let req = test::TestRequest::post()
            .uri(&format!("/api/session/{id}/quiz/answer"))
            .set_json(json!({ "questionId": 1, "option": 1 }))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["quiz"]["number"], 2);
        assert_eq!(view["quiz"]["transitioning"], true);
    }

    #[actix_web::test]
    async fn rejected_actions_use_respond_body() {
        let app = portal!(registry(), proxy_target("http://127.0.0.1:1/exec"));

        let req = test::TestRequest::get().uri("/api/session/missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let created: Value = test::call_and_read_body_json(&app, test::TestRequest::post().uri("/api/session").to_request()).await;
        let id = created["sessionId"].as_str().unwrap().to_string();

        let req = test::TestRequest::post().uri(&format!("/api/session/{id}/essay/skip")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 409);

        let req = test::TestRequest::post()
            .uri(&format!("/api/session/{id}/register"))
            .set_json(json!({ "fullName": "علي حسن" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["msg"], crate::registration::NAME_ERROR);

        let req = test::TestRequest::post()
            .uri(&format!("/api/session/{id}/register"))
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 400);
    }

    #[actix_web::test]
    async fn admin_branch_filters_participants() {
        let app = portal!(registry(), proxy_target("http://127.0.0.1:1/exec"));
        let created: Value = test::call_and_read_body_json(&app, test::TestRequest::post().uri("/api/session").to_request()).await;
        let id = created["sessionId"].as_str().unwrap().to_string();

        let view: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post().uri(&format!("/api/session/{id}/admin")).to_request(),
        )
        .await;
        assert_eq!(view["step"], "admin_login");

        let req = test::TestRequest::post()
            .uri(&format!("/api/session/{id}/admin/login"))
            .set_json(json!({ "username": "admin", "password": "nope" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri(&format!("/api/session/{id}/admin/login"))
            .set_json(json!({ "user": "admin", "pass": "s3cret" }))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["step"], "admin_dashboard");
        assert_eq!(view["dashboard"]["total"], 0);

        let req = test::TestRequest::get()
            .uri(&format!("/api/session/{id}/admin/participants?search=&center=&book="))
            .to_request();
        let dashboard: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dashboard["participants"], json!([]));
    }

    #[actix_web::test]
    async fn catalogs_are_listed() {
        let app = portal!(registry(), proxy_target("http://127.0.0.1:1/exec"));
        let books: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/books").to_request()).await;
        assert_eq!(books.as_array().unwrap().len(), 4);
        assert_eq!(books[2]["book"], "ماجدولين");
        assert_eq!(books[2]["tab"], "madoline");
        let centers: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/centers").to_request()).await;
        assert_eq!(centers.as_array().unwrap().len(), 8);
    }

    async fn fake_script(req: actix_web::HttpRequest, body: web::Bytes) -> HttpResponse {
        if body.is_empty() {
            HttpResponse::Ok().json(json!({ "query": req.query_string() }))
        } else {
            HttpResponse::Created().body(body)
        }
    }

    #[actix_web::test]
    async fn proxy_relays_status_and_body() {
        let server = HttpServer::new(|| App::new().route("/exec", web::to(fake_script)))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let app = portal!(registry(), proxy_target(&format!("http://{addr}/exec?v=1")));
        let req = test::TestRequest::get().uri("/proxy?action=getQuestions&tab=madoline").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["query"], "v=1&action=getQuestions&tab=madoline");

        let req = test::TestRequest::post()
            .uri("/proxy")
            .set_payload(r#"{"action":"submitResult"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["action"], "submitResult");

        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn unreachable_script_is_reported() {
        let app = portal!(registry(), proxy_target("http://127.0.0.1:1/exec"));
        let resp = test::call_service(&app, test::TestRequest::get().uri("/proxy?action=x").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Failed to fetch from Google Apps Script");
        assert!(body["details"].is_string());
    }
}
