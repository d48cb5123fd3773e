use std::io;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use lazy_static::lazy_static;

use crate::config::Config;
use crate::gateway::RemoteGateway;
use crate::grader::GeminiGrader;
use crate::service::proxy::ProxyTarget;
use crate::session_server::SessionServer;
use crate::traits::Backends;

mod book_selection;
mod config;
mod controller;
mod countdown;
mod dashboard;
mod error;
mod essay;
mod gateway;
mod grader;
mod profile;
mod quiz;
mod registration;
mod service;
mod session_server;
mod r#struct;
mod traits;
mod utils;

#[cfg(test)]
mod testing;

lazy_static! {
    static ref CONFIG: Config = Config::load();
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let gateway = RemoteGateway::new(CONFIG.gateway_url(), CONFIG.request_timeout()).map_err(io::Error::other)?;
    if CONFIG.gemini_api_key.is_none() {
        log::warn!("未配置AI接口密钥，作文评分将不可用");
    }
    let grader = GeminiGrader::new(
        &CONFIG.gemini_endpoint,
        &CONFIG.gemini_model,
        CONFIG.gemini_api_key.clone(),
        CONFIG.request_timeout(),
    )
    .map_err(io::Error::other)?;
    let backends = Backends {
        gateway: Arc::new(gateway),
        grader: Arc::new(grader),
    };

    let (session_server, session_handle) = SessionServer::new(backends, CONFIG.session_idle());
    tokio::spawn(async move {
        if let Err(e) = session_server.run().await {
            log::error!("会话服务意外退出: {e}");
        }
    });

    let proxy_target = ProxyTarget::new(&CONFIG.script_url, CONFIG.request_timeout()).map_err(io::Error::other)?;

    log::info!("HTTP服务监听于{}", CONFIG.bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(session_handle.clone()))
            .app_data(web::Data::new(proxy_target.clone()))
            .configure(service::configure)
    })
    .bind(&CONFIG.bind_address)?
    .run()
    .await
}
