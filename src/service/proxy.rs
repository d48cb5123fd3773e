use std::time::Duration;

use actix_web::http::header::{self, HeaderValue};
use actix_web::http::{Method, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use serde_json::json;
use url::Url;

use crate::error::GatewayError;

/// /proxy转发的目标
#[derive(Clone)]
pub struct ProxyTarget {
    client: reqwest::Client,
    script_url: Url,
}

impl ProxyTarget {
    pub fn new(script_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let script_url = Url::parse(script_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ProxyTarget { client, script_url })
    }

    // 保留脚本地址自带的参数，再追加客户端的查询字符串
    fn url_for(&self, query: &str) -> Url {
        let mut url = self.script_url.clone();
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(url::form_urlencoded::parse(query.as_bytes()));
        }
        url
    }
}

fn with_cors(builder: &mut HttpResponseBuilder) -> &mut HttpResponseBuilder {
    builder
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "GET,OPTIONS,PATCH,DELETE,POST,PUT"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
}

pub(crate) async fn preflight() -> HttpResponse {
    with_cors(&mut HttpResponse::Ok()).finish()
}

// 把请求原样转发给表格脚本，并返回脚本的状态码和内容
pub(crate) async fn forward(req: HttpRequest, body: web::Bytes, target: web::Data<ProxyTarget>) -> HttpResponse {
    let url = target.url_for(req.query_string());
    let request = if req.method() == Method::POST {
        target
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_vec())
    } else {
        target.client.get(url)
    };

    let result = match request.send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            response.text().await.map(|text| (status, text))
        }
        Err(e) => Err(e),
    };

    match result {
        Ok((status, text)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            with_cors(&mut HttpResponse::build(status))
                .insert_header((header::CONTENT_TYPE, HeaderValue::from_static("application/json")))
                .body(text)
        }
        Err(e) => {
            log::error!("转发请求到表格脚本失败: {e}");
            with_cors(&mut HttpResponse::InternalServerError()).json(json!({
                "error": "Failed to fetch from Google Apps Script",
                "details": e.to_string(),
            }))
        }
    }
}
