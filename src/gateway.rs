use std::time::Duration;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::GatewayError;
use crate::r#struct::book::Book;
use crate::r#struct::participant::ParticipantSummary;
use crate::r#struct::question::{Question, QuestionRow};
use crate::r#struct::submit::{SubmitResult, SuccessResponse};
use crate::traits::gateway::DataGateway;

/// 通过动作分发的方式访问表格脚本后端
pub struct RemoteGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl RemoteGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(RemoteGateway { client, base_url })
    }

    // GET请求，动作和参数编码在查询字符串中
    async fn get_action(&self, action: &str, params: &[(&str, &str)]) -> Result<Value, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("action", action);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        log::info!("向后端发送GET请求: {action}");
        let response = self.client.get(url).send().await?;
        read_json(response, action).await
    }

    // POST请求，动作和数据一起放在JSON中
    async fn post_action<T: Serialize>(&self, action: &str, payload: &T) -> Result<Value, GatewayError> {
        let mut body = serde_json::to_value(payload).map_err(|e| GatewayError::Malformed(e.to_string()))?;
        match body.as_object_mut() {
            Some(object) => {
                object.insert("action".to_string(), Value::String(action.to_string()));
            }
            None => return Err(GatewayError::Malformed("请求内容必须是JSON对象".to_string())),
        }
        log::info!("向后端发送POST请求: {action}");
        let response = self.client.post(self.base_url.clone()).json(&body).send().await?;
        read_json(response, action).await
    }
}

async fn read_json(response: reqwest::Response, action: &str) -> Result<Value, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        log::error!("后端动作{action}返回错误状态码: {status}");
        return Err(GatewayError::Status(status));
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        log::error!("后端动作{action}返回的内容不是合法JSON: {e}");
        GatewayError::Malformed(e.to_string())
    })
}

/// 把getQuestions的结果转换为题目列表，非数组视为格式错误
pub fn parse_questions(book: Book, value: Value) -> Result<Vec<Question>, GatewayError> {
    let rows: Vec<QuestionRow> =
        serde_json::from_value(value).map_err(|e| GatewayError::Malformed(e.to_string()))?;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.into_question(i as u32 + 1, book))
        .collect())
}

fn parse_success(value: Value) -> Result<bool, GatewayError> {
    let response: SuccessResponse =
        serde_json::from_value(value).map_err(|e| GatewayError::Malformed(e.to_string()))?;
    Ok(response.success)
}

impl DataGateway for RemoteGateway {
    fn get_questions(&self, book: Book) -> BoxFuture<'_, Result<Vec<Question>, GatewayError>> {
        Box::pin(async move {
            let value = self.get_action("getQuestions", &[("tab", book.tab())]).await?;
            parse_questions(book, value)
        })
    }

    fn submit_result<'a>(&'a self, result: &'a SubmitResult) -> BoxFuture<'a, Result<bool, GatewayError>> {
        Box::pin(async move {
            let value = self.post_action("submitResult", result).await?;
            parse_success(value)
        })
    }

    fn admin_login<'a>(&'a self, user: &'a str, pass: &'a str) -> BoxFuture<'a, Result<bool, GatewayError>> {
        Box::pin(async move {
            let value = self.get_action("adminLogin", &[("user", user), ("pass", pass)]).await?;
            parse_success(value)
        })
    }

    fn get_participants(&self) -> BoxFuture<'_, Result<Vec<ParticipantSummary>, GatewayError>> {
        Box::pin(async move {
            let value = self.get_action("getParticipants", &[]).await?;
            serde_json::from_value(value).map_err(|e| GatewayError::Malformed(e.to_string()))
        })
    }
}
