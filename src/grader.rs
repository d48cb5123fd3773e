use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::{json, Value};

use crate::error::GradingError;
use crate::r#struct::book::Book;
use crate::traits::grader::{EssayGrader, Evaluation};
use crate::utils::value_to_f64;

/// 少于这个字数的作文不请求AI接口
pub const GRADER_MIN_CHARS: usize = 20;
pub const ESSAY_MAX_SCORE: f64 = 50.0;
pub const TOO_SHORT_FEEDBACK: &str = "المقال قصير جداً للتقييم الموضوعي.";
pub const MISSING_FEEDBACK: &str = "لم يتم توفير تقييم مفصل.";

/// 基于Gemini generateContent接口的作文评分
pub struct GeminiGrader {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGrader {
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, GradingError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(GeminiGrader {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn evaluate(&self, book: Book, essay: &str) -> Result<Evaluation, GradingError> {
        if let Some(evaluation) = short_circuit(essay) {
            return Ok(evaluation);
        }
        let api_key = self.api_key.as_deref().ok_or(GradingError::MissingCredential)?;

        log::info!("请求AI评分，书目: {book}，字数: {}", essay.chars().count());
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request_body(book, essay))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GradingError::Status(status));
        }
        let body: Value = response.json().await?;
        parse_response(&body)
    }
}

// 过短的作文直接给0分
pub fn short_circuit(essay: &str) -> Option<Evaluation> {
    if essay.trim().chars().count() < GRADER_MIN_CHARS {
        Some(Evaluation {
            score: 0.0,
            feedback: TOO_SHORT_FEEDBACK.to_string(),
        })
    } else {
        None
    }
}

fn request_body(book: Book, essay: &str) -> Value {
    let system_prompt = format!(
        "أنت مقيم أدبي محترف في مبادرة \"حياة كريمة\".\n\
         مهمتك هي تقييم ملخص أو رسالة كتبها مشارك عن كتاب \"{book}\".\n\
         يجب أن تعطي درجة من 50 بناءً على (الفهم، الأسلوب، عمق التحليل).\n\
         ويجب أن تقدم ملاحظات نوعية (AI Notes) للمشارك.\n\
         الرد يجب أن يكون بتنسيق JSON حصراً."
    );
    json!({
        "systemInstruction": {"parts": [{"text": system_prompt}]},
        "contents": [{"role": "user", "parts": [{"text": format!("قم بتقييم النص التالي: \"{essay}\"")}]}],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "score": {"type": "NUMBER", "description": "الدرجة المستحقة من 50"},
                    "feedback": {"type": "STRING", "description": "ملاحظات الذكاء الاصطناعي النوعية"}
                },
                "required": ["score", "feedback"]
            }
        }
    })
}

/// 从generateContent的响应中取出评分结果
pub fn parse_response(body: &Value) -> Result<Evaluation, GradingError> {
    let text = body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| GradingError::Malformed("响应中没有文本内容".to_string()))?;
    let result: Value = serde_json::from_str(text).map_err(|e| GradingError::Malformed(e.to_string()))?;

    let score = value_to_f64(&result["score"])
        .filter(|s| s.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, ESSAY_MAX_SCORE);
    let feedback = result["feedback"]
        .as_str()
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(MISSING_FEEDBACK)
        .to_string();
    Ok(Evaluation { score, feedback })
}

impl EssayGrader for GeminiGrader {
    fn grade<'a>(&'a self, book: Book, essay: &'a str) -> BoxFuture<'a, Result<Evaluation, GradingError>> {
        Box::pin(async move {
            self.evaluate(book, essay).await.map_err(|e| {
                log::error!("AI评分失败: {e}");
                e
            })
        })
    }
}
