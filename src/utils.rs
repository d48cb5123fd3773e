use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::r#struct::book::Book;
use crate::r#struct::participant::{BookScore, Status};

// 当前时间的RFC 3339字符串，用作报名时间
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|e| {
            log::error!("格式化时间失败: {e}");
            String::new()
        })
}

// 表格后端返回的数字和字符串经常混用，统一转换为字符串
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

// 数字或数字字符串转换为f64，无法识别时返回None
pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).unwrap_or(0.0))
}

// 状态单元格为空或无法识别时视为未完成
pub fn lenient_status<'de, D>(deserializer: D) -> Result<Status, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value_to_string(&value).trim().to_lowercase().as_str() {
        "completed" => Ok(Status::Completed),
        _ => Ok(Status::Pending),
    }
}

// 书目列表中无法识别的标题直接丢弃
pub fn lenient_books<'de, D>(deserializer: D) -> Result<Vec<Book>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| {
            let label = value_to_string(item);
            let book = Book::parse(&label);
            if book.is_none() {
                log::warn!("忽略无法识别的书目: {label}");
            }
            book
        })
        .collect())
}

// 成绩表中书目无法识别或内容损坏的条目直接丢弃
pub fn lenient_scores<'de, D>(deserializer: D) -> Result<BTreeMap<Book, BookScore>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(label, score)| {
            let Some(book) = Book::parse(&label) else {
                log::warn!("忽略无法识别书目的成绩: {label}");
                return None;
            };
            match BookScore::deserialize(score) {
                Ok(score) => Some((book, score)),
                Err(e) => {
                    log::warn!("忽略书目{book}的损坏成绩: {e}");
                    None
                }
            }
        })
        .collect())
}
