use futures::future::BoxFuture;

use crate::error::GradingError;
use crate::r#struct::book::Book;

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: f64,
    pub feedback: String,
}

pub trait EssayGrader: Send + Sync {
    /// 对作文打分，分数范围0到50
    fn grade<'a>(&'a self, book: Book, essay: &'a str) -> BoxFuture<'a, Result<Evaluation, GradingError>>;
}
