use crate::error::PortalError;
use crate::r#struct::book::Book;
use crate::traits::grader::EssayGrader;

pub const ESSAY_MIN_CHARS: usize = 50;
pub const TOO_SHORT_ERROR: &str = "المقال قصير جداً. يرجى كتابة ٥٠ حرفاً على الأقل لتعبر عن رأيك بشكل وافٍ.";
pub const GRADING_RETRY_ERROR: &str = "حدث خطأ أثناء تقييم المقال. يرجى المحاولة مرة أخرى.";
pub const SKIP_FEEDBACK: &str = "تم تخطي القسم المقالي.";

#[derive(Debug, Clone, PartialEq)]
pub struct EssayOutcome {
    pub essay: String,
    pub score: f64,
    pub feedback: String,
}

/// 单本书的作文环节
#[derive(Debug)]
pub struct EssayEditor {
    book: Book,
    error: Option<String>,
}

pub fn check_length(essay: &str) -> Result<(), PortalError> {
    if essay.trim().chars().count() < ESSAY_MIN_CHARS {
        Err(PortalError::Validation(TOO_SHORT_ERROR.to_string()))
    } else {
        Ok(())
    }
}

impl EssayEditor {
    pub fn new(book: Book) -> Self {
        EssayEditor { book, error: None }
    }

    pub fn book(&self) -> Book {
        self.book
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 字数不足时只返回本地错误，不请求评分
    pub async fn submit(&mut self, essay: String, grader: &dyn EssayGrader) -> Result<EssayOutcome, PortalError> {
        if let Err(e) = check_length(&essay) {
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.error = None;
        match grader.grade(self.book, &essay).await {
            Ok(evaluation) => Ok(EssayOutcome {
                essay,
                score: evaluation.score,
                feedback: evaluation.feedback,
            }),
            Err(e) => {
                log::error!("书目{}的作文评分失败: {e}", self.book);
                self.error = Some(GRADING_RETRY_ERROR.to_string());
                Err(PortalError::Retryable(GRADING_RETRY_ERROR.to_string()))
            }
        }
    }

    /// 跳过作文，记0分
    pub fn skip(&mut self, essay: String) -> EssayOutcome {
        self.error = None;
        EssayOutcome {
            essay,
            score: 0.0,
            feedback: SKIP_FEEDBACK.to_string(),
        }
    }
}
