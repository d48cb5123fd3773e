use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::countdown::Countdown;
use crate::error::PortalError;
use crate::r#struct::alias::QuestionId;
use crate::r#struct::book::{Book, QUIZ_TIMER_SECONDS};
use crate::r#struct::question::Question;
use crate::traits::gateway::DataGateway;

/// 切换题目时的锁定时间，期间的作答会被忽略
pub const TRANSITION_LOCK: Duration = Duration::from_millis(400);
pub const QUESTION_TIME: Duration = Duration::from_secs(QUIZ_TIMER_SECONDS);

pub const NO_QUESTIONS_ERROR: &str = "لم يتم العثور على أسئلة لهذا الكتاب حالياً في قاعدة البيانات.";
pub const LOAD_ERROR: &str = "فشل في تحميل الأسئلة. يرجى التحقق من اتصال الإنترنت أو المحاولة لاحقاً.";
pub const OPTION_ERROR: &str = "الإجابة المختارة غير موجودة.";

/// 标识某一道正在计时的题目，过期的计时回调凭此识别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionToken {
    pub book: Book,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub answers: BTreeMap<QuestionId, String>,
    pub score: f64,
}

/// 一次作答或超时之后的结果
#[derive(Debug, PartialEq)]
pub enum Advance {
    Ignored,
    Next { token: QuestionToken, deadline: Instant },
    Finished(QuizResult),
}

#[derive(Debug)]
struct ActiveQuiz {
    questions: Vec<Question>,
    index: usize,
    answers: BTreeMap<QuestionId, String>,
    opens_at: Instant,
    deadline: Instant,
}

#[derive(Debug)]
enum RunnerState {
    Loading,
    Failed(String),
    Running(ActiveQuiz),
}

/// 单本书的计时答题
#[derive(Debug)]
pub struct QuizRunner {
    book: Book,
    state: RunnerState,
    // 当前题目的倒计时，任何离开当前题目的路径都会丢弃它
    countdown: Option<Countdown>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizView {
    Loading,
    Failed {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Question {
        question_id: QuestionId,
        number: usize,
        total: usize,
        text: String,
        options: Vec<String>,
        seconds_left: u64,
        transitioning: bool,
    },
}

/// 答案与正确答案完全一致的题目分值之和
pub fn score(questions: &[Question], answers: &BTreeMap<QuestionId, String>) -> f64 {
    questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct_answer))
        .map(|q| q.points)
        .sum()
}

impl QuizRunner {
    pub fn new(book: Book) -> Self {
        QuizRunner {
            book,
            state: RunnerState::Loading,
            countdown: None,
        }
    }

    pub fn book(&self) -> Book {
        self.book
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunnerState::Running(_))
    }

    /// 从后端读取题目并开始第一题，失败时保留错误等待用户重试
    pub async fn load(&mut self, gateway: &dyn DataGateway) -> Option<(QuestionToken, Instant)> {
        self.countdown = None;
        self.state = RunnerState::Loading;
        match gateway.get_questions(self.book).await {
            Ok(questions) => match self.start(questions, Instant::now()) {
                Ok(first) => Some(first),
                Err(message) => {
                    log::warn!("书目{}没有题目", self.book);
                    self.state = RunnerState::Failed(message);
                    None
                }
            },
            Err(e) => {
                log::error!("读取书目{}的题目失败: {e}", self.book);
                self.state = RunnerState::Failed(LOAD_ERROR.to_string());
                None
            }
        }
    }

    pub fn start(&mut self, questions: Vec<Question>, now: Instant) -> Result<(QuestionToken, Instant), String> {
        if questions.is_empty() {
            return Err(NO_QUESTIONS_ERROR.to_string());
        }
        let deadline = now + QUESTION_TIME;
        self.state = RunnerState::Running(ActiveQuiz {
            questions,
            index: 0,
            answers: BTreeMap::new(),
            opens_at: now,
            deadline,
        });
        Ok((QuestionToken { book: self.book, index: 0 }, deadline))
    }

    pub fn arm(&mut self, countdown: Countdown) {
        self.countdown = Some(countdown);
    }

    /// 选择当前题目的一个选项
    pub fn answer(&mut self, question_id: Option<QuestionId>, option: usize, now: Instant) -> Result<Advance, PortalError> {
        let quiz = match &mut self.state {
            RunnerState::Running(quiz) => quiz,
            _ => return Err(PortalError::InvalidStep),
        };
        if now < quiz.opens_at {
            return Ok(Advance::Ignored);
        }
        let current = &quiz.questions[quiz.index];
        if question_id.is_some_and(|id| id != current.id) {
            return Ok(Advance::Ignored);
        }
        if now >= quiz.deadline {
            // 计时回调尚未执行，按超时处理
            return Ok(self.close_question(now));
        }
        let chosen = current
            .options
            .get(option)
            .cloned()
            .ok_or_else(|| PortalError::Validation(OPTION_ERROR.to_string()))?;
        quiz.answers.insert(current.id, chosen);
        Ok(self.close_question(now))
    }

    /// 当前题目超时，不记录答案直接进入下一题
    pub fn expire(&mut self, token: QuestionToken, now: Instant) -> Advance {
        let is_current = matches!(
            &self.state,
            RunnerState::Running(quiz) if token.book == self.book && token.index == quiz.index
        );
        if is_current {
            self.close_question(now)
        } else {
            Advance::Ignored
        }
    }

    fn close_question(&mut self, now: Instant) -> Advance {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
        let book = self.book;
        let quiz = match &mut self.state {
            RunnerState::Running(quiz) => quiz,
            _ => return Advance::Ignored,
        };
        if quiz.index + 1 < quiz.questions.len() {
            quiz.index += 1;
            quiz.opens_at = now + TRANSITION_LOCK;
            quiz.deadline = quiz.opens_at + QUESTION_TIME;
            Advance::Next {
                token: QuestionToken { book, index: quiz.index },
                deadline: quiz.deadline,
            }
        } else {
            let answers = std::mem::take(&mut quiz.answers);
            let score = score(&quiz.questions, &answers);
            self.state = RunnerState::Loading;
            Advance::Finished(QuizResult { answers, score })
        }
    }

    pub fn view(&self, now: Instant) -> QuizView {
        match &self.state {
            RunnerState::Loading => QuizView::Loading,
            RunnerState::Failed(message) => QuizView::Failed { message: message.clone() },
            RunnerState::Running(quiz) => {
                let q = &quiz.questions[quiz.index];
                let transitioning = now < quiz.opens_at;
                let seconds_left = if transitioning {
                    QUIZ_TIMER_SECONDS
                } else {
                    quiz.deadline.saturating_duration_since(now).as_secs_f64().ceil() as u64
                };
                QuizView::Question {
                    question_id: q.id,
                    number: quiz.index + 1,
                    total: quiz.questions.len(),
                    text: q.text.clone(),
                    options: q.options.clone(),
                    seconds_left,
                    transitioning,
                }
            }
        }
    }
}
