use std::mem;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::book_selection::BookSelection;
use crate::countdown::Countdown;
use crate::dashboard::{Dashboard, DashboardView};
use crate::error::{GatewayError, PortalError};
use crate::essay::{EssayEditor, EssayOutcome};
use crate::profile::ProfileView;
use crate::quiz::{Advance, QuestionToken, QuizResult, QuizRunner};
use crate::r#struct::alias::{QuestionId, SessionId};
use crate::r#struct::book::Book;
use crate::r#struct::participant::{BookSlot, Identity, Participant, Registrant};
use crate::r#struct::request::DashboardQuery;
use crate::r#struct::respond::{SessionView, StepView};
use crate::r#struct::submit::SubmitResult;
use crate::registration;
use crate::traits::Backends;

pub const SAVE_ERROR: &str = "تعذر حفظ النتائج، يرجى المحاولة لاحقاً.";
pub const ADMIN_LOGIN_ERROR: &str = "بيانات الدخول غير صحيحة";
pub const ADMIN_CONNECTION_ERROR: &str = "فشل الاتصال بالنظام";

pub type SharedSession = Arc<Mutex<Session>>;

/// 会话所处的步骤，每个步骤只携带该步骤有效的数据
#[derive(Debug)]
pub enum Step {
    Register,
    SelectBooks {
        registrant: Registrant,
        selection: BookSelection,
    },
    Quiz {
        participant: Participant,
        slot: BookSlot,
        runner: QuizRunner,
    },
    Essay {
        participant: Participant,
        slot: BookSlot,
        editor: EssayEditor,
    },
    // 成绩正在提交，结果返回前不接受任何操作
    Saving {
        participant: Participant,
    },
    Completed {
        participant: Participant,
    },
    AdminLogin,
    AdminDashboard {
        dashboard: Dashboard,
    },
    // 成绩保存失败，只能重新开始会话
    Fatal {
        message: String,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Register => "REGISTER",
            Step::SelectBooks { .. } => "SELECT_BOOKS",
            Step::Quiz { slot: BookSlot::First, .. } => "QUIZ_1",
            Step::Quiz { slot: BookSlot::Second, .. } => "QUIZ_2",
            Step::Essay { slot: BookSlot::First, .. } => "ESSAY_1",
            Step::Essay { slot: BookSlot::Second, .. } => "ESSAY_2",
            Step::Saving { .. } => "SAVING",
            Step::Completed { .. } => "COMPLETED",
            Step::AdminLogin => "ADMIN_LOGIN",
            Step::AdminDashboard { .. } => "ADMIN_DASHBOARD",
            Step::Fatal { .. } => "FATAL",
        }
    }

    pub fn is_exam(&self) -> bool {
        matches!(self, Step::Quiz { .. } | Step::Essay { .. })
    }
}

/// 单个访客的参赛流程控制器，独占并顺序修改参赛者记录
pub struct Session {
    id: SessionId,
    step: Step,
    backends: Backends,
    // 倒计时回调通过弱引用找回会话，会话被丢弃后回调自然失效
    this: Weak<Mutex<Session>>,
    last_seen: Instant,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("step", &self.step.name())
            .finish()
    }
}

type SaveOutcome = Option<Result<bool, GatewayError>>;

/// 正在进行的成绩提交，请求被取消时由后台任务把结果写回会话
struct PendingSave {
    task: Option<JoinHandle<Result<bool, GatewayError>>>,
    this: Weak<Mutex<Session>>,
}

impl PendingSave {
    async fn wait(mut self) -> SaveOutcome {
        let task = self.task.as_mut()?;
        let outcome = task.await.ok();
        self.task = None;
        outcome
    }
}

impl Drop for PendingSave {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let this = self.this.clone();
            tokio::spawn(async move {
                let outcome = task.await.ok();
                if let Some(session) = this.upgrade() {
                    let mut session = session.lock().await;
                    log::warn!("会话{}的保存请求已取消，后台写回保存结果", session.id);
                    let _ = session.finish_save(outcome);
                }
            });
        }
    }
}

fn start_countdown(this: Weak<Mutex<Session>>, token: QuestionToken, deadline: Instant) -> Countdown {
    Countdown::start(deadline, async move {
        if let Some(session) = this.upgrade() {
            session.lock().await.expire_question(token);
        }
    })
}

impl Session {
    pub fn spawn(id: SessionId, backends: Backends) -> SharedSession {
        Arc::new_cyclic(|this| {
            Mutex::new(Session {
                id,
                step: Step::Register,
                backends,
                this: this.clone(),
                last_seen: Instant::now(),
            })
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    fn transition(&mut self, next: Step) {
        log::info!("会话{}进入步骤{}", self.id, next.name());
        if next.is_exam() {
            log::info!("会话{}处于考试中，客户端应拦截离开页面", self.id);
        }
        self.step = next;
    }

    // 当前步骤不支持该操作时的错误，致命状态下始终提示刷新
    fn step_error(&self) -> PortalError {
        match &self.step {
            Step::Fatal { message } => PortalError::Fatal(message.clone()),
            _ => PortalError::InvalidStep,
        }
    }

    pub fn register(&mut self, identity: Identity) -> Result<(), PortalError> {
        if !matches!(self.step, Step::Register) {
            return Err(self.step_error());
        }
        let registrant = registration::register(identity)?;
        self.transition(Step::SelectBooks {
            registrant,
            selection: BookSelection::default(),
        });
        Ok(())
    }

    pub fn open_admin_login(&mut self) -> Result<(), PortalError> {
        if !matches!(self.step, Step::Register) {
            return Err(self.step_error());
        }
        self.transition(Step::AdminLogin);
        Ok(())
    }

    pub fn toggle_book(&mut self, book: Book) -> Result<(), PortalError> {
        match &mut self.step {
            Step::SelectBooks { selection, .. } => {
                selection.toggle(book);
                Ok(())
            }
            _ => Err(self.step_error()),
        }
    }

    /// 返回报名页，已填写的报名信息作废
    pub fn back_to_register(&mut self) -> Result<(), PortalError> {
        if !matches!(self.step, Step::SelectBooks { .. }) {
            return Err(self.step_error());
        }
        self.transition(Step::Register);
        Ok(())
    }

    pub async fn confirm_books(&mut self) -> Result<(), PortalError> {
        let books = match &self.step {
            Step::SelectBooks { selection, .. } => selection.confirm()?,
            _ => return Err(self.step_error()),
        };
        match mem::replace(&mut self.step, Step::Register) {
            Step::SelectBooks { registrant, .. } => {
                let participant = Participant::new(registrant, books);
                self.enter_quiz(participant, BookSlot::First).await;
                Ok(())
            }
            other => {
                self.step = other;
                Err(self.step_error())
            }
        }
    }

    async fn enter_quiz(&mut self, participant: Participant, slot: BookSlot) {
        let runner = QuizRunner::new(participant.book(slot));
        self.transition(Step::Quiz { participant, slot, runner });
        self.load_quiz().await;
    }

    async fn load_quiz(&mut self) {
        let gateway = self.backends.gateway.clone();
        let this = self.this.clone();
        if let Step::Quiz { runner, .. } = &mut self.step {
            if let Some((token, deadline)) = runner.load(gateway.as_ref()).await {
                runner.arm(start_countdown(this, token, deadline));
            }
        }
    }

    /// 题目读取失败后由用户手动重试
    pub async fn retry_quiz(&mut self) -> Result<(), PortalError> {
        match &self.step {
            Step::Quiz { runner, .. } if !runner.is_running() => {}
            _ => return Err(self.step_error()),
        }
        self.load_quiz().await;
        Ok(())
    }

    pub fn answer(&mut self, question_id: Option<QuestionId>, option: usize) -> Result<(), PortalError> {
        let advance = match &mut self.step {
            Step::Quiz { runner, .. } => runner.answer(question_id, option, Instant::now())?,
            _ => return Err(self.step_error()),
        };
        self.apply_advance(advance);
        Ok(())
    }

    /// 倒计时到期的回调，过期的token会被忽略
    pub fn expire_question(&mut self, token: QuestionToken) {
        let advance = match &mut self.step {
            Step::Quiz { runner, .. } => runner.expire(token, Instant::now()),
            _ => return,
        };
        if advance != Advance::Ignored {
            log::info!("会话{}第{}题超时", self.id, token.index + 1);
        }
        self.apply_advance(advance);
    }

    fn apply_advance(&mut self, advance: Advance) {
        match advance {
            Advance::Ignored => {}
            Advance::Next { token, deadline } => {
                let countdown = start_countdown(self.this.clone(), token, deadline);
                if let Step::Quiz { runner, .. } = &mut self.step {
                    runner.arm(countdown);
                }
            }
            Advance::Finished(result) => self.finish_quiz(result),
        }
    }

    fn finish_quiz(&mut self, result: QuizResult) {
        match mem::replace(&mut self.step, Step::Register) {
            Step::Quiz { mut participant, slot, .. } => {
                log::info!("会话{}完成《{}》选择题，得分{}", self.id, participant.book(slot), result.score);
                participant.record_quiz(slot, result.answers, result.score);
                let editor = EssayEditor::new(participant.book(slot));
                self.transition(Step::Essay { participant, slot, editor });
            }
            other => self.step = other,
        }
    }

    pub async fn submit_essay(&mut self, essay: String) -> Result<(), PortalError> {
        let grader = self.backends.grader.clone();
        let outcome = match &mut self.step {
            Step::Essay { editor, .. } => editor.submit(essay, grader.as_ref()).await?,
            _ => return Err(self.step_error()),
        };
        self.finish_essay(outcome).await
    }

    pub async fn skip_essay(&mut self, essay: String) -> Result<(), PortalError> {
        let outcome = match &mut self.step {
            Step::Essay { editor, .. } => editor.skip(essay),
            _ => return Err(self.step_error()),
        };
        self.finish_essay(outcome).await
    }

    async fn finish_essay(&mut self, outcome: EssayOutcome) -> Result<(), PortalError> {
        match mem::replace(&mut self.step, Step::Register) {
            Step::Essay { mut participant, slot, .. } => {
                participant.record_essay(slot, outcome.essay, outcome.score, outcome.feedback);
                match slot.next() {
                    Some(next) => {
                        self.enter_quiz(participant, next).await;
                        Ok(())
                    }
                    None => {
                        participant.complete();
                        self.save(participant).await
                    }
                }
            }
            other => {
                self.step = other;
                Err(self.step_error())
            }
        }
    }

    // 只在最后一篇作文结束后保存一次，失败不重试
    async fn save(&mut self, participant: Participant) -> Result<(), PortalError> {
        let payload = SubmitResult::from(&participant);
        self.transition(Step::Saving { participant });
        let gateway = self.backends.gateway.clone();
        let pending = PendingSave {
            task: Some(tokio::spawn(async move { gateway.submit_result(&payload).await })),
            this: self.this.clone(),
        };
        let outcome = pending.wait().await;
        self.finish_save(outcome)
    }

    fn finish_save(&mut self, outcome: SaveOutcome) -> Result<(), PortalError> {
        let participant = match mem::replace(&mut self.step, Step::Register) {
            Step::Saving { participant } => participant,
            other => {
                self.step = other;
                return Err(self.step_error());
            }
        };
        match outcome {
            Some(Ok(true)) => {
                log::info!("会话{}成绩已保存，总分{}", self.id, participant.total_score);
                self.transition(Step::Completed { participant });
                return Ok(());
            }
            Some(Ok(false)) => log::error!("会话{}保存成绩被后端拒绝", self.id),
            Some(Err(e)) => log::error!("会话{}保存成绩失败: {e}", self.id),
            None => log::error!("会话{}保存任务异常退出", self.id),
        }
        self.transition(Step::Fatal { message: SAVE_ERROR.to_string() });
        Err(PortalError::Fatal(SAVE_ERROR.to_string()))
    }

    pub async fn admin_login(&mut self, user: &str, pass: &str) -> Result<(), PortalError> {
        if !matches!(self.step, Step::AdminLogin) {
            return Err(self.step_error());
        }
        let gateway = self.backends.gateway.clone();
        match gateway.admin_login(user, pass).await {
            Ok(true) => {
                log::info!("会话{}管理员登录成功", self.id);
                let dashboard = Dashboard::load(gateway.as_ref()).await;
                self.transition(Step::AdminDashboard { dashboard });
                Ok(())
            }
            Ok(false) => {
                log::warn!("会话{}管理员登录失败", self.id);
                Err(PortalError::Unauthorized(ADMIN_LOGIN_ERROR.to_string()))
            }
            Err(e) => {
                log::error!("管理员登录请求失败: {e}");
                Err(PortalError::Retryable(ADMIN_CONNECTION_ERROR.to_string()))
            }
        }
    }

    pub async fn refresh_dashboard(&mut self) -> Result<(), PortalError> {
        let gateway = self.backends.gateway.clone();
        match &mut self.step {
            Step::AdminDashboard { dashboard } => {
                dashboard.refresh(gateway.as_ref()).await;
                Ok(())
            }
            _ => Err(self.step_error()),
        }
    }

    pub fn select_participant(&mut self, id: &str) -> Result<(), PortalError> {
        match &mut self.step {
            Step::AdminDashboard { dashboard } => dashboard.select(id),
            _ => Err(self.step_error()),
        }
    }

    pub fn dashboard(&self, query: &DashboardQuery) -> Result<DashboardView, PortalError> {
        match &self.step {
            Step::AdminDashboard { dashboard } => Ok(dashboard.view(query)),
            _ => Err(self.step_error()),
        }
    }

    pub fn profile(&self) -> Result<ProfileView, PortalError> {
        match &self.step {
            Step::Completed { participant } => Ok(ProfileView::public(participant)),
            _ => Err(self.step_error()),
        }
    }

    pub fn view(&self) -> SessionView {
        let now = Instant::now();
        let step = match &self.step {
            Step::Register => StepView::Register,
            Step::SelectBooks { selection, .. } => StepView::SelectBooks {
                selected: selection.selected().to_vec(),
                can_confirm: selection.can_confirm(),
            },
            Step::Quiz { slot, runner, .. } => StepView::Quiz {
                book_number: slot.index() + 1,
                book: runner.book(),
                quiz: runner.view(now),
            },
            Step::Essay { slot, editor, .. } => StepView::Essay {
                book_number: slot.index() + 1,
                book: editor.book(),
                error: editor.error().map(str::to_string),
            },
            Step::Saving { .. } => StepView::Saving,
            Step::Completed { participant } => StepView::Completed {
                profile: ProfileView::public(participant),
            },
            Step::AdminLogin => StepView::AdminLogin,
            Step::AdminDashboard { dashboard } => StepView::AdminDashboard {
                dashboard: dashboard.view(&DashboardQuery::default()),
            },
            Step::Fatal { message } => StepView::Fatal { message: message.clone() },
        };
        SessionView {
            session_id: self.id.clone(),
            exam_in_progress: self.step.is_exam(),
            step,
        }
    }
}
