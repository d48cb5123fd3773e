use std::collections::HashMap;
use std::io;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};

use crate::controller::{Session, SharedSession};
use crate::error::PortalError;
use crate::r#struct::alias::SessionId;
use crate::traits::Backends;

/// 空闲会话的清理周期
const EVICT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
enum Command {
    Create {
        res_tx: oneshot::Sender<SharedSession>,
    },

    Get {
        id: SessionId,
        res_tx: oneshot::Sender<Option<SharedSession>>,
    },
}

pub struct SessionServer {
    /// 会话ID和会话的键值对
    sessions: HashMap<SessionId, SharedSession>,

    /// 新会话使用的后端
    backends: Backends,

    /// 超过该时长没有请求的会话会被清理
    idle: Duration,

    /// 接收命令的管道
    cmd_rx: mpsc::UnboundedReceiver<Command>,
}

impl SessionServer {
    pub fn new(backends: Backends, idle: Duration) -> (SessionServer, SessionServerHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (
            SessionServer {
                sessions: HashMap::new(),
                backends,
                idle,
                cmd_rx,
            },
            SessionServerHandle { cmd_tx },
        )
    }

    fn create(&mut self) -> SharedSession {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Session::spawn(id.clone(), self.backends.clone());
        self.sessions.insert(id.clone(), session.clone());
        log::info!("创建会话{id}，当前共{}个会话", self.sessions.len());
        session
    }

    // 正在处理请求的会话不会被清理
    fn evict_idle(&mut self, now: Instant) {
        let idle = self.idle;
        let expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|(_, session)| {
                session
                    .try_lock()
                    .map(|s| now.saturating_duration_since(s.last_seen()) > idle)
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            self.sessions.remove(&id);
            log::info!("会话{id}长时间无操作，已清理");
        }
    }

    pub async fn run(mut self) -> io::Result<()> {
        let mut interval = time::interval(EVICT_INTERVAL);
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Create { res_tx }) => {
                        let session = self.create();
                        let _ = res_tx.send(session);
                    }

                    Some(Command::Get { id, res_tx }) => {
                        let _ = res_tx.send(self.sessions.get(&id).cloned());
                    }

                    None => break,
                },

                _ = interval.tick() => self.evict_idle(Instant::now()),
            }
        }
        log::info!("会话服务已停止");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SessionServerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl SessionServerHandle {
    async fn request<T>(&self, cmd: Command, res_rx: oneshot::Receiver<T>) -> Result<T, PortalError> {
        if self.cmd_tx.send(cmd).is_err() {
            log::error!("会话服务已停止，无法处理请求");
            return Err(PortalError::Unavailable);
        }
        res_rx.await.map_err(|_| PortalError::Unavailable)
    }

    /// 为新访客创建会话
    pub async fn create(&self) -> Result<SharedSession, PortalError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.request(Command::Create { res_tx }, res_rx).await
    }

    pub async fn get(&self, id: SessionId) -> Result<SharedSession, PortalError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.request(Command::Get { id, res_tx }, res_rx)
            .await?
            .ok_or(PortalError::SessionNotFound)
    }
}
