use std::future::Future;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// 可取消的倒计时，句柄被丢弃时计时任务随之取消
#[derive(Debug)]
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// 到达deadline后执行on_expire
    pub fn start<F>(deadline: Instant, on_expire: F) -> Countdown
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            time::sleep_until(deadline).await;
            on_expire.await;
        });
        Countdown { handle }
    }

    /// 立即取消，计时任务不会再执行on_expire
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
