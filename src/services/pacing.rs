//! 随机节奏控制
//!
//! 每次点击类操作之后停顿一个随机时长，模拟人工操作节奏。

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use crate::config::Delays;

#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
}

impl Pacer {
    /// 区间已在配置加载时校验，这里只做截断
    pub fn new(delays: &Delays) -> Self {
        let min_ms = delays.min.max(0) as u64;
        let max_ms = (delays.max.max(0) as u64).max(min_ms);
        Self { min_ms, max_ms }
    }

    /// 在 `[min, max]` 内均匀取一个时长
    pub fn sample(&self) -> Duration {
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    pub async fn pause(&self) {
        sleep(self.sample()).await;
    }
}
