//! 运行会话
//!
//! 把一次运行所需的东西打包在一起，沿流程向下传递：页面能力、配置、节奏控制、
//! 编译好的启发式规则。不使用任何全局状态。

use crate::config::AppConfig;
use crate::error::{BrowserResult, ConfigError};
use crate::infrastructure::{Dom, Locator};
use crate::services::{interaction, Pacer, TabRules};

pub struct Session<'a, D: Dom> {
    pub dom: &'a D,
    pub config: &'a AppConfig,
    pub pacer: Pacer,
    pub tab_rules: TabRules,
}

impl<'a, D: Dom> Session<'a, D> {
    pub fn new(dom: &'a D, config: &'a AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            dom,
            config,
            pacer: Pacer::new(&config.delays_ms),
            tab_rules: TabRules::from_heuristics(&config.heuristics)?,
        })
    }

    /// 按重试阶梯点击，之后随机停顿
    pub async fn click(&self, target: &Locator) -> BrowserResult<()> {
        interaction::click(self.dom, target).await?;
        self.pacer.pause().await;
        Ok(())
    }

    pub async fn pause(&self) {
        self.pacer.pause().await;
    }
}
