//! 浏览器获取
//!
//! 按配置启动新浏览器，或连接到已开启远程调试端口的浏览器。

pub mod connection;
pub mod launch;
pub mod storage;

use chromiumoxide::{Browser, Page};

use crate::config::BrowserSettings;
use crate::error::BrowserResult;

pub use connection::connect_to_browser_and_page;
pub use launch::launch_browser;
pub use storage::StorageState;

/// 浏览器的来源，决定结束时是否关闭它
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserOrigin {
    Launched,
    Attached,
}

/// 按配置获取浏览器和页面
pub async fn open_browser(settings: &BrowserSettings) -> BrowserResult<(Browser, Page, BrowserOrigin)> {
    match settings.debug_port {
        Some(port) => {
            let (browser, page) = connect_to_browser_and_page(port).await?;
            Ok((browser, page, BrowserOrigin::Attached))
        }
        None => {
            let (browser, page) = launch_browser(settings).await?;
            Ok((browser, page, BrowserOrigin::Launched))
        }
    }
}
