use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 评教流程错误
    #[error("流程错误: {0}")]
    Flow(#[from] FlowError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 浏览器相关错误
///
/// `ActionTimeout` 是唯一会被点击重试阶梯吸收的变体，其余全部向上传播。
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {message}")]
    LaunchFailed { message: String },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 页面脚本执行失败
    #[error("执行脚本失败: {message}")]
    ScriptFailed { message: String },
    /// 目标元素不存在或已从文档中移除
    #[error("元素不存在或已从文档移除: {target}")]
    ElementDetached { target: String },
    /// 操作在限定时间内未能完成
    #[error("{action} 超时 ({timeout_ms}ms): {target}")]
    ActionTimeout {
        action: String,
        target: String,
        timeout_ms: u64,
    },
    /// 底层 CDP 错误
    #[error("CDP 错误: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
    /// 脚本返回值无法解析
    #[error("脚本返回值解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BrowserError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::ActionTimeout { .. })
    }

    pub fn timeout(action: impl Into<String>, target: impl ToString, timeout_ms: u64) -> Self {
        BrowserError::ActionTimeout {
            action: action.into(),
            target: target.to_string(),
            timeout_ms,
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 评语模板为空
    #[error("comment_templates 不能为空")]
    EmptyCommentPool,
    /// 延迟区间不合法
    #[error("delays_ms 配置不合法: min={min}, max={max}")]
    InvalidDelays { min: i64, max: i64 },
    /// 正则表达式不合法
    #[error("heuristics.tab_name_pattern 不是合法的正则表达式 ({pattern}): {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// 选择器写法不受支持
    #[error("选择器不合法 ({selector}): {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// 评教流程错误
#[derive(Debug, Error)]
pub enum FlowError {
    /// 等待某个页面状态超时
    #[error("等待{what}超时 (已等待 {waited_ms}ms)")]
    WaitTimeout { what: String, waited_ms: u64 },
    /// 未找到评教弹窗
    #[error("未找到评教弹窗 (selector={selector})")]
    ModalNotFound { selector: String },
    /// 等待手动提交超时
    #[error("等待手动提交超时 (已等待 {waited_s}s)")]
    ManualSubmitTimeout { waited_s: u64 },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 登录态文件格式错误
    #[error("登录态文件格式错误 ({path}): {source}")]
    InvalidStorageState {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 浏览器操作结果类型
pub type BrowserResult<T> = Result<T, BrowserError>;
