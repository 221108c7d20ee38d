//! 登录态持久化
//!
//! 文件格式与 Playwright 的 `storage_state.json` 一致：
//!
//! ```json
//! {
//!   "cookies": [{ "name": "...", "value": "...", "domain": "...", "path": "/", "expires": -1,
//!                 "httpOnly": true, "secure": false, "sameSite": "Lax" }],
//!   "origins": [{ "origin": "https://...", "localStorage": [{ "name": "...", "value": "..." }] }]
//! }
//! ```

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::network::{
    Cookie, CookieParam, CookieSameSite, TimeSinceEpoch,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::browser_protocol::storage::GetCookiesParams;
use chromiumoxide::Page;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BrowserError, BrowserResult, FileError};

/// 读取当前页面 localStorage 的脚本
const READ_LOCAL_STORAGE: &str = r#"(() => {
  const items = [];
  try {
    for (let i = 0; i < localStorage.length; i++) {
      const name = localStorage.key(i);
      items.push({ name, value: localStorage.getItem(name) || '' });
    }
  } catch (e) {}
  return { origin: location.origin, localStorage: items };
})()"#;

/// 标记某个源在当前标签页里已经写过 localStorage
const SEEDED_MARKER: &str = "__pj_storage_seeded__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
    #[serde(default)]
    pub origins: Vec<OriginState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// 过期时间（秒），-1 表示会话 cookie
    #[serde(default = "session_expiry")]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: SameSite,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginState {
    pub origin: String,
    #[serde(rename = "localStorage", default)]
    pub local_storage: Vec<NameValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

fn default_path() -> String {
    "/".to_string()
}

fn session_expiry() -> f64 {
    -1.0
}

impl From<&Cookie> for StoredCookie {
    fn from(cookie: &Cookie) -> Self {
        let same_site = match cookie.same_site {
            Some(CookieSameSite::Strict) => SameSite::Strict,
            Some(CookieSameSite::None) => SameSite::None,
            _ => SameSite::Lax,
        };
        Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
            expires: if cookie.session { -1.0 } else { cookie.expires },
            http_only: cookie.http_only,
            secure: cookie.secure,
            same_site,
        }
    }
}

impl StoredCookie {
    fn to_param(&self) -> BrowserResult<CookieParam> {
        let same_site = match self.same_site {
            SameSite::Strict => CookieSameSite::Strict,
            SameSite::Lax => CookieSameSite::Lax,
            SameSite::None => CookieSameSite::None,
        };
        let mut builder = CookieParam::builder()
            .name(self.name.clone())
            .value(self.value.clone())
            .domain(self.domain.clone())
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(same_site);
        if self.expires > 0.0 {
            builder = builder.expires(TimeSinceEpoch::new(self.expires));
        }
        builder
            .build()
            .map_err(|message| BrowserError::ScriptFailed { message })
    }
}

impl StorageState {
    /// 从文件读取登录态
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| FileError::InvalidStorageState {
            path: path.display().to_string(),
            source,
        })
    }

    /// 写入文件，必要时创建父目录
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FileError> {
        let path = path.as_ref();
        let write_failed = |source| FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            FileError::InvalidStorageState {
                path: path.display().to_string(),
                source,
            }
        })?;
        std::fs::write(path, json).map_err(write_failed)
    }

    /// 读取浏览器里所有域的 cookie 和当前源的 localStorage
    ///
    /// 登录会经过统一认证等其他域名，只取当前页面 URL 的 cookie 会丢掉它们。
    pub async fn capture(page: &Page) -> BrowserResult<Self> {
        let all = page.execute(GetCookiesParams::default()).await?;
        let cookies = stored_cookies(&all.result.cookies);

        let origin: OriginState = page.evaluate(READ_LOCAL_STORAGE).await?.into_value()?;
        let origins = if origin.local_storage.is_empty() || origin.origin == "null" {
            Vec::new()
        } else {
            vec![origin]
        };

        info!(
            "✓ 已读取登录态: {} 个 cookie, {} 个源的 localStorage",
            cookies.len(),
            origins.len()
        );
        Ok(Self { cookies, origins })
    }

    /// 恢复到页面：cookie 立即写入，localStorage 在当前标签页第一次打开对应源的文档时写入
    pub async fn apply(&self, page: &Page) -> BrowserResult<()> {
        if !self.cookies.is_empty() {
            let params = self
                .cookies
                .iter()
                .map(StoredCookie::to_param)
                .collect::<BrowserResult<Vec<_>>>()?;
            page.set_cookies(params).await?;
            debug!("已写入 {} 个 cookie", self.cookies.len());
        }

        if !self.origins.is_empty() {
            let script = self.local_storage_script()?;
            page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(script))
                .await?;
            debug!("已注册 {} 个源的 localStorage", self.origins.len());
        }
        Ok(())
    }

    /// 每个源只写一次，之后页面自己更新的值不会被覆盖
    fn local_storage_script(&self) -> BrowserResult<String> {
        let data = serde_json::to_string(&self.origins)?;
        let marker = serde_json::to_string(SEEDED_MARKER)?;
        Ok(format!(
            r#"(() => {{
  const origins = {data};
  const marker = {marker};
  for (const o of origins) {{
    if (o.origin !== location.origin) continue;
    try {{
      if (sessionStorage.getItem(marker)) return;
      for (const item of o.localStorage) localStorage.setItem(item.name, item.value);
      sessionStorage.setItem(marker, '1');
    }} catch (e) {{}}
  }}
}})()"#
        ))
    }
}

/// 转换浏览器返回的 cookie，按域名、路径、名称排序，同一键只保留第一个
fn stored_cookies(cookies: &[Cookie]) -> Vec<StoredCookie> {
    let mut stored: Vec<StoredCookie> = cookies.iter().map(Into::into).collect();
    stored.sort_by(|a, b| {
        (a.domain.as_str(), a.path.as_str(), a.name.as_str())
            .cmp(&(b.domain.as_str(), b.path.as_str(), b.name.as_str()))
    });
    stored.dedup_by(|a, b| a.domain == b.domain && a.path == b.path && a.name == b.name);
    stored
}
