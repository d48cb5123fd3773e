use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

pub const CONFIG_FILE: &str = "config.toml";
// 未配置时使用的表格脚本地址
pub const FALLBACK_SCRIPT_URL: &str = "https://script.google.com/macros/s/AKfycbyC2AAsGCeKELpypftPvVedfpI9qCmKHJgEsM2hI0oEogqfta9dA22AnQxJUncc8YM5/exec";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bind_address: String,
    /// /proxy转发的目标脚本地址
    pub script_url: String,
    /// 门户自身访问后端时使用的地址，未设置时直接访问脚本
    pub gateway_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_endpoint: String,
    pub request_timeout_secs: u64,
    pub session_idle_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_address: "127.0.0.1:8081".to_string(),
            script_url: FALLBACK_SCRIPT_URL.to_string(),
            gateway_url: None,
            gemini_api_key: None,
            gemini_model: "gemini-3-flash-preview".to_string(),
            gemini_endpoint: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout_secs: 30,
            session_idle_minutes: 180,
        }
    }
}

impl Config {
    /// 先读取配置文件，再用环境变量覆盖
    pub fn load() -> Config {
        let config = match fs::read_to_string(Path::new(CONFIG_FILE)) {
            Ok(text) => Config::from_toml(&text).unwrap_or_else(|e| {
                log::error!("解析{CONFIG_FILE}失败，使用默认配置: {e}");
                Config::default()
            }),
            Err(_) => {
                log::info!("未找到{CONFIG_FILE}，使用默认配置");
                Config::default()
            }
        };
        config.with_overrides(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    pub fn from_toml(text: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("PORTAL_BIND") {
            self.bind_address = bind;
        }
        if let Some(url) = lookup("GAS_URL").or_else(|| lookup("VITE_APP_SCRIPT_URL")) {
            self.script_url = url;
        }
        if let Some(url) = lookup("PORTAL_GATEWAY_URL") {
            self.gateway_url = Some(url);
        }
        if let Some(key) = lookup("API_KEY").or_else(|| lookup("GEMINI_API_KEY")) {
            self.gemini_api_key = Some(key);
        }
        self
    }

    pub fn gateway_url(&self) -> &str {
        self.gateway_url.as_deref().unwrap_or(&self.script_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml("bind_address = \"0.0.0.0:9000\"\nsession_idle_minutes = 5\n").unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.session_idle(), Duration::from_secs(300));
        assert_eq!(config.script_url, FALLBACK_SCRIPT_URL);
        assert_eq!(config.gateway_url(), FALLBACK_SCRIPT_URL);
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("VITE_APP_SCRIPT_URL", "https://example.org/exec"),
            ("GEMINI_API_KEY", "secret"),
        ]);
        let config = Config::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.script_url, "https://example.org/exec");
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.gateway_url(), "https://example.org/exec");
    }

    #[test]
    fn gas_url_wins_over_vite_variable() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GAS_URL", "https://a.example/exec"),
            ("VITE_APP_SCRIPT_URL", "https://b.example/exec"),
        ]);
        let config = Config::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.script_url, "https://a.example/exec");
    }
}
