//! 应用配置.
//!
//! JSON 格式, 所有字段均可省略:
//!
//! ```json
//! {
//!     "logging": { "level": "debug", "directory": "logs" },
//!     "codecs": "PCMU PCMA L16/96/16000 G729"
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use mpf_codec::{CodecDescriptor, CodecManager};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::logging::LoggingConfig;

/// 默认编解码列表
pub const DEFAULT_CODEC_LIST: &str = "PCMU PCMA L16/96/8000";

/// 应用配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MpfConfig {
    /// 日志配置, 缺省时由调用方选择默认值 (mpf-cli 写入 `logs/mpf-cli.{date}.log`)
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
    /// 编解码列表, 格式见 [`CodecManager::load_codec_list`]
    #[serde(default = "default_codecs")]
    pub codecs: String,
}

fn default_codecs() -> String {
    DEFAULT_CODEC_LIST.to_string()
}

impl Default for MpfConfig {
    fn default() -> Self {
        Self {
            logging: None,
            codecs: default_codecs(),
        }
    }
}

impl MpfConfig {
    /// 从 JSON 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败, path={}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("配置文件无效, path={}", path.display()))
    }

    /// 从 JSON 字符串解析
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("解析 JSON 配置失败")
    }

    /// 按配置的编解码列表生成描述符
    pub fn build_codec_list(&self, manager: &CodecManager) -> Result<Vec<CodecDescriptor>> {
        let list = manager
            .load_codec_list(&self.codecs)
            .with_context(|| format!("编解码列表无效: {}", self.codecs))?;
        info!("已加载 {} 个编解码描述符", list.len());
        Ok(list)
    }
}
