use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 组件运行时错误类型
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum WidgetError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("network error: {message}")]
    Network { message: String, url: Option<String> },

    #[error("parse error: {message} ({content_type})")]
    Parsing { message: String, content_type: String },

    #[error("protocol error: {message}")]
    Protocol { message: String },

    #[error("listener on '{channel}' failed: {message}")]
    Listener { channel: String, message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl WidgetError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, WidgetError::Network { .. })
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            WidgetError::Configuration { .. } => ErrorCategory::Configuration,
            WidgetError::Network { .. } => ErrorCategory::Network,
            WidgetError::Parsing { .. } | WidgetError::Protocol { .. } => ErrorCategory::Data,
            WidgetError::Listener { .. } => ErrorCategory::Component,
            WidgetError::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        WidgetError::Configuration {
            message: message.into(),
        }
    }

    /// 创建网络错误
    pub fn network(message: impl Into<String>, url: Option<String>) -> Self {
        WidgetError::Network {
            message: message.into(),
            url,
        }
    }

    /// 创建协议错误
    pub fn protocol(message: impl Into<String>) -> Self {
        WidgetError::Protocol {
            message: message.into(),
        }
    }

    /// 创建监听器错误
    pub fn listener(channel: impl Into<String>, message: impl Into<String>) -> Self {
        WidgetError::Listener {
            channel: channel.into(),
            message: message.into(),
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Component,
    Internal,
}

// 实现从常见错误类型的转换
impl From<std::io::Error> for WidgetError {
    fn from(error: std::io::Error) -> Self {
        WidgetError::Internal {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(error: serde_json::Error) -> Self {
        WidgetError::Parsing {
            message: error.to_string(),
            content_type: "JSON".to_string(),
        }
    }
}

impl From<toml::de::Error> for WidgetError {
    fn from(error: toml::de::Error) -> Self {
        WidgetError::Parsing {
            message: error.to_string(),
            content_type: "TOML".to_string(),
        }
    }
}

impl From<reqwest::Error> for WidgetError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return WidgetError::Parsing {
                message: error.to_string(),
                content_type: "JSON".to_string(),
            };
        }
        WidgetError::Network {
            message: error.to_string(),
            url: error.url().map(|u| u.to_string()),
        }
    }
}

impl From<anyhow::Error> for WidgetError {
    fn from(error: anyhow::Error) -> Self {
        WidgetError::Internal {
            message: error.to_string(),
        }
    }
}
