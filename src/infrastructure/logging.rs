use std::io;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::infrastructure::error::WidgetError;

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: &str) -> Result<Self, WidgetError> {
        self.level = Level::from_str(level)
            .map_err(|_| WidgetError::config(format!("unknown log level: {}", level)))?;
        Ok(self)
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Log to `path` instead of stderr when a path is given.
    pub fn with_file(mut self, path: Option<&str>) -> Self {
        if let Some(path) = path {
            self.output = LogOutput::File(path.to_string());
        }
        self
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// 人类可读的格式
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式
    Json,
}

/// 日志输出目标。stdout 留给渲染出的页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// 标准错误
    Stderr,
    /// 文件（追加写入）
    File(String),
}

/// 设置日志系统
pub fn setup_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(format!("form_widgets={}", config.level).parse()?);

    match &config.output {
        LogOutput::Stderr => {
            let layer = create_fmt_layer(config.format, io::stderr);
            tracing_subscriber::registry().with(layer.with_filter(env_filter)).try_init()?;
        }
        LogOutput::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let layer = create_fmt_layer(config.format, std::sync::Mutex::new(file));
            tracing_subscriber::registry().with(layer.with_filter(env_filter)).try_init()?;
        }
    }

    Ok(())
}

fn create_fmt_layer<W>(
    format: LogFormat,
    make_writer: W,
) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(make_writer)
        .with_target(true)
        .with_level(true);

    match format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}
