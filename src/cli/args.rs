use clap::Parser;
use std::path::PathBuf;

use crate::infrastructure::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "form-widgets",
    version,
    about = "Headless login form with a language switcher",
    long_about = "Builds the login page (credential form, submit button and language switchers), \
                  replays the requested interactions and prints the rendered HTML."
)]
pub struct Args {
    /// Initial page language (ru or en)
    #[arg(short, long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Text typed into the login field
    #[arg(long, default_value = "")]
    pub login: String,

    /// Text typed into the password field
    #[arg(long, default_value = "")]
    pub password: String,

    /// Click the switcher button for this language before submitting
    #[arg(short = 's', long = "switch-lang", value_name = "LANG")]
    pub switch_lang: Option<String>,

    /// Submit the form after filling it in
    #[arg(long, default_value_t = false)]
    pub submit: bool,

    /// Base URL the form posts to
    #[arg(short = 'u', long = "endpoint-url", default_value = "")] // 空字符串表示未指定
    pub endpoint_url: String,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not read `~/.form-widgets/.env` or `./.env`
    #[arg(long = "no-env-file", default_value_t = false)]
    pub no_env_file: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "")] // 空字符串表示未指定
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
