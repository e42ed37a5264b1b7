use config::{Config, ConfigError, Environment, File};
use quoteview_core::config::AppConfig;

pub const DEFAULT_CONFIG_FILE: &str = "quoteview.toml";

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 读取可选的配置文件，文件不存在时全部使用默认值。
/// 2. 叠加 `QUOTEVIEW__` 前缀的环境变量，例如 `QUOTEVIEW__EQUITY__WINDOW=50`，
///    列表字段以逗号分隔，例如 `QUOTEVIEW__COMPANIES__FIELDS=CMP,PE`。
///
/// # Arguments
/// * `path`: 配置文件路径。
///
/// # Returns
/// 合并后的配置。
pub fn load(path: &str) -> Result<AppConfig, ConfigError> {
    load_with(path, environment())
}

// 以逗号拆分的列表字段
const LIST_KEYS: [&str; 3] = ["equity.fields", "equity.ignored_columns", "companies.fields"];

fn environment() -> Environment {
    LIST_KEYS.iter().fold(
        Environment::with_prefix("QUOTEVIEW")
            .separator("__")
            .list_separator(","),
        |env, key| env.with_list_parse_key(key),
    )
}

fn load_with(path: &str, env: Environment) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(env)
        .build()?
        .try_deserialize()
}
