use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub equity: EquityConfig,
    pub companies: CompaniesConfig,
    pub log: LogConfig,
}

/// 指数视图配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EquityConfig {
    // 行情 CSV 路径
    pub data_path: String,
    // 日期列名
    pub date_column: String,
    // 加载时忽略的列
    pub ignored_columns: Vec<String>,
    // 移动平均窗口
    pub window: usize,
    // 刷新调度间隔（毫秒）
    pub refresh_interval_ms: u64,
    // 轮换展示的字段
    pub fields: Vec<String>,
}

/// 公司视图配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompaniesConfig {
    pub data_path: String,
    // 名称列名
    pub name_column: String,
    // 字段轮换间隔（毫秒）
    pub field_interval_ms: u64,
    // 分区轮转间隔（毫秒）
    pub rotation_interval_ms: u64,
    pub fields: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // 默认过滤级别，RUST_LOG 优先
    pub level: String,
    // 日志文件目录，None 表示只输出到终端
    pub directory: Option<String>,
}

impl Default for EquityConfig {
    fn default() -> Self {
        Self {
            data_path: "data/nsei.csv".to_string(),
            date_column: "Date".to_string(),
            ignored_columns: vec!["Volume".to_string(), "AdjClose".to_string()],
            window: 100,
            refresh_interval_ms: 2000,
            fields: vec!["Close".to_string()],
        }
    }
}

impl Default for CompaniesConfig {
    fn default() -> Self {
        Self {
            data_path: "data/companies.csv".to_string(),
            name_column: "Name".to_string(),
            field_interval_ms: 2000,
            rotation_interval_ms: 5000,
            fields: ["CMP", "PE", "MarketCap", "DivYld", "QNetProfit", "QSales", "ROCE"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
