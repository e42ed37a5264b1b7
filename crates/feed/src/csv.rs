use chrono::{DateTime, NaiveDate, Utc};
use quoteview_core::config::AppConfig;
use quoteview_core::feed::error::FeedError;
use quoteview_core::feed::port::RecordSource;
use quoteview_core::series::entity::{Company, Record};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// # Summary
/// 基于 CSV 文件的记录来源。
///
/// # Invariants
/// - 首行为表头，单元格两端空白会被去除。
/// - 除日期列、名称列与忽略列之外的所有列都必须是有限的数值。
#[derive(Debug, Clone)]
pub struct CsvSource {
    // 行情文件路径
    quotes_path: PathBuf,
    // 公司文件路径
    companies_path: PathBuf,
    // 日期列名
    date_column: String,
    // 行情文件中忽略的列
    ignored_columns: Vec<String>,
    // 公司名称列名
    name_column: String,
}

impl CsvSource {
    /// # Summary
    /// 创建 CSV 来源，列名使用默认值 (`Date`、`Name`，忽略 `Volume`、`AdjClose`)。
    ///
    /// # Arguments
    /// * `quotes_path`: 行情 CSV 路径。
    /// * `companies_path`: 公司 CSV 路径。
    pub fn new(quotes_path: impl Into<PathBuf>, companies_path: impl Into<PathBuf>) -> Self {
        Self {
            quotes_path: quotes_path.into(),
            companies_path: companies_path.into(),
            date_column: "Date".to_string(),
            ignored_columns: vec!["Volume".to_string(), "AdjClose".to_string()],
            name_column: "Name".to_string(),
        }
    }

    /// 按应用配置创建 CSV 来源。
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.equity.data_path, &config.companies.data_path)
            .with_date_column(&config.equity.date_column)
            .with_ignored_columns(config.equity.ignored_columns.clone())
            .with_name_column(&config.companies.name_column)
    }

    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = column.into();
        self
    }

    pub fn with_ignored_columns(mut self, columns: Vec<String>) -> Self {
        self.ignored_columns = columns;
        self
    }

    pub fn with_name_column(mut self, column: impl Into<String>) -> Self {
        self.name_column = column.into();
        self
    }

    fn open(path: &Path) -> Result<std::fs::File, FeedError> {
        std::fs::File::open(path).map_err(|e| FeedError::Io(format!("{}: {}", path.display(), e)))
    }
}

impl RecordSource for CsvSource {
    fn load_quotes(&self) -> Result<Vec<Record>, FeedError> {
        let file = Self::open(&self.quotes_path)?;
        let records = parse_quotes(file, &self.date_column, &self.ignored_columns)?;
        info!(
            "Loaded {} quotes from {}",
            records.len(),
            self.quotes_path.display()
        );
        Ok(records)
    }

    fn load_companies(&self) -> Result<Vec<Company>, FeedError> {
        let file = Self::open(&self.companies_path)?;
        let companies = parse_companies(file, &self.name_column)?;
        info!(
            "Loaded {} companies from {}",
            companies.len(),
            self.companies_path.display()
        );
        Ok(companies)
    }
}

/// 带表头的 CSV 读取器。
struct Table<R: Read> {
    reader: ::csv::Reader<R>,
    headers: Vec<String>,
}

impl<R: Read> Table<R> {
    fn new(input: R) -> Result<Self, FeedError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(::csv::Trim::All)
            .from_reader(input);
        let headers = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();
        Ok(Self { reader, headers })
    }

    fn column(&self, name: &str) -> Result<usize, FeedError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FeedError::MissingColumn(name.to_string()))
    }
}

fn csv_error(e: ::csv::Error) -> FeedError {
    if e.is_io_error() {
        FeedError::Io(e.to_string())
    } else {
        FeedError::Csv(e.to_string())
    }
}

fn parse_number(column: &str, value: &str, line: u64) -> Result<f64, FeedError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FeedError::InvalidNumber {
            column: column.to_string(),
            value: value.to_string(),
            line,
        })
}

/// # Summary
/// 解析日期文本。
///
/// # Logic
/// 1. 先按 `YYYY-MM-DD` 解析，取当天 UTC 零点。
/// 2. 再按 RFC 3339 解析。
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// # Summary
/// 解析行情 CSV。
///
/// # Logic
/// 1. 定位日期列，缺失返回 `MissingColumn`。
/// 2. 逐行解析日期与其余数值列，忽略列直接跳过。
/// 3. 任意单元格解析失败即整体失败，错误中带行号。
///
/// # Arguments
/// * `input`: CSV 文本来源。
/// * `date_column`: 日期列名。
/// * `ignored_columns`: 不参与解析的列。
///
/// # Returns
/// 按文件顺序排列的记录。
pub fn parse_quotes<R: Read>(
    input: R,
    date_column: &str,
    ignored_columns: &[String],
) -> Result<Vec<Record>, FeedError> {
    let mut table = Table::new(input)?;
    let date_idx = table.column(date_column)?;
    let headers = table.headers.clone();

    let mut records = Vec::new();
    for row in table.reader.records() {
        let row = row.map_err(csv_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let date = row.get(date_idx).unwrap_or_default();
        let time = parse_date(date).ok_or_else(|| FeedError::InvalidDate {
            value: date.to_string(),
            line,
        })?;

        let mut record = Record::new(date, time);
        for (idx, (column, value)) in headers.iter().zip(row.iter()).enumerate() {
            if idx == date_idx || ignored_columns.iter().any(|c| c == column) {
                continue;
            }
            record = record.with_field(column.as_str(), parse_number(column, value, line)?);
        }
        records.push(record);
    }
    Ok(records)
}

/// # Summary
/// 解析公司 CSV。
///
/// # Logic
/// 名称列之外的所有列均解析为数值，保持文件中的行顺序。
///
/// # Arguments
/// * `input`: CSV 文本来源。
/// * `name_column`: 名称列名。
///
/// # Returns
/// 公司列表。
pub fn parse_companies<R: Read>(input: R, name_column: &str) -> Result<Vec<Company>, FeedError> {
    let mut table = Table::new(input)?;
    let name_idx = table.column(name_column)?;
    let headers = table.headers.clone();

    let mut companies = Vec::new();
    for row in table.reader.records() {
        let row = row.map_err(csv_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let mut company = Company::new(row.get(name_idx).unwrap_or_default());
        for (idx, (column, value)) in headers.iter().zip(row.iter()).enumerate() {
            if idx == name_idx {
                continue;
            }
            company = company.with_field(column.as_str(), parse_number(column, value, line)?);
        }
        companies.push(company);
    }
    Ok(companies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quoteview_core::series::entity::FieldSource;

    const QUOTES: &str = "\
Date,Open,High,Low,Close,AdjClose,Volume
2020-01-02, 12198.5,12289.9,12195.25,12282.2,12282.2,0
2020-01-03,12261.1,12265.6,12191.35,12226.65,12226.65,0
";

    #[test]
    fn test_parse_quotes_skips_ignored_columns() {
        let ignored = vec!["Volume".to_string(), "AdjClose".to_string()];
        let records = parse_quotes(QUOTES.as_bytes(), "Date", &ignored).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.date(), "2020-01-02");
        assert_eq!(
            quoteview_core::series::entity::Timestamped::time(first),
            Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(first.value("Open").unwrap(), 12198.5);
        assert_eq!(first.value("Close").unwrap(), 12282.2);
        assert!(first.value("Volume").is_err());
        assert!(first.value("AdjClose").is_err());
    }

    #[test]
    fn test_parse_quotes_rejects_non_numeric_cells() {
        let input = "Date,Close\n2020-01-02,null\n";
        let err = parse_quotes(input.as_bytes(), "Date", &[]).unwrap_err();
        assert!(matches!(
            err,
            FeedError::InvalidNumber { ref column, ref value, line: 2 } if column == "Close" && value == "null"
        ));
    }

    #[test]
    fn test_parse_quotes_rejects_bad_date_and_missing_column() {
        let err = parse_quotes("Date,Close\n02/01/2020,1\n".as_bytes(), "Date", &[]).unwrap_err();
        assert!(matches!(err, FeedError::InvalidDate { .. }));

        let err = parse_quotes("Day,Close\n2020-01-02,1\n".as_bytes(), "Date", &[]).unwrap_err();
        assert!(matches!(err, FeedError::MissingColumn(ref c) if c == "Date"));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2020-01-02"), Some(expected));
        assert_eq!(parse_date("2020-01-02T05:30:00+05:30"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_parse_companies_keeps_file_order() {
        let input = "Name,CMP,PE\nTCS,2100.5,25.1\nInfosys,750,19.3\n";
        let companies = parse_companies(input.as_bytes(), "Name").unwrap();
        let names: Vec<&str> = companies.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["TCS", "Infosys"]);
        assert_eq!(companies[1].value("CMP").unwrap(), 750.0);
    }
}
