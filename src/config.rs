use crate::models::Category;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 地点清单文件（CSV，需包含 "Place ID" 列）
    pub input_file: String,
    /// 抓取类别（餐厅 / 景点），决定输出目录与帐本文件名
    pub category: Category,
    /// 并发工作者数量
    pub worker_count: usize,
    /// 数据目录（输出文件夹、进度帐本、暂存记录都在这里）
    pub data_dir: String,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 是否自行启动无头浏览器（否则连接到已开启的调试端口）
    pub headless: bool,
    /// 页面导航后的等待时间（毫秒）
    pub page_wait_ms: u64,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: "完整_台北_新北_地點清單.csv".to_string(),
            category: Category::Restaurant,
            worker_count: 6,
            data_dir: ".".to_string(),
            browser_debug_port: 9222,
            headless: false,
            page_wait_ms: 4000,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_file: std::env::var("INPUT_FILE").unwrap_or(default.input_file),
            category: std::env::var("CATEGORY").ok().and_then(|v| Category::from_str(&v)).unwrap_or(default.category),
            worker_count: std::env::var("WORKER_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.worker_count),
            data_dir: std::env::var("DATA_DIR").unwrap_or(default.data_dir),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            page_wait_ms: std::env::var("PAGE_WAIT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.page_wait_ms),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}
