/// 抓取类别枚举
///
/// 餐厅与景点共用全部抓取逻辑，只有输出目录和进度帐本文件名不同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Category {
    /// 餐厅
    Restaurant,
    /// 景点
    Attraction,
}

impl Category {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Category::Restaurant => "餐廳",
            Category::Attraction => "景點",
        }
    }

    /// 详细资料的输出目录名
    pub fn output_dir(self) -> &'static str {
        match self {
            Category::Restaurant => "餐廳詳細資訊",
            Category::Attraction => "景點詳細資訊",
        }
    }

    /// 进度帐本文件名
    pub fn ledger_file(self) -> &'static str {
        match self {
            Category::Restaurant => "爬過的餐廳ID.json",
            Category::Attraction => "爬過的景點ID.json",
        }
    }

    /// 尝试从字符串解析类别（支持中英文写法）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "restaurant" | "餐厅" | "餐廳" => Some(Category::Restaurant),
            "attraction" | "景点" | "景點" => Some(Category::Attraction),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
