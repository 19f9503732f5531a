use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 单个地点的详细资料
///
/// 字段顺序即输出 JSON 的字段顺序，与 Google 地图页面上的
/// 呈现顺序一致。抓取失败的字段保留空值，不影响其余字段。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// 店名（必填，抓不到店名视为该地点抓取失败）
    #[serde(rename = "店名", default)]
    pub name: String,

    /// Google 地图 Place ID
    #[serde(rename = "Place ID", default)]
    pub place_id: String,

    /// 评分
    #[serde(rename = "評分", default)]
    pub rating: String,

    /// 种类
    #[serde(rename = "種類", default)]
    pub kind: String,

    /// 地址
    #[serde(rename = "地址", default)]
    pub address: String,

    /// 营业时间（星期 → 时段）
    #[serde(rename = "開始營業時間", default)]
    pub opening_hours: Map<String, Value>,

    /// 平均每人消费
    #[serde(rename = "平均每人消費", default)]
    pub average_cost: String,

    /// 电话
    #[serde(rename = "電話", default)]
    pub phone: String,

    /// 简介
    #[serde(rename = "簡介", default)]
    pub intro: String,

    // ---- 「简介」页签下的勾选项目区块 ----
    #[serde(rename = "無障礙程度", default)]
    pub accessibility: Vec<String>,

    #[serde(rename = "服務項目", default)]
    pub service_options: Vec<String>,

    #[serde(rename = "產品/服務", default)]
    pub offerings: Vec<String>,

    #[serde(rename = "用餐選擇", default)]
    pub dining_options: Vec<String>,

    #[serde(rename = "設施", default)]
    pub amenities: Vec<String>,

    #[serde(rename = "客層族群", default)]
    pub crowd: Vec<String>,

    #[serde(rename = "氛圍", default)]
    pub atmosphere: Vec<String>,

    #[serde(rename = "付款方式", default)]
    pub payments: Vec<String>,

    #[serde(rename = "兒童", default)]
    pub children: Vec<String>,

    #[serde(rename = "停車場", default)]
    pub parking: Vec<String>,
}

impl PlaceRecord {
    /// 创建只带 Place ID 的空记录
    pub fn empty(place_id: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            ..Default::default()
        }
    }
}
