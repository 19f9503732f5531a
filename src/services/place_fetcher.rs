//! 地点抓取 - 业务能力层
//!
//! 持有一个专属分页，把 Place ID 变成一份 `PlaceRecord`。
//! 一个抓取器对应一个浏览器会话，不可跨工作者共用。

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Page;
use serde_json::{Map, Value};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::infrastructure::JsExecutor;
use crate::models::PlaceRecord;

/// 地点抓取能力
///
/// 生产实现为 [`PlaceFetcher`]；流程层只依赖本 trait，测试用桩实现替换。
pub trait PlaceFetch {
    fn fetch(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<PlaceRecord, FetchError>> + Send;
}

/// 生产用地点抓取器
///
/// 职责：
/// - 持有一个专属分页（经由 JsExecutor）
/// - 导航到地点页面并注入 JS 撷取各栏位
/// - 单一栏位抓不到只留空值；撷取不到店名视为该地点失败
pub struct PlaceFetcher {
    executor: JsExecutor,
    page_wait: Duration,
}

impl PlaceFetcher {
    pub fn new(page: Page, page_wait_ms: u64) -> Self {
        Self {
            executor: JsExecutor::new(page),
            page_wait: Duration::from_millis(page_wait_ms),
        }
    }

    /// 释放分页（会话随之结束）
    pub async fn close(self) -> Result<()> {
        self.executor.into_page().close().await?;
        Ok(())
    }

    /// 展开「简介」页签并读取勾选项目区块
    async fn fetch_about_sections(&self) -> Result<Map<String, Value>> {
        self.executor.eval(OPEN_ABOUT_TAB_JS).await?;
        sleep(self.page_wait / 2).await;
        self.executor.eval_as(EXTRACT_SECTIONS_JS).await
    }
}

impl PlaceFetch for PlaceFetcher {
    fn fetch(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<PlaceRecord, FetchError>> + Send {
        async move {
            let url = format!(
                "https://www.google.com/maps/place/?q=place_id:{}",
                place_id
            );
            debug!("导航到: {}", url);
            self.executor
                .navigate(url)
                .await
                .map_err(FetchError::session)?;

            // 地图页面是重前端，导航返回不代表栏位就绪
            sleep(self.page_wait).await;

            let mut record: PlaceRecord = self
                .executor
                .eval_as(EXTRACT_DETAIL_JS)
                .await
                .map_err(FetchError::session)?;
            record.place_id = place_id.to_string();

            if record.name.is_empty() {
                return Err(FetchError::item(place_id, "无法撷取店名"));
            }

            // 勾选项目区块在「简介」页签下；这一步失败不影响主体栏位
            match self.fetch_about_sections().await {
                Ok(sections) => apply_sections(&mut record, sections),
                Err(e) => warn!("地点 {} 的简介区块撷取失败: {}", place_id, e),
            }

            Ok(record)
        }
    }
}

/// 把区块撷取结果套进对应栏位；没出现的区块保持空列表
fn apply_sections(record: &mut PlaceRecord, mut sections: Map<String, Value>) {
    let mut take = |label: &str| -> Vec<String> {
        match sections.remove(label) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    };

    record.accessibility = take("無障礙程度");
    record.service_options = take("服務項目");
    record.offerings = take("產品/服務");
    record.dining_options = take("用餐選擇");
    record.amenities = take("設施");
    record.crowd = take("客層族群");
    record.atmosphere = take("氛圍");
    record.payments = take("付款方式");
    record.children = take("兒童");
    record.parking = take("停車場");
}

/// 撷取主页面栏位，回传的键名即存档字段名
const EXTRACT_DETAIL_JS: &str = r#"
(() => {
    const text = (sel) => {
        const el = document.querySelector(sel);
        return el ? el.textContent.trim() : "";
    };

    const data = {
        "店名": text('div[role="main"] h1'),
        "評分": "",
        "種類": text("button.DkEaL"),
        "地址": "",
        "開始營業時間": {},
        "平均每人消費": "",
        "電話": "",
        "簡介": text('div[role="main"] div.PYvSYb span'),
    };

    // 评分：星等图示的 aria-label 形如「4.3 顆星」
    const rating = document.querySelector('div[role="main"] span[role="img"]');
    if (rating) {
        const m = (rating.getAttribute("aria-label") || "").match(/[\d.]+/);
        if (m) data["評分"] = m[0];
    }

    // 地址与电话按钮以 aria-label 标示
    for (const btn of document.querySelectorAll("button[aria-label]")) {
        const label = btn.getAttribute("aria-label") || "";
        if (label.startsWith("地址:")) {
            data["地址"] = label.slice("地址:".length).trim().replace(/\n/g, "");
        } else if (label.startsWith("電話號碼:")) {
            data["電話"] = label.slice("電話號碼:".length).trim();
        }
    }

    // 营业时间：星期列的 aria-label 带出整周时段，以「; 」分隔
    const hoursRow = document.querySelector('div[aria-label*="星期"]');
    if (hoursRow) {
        const full = (hoursRow.getAttribute("aria-label") || "")
            .replace("隱藏本週營業時間", "")
            .trim();
        for (const part of full.split("; ")) {
            const idx = part.indexOf("、");
            if (idx > 0) {
                const day = part.slice(0, idx).trim();
                const time = part.slice(idx + 1).replace(/到/g, "~").trim();
                data["開始營業時間"][day] = time;
            }
        }
    }

    // 平均每人消费
    const spend = document.querySelector('span[aria-label*="每人消費"]');
    if (spend) data["平均每人消費"] = spend.textContent.trim();

    return data;
})()
"#;

/// 点开「简介」页签
const OPEN_ABOUT_TAB_JS: &str = r#"
(() => {
    const tab = document.querySelector(
        'button[role="tab"][aria-label*="簡介"], button[aria-label^="簡介"]'
    );
    if (tab) {
        tab.click();
        return true;
    }
    return false;
})()
"#;

/// 读取「简介」页签下各区块的勾选项目
const EXTRACT_SECTIONS_JS: &str = r#"
(() => {
    const sections = {};
    for (const block of document.querySelectorAll('div[role="region"] > div')) {
        const title = block.querySelector("h2");
        if (!title) continue;

        const items = [];
        for (const span of block.querySelectorAll("li span[aria-label]")) {
            const label = (span.getAttribute("aria-label") || "").trim();
            // 未提供的项目 aria-label 以「沒有」开头，略过
            if (label && !label.startsWith("沒有")) items.push(label);
        }
        if (items.length > 0) sections[title.textContent.trim()] = items;
    }
    return sections;
})()
"#;
