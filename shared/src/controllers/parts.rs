//! 零件库存页

use tracing::{debug, info};

use super::{ListView, PLACEHOLDER};
use crate::error::ApiResult;
use crate::http::{ApiClient, HttpTransport, Navigator};
use crate::models::Part;
use crate::protocol::{CreatePart, DeletePart, ListParts, PartForm, PartQrCode, QrCode, UpdatePart};
use crate::session::KeyValueStore;

pub const NO_PARTS: &str = "No parts found";

/// 库存水平筛选
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockLevel {
    #[default]
    All,
    Low,
}

impl StockLevel {
    /// 下拉框取值：`low` 之外的任何值都视为不过滤
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("low") {
            StockLevel::Low
        } else {
            StockLevel::All
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevel::All => "",
            StockLevel::Low => "low",
        }
    }
}

/// 零件筛选条件，各条件之间为 AND 关系；空串表示不限
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartFilter {
    pub search: String,
    pub category: String,
    pub location: String,
    pub stock: StockLevel,
}

impl PartFilter {
    pub fn matches(&self, part: &Part) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || part.name.to_lowercase().contains(&needle)
            || part
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
        let matches_category =
            self.category.is_empty() || part.category.as_deref() == Some(self.category.as_str());
        let matches_location =
            self.location.is_empty() || part.location.as_deref() == Some(self.location.as_str());
        let matches_stock = match self.stock {
            StockLevel::All => true,
            StockLevel::Low => part.is_low_stock,
        };

        matches_search && matches_category && matches_location && matches_stock
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Low,
    InStock,
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Low => "Low Stock",
            StockStatus::InStock => "In Stock",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub location: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub status: StockStatus,
    pub image_url: Option<String>,
    pub supplier: Option<String>,
}

impl From<&Part> for PartRow {
    fn from(part: &Part) -> Self {
        let or_placeholder = |value: &Option<String>| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        };
        Self {
            id: part.id,
            name: part.name.clone(),
            category: or_placeholder(&part.category),
            location: or_placeholder(&part.location),
            quantity: part.quantity,
            min_quantity: part.min_quantity,
            status: if part.is_low_stock {
                StockStatus::Low
            } else {
                StockStatus::InStock
            },
            image_url: part.image_url.clone(),
            supplier: part.supplier_name.clone(),
        }
    }
}

/// 筛选下拉框选项：不重复的非空值，保持首次出现顺序
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub locations: Vec<String>,
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values.flatten() {
        if !value.is_empty() && !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

pub fn delete_confirmation(name: &str) -> String {
    format!("Are you sure you want to delete \"{}\"?", name)
}

#[derive(Debug, Clone, Default)]
pub struct PartsController {
    parts: Vec<Part>,
}

impl PartsController {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    pub async fn fetch<T, K, N>(client: &ApiClient<T, K, N>) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        let envelope = client.call(&ListParts).await?;
        Ok(envelope.map(|e| {
            debug!(count = e.parts.len(), "parts loaded");
            Self::new(e.parts)
        }))
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn find(&self, id: i64) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn view(&self, filter: &PartFilter) -> ListView<PartRow> {
        let rows = self
            .parts
            .iter()
            .filter(|p| filter.matches(p))
            .map(PartRow::from)
            .collect();
        ListView::from_rows(rows, NO_PARTS)
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            categories: distinct(self.parts.iter().map(|p| p.category.as_deref())),
            locations: distinct(self.parts.iter().map(|p| p.location.as_deref())),
        }
    }

    /// 新建（`id` 为空）或更新零件，成功后整表重载
    pub async fn save_and_reload<T, K, N>(
        client: &ApiClient<T, K, N>,
        id: Option<i64>,
        form: PartForm,
    ) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        form.validate()?;
        let saved = match id {
            Some(id) => client.call(&UpdatePart { id, form }).await?,
            None => client.call(&CreatePart(form)).await?,
        };
        if saved.is_none() {
            return Ok(None);
        }
        info!(?id, "part saved");
        Self::fetch(client).await
    }

    /// 删除零件并重载；确认对话框由调用方负责
    pub async fn delete_and_reload<T, K, N>(
        client: &ApiClient<T, K, N>,
        id: i64,
    ) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        if client.call(&DeletePart { id }).await?.is_none() {
            return Ok(None);
        }
        info!(id, "part deleted");
        Self::fetch(client).await
    }

    pub async fn fetch_qr_code<T, K, N>(
        client: &ApiClient<T, K, N>,
        id: i64,
    ) -> ApiResult<Option<QrCode>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        client.call(&PartQrCode { id }).await
    }
}
