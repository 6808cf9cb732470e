//! 页面控制器
//!
//! 每个控制器持有最近一次获取的记录集合，并提供纯函数 `view` 推导视图模型。
//! 获取与变更都返回一个全新的控制器（整表重载，不做合并）；
//! `Ok(None)` 表示会话已过期，客户端已完成登出与跳转。

pub mod alerts;
pub mod analytics;
pub mod dashboard;
pub mod parts;
pub mod shell;
pub mod suppliers;
pub mod transactions;

use crate::date;
use crate::models::{Transaction, TransactionType};

pub const UNKNOWN: &str = "Unknown";
pub const PLACEHOLDER: &str = "-";

/// 列表视图：有行，或带文案的空状态
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<R> {
    Empty(&'static str),
    Rows(Vec<R>),
}

impl<R> ListView<R> {
    pub fn from_rows(rows: Vec<R>, empty: &'static str) -> Self {
        if rows.is_empty() {
            ListView::Empty(empty)
        } else {
            ListView::Rows(rows)
        }
    }

    pub fn rows(&self) -> &[R] {
        match self {
            ListView::Rows(rows) => rows,
            ListView::Empty(_) => &[],
        }
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        match self {
            ListView::Empty(message) => Some(message),
            ListView::Rows(_) => None,
        }
    }
}

/// 交易表格行（仪表盘与交易页共用）
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub part: String,
    pub kind: TransactionType,
    pub quantity: i64,
    pub machine: String,
    pub user: String,
    pub notes: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id,
            date: date::display_date(t.timestamp.as_deref()),
            time: date::display_time(t.timestamp.as_deref()),
            part: t.part_name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            kind: t.kind,
            quantity: t.quantity,
            machine: t
                .machine
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            user: t.user_name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            notes: t.notes.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    pub fn part(id: i64, name: &str, quantity: i64, min_quantity: i64) -> Value {
        json!({
            "id": id,
            "name": name,
            "quantity": quantity,
            "min_quantity": min_quantity,
            "is_low_stock": quantity <= min_quantity
        })
    }

    pub fn transaction(id: i64, kind: &str, quantity: i64, timestamp: &str) -> Value {
        json!({
            "id": id,
            "user_id": 1,
            "user_name": "admin",
            "part_id": 1,
            "part_name": "Bearing 6204",
            "type": kind,
            "quantity": quantity,
            "machine": "Press #2",
            "notes": null,
            "timestamp": timestamp
        })
    }
}
