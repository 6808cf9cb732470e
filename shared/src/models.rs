//! 领域模型 (Domain Models)
//!
//! 与后端 JSON 一一对应。可选字段在缺失或为 `null` 时反序列化为 `None`。

use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================
// 用户与角色
// =========================================================

/// 用户角色
///
/// 后端的非管理员默认角色为 `technician`；未知角色一律视为普通用户。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Technician,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Technician => "technician",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

// =========================================================
// 库存资源
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub min_quantity: i64,
    pub location: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub qr_code_url: Option<String>,
    /// 由后端计算：`quantity <= min_quantity`
    #[serde(default)]
    pub is_low_stock: bool,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: Option<String>,
}

/// 库存流动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
        }
    }

    /// 解析筛选/表单取值，空串或未知值返回 `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IN" => Some(TransactionType::In),
            "OUT" => Some(TransactionType::Out),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub part_id: i64,
    pub part_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub quantity: i64,
    pub machine: Option<String>,
    pub notes: Option<String>,
    pub timestamp: Option<String>,
}

/// 低库存告警
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub part_id: i64,
    pub part_name: Option<String>,
    pub message: String,
    #[serde(default)]
    pub seen: bool,
    pub created_at: Option<String>,
}

// =========================================================
// 统计分析
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Overview {
    pub total_parts: u64,
    pub low_stock_count: u64,
    pub out_of_stock_count: u64,
    pub total_quantity: i64,
    pub categories: Vec<CategoryCount>,
    pub total_alerts: u64,
    pub unread_alerts: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StockDistribution {
    pub by_category: Vec<CategoryStock>,
    pub by_location: Vec<LocationStock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStock {
    pub category: String,
    pub total_quantity: i64,
    pub part_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationStock {
    pub location: String,
    pub total_quantity: i64,
    pub part_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LowStockReport {
    pub low_stock_parts: Vec<LowStockPart>,
    pub total_low_stock: u64,
    pub total_critical: u64,
    pub total_warning: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockPart {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub location: Option<String>,
    pub quantity: i64,
    pub min_quantity: i64,
    pub stock_percentage: f64,
    pub deficit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TopParts {
    pub top_by_quantity: Vec<RankedPart>,
    pub most_critical: Vec<CriticalPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPart {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPart {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i64,
    pub min_quantity: i64,
    pub stock_percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_role_falls_back_to_user() {
        let user: User =
            serde_json::from_value(json!({"id": 3, "username": "kim", "role": "auditor"})).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!user.role.is_admin());

        let tech: User =
            serde_json::from_value(json!({"id": 4, "username": "lee", "role": "technician"}))
                .unwrap();
        assert_eq!(tech.role, Role::Technician);
    }

    #[test]
    fn part_tolerates_null_and_missing_fields() {
        let part: Part = serde_json::from_value(json!({
            "id": 1,
            "name": "Bearing 6204",
            "description": null,
            "quantity": 4,
            "min_quantity": 10,
            "is_low_stock": true
        }))
        .unwrap();
        assert!(part.is_low_stock);
        assert_eq!(part.category, None);
        assert_eq!(part.supplier_id, None);
    }

    #[test]
    fn transaction_type_uses_upper_case_wire_names() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": 9,
            "user_id": 1,
            "part_id": 2,
            "type": "OUT",
            "quantity": 3
        }))
        .unwrap();
        assert_eq!(tx.kind, TransactionType::Out);
        assert_eq!(TransactionType::parse(" in "), Some(TransactionType::In));
        assert_eq!(TransactionType::parse(""), None);
    }
}
