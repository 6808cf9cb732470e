use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::http::{FileUpload, HttpMethod, MultipartForm, RequestBody};
use crate::models::{
    Alert, LowStockReport, Overview, Part, StockDistribution, Supplier, TopParts, Transaction,
    User,
};

/// A backend endpoint: method, path, body and the response it decodes into.
pub trait Endpoint {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path, including any query string.
    fn path(&self) -> String;
    /// The request body; most endpoints send none.
    fn body(&self) -> ApiResult<RequestBody> {
        Ok(RequestBody::Empty)
    }
}

// =========================================================
// Response Envelopes
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartsEnvelope {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SuppliersEnvelope {
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransactionsEnvelope {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlertsEnvelope {
    #[serde(default)]
    pub alerts: Vec<Alert>,
    pub unread_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnreadCount {
    #[serde(default)]
    pub unread_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCode {
    pub part_id: i64,
    pub part_name: String,
    /// data URL (`data:image/png;base64,...`)
    pub qr_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

/// Acknowledgement for mutations whose payload the client does not use.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Ack {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub message: Option<String>,
    pub transaction: Transaction,
    pub part: Part,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MarkAllReadReceipt {
    pub message: Option<String>,
    #[serde(default)]
    pub count: u64,
}

// =========================================================
// Request Payloads
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Part create/update form. Sent as multipart so an image can ride along.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub supplier_id: Option<i64>,
    pub image: Option<FileUpload>,
}

impl PartForm {
    /// 编辑时以现有记录预填表单（图片不预填）
    pub fn from_part(part: &Part) -> Self {
        Self {
            name: part.name.clone(),
            description: part.description.clone().unwrap_or_default(),
            category: part.category.clone().unwrap_or_default(),
            location: part.location.clone().unwrap_or_default(),
            quantity: part.quantity,
            min_quantity: part.min_quantity,
            supplier_id: part.supplier_id,
            image: None,
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::validation("Part name is required"));
        }
        if self.quantity < 0 || self.min_quantity < 0 {
            return Err(ApiError::validation("Quantities cannot be negative"));
        }
        Ok(())
    }

    pub fn to_multipart(&self) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("name", self.name.trim())
            .text("description", self.description.as_str())
            .text("category", self.category.as_str())
            .text("location", self.location.as_str())
            .text("quantity", self.quantity.to_string())
            .text("min_quantity", self.min_quantity.to_string());
        if let Some(id) = self.supplier_id {
            form = form.text("supplier_id", id.to_string());
        }
        if let Some(image) = &self.image {
            form = form.file("image", image.clone());
        }
        form
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SupplierForm {
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl SupplierForm {
    pub fn from_supplier(supplier: &Supplier) -> Self {
        Self {
            name: supplier.name.clone(),
            contact_person: supplier.contact_person.clone().unwrap_or_default(),
            email: supplier.email.clone().unwrap_or_default(),
            phone: supplier.phone.clone().unwrap_or_default(),
            address: supplier.address.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::validation("Supplier name is required"));
        }
        Ok(())
    }
}

/// Stock IN/OUT payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub part_id: i64,
    pub quantity: i64,
    pub machine: String,
    pub notes: String,
}

// =========================================================
// Request Definitions
// =========================================================

pub struct Login(pub Credentials);

impl Endpoint for Login {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/auth/login".into()
    }
    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&self.0)
    }
}

pub struct Signup(pub Credentials);

impl Endpoint for Signup {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/auth/signup".into()
    }
    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&self.0)
    }
}

/// List all parts
pub struct ListParts;

impl Endpoint for ListParts {
    type Response = PartsEnvelope;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/parts".into()
    }
}

pub struct CreatePart(pub PartForm);

impl Endpoint for CreatePart {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/parts".into()
    }
    fn body(&self) -> ApiResult<RequestBody> {
        Ok(RequestBody::Multipart(self.0.to_multipart()))
    }
}

pub struct UpdatePart {
    pub id: i64,
    pub form: PartForm,
}

impl Endpoint for UpdatePart {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/parts/{}", self.id)
    }
    fn body(&self) -> ApiResult<RequestBody> {
        Ok(RequestBody::Multipart(self.form.to_multipart()))
    }
}

pub struct DeletePart {
    pub id: i64,
}

impl Endpoint for DeletePart {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/parts/{}", self.id)
    }
}

pub struct PartQrCode {
    pub id: i64,
}

impl Endpoint for PartQrCode {
    type Response = QrCode;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/api/parts/{}/qrcode", self.id)
    }
}

pub struct ListSuppliers;

impl Endpoint for ListSuppliers {
    type Response = SuppliersEnvelope;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/suppliers".into()
    }
}

pub struct CreateSupplier(pub SupplierForm);

impl Endpoint for CreateSupplier {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/suppliers".into()
    }
    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&self.0)
    }
}

pub struct UpdateSupplier {
    pub id: i64,
    pub form: SupplierForm,
}

impl Endpoint for UpdateSupplier {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/suppliers/{}", self.id)
    }
    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&self.form)
    }
}

pub struct DeleteSupplier {
    pub id: i64,
}

impl Endpoint for DeleteSupplier {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/api/suppliers/{}", self.id)
    }
}

/// List transactions, newest first (server order)
pub struct ListTransactions {
    pub limit: Option<u32>,
}

impl Endpoint for ListTransactions {
    type Response = TransactionsEnvelope;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        match self.limit {
            Some(limit) => format!("/api/transactions?limit={}", limit),
            None => "/api/transactions".into(),
        }
    }
}

pub struct RecordStockIn(pub StockMovement);

impl Endpoint for RecordStockIn {
    type Response = TransactionReceipt;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/transactions/in".into()
    }
    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&self.0)
    }
}

pub struct RecordStockOut(pub StockMovement);

impl Endpoint for RecordStockOut {
    type Response = TransactionReceipt;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/api/transactions/out".into()
    }
    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&self.0)
    }
}

pub struct ListAlerts;

impl Endpoint for ListAlerts {
    type Response = AlertsEnvelope;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/alerts".into()
    }
}

pub struct UnreadAlertCount;

impl Endpoint for UnreadAlertCount {
    type Response = UnreadCount;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/alerts/unread-count".into()
    }
}

pub struct MarkAlertRead {
    pub id: i64,
}

impl Endpoint for MarkAlertRead {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/api/alerts/{}/mark-read", self.id)
    }
    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&json!({}))
    }
}

pub struct MarkAllAlertsRead;

impl Endpoint for MarkAllAlertsRead {
    type Response = MarkAllReadReceipt;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        "/api/alerts/mark-all-read".into()
    }
    fn body(&self) -> ApiResult<RequestBody> {
        RequestBody::json(&json!({}))
    }
}

pub struct AnalyticsOverview;

impl Endpoint for AnalyticsOverview {
    type Response = Overview;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/analytics/overview".into()
    }
}

pub struct StockDistributionReport;

impl Endpoint for StockDistributionReport {
    type Response = StockDistribution;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/analytics/stock-distribution".into()
    }
}

pub struct LowStockAnalysis;

impl Endpoint for LowStockAnalysis {
    type Response = LowStockReport;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/analytics/low-stock".into()
    }
}

pub struct TopPartsReport;

impl Endpoint for TopPartsReport {
    type Response = TopParts;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/api/analytics/top-parts".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FormField;

    #[test]
    fn part_form_includes_optional_fields_only_when_set() {
        let form = PartForm {
            name: "  Belt A-42 ".into(),
            quantity: 7,
            min_quantity: 2,
            ..Default::default()
        };
        let multipart = form.to_multipart();
        assert_eq!(multipart.text_value("name"), Some("Belt A-42"));
        assert_eq!(multipart.text_value("quantity"), Some("7"));
        assert_eq!(multipart.text_value("supplier_id"), None);
        assert_eq!(multipart.fields().len(), 6);

        let with_extras = PartForm {
            supplier_id: Some(5),
            image: Some(FileUpload {
                file_name: "belt.png".into(),
                mime_type: "image/png".into(),
                bytes: vec![0x89, 0x50],
            }),
            ..form
        }
        .to_multipart();
        assert_eq!(with_extras.text_value("supplier_id"), Some("5"));
        assert!(matches!(
            with_extras.fields().last(),
            Some(FormField::File { name, .. }) if name == "image"
        ));
    }

    #[test]
    fn paths_embed_ids_and_limits() {
        assert_eq!(PartQrCode { id: 12 }.path(), "/api/parts/12/qrcode");
        assert_eq!(MarkAlertRead { id: 3 }.path(), "/api/alerts/3/mark-read");
        assert_eq!(
            ListTransactions { limit: Some(500) }.path(),
            "/api/transactions?limit=500"
        );
        assert_eq!(ListTransactions { limit: None }.path(), "/api/transactions");
    }

    #[test]
    fn mark_read_sends_empty_json_object() {
        assert_eq!(
            MarkAllAlertsRead.body().unwrap(),
            RequestBody::Json("{}".into())
        );
    }
}
