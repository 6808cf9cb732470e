use tracing::{debug, info};

use super::{ListView, PLACEHOLDER};
use crate::error::ApiResult;
use crate::http::{ApiClient, HttpTransport, Navigator};
use crate::models::Supplier;
use crate::protocol::{CreateSupplier, DeleteSupplier, ListSuppliers, SupplierForm, UpdateSupplier};
use crate::session::KeyValueStore;

pub const NO_SUPPLIERS: &str = "No suppliers found. Start by adding one.";
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this supplier?";

#[derive(Debug, Clone, PartialEq)]
pub struct SupplierRow {
    pub id: i64,
    pub name: String,
    pub contact_person: String,
    /// 原始邮箱，用于 `mailto:` 链接
    pub email: Option<String>,
    pub email_label: String,
    pub phone: String,
    pub address: String,
}

fn or_placeholder(value: &Option<String>) -> String {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

impl From<&Supplier> for SupplierRow {
    fn from(s: &Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            contact_person: or_placeholder(&s.contact_person),
            email: s.email.clone().filter(|e| !e.is_empty()),
            email_label: or_placeholder(&s.email),
            phone: or_placeholder(&s.phone),
            address: or_placeholder(&s.address),
        }
    }
}

/// 供应商页
#[derive(Debug, Clone, Default)]
pub struct SuppliersController {
    suppliers: Vec<Supplier>,
}

impl SuppliersController {
    pub fn new(suppliers: Vec<Supplier>) -> Self {
        Self { suppliers }
    }

    pub async fn fetch<T, K, N>(client: &ApiClient<T, K, N>) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        let envelope = client.call(&ListSuppliers).await?;
        Ok(envelope.map(|e| {
            debug!(count = e.suppliers.len(), "suppliers loaded");
            Self::new(e.suppliers)
        }))
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn find(&self, id: i64) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.id == id)
    }

    pub fn view(&self) -> ListView<SupplierRow> {
        let rows = self.suppliers.iter().map(SupplierRow::from).collect();
        ListView::from_rows(rows, NO_SUPPLIERS)
    }

    pub async fn save_and_reload<T, K, N>(
        client: &ApiClient<T, K, N>,
        id: Option<i64>,
        form: SupplierForm,
    ) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        form.validate()?;
        let saved = match id {
            Some(id) => client.call(&UpdateSupplier { id, form }).await?,
            None => client.call(&CreateSupplier(form)).await?,
        };
        if saved.is_none() {
            return Ok(None);
        }
        info!(?id, "supplier saved");
        Self::fetch(client).await
    }

    pub async fn delete_and_reload<T, K, N>(
        client: &ApiClient<T, K, N>,
        id: i64,
    ) -> ApiResult<Option<Self>>
    where
        T: HttpTransport,
        K: KeyValueStore,
        N: Navigator,
    {
        if client.call(&DeleteSupplier { id }).await?.is_none() {
            return Ok(None);
        }
        info!(id, "supplier deleted");
        Self::fetch(client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::Harness;
    use crate::http::{HttpMethod, RequestBody};
    use crate::session::tests::technician;
    use serde_json::json;

    #[tokio::test]
    async fn list_renders_placeholders() {
        let h = Harness::signed_in();
        h.transport.respond(
            HttpMethod::Get,
            "/api/suppliers",
            200,
            json!({"suppliers": [
                {"id": 1, "name": "Acme", "contact_person": "Jo", "email": "jo@acme.test",
                 "phone": null, "address": ""}
            ]}),
        );

        let view = SuppliersController::fetch(&h.client)
            .await
            .unwrap()
            .unwrap()
            .view();

        let row = &view.rows()[0];
        assert_eq!(row.email.as_deref(), Some("jo@acme.test"));
        assert_eq!(row.phone, "-");
        assert_eq!(row.address, "-");
    }

    #[test]
    fn empty_list_invites_adding_one() {
        assert_eq!(
            SuppliersController::default().view(),
            ListView::Empty(NO_SUPPLIERS)
        );
    }

    #[tokio::test]
    async fn update_sends_json_then_reloads() {
        let h = Harness::signed_in();
        h.transport.respond(
            HttpMethod::Put,
            "/api/suppliers/2",
            200,
            json!({"message": "Supplier updated successfully"}),
        );
        h.transport.respond(
            HttpMethod::Get,
            "/api/suppliers",
            200,
            json!({"suppliers": [{"id": 2, "name": "Bolt Co"}]}),
        );

        let form = SupplierForm {
            name: "Bolt Co".into(),
            ..Default::default()
        };
        let ctl = SuppliersController::save_and_reload(&h.client, Some(2), form)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(ctl.find(2).map(|s| s.name.as_str()), Some("Bolt Co"));
        let put = &h.transport.requests()[0];
        assert_eq!(put.header("Content-Type"), Some("application/json"));
        assert!(matches!(&put.body, RequestBody::Json(body) if body.contains("\"contact_person\":\"\"")));
    }

    #[tokio::test]
    async fn server_refusal_keeps_state_and_surfaces_message() {
        let h = Harness::signed_in();
        h.transport.respond(
            HttpMethod::Delete,
            "/api/suppliers/4",
            400,
            json!({"error": "Cannot delete supplier with associated spare parts"}),
        );

        let err = SuppliersController::delete_and_reload(&h.client, 4)
            .await
            .unwrap_err();

        assert_eq!(
            err.user_message(),
            "Cannot delete supplier with associated spare parts"
        );
        assert_eq!(h.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn technician_delete_reaches_server_and_reloads() {
        let h = Harness::new();
        h.client.session().save("tok", &technician());
        h.transport.respond(
            HttpMethod::Delete,
            "/api/suppliers/4",
            200,
            json!({"message": "Supplier deleted successfully"}),
        );
        h.transport
            .respond(HttpMethod::Get, "/api/suppliers", 200, json!({"suppliers": []}));

        let ctl = SuppliersController::delete_and_reload(&h.client, 4)
            .await
            .unwrap();

        assert!(ctl.is_some());
        let sent = h.transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].method, HttpMethod::Delete);
        assert_eq!(sent[0].url, "http://inventory.test/api/suppliers/4");
        assert!(h.navigator.redirects().is_empty());
        assert!(h.navigator.notices().is_empty());
    }
}
