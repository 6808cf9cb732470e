//! HTTP 传输层
//!
//! 使用 `web_sys::fetch` 实现共享层的 `HttpTransport`。
//! multipart 体转换为 `FormData`，由浏览器自动设置 boundary。

use async_trait::async_trait;
use stocksphere_shared::http::{
    FormField, HttpRequest, HttpResponse, HttpTransport, MultipartForm, RequestBody, TransportError,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response};

fn build_error(e: JsValue) -> TransportError {
    TransportError::Build(format!("{:?}", e))
}

fn network_error(e: JsValue) -> TransportError {
    TransportError::Network(format!("{:?}", e))
}

/// 基于 `fetch` 的传输实现
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let headers = Headers::new().map_err(build_error)?;
        for (key, value) in &req.headers {
            headers.set(key, value).map_err(build_error)?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        match &req.body {
            RequestBody::Empty => {}
            RequestBody::Json(body) => opts.set_body(&JsValue::from_str(body)),
            RequestBody::Multipart(form) => opts.set_body(&form_data(form)?.into()),
        }

        let request = Request::new_with_str_and_init(&req.url, &opts).map_err(build_error)?;

        let window = web_sys::window()
            .ok_or_else(|| TransportError::Network("window is unavailable".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network_error)?;

        let response: Response = resp_value.dyn_into().map_err(network_error)?;
        let status = response.status();

        // 响应体读取失败时按空串处理，交给共享层归类
        let body = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };

        Ok(HttpResponse { status, body })
    }
}

fn form_data(form: &MultipartForm) -> Result<FormData, TransportError> {
    let data = FormData::new().map_err(build_error)?;
    for field in form.fields() {
        match field {
            FormField::Text { name, value } => {
                data.append_with_str(name, value).map_err(build_error)?;
            }
            FormField::File { name, upload } => {
                let bytes = js_sys::Uint8Array::from(upload.bytes.as_slice());
                let parts = js_sys::Array::of1(&bytes);
                let bag = BlobPropertyBag::new();
                bag.set_type(&upload.mime_type);
                let blob =
                    Blob::new_with_u8_array_sequence_and_options(&parts, &bag).map_err(build_error)?;
                data.append_with_blob_and_filename(name, &blob, &upload.file_name)
                    .map_err(build_error)?;
            }
        }
    }
    Ok(data)
}
