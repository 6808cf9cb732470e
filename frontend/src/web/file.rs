use stocksphere_shared::http::FileUpload;
use wasm_bindgen_futures::JsFuture;

/// 读取 `<input type="file">` 选中的文件
pub async fn read_upload(file: &web_sys::File) -> Result<FileUpload, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("{:?}", e))?;
    Ok(FileUpload {
        file_name: file.name(),
        mime_type: file.type_(),
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}

/// 文件输入框当前选中的第一个文件
pub fn first_file(input: &web_sys::HtmlInputElement) -> Option<web_sys::File> {
    input.files()?.get(0)
}
