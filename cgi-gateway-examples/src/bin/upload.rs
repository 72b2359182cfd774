//! Summarize `multipart/form-data` uploads as JSON.
//!
//! Only `POST` is accepted; other methods get a 405 page. Each uploaded file
//! is reported with its field name, client file name, content type and size.
//! Plain form fields are listed separately.

use cgi_gateway::output_method_not_allowed;
use cgi_gateway::prelude::*;
use serde::Serialize;

#[derive(Serialize)]
struct UploadedFile {
    field: String,
    filename: String,
    content_type: String,
    size: usize,
}

#[derive(Serialize)]
struct Summary {
    files: Vec<UploadedFile>,
    fields: Vec<(String, String)>,
    warnings: Vec<String>,
}

fn upload(cgi: &mut Cgi) -> Result<CgiResult, CgiError> {
    if cgi.gets(|s| s.env.request_method() != "POST") {
        return Ok(output_method_not_allowed(cgi, &["POST"]));
    }

    let summary = cgi.gets(|s| {
        let mut files = Vec::new();
        let mut fields = Vec::new();
        for (name, input) in s.inputs.iter() {
            match &input.filename {
                Some(filename) => files.push(UploadedFile {
                    field: name.to_string(),
                    filename: filename.clone(),
                    content_type: input.content_type.to_string(),
                    size: input.value.len(),
                }),
                None => fields.push((name.to_string(), input.value_lossy().into_owned())),
            }
        }
        Summary {
            files,
            fields,
            warnings: s.inputs.warnings().iter().map(ToString::to_string).collect(),
        }
    });

    let body = serde_json::to_vec_pretty(&summary).map_err(CgiError::other)?;
    cgi.set_header("Content-Type", "application/json");
    Ok(output(body))
}

fn main() -> anyhow::Result<()> {
    cgi_gateway_examples::init_tracing();
    CgiRunner::new()
        .with_config(CgiConfig::new().max_body_bytes(8 * 1024 * 1024))
        .run_stdio(handle_errors(upload))?;
    Ok(())
}
