//! Schema retrieval: an http(s) URL or a local file path.
//!
//! This is the only blocking/foreign step in the program; everything after
//! the document is in memory is pure computation.

use anyhow::Context;

use crate::swagger::SwaggerDocument;

pub fn load_document(source: &str) -> anyhow::Result<SwaggerDocument> {
    let text = if is_http_uri(source) {
        fetch_over_http(source)?
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("reading schema file {source}"))?
    };
    SwaggerDocument::from_json_str(&text)
        .with_context(|| format!("parsing schema document from {source}"))
}

fn is_http_uri(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn fetch_over_http(uri: &str) -> anyhow::Result<String> {
    let response = reqwest::blocking::get(uri)
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("fetching {uri}"))?;
    response.text().with_context(|| format!("reading body of {uri}"))
}

// ------------------------------- Tests ------------------------------------ //
