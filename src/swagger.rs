//! Swagger/OpenAPI document model — only the fields the generator reads.
//!
//! Definition and property maps are `IndexMap`s (and serde_json is built with
//! `preserve_order`) so that emission walks the document in source order and
//! two runs over the same input are byte-identical.

use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwaggerDocument {
    #[serde(default)]
    pub definitions: IndexMap<String, SwaggerDefinition>,
}

impl SwaggerDocument {
    /// Deserialize with JSON-path context in error messages.
    pub fn from_json_str(src: &str) -> anyhow::Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(src);
        match serde_path_to_error::deserialize::<_, Self>(de) {
            Ok(doc) => Ok(doc),
            Err(err) => {
                let path = err.path().to_string();
                Err(anyhow::anyhow!("at JSON path {path} → {}", err.into_inner()))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SwaggerDefinition {
    /// Raw type name, possibly generic: `HttpResponse«Page«Version»»`.
    pub title: String,
    pub description: Option<String>,
    /// Property keys that must be present; everything else gets `?`.
    pub required: Vec<String>,
    pub properties: IndexMap<String, SwaggerProperty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SwaggerProperty {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    /// Reference pointer: `#/definitions/ActDetail`.
    #[serde(rename = "$ref")]
    pub ref_: Option<String>,
    /// Element schema, present when `type` denotes a collection.
    pub items: Option<SwaggerItems>,
    pub description: Option<String>,
    /// When true the emitted type is widened with `| null`.
    #[serde(rename = "allowEmptyValue")]
    pub allow_empty_value: bool,
    /// Literal values; informational only, never affects the projected type.
    #[serde(rename = "enum")]
    pub enum_: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SwaggerItems {
    #[serde(rename = "$ref")]
    pub ref_: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

// ------------------------------- Tests ------------------------------------ //
