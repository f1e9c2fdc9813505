//! The emission engine: `$ref` resolution, generic binding, property type
//! projection, import collection, and interface rendering.
//!
//! All of it is pure: context (the definition's generic scope, the file's
//! import set) is threaded through as parameters, never held in shared state.
//! Errors are definition-scoped; the pipeline reports and moves on.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::swagger::{SwaggerDefinition, SwaggerProperty};
use crate::type_expr::{self, InvalidTypeName, TypeExpr};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("reference {0:?} does not match #/definitions/<Name>")]
    MalformedReference(String),
    #[error(transparent)]
    InvalidTypeName(#[from] InvalidTypeName),
}

// ————————————————————————————————————————————————————————————————————————————
// REFERENCE RESOLVER
// ————————————————————————————————————————————————————————————————————————————

static REF_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"#/definitions/([^/]*)$").unwrap());

/// `#/definitions/Page«Version»` → `ApiPage<ApiVersion>`.
///
/// A pointer that does not match the pattern is surfaced as
/// [`GenerateError::MalformedReference`], never defaulted: a bad reference
/// means a schema this generator cannot safely model.
pub fn resolve_ref(pointer: &str) -> Result<String, GenerateError> {
    let caps = REF_PATTERN
        .captures(pointer)
        .ok_or_else(|| GenerateError::MalformedReference(pointer.to_string()))?;
    Ok(type_expr::normalize_name(&caps[1])?)
}

// ————————————————————————————————————————————————————————————————————————————
// GENERIC BINDER
// ————————————————————————————————————————————————————————————————————————————

/// Positional generic parameters captured from a definition's own title,
/// keyed by the rendered argument string. Built once per definition; the
/// projector looks resolved reference names up here before importing them.
#[derive(Debug, Default)]
pub struct GenericScope {
    params: IndexMap<String, usize>,
}

impl GenericScope {
    /// Split `title` into its base interface name and captured generic scope.
    ///
    /// `HttpResponse«Page«Version»»` → (`ApiHttpResponse`, {`ApiPage<ApiVersion>` → T0}).
    /// The top-level argument list is captured as a single combined slot
    /// (`Map«string,Version»` captures `Map<string,ApiVersion>` whole), which
    /// is what the projector's single-slot substitution expects.
    pub fn bind(title: &str) -> Result<(String, GenericScope), GenerateError> {
        let expr = type_expr::normalize(&type_expr::parse(title)?);
        let mut scope = GenericScope::default();
        let base = match &expr {
            TypeExpr::Named(name) => name.clone(),
            TypeExpr::Generic(head, args) => {
                let captured = args
                    .iter()
                    .map(type_expr::render)
                    .collect::<Vec<_>>()
                    .join(",");
                let slot = scope.params.len();
                scope.params.insert(captured, slot);
                head.clone()
            }
        };
        Ok((base, scope))
    }

    /// `Some("Ti")` when `type_name` is the i-th captured argument.
    pub fn substitute(&self, type_name: &str) -> Option<String> {
        self.params.get(type_name).map(|i| format!("T{i}"))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Declared parameter list for the interface header: `<T0, T1, …>`,
    /// or the empty string when nothing was captured.
    pub fn declaration(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        let names = (0..self.params.len())
            .map(|i| format!("T{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("<{names}>")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPORT COLLECTOR
// ————————————————————————————————————————————————————————————————————————————

/// Deduplicated import lines for one emitted file.
#[derive(Debug, Default)]
pub struct ImportSet {
    lines: Vec<String>,
}

impl ImportSet {
    /// Register `type_name` and, recursively, each of its generic arguments:
    /// `ApiFoo<ApiBar>` registers both `ApiFoo` and `ApiBar`. Built-ins and
    /// `T<n>` placeholders are never registered; duplicates are dropped.
    pub fn add(&mut self, type_name: &str) {
        if type_name.is_empty() {
            return;
        }
        // Names arrive here already normalized; an unparsable one has nothing
        // importable in it.
        if let Ok(expr) = type_expr::parse(type_name) {
            self.add_expr(&expr);
        }
    }

    fn add_expr(&mut self, expr: &TypeExpr) {
        if !type_expr::is_builtin(expr.head()) {
            let line = import_line(expr.head());
            if !self.lines.contains(&line) {
                self.lines.push(line);
            }
        }
        if let TypeExpr::Generic(_, args) = expr {
            for arg in args {
                self.add_expr(arg);
            }
        }
    }

    /// Rendered lines, minus any self-import of `own_type`.
    pub fn render(&self, own_type: &str) -> Vec<String> {
        let own = import_line(own_type);
        self.lines.iter().filter(|l| **l != own).cloned().collect()
    }
}

fn import_line(type_name: &str) -> String {
    format!(
        "import {{ {type_name} }} from './{}';",
        type_expr::hyphenate(type_name)
    )
}

// ————————————————————————————————————————————————————————————————————————————
// PROPERTY TYPE PROJECTOR
// ————————————————————————————————————————————————————————————————————————————

const NUMERIC_ALIASES: &[&str] = &["integer", "double", "float", "number"];

/// Free-form `object` values and anything unresolvable.
const DYNAMIC: &str = "any";

/// String-keyed dynamic map, for `type: Map`.
const STRING_KEYED_MAP: &str = "{ [key: string]: any }";

/// Compute the emitted TypeScript type expression for one property.
///
/// `imports` is `None` on nested recursive calls where the outer caller owns
/// import collection; `scope` is `None` when the enclosing definition has no
/// generic parameters. First matching rule wins.
pub fn project_type(
    name: Option<&str>,
    property: Option<&SwaggerProperty>,
    mut imports: Option<&mut ImportSet>,
    scope: Option<&GenericScope>,
) -> Result<String, GenerateError> {
    if let Some(n) = name {
        if NUMERIC_ALIASES.contains(&n) {
            return Ok("number".to_string());
        }
        if n == "string" || n == "boolean" {
            return Ok(n.to_string());
        }
        if n == "object" {
            return Ok(DYNAMIC.to_string());
        }
        if n == "Map" {
            return Ok(STRING_KEYED_MAP.to_string());
        }
        if n == "array" || n == "List" {
            if let Some(items) = property.and_then(|p| p.items.as_ref()) {
                let element = match items.ref_.as_deref() {
                    Some(pointer) => {
                        let resolved = resolve_ref(pointer)?;
                        substitute_or_import(resolved, &mut imports, scope)
                    }
                    // element is a scalar tag; no import collection downstream
                    None => project_type(items.type_.as_deref(), None, None, None)?,
                };
                return Ok(format!("Array<{element}>"));
            }
        }
    }
    if name.is_none() {
        if let Some(pointer) = property.and_then(|p| p.ref_.as_deref()) {
            let resolved = resolve_ref(pointer)?;
            return Ok(substitute_or_import(resolved, &mut imports, scope));
        }
    }
    match name {
        Some(n) if !n.is_empty() => {
            let expr = type_expr::normalize(&type_expr::parse(n)?);
            match &expr {
                // The generic argument is dropped at this emission site: it is
                // the caller definition's own parameter, bound via its title.
                TypeExpr::Generic(head, args) => {
                    if let Some(imports) = imports.as_deref_mut() {
                        for arg in args {
                            imports.add(&type_expr::render(arg));
                        }
                    }
                    Ok(head.clone())
                }
                TypeExpr::Named(name) => Ok(name.clone()),
            }
        }
        _ => Ok(DYNAMIC.to_string()),
    }
}

/// Generic-substitution-vs-import decision for a resolved reference name.
fn substitute_or_import(
    resolved: String,
    imports: &mut Option<&mut ImportSet>,
    scope: Option<&GenericScope>,
) -> String {
    if let Some(placeholder) = scope.and_then(|s| s.substitute(&resolved)) {
        return placeholder;
    }
    if let Some(imports) = imports.as_deref_mut() {
        imports.add(&resolved);
    }
    resolved
}

// ————————————————————————————————————————————————————————————————————————————
// INTERFACE EMITTER
// ————————————————————————————————————————————————————————————————————————————

/// One fully rendered interface file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedInterface {
    /// Base interface name, e.g. `ApiHttpResponse`.
    pub type_name: String,
    /// Deterministic file name, e.g. `api-http-response.ts`.
    pub file_name: String,
    pub text: String,
}

/// Assemble the complete file text for one definition.
pub fn emit_interface(definition: &SwaggerDefinition) -> Result<EmittedInterface, GenerateError> {
    let (base, scope) = GenericScope::bind(&definition.title)?;
    let scope_ref = if scope.is_empty() { None } else { Some(&scope) };
    let mut imports = ImportSet::default();

    let mut body = Vec::new();
    for (key, property) in &definition.properties {
        if let Some(desc) = &property.description {
            body.push("  /**".to_string());
            body.push(format!("   * {desc}"));
            body.push("   */".to_string());
        }
        let projected = project_type(
            property.type_.as_deref(),
            Some(property),
            Some(&mut imports),
            scope_ref,
        )?;
        let optional = if definition.required.iter().any(|r| r == key) { "" } else { "?" };
        let nullable = if property.allow_empty_value { " | null" } else { "" };
        body.push(format!("  {key}{optional}: {projected}{nullable};"));
    }

    let mut lines = imports.render(&base);
    if !lines.is_empty() {
        lines.push(String::new());
    }
    if let Some(desc) = &definition.description {
        lines.push("/**".to_string());
        lines.push(format!(" * {desc}"));
        lines.push(" */".to_string());
    }
    lines.push(format!("export interface {base}{} {{", scope.declaration()));
    lines.extend(body);
    lines.push("}".to_string());
    lines.push(String::new());

    Ok(EmittedInterface {
        file_name: format!("{}.ts", type_expr::hyphenate(&base)),
        type_name: base,
        text: lines.join("\n"),
    })
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swagger::SwaggerDocument;

    fn definition(src: serde_json::Value) -> SwaggerDefinition {
        serde_json::from_value(src).unwrap()
    }

    #[test]
    fn bind_captures_the_nested_argument_whole() {
        let (base, scope) = GenericScope::bind("HttpResponse«Page«Version»»").unwrap();
        assert_eq!(base, "ApiHttpResponse");
        let captured: Vec<&str> = scope.params.keys().map(String::as_str).collect();
        assert_eq!(captured, ["ApiPage<ApiVersion>"]);
        assert_eq!(scope.declaration(), "<T0>");
    }

    #[test]
    fn bind_captures_map_arguments_as_one_slot() {
        let (base, scope) = GenericScope::bind("HttpResponse«Map«string,Version»»").unwrap();
        assert_eq!(base, "ApiHttpResponse");
        let captured: Vec<&str> = scope.params.keys().map(String::as_str).collect();
        assert_eq!(captured, ["Map<string,ApiVersion>"]);
    }

    #[test]
    fn bind_plain_title_has_no_parameters() {
        let (base, scope) = GenericScope::bind("Version").unwrap();
        assert_eq!(base, "ApiVersion");
        assert!(scope.is_empty());
        assert_eq!(scope.declaration(), "");
    }

    #[test]
    fn bind_rejects_malformed_titles() {
        assert!(matches!(
            GenericScope::bind("HttpResponse«"),
            Err(GenerateError::InvalidTypeName(_))
        ));
    }

    #[test]
    fn refs_resolve_through_the_normalizer() {
        assert_eq!(resolve_ref("#/definitions/ActDetail").unwrap(), "ApiActDetail");
        assert_eq!(
            resolve_ref("#/definitions/Page«Version»").unwrap(),
            "ApiPage<ApiVersion>"
        );
        assert_eq!(
            resolve_ref("#/definitions/Map«string,Version»").unwrap(),
            "Map<string,ApiVersion>"
        );
    }

    #[test]
    fn bad_pointers_are_malformed_references() {
        assert!(matches!(
            resolve_ref("definitions/Foo"),
            Err(GenerateError::MalformedReference(_))
        ));
        assert!(matches!(
            resolve_ref("#/parameters/Foo"),
            Err(GenerateError::MalformedReference(_))
        ));
        // empty trailing segment resolves to nothing parseable
        assert!(resolve_ref("#/definitions/").is_err());
    }

    #[test]
    fn numeric_aliases_collapse_to_number() {
        for alias in ["integer", "double", "float", "number"] {
            assert_eq!(project_type(Some(alias), None, None, None).unwrap(), "number");
        }
    }

    #[test]
    fn scalar_and_dynamic_tags() {
        assert_eq!(project_type(Some("string"), None, None, None).unwrap(), "string");
        assert_eq!(project_type(Some("boolean"), None, None, None).unwrap(), "boolean");
        assert_eq!(project_type(Some("object"), None, None, None).unwrap(), "any");
        assert_eq!(
            project_type(Some("Map"), None, None, None).unwrap(),
            "{ [key: string]: any }"
        );
        assert_eq!(project_type(None, None, None, None).unwrap(), "any");
    }

    #[test]
    fn array_of_ref_imports_its_element() {
        let prop: SwaggerProperty = serde_json::from_value(serde_json::json!({
            "type": "array",
            "items": { "$ref": "#/definitions/ActDetail" }
        }))
        .unwrap();
        let mut imports = ImportSet::default();
        let ty = project_type(Some("array"), Some(&prop), Some(&mut imports), None).unwrap();
        assert_eq!(ty, "Array<ApiActDetail>");
        assert_eq!(
            imports.render("ApiOwner"),
            ["import { ApiActDetail } from './api-act-detail';"]
        );
    }

    #[test]
    fn array_of_scalar_recurses_without_imports() {
        let prop: SwaggerProperty = serde_json::from_value(serde_json::json!({
            "type": "List",
            "items": { "type": "integer" }
        }))
        .unwrap();
        let mut imports = ImportSet::default();
        let ty = project_type(Some("List"), Some(&prop), Some(&mut imports), None).unwrap();
        assert_eq!(ty, "Array<number>");
        assert!(imports.render("ApiOwner").is_empty());
    }

    #[test]
    fn ref_matching_a_captured_argument_becomes_a_placeholder() {
        let (_, scope) = GenericScope::bind("HttpResponse«Page«Version»»").unwrap();
        let prop: SwaggerProperty = serde_json::from_value(serde_json::json!({
            "$ref": "#/definitions/Page«Version»"
        }))
        .unwrap();
        let mut imports = ImportSet::default();
        let ty = project_type(None, Some(&prop), Some(&mut imports), Some(&scope)).unwrap();
        assert_eq!(ty, "T0");
        assert!(imports.render("ApiHttpResponse").is_empty(), "no import for a bound parameter");
    }

    #[test]
    fn array_element_matching_a_captured_argument_becomes_a_placeholder() {
        let (_, scope) = GenericScope::bind("Page«Record»").unwrap();
        let prop: SwaggerProperty = serde_json::from_value(serde_json::json!({
            "type": "array",
            "items": { "$ref": "#/definitions/Record" }
        }))
        .unwrap();
        let mut imports = ImportSet::default();
        let ty = project_type(Some("array"), Some(&prop), Some(&mut imports), Some(&scope)).unwrap();
        assert_eq!(ty, "Array<T0>");
        assert!(imports.render("ApiPage").is_empty());
    }

    #[test]
    fn raw_generic_type_emits_its_base_and_imports_the_argument() {
        let mut imports = ImportSet::default();
        let ty = project_type(Some("Page«Version»"), None, Some(&mut imports), None).unwrap();
        assert_eq!(ty, "ApiPage");
        assert_eq!(
            imports.render("ApiOwner"),
            ["import { ApiVersion } from './api-version';"]
        );
    }

    #[test]
    fn import_set_recurses_dedupes_and_skips_builtins() {
        let mut imports = ImportSet::default();
        imports.add("ApiHttpResponse<ApiPage<ApiVersion>>");
        imports.add("Map<string,ApiVersion>");
        imports.add("ApiPage<T0>");
        imports.add("");
        assert_eq!(
            imports.render("ApiOther"),
            [
                "import { ApiHttpResponse } from './api-http-response';",
                "import { ApiPage } from './api-page';",
                "import { ApiVersion } from './api-version';",
            ]
        );
    }

    #[test]
    fn emitted_interface_never_imports_itself() {
        let def = definition(serde_json::json!({
            "title": "Node",
            "properties": {
                "parent": { "$ref": "#/definitions/Node" },
                "label": { "type": "string" }
            }
        }));
        let emitted = emit_interface(&def).unwrap();
        assert_eq!(emitted.type_name, "ApiNode");
        assert!(!emitted.text.contains("import { ApiNode }"), "{}", emitted.text);
        assert!(emitted.text.contains("parent?: ApiNode;"));
    }

    #[test]
    fn full_interface_text_for_a_generic_definition() {
        let def = definition(serde_json::json!({
            "title": "HttpResponse«Page«Version»»",
            "description": "standard envelope",
            "required": ["code"],
            "properties": {
                "code": { "type": "integer", "description": "status code" },
                "data": { "$ref": "#/definitions/Page«Version»" },
                "trace": { "type": "string", "allowEmptyValue": true }
            }
        }));
        let emitted = emit_interface(&def).unwrap();
        assert_eq!(emitted.file_name, "api-http-response.ts");
        let expected = "\
/**
 * standard envelope
 */
export interface ApiHttpResponse<T0> {
  /**
   * status code
   */
  code: number;
  data?: T0;
  trace?: string | null;
}
";
        assert_eq!(emitted.text, expected);
    }

    #[test]
    fn imports_precede_the_interface_block() {
        let def = definition(serde_json::json!({
            "title": "Report",
            "properties": {
                "rows": { "type": "array", "items": { "$ref": "#/definitions/Row" } },
                "owner": { "$ref": "#/definitions/Account" }
            }
        }));
        let emitted = emit_interface(&def).unwrap();
        let expected = "\
import { ApiRow } from './api-row';
import { ApiAccount } from './api-account';

export interface ApiReport {
  rows?: Array<ApiRow>;
  owner?: ApiAccount;
}
";
        assert_eq!(emitted.text, expected);
    }

    #[test]
    fn definitions_parsed_from_a_document_emit_deterministically() {
        let src = r##"{
            "definitions": {
                "Version": {
                    "title": "Version",
                    "properties": { "name": { "type": "string" } }
                }
            }
        }"##;
        let a = SwaggerDocument::from_json_str(src).unwrap();
        let b = SwaggerDocument::from_json_str(src).unwrap();
        let ea = emit_interface(&a.definitions["Version"]).unwrap();
        let eb = emit_interface(&b.definitions["Version"]).unwrap();
        assert_eq!(ea, eb);
    }
}
