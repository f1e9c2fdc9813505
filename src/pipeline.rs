//! Run orchestration: decide which definitions get a file, plan the output,
//! write it.
//!
//! Planning is pure — same document in, byte-identical plan out — so the
//! write step is a dumb loop: one `create_dir_all` up front, then a full
//! overwrite per file. A definition that fails to emit is recorded on the
//! plan and never aborts the run; filesystem failures are fatal.

use std::path::{Path, PathBuf};

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::generate::{self, EmittedInterface, GenerateError};
use crate::swagger::SwaggerDocument;

/// Definition names like `Map«string,Foo»` or `List«Foo»` are instantiated
/// container shapes with no identity of their own; they are inlined at their
/// use sites and would only produce degenerate duplicate files.
static CONTAINER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Map|List)(?:«.*»)?$").unwrap());

pub fn is_container_name(name: &str) -> bool {
    CONTAINER_NAME.is_match(name)
}

#[derive(Debug, Default)]
pub struct Plan {
    pub files: Vec<EmittedInterface>,
    /// Definitions that could not be emitted: (definition name, cause).
    pub skipped: Vec<(String, GenerateError)>,
}

/// Emit every eligible definition, in document order.
pub fn plan(document: &SwaggerDocument) -> Plan {
    let mut plan = Plan::default();
    for (name, definition) in &document.definitions {
        if is_container_name(name) {
            continue;
        }
        match generate::emit_interface(definition) {
            Ok(file) => plan.files.push(file),
            Err(error) => plan.skipped.push((name.clone(), error)),
        }
    }
    plan
}

/// Write every planned file under `out_dir`, overwriting whatever is there.
/// Returns the written paths in plan order.
pub fn write_plan(plan: &Plan, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let mut written = Vec::with_capacity(plan.files.len());
    for file in &plan.files {
        let path = out_dir.join(&file.file_name);
        std::fs::write(&path, &file.text)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

// ------------------------------- Tests ------------------------------------ //
