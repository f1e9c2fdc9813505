//! Minimal CLI: fetch schema → one TypeScript interface file per definition.
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate TypeScript interfaces from a Swagger schema document
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// schema source: an http(s) URL or a local JSON file path
    source: String,

    /// output directory for the generated .ts files
    #[arg(short, long, default_value = "./api")]
    out: PathBuf,

    /// print the planned output paths instead of writing files
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        // 1) retrieve + parse the document
        let document = crate::fetch::load_document(&self.source)?;

        // 2) pure planning pass over all definitions
        let plan = crate::pipeline::plan(&document);
        for (name, error) in &plan.skipped {
            eprintln!("{} {name}: {error}", "skipped".yellow().bold());
        }

        if self.dry_run {
            for file in &plan.files {
                println!("{}", self.out.join(&file.file_name).display());
            }
            return Ok(());
        }

        // 3) write everything under the output directory
        let written = crate::pipeline::write_plan(&plan, &self.out)?;
        for path in &written {
            eprintln!("{} {}", "wrote".green().bold(), path.display());
        }
        Ok(())
    }
}
