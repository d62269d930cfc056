//! Show one module of an alignment model.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::model::{AlignmentModel, MODEL_FILE_NAME, Module, ROOT_PATH};

#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Alignment model written by `depalign align`
    #[arg(value_name = "MODEL", default_value = MODEL_FILE_NAME)]
    pub model: PathBuf,

    /// Module path (`:a:b`) or unique module name; the root when omitted
    #[arg(short, long)]
    pub module: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl ShowCommand {
    /// # Errors
    ///
    /// Returns an error when the model cannot be loaded or the module is not found.
    pub fn execute(self) -> Result<()> {
        let model = AlignmentModel::load(&self.model)?;
        let query = self.module.as_deref().unwrap_or(ROOT_PATH);
        let path = model.resolve(query)?;
        let module = model.find(&path)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&to_json(&path, module))?);
        } else {
            print!("{}", render(&path, module));
        }
        Ok(())
    }
}

fn to_json(path: &str, module: &Module) -> serde_json::Value {
    let dependencies: serde_json::Map<String, serde_json::Value> = module
        .aligned_dependencies()
        .iter()
        .map(|(original, replacement)| (original.clone(), json!(replacement.to_string())))
        .collect();
    json!({
        "path": path,
        "name": module.name,
        "group": module.group,
        "version": module.version(),
        "originalVersion": module.original_version,
        "alignedDependencies": dependencies,
    })
}

fn render(path: &str, module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}:{}", path.bold(), module.group, module.name);
    let _ = writeln!(
        out,
        "  version: {} (was {})",
        module.version().unwrap_or("unassigned").green(),
        module.original_version.as_deref().unwrap_or("unspecified")
    );
    if module.aligned_dependencies().is_empty() {
        let _ = writeln!(out, "  no aligned dependencies");
    } else {
        let _ = writeln!(out, "  aligned dependencies:");
        for (original, replacement) in module.aligned_dependencies() {
            let _ = writeln!(out, "    {original} -> {}", replacement.to_string().cyan());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;

    #[test]
    fn test_render_lists_dependencies() {
        colored::control::set_override(false);
        let mut module = Module::new("subA", "org.acme");
        module.original_version = Some("1.0".to_string());
        module.assign_version("1.0-redhat-00001", ":subA").unwrap();
        module.insert_aligned(&Coordinate::new("g", "a", "1.0"), Coordinate::new("g", "a", "1.0-redhat-1"));

        let text = render(":subA", &module);
        assert!(text.contains(":subA org.acme:subA"));
        assert!(text.contains("version: 1.0-redhat-00001 (was 1.0)"));
        assert!(text.contains("g:a:1.0 -> g:a:1.0-redhat-1"));

        let value = to_json(":subA", &module);
        assert_eq!(value["alignedDependencies"]["g:a:1.0"], "g:a:1.0-redhat-1");
    }
}
