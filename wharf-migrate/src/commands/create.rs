use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::CreateArgs;
use crate::{print_info, print_success};

const TEMPLATE: &str = include_str!("../../templates/migration.rs.tmpl");

pub fn run(args: CreateArgs) -> Result<PathBuf> {
    let path = scaffold(&args.dir, &args.name, Utc::now())?;
    let module = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();

    print_success(&format!("Created {}", path.display()));
    println!();
    println!("{}", "Register it in src/database/migrations/mod.rs:".yellow().bold());
    println!("  mod {module};");
    println!("  Box::new({module}::Migration),");
    print_info("Then run `wharf-migrate up`");

    Ok(path)
}

/// Write `m<YYYYMMDD_HHMMSS>_<name>.rs` into `dir` and return its path.
pub fn scaffold(dir: &Path, name: &str, now: DateTime<Utc>) -> Result<PathBuf> {
    let name = normalize_name(name)?;
    let module = format!("m{}_{}", now.format("%Y%m%d_%H%M%S"), name);

    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join(format!("{module}.rs"));
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    fs::write(&path, TEMPLATE.replace("{{name}}", &name))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn normalize_name(name: &str) -> Result<String> {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let out = out.trim_matches('_').to_string();
    if out.is_empty() {
        bail!("migration name must contain letters or digits");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn names_are_snake_cased() {
        assert_eq!(normalize_name("Add Last-Seen").unwrap(), "add_last_seen");
        assert_eq!(normalize_name("  users__index  ").unwrap(), "users_index");
        assert!(normalize_name("--").is_err());
    }

    #[test]
    fn scaffold_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = scaffold(dir.path(), "add last seen", at()).unwrap();

        assert_eq!(
            path.file_name().unwrap(),
            "m20250314_092653_add_last_seen.rs"
        );
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("DeriveMigrationName"));
        assert!(content.contains("// add_last_seen"));
        assert!(!content.contains("{{name}}"));
    }

    #[test]
    fn scaffold_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src/database/migrations");
        let path = scaffold(&nested, "init", at()).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn scaffold_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path(), "once", at()).unwrap();
        let err = scaffold(dir.path(), "once", at()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
