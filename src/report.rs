// src/report.rs
// =============================================================================
// Printing bundles and format families, either as JSON or as a table.
// =============================================================================

use anyhow::Result;
use serde::Serialize;

use crate::flatten::Bundle;
use crate::formats::FormatFamily;

/// Prints bundles as pretty JSON or as a human-readable table.
pub fn print_bundles(bundles: &[Bundle], json: bool) -> Result<()> {
    if json {
        print_json(bundles)
    } else {
        print!("{}", bundle_table(bundles));
        Ok(())
    }
}

pub fn print_families(families: &[FormatFamily], json: bool) -> Result<()> {
    if json {
        print_json(families)
    } else {
        print!("{}", family_table(families));
        Ok(())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// One row per bundle, related files indented underneath.
fn bundle_table(bundles: &[Bundle]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<70} {:<18} {:>7}\n", "PRIMARY", "FORMAT", "RELATED"));
    out.push_str(&format!("{}\n", "=".repeat(97)));

    for bundle in bundles {
        out.push_str(&format!(
            "{:<70} {:<18} {:>7}\n",
            truncate(&bundle.primary.url, 67),
            bundle.family.as_deref().unwrap_or("-"),
            bundle.related.len()
        ));
        for related in &bundle.related {
            out.push_str(&format!("    + {}\n", truncate(&related.url, 90)));
        }
    }

    let files: usize = bundles.iter().map(|b| 1 + b.related.len()).sum();
    let grouped = bundles.iter().filter(|b| b.family.is_some()).count();

    out.push('\n');
    out.push_str("📊 Summary:\n");
    out.push_str(&format!("   📦 Bundles: {}\n", bundles.len()));
    out.push_str(&format!("   🧩 Recognised formats: {}\n", grouped));
    out.push_str(&format!("   📄 Files: {}\n", files));
    out
}

fn family_table(families: &[FormatFamily]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<24} {:<10} {}\n", "FAMILY", "MAIN", "RELATED"));
    out.push_str(&format!("{}\n", "=".repeat(80)));

    for family in families {
        out.push_str(&format!(
            "{:<24} {:<10} {}\n",
            family.name,
            family.main,
            family.related.join(", ")
        ));
    }
    out
}

// Shortens long URLs for display, keeping char boundaries intact.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", head)
}
