//! `recover` and `fix` commands.

use anyhow::Result;

use sitetree::Structure;
use sitetree::logger;
use sitetree::utils::plural_count;

pub fn run_recover(structure: &Structure) -> Result<()> {
    let report = structure.tree().recover()?;
    if report.changed == 0 {
        logger::success("tree is consistent");
    } else {
        logger::success(&format!("renumbered {}", plural_count(report.changed, "node")));
    }
    Ok(())
}

pub fn run_fix(structure: &Structure) -> Result<()> {
    let report = structure.fix()?;

    if report.issues.is_empty() {
        logger::success(&format!(
            "{} untranslated, {} purged",
            plural_count(report.missing.len(), "translation"),
            plural_count(report.purged.len(), "node"),
        ));
        return Ok(());
    }

    let detail = report
        .issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n");
    logger::failure("tree needs `sitetree recover`", &detail);
    Ok(())
}
