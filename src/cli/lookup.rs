//! `route` and `link` commands.

use anyhow::{Context, Result};

use sitetree::Structure;
use sitetree::log;

use super::pairs_to_params;

/// Resolve `path` and print the match as JSON.
pub fn run_route(structure: &Structure, path: &str, query: &[(String, String)]) -> Result<()> {
    let hit = structure
        .router()
        .match_path(path, &pairs_to_params(query))
        .with_context(|| format!("no route for `{path}`"))?;

    log!(
        "route";
        "{} -> {} `{}` ({:?})",
        path,
        hit.node.id,
        hit.node.identifier,
        hit.kind
    );
    println!("{}", serde_json::to_string_pretty(&hit)?);
    Ok(())
}

/// Print the canonical path of `presenter:action`.
pub fn run_link(
    structure: &Structure,
    presenter: &str,
    action: &str,
    params: &[(String, String)],
    locale: Option<&str>,
) -> Result<()> {
    let path = structure
        .router()
        .construct_path(presenter, action, &pairs_to_params(params), locale)
        .with_context(|| format!("cannot link {presenter}:{action}"))?;
    println!("{path}");
    Ok(())
}
