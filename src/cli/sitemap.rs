//! `sitemap` command.

use std::path::Path;

use anyhow::{Context, Result};

use sitetree::Structure;
use sitetree::core::Locale;
use sitetree::log;
use sitetree::router::Sitemap;
use sitetree::utils::plural_count;

pub fn run_sitemap(
    structure: &Structure,
    locale: &Locale,
    base_url: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let sitemap = Sitemap::build(&structure.router().sitemap(locale), base_url);

    match output {
        Some(path) => {
            let count = sitemap.len();
            sitemap
                .write(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log!("sitemap"; "wrote {} to {}", plural_count(count, "url"), path.display());
        }
        None => print!("{}", sitemap.into_xml()),
    }
    Ok(())
}
