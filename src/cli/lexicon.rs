//! Lexicon commands - validate a lexicon file or print the built-in one

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::lexicon::{Lexicon, DEFAULT_LEXICON};

/// `lexicon check [FILE]`
pub(super) fn check(file: Option<&Path>, json: bool) -> Result<()> {
    let lexicon = Lexicon::load_or_builtin(file).with_context(|| match file {
        Some(p) => format!("Invalid lexicon {}", p.display()),
        None => "Invalid built-in lexicon".to_string(),
    })?;
    let summary = lexicon.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let name = file.map_or_else(|| "built-in lexicon".to_string(), |p| p.display().to_string());
    println!(
        "{} {} {}",
        style("✓").green(),
        style(name).cyan(),
        style(format!("(version {})", summary.version.as_deref().unwrap_or("unversioned"))).dim()
    );
    println!("\n{}", style("Domains (literal words)").bold());
    for (domain, literals) in &summary.domains {
        println!("  {:<22} {}", domain, literals);
    }
    println!("\n{}", style("Register fields").bold());
    for field in &summary.register_fields {
        let scope = if field.domains.is_empty() {
            "all domains".to_string()
        } else {
            field.domains.join(", ")
        };
        println!("  {:<22} {:>4} words  {}", field.name, field.words, style(scope).dim());
    }
    println!(
        "\n  stopwords {}  inanimate nouns {}  animate verbs {}  animate qualities {}  signposts {}",
        summary.stopwords,
        summary.inanimate_nouns,
        summary.animate_verbs,
        summary.animate_qualities,
        summary.signposts
    );
    Ok(())
}

/// `lexicon dump`
pub(super) fn dump() -> Result<()> {
    print!("{}", DEFAULT_LEXICON);
    Ok(())
}
