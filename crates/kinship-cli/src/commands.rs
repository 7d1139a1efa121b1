//! CLI command implementations.

use crate::config;
use colored::Colorize;
use kinship_core::{ColumnMarkers, KinshipConfig};
use kinship_graph::{resolve_csv, Diagnostics, Person, ResolvedForest, TreeExporter};
use std::fs;
use std::path::Path;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Reads the input CSV and runs the resolution pipeline.
fn load_forest(config_path: Option<&Path>, input: &Path) -> Result<ResolvedForest> {
    let cwd = std::env::current_dir()?;
    let config = config::load(config_path, &cwd)?;
    let text = fs::read_to_string(input)
        .map_err(|e| format!("failed to read {}: {}", input.display(), e))?;
    debug!("Read {} bytes from {}", text.len(), input.display());

    Ok(resolve_csv(&text, &config.markers)?)
}

/// Write a default config in a directory.
pub fn init(path: &Path, danish: bool) -> Result<()> {
    let config_path = config::project_config_path(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    let markers = if danish {
        ColumnMarkers::danish()
    } else {
        ColumnMarkers::default()
    };
    KinshipConfig::with_markers(markers).save(&config_path)?;

    println!("{} Wrote {}", "✓".green(), config_path.display());
    println!("  Edit the markers to match your survey's column headers");

    Ok(())
}

/// Convert a survey CSV into the family tree document.
pub fn convert(
    config_path: Option<&Path>,
    input: &Path,
    output: Option<&Path>,
    diagnostics_path: Option<&Path>,
) -> Result<()> {
    let forest = load_forest(config_path, input)?;
    let document = TreeExporter::new().export(&forest);
    let json = document.to_json_pretty()?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!(
                "{} Family tree ({} people, {} roots) written to {}",
                "✓".green(),
                forest.len().to_string().cyan(),
                document.roots.len().to_string().cyan(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    if let Some(path) = diagnostics_path {
        fs::write(path, forest.diagnostics.to_json_pretty()?)?;
        eprintln!("{} Diagnostics written to {}", "✓".green(), path.display());
    }

    if !forest.diagnostics.is_clean() {
        eprintln!("{} {}", "⚠".yellow(), forest.diagnostics.summary());
        eprintln!("  Run {} for details", "kinship check".cyan());
    }

    Ok(())
}

/// Report data problems.
pub fn check(config_path: Option<&Path>, input: &Path, json: bool) -> Result<()> {
    let forest = load_forest(config_path, input)?;

    if json {
        println!("{}", forest.diagnostics.to_json_pretty()?);
        return Ok(());
    }

    print_report(&forest.diagnostics);
    Ok(())
}

fn print_report(diagnostics: &Diagnostics) {
    if diagnostics.is_clean() {
        println!("{} No problems found", "✓".green());
        return;
    }

    println!("{}", diagnostics.summary().yellow().bold());

    section("Row warnings", diagnostics.row_warnings.iter().map(|w| w.to_string()));
    section(
        "Unmatched parents",
        diagnostics.unmatched_references.iter().map(|u| {
            format!("{} lists \"{}\" ({})", u.child_id.cyan(), u.raw_parent_text, u.reason)
        }),
    );
    section(
        "Ambiguous parents",
        diagnostics.ambiguous_matches.iter().map(|a| {
            format!(
                "{} lists \"{}\": linked {} of {}",
                a.child_id.cyan(),
                a.raw_parent_text,
                a.chosen_id,
                a.candidate_ids.join(", ")
            )
        }),
    );
    section(
        "Duplicate names",
        diagnostics
            .duplicate_name_groups
            .iter()
            .map(|g| format!("\"{}\": {}", g.key, g.person_ids.join(", "))),
    );
    section(
        "Self references",
        diagnostics
            .self_references
            .iter()
            .map(|s| format!("{} lists itself as parent", s.person_id.cyan())),
    );
    section(
        "Cycles",
        diagnostics.cycles_detected.iter().map(|c| c.join(" → ")),
    );
    section(
        "Birth order",
        diagnostics.chronology_warnings.iter().map(|c| {
            format!(
                "{} ({}) born before parent {} ({})",
                c.child_id.cyan(),
                c.child_birth_year,
                c.parent_id,
                c.parent_birth_year
            )
        }),
    );

    if diagnostics.root_fallback_triggered {
        println!(
            "\n{} Nobody is without parents; the tree is shown flat",
            "⚠".yellow()
        );
    }
}

fn section(title: &str, lines: impl Iterator<Item = String>) {
    let lines: Vec<String> = lines.collect();
    if lines.is_empty() {
        return;
    }
    println!("\n{} ({})", title.bold(), lines.len());
    for line in lines {
        println!("  {}", line);
    }
}

/// Show forest statistics.
pub fn stats(config_path: Option<&Path>, input: &Path, json: bool) -> Result<()> {
    let forest = load_forest(config_path, input)?;
    let stats = forest.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Kinship Stats".cyan().bold());
    println!();
    println!("  {} {}", "People:".dimmed(), stats.people);
    println!("  {} {}", "Roots:".dimmed(), stats.roots);
    println!("  {} {}", "Parent links:".dimmed(), stats.parent_links);
    println!("  {} {}", "Couples:".dimmed(), stats.couples);
    println!("  {} {}", "Anomalies:".dimmed(), stats.anomalies);

    Ok(())
}

/// Show one person's close family.
pub fn relatives(config_path: Option<&Path>, input: &Path, query: &str) -> Result<()> {
    let forest = load_forest(config_path, input)?;

    let person = match forest.get(query) {
        Some(person) => person,
        None => {
            let matches = forest.find_by_name(query);
            match matches.as_slice() {
                [] => return Err(format!("no person named \"{}\"", query).into()),
                [only] => *only,
                [first, ..] => {
                    println!(
                        "{} {} people named \"{}\"; showing {}",
                        "⚠".yellow(),
                        matches.len(),
                        query,
                        first.id
                    );
                    *first
                }
            }
        }
    };

    let born = person
        .birth_date
        .map(|d| format!(" (born {})", d))
        .unwrap_or_default();
    println!("{}{}", person.name.cyan().bold(), born.dimmed());

    print_people("Parents", forest.parents(&person.id)?);
    print_people("Spouses", forest.spouses(&person.id)?);
    print_people("Siblings", forest.siblings(&person.id)?);
    print_people("Children", forest.children(&person.id)?);

    let ancestors = forest.ancestors(&person.id)?.len();
    let descendants = forest.descendants(&person.id)?.len();
    println!(
        "\n  {} {} ancestors, {} descendants",
        "Lineage:".dimmed(),
        ancestors,
        descendants
    );

    Ok(())
}

fn print_people(label: &str, people: Vec<&Person>) {
    if people.is_empty() {
        return;
    }
    let names: Vec<String> = people
        .iter()
        .map(|p| format!("{} {}", p.name, format!("[{}]", p.id).dimmed()))
        .collect();
    println!("  {} {}", format!("{}:", label).dimmed(), names.join(", "));
}
