//! The end-to-end resolution pipeline.
//!
//! parse → build → check. Every call starts from scratch; nothing is cached
//! between runs.

use crate::builder::GraphBuilder;
use crate::export::{FamilyDocument, TreeExporter};
use crate::forest::ResolvedForest;
use crate::integrity::IntegrityChecker;
use kinship_core::{ColumnMarkers, ParsedRows, RowParser};
use tracing::info;

/// Parses, resolves and checks a survey CSV document.
///
/// # Errors
///
/// Fails only when the header lacks one of the marker columns. Every other
/// problem is recovered from and recorded in the forest's diagnostics.
pub fn resolve_csv(text: &str, markers: &ColumnMarkers) -> kinship_core::Result<ResolvedForest> {
    let parsed = RowParser::new(markers.clone()).parse(text)?;
    Ok(resolve_rows(parsed))
}

/// Resolves and checks already parsed rows.
pub fn resolve_rows(parsed: ParsedRows) -> ResolvedForest {
    let forest = GraphBuilder::new().build(&parsed.records);
    let mut forest = IntegrityChecker::new().check(forest);

    let warnings = &mut forest.diagnostics.row_warnings;
    warnings.extend(parsed.warnings);
    warnings.sort_by_key(|w| w.line);

    info!(
        "resolved {} people from {} records: {}",
        forest.len(),
        parsed.records.len(),
        forest.diagnostics.summary()
    );
    forest
}

/// Parses, resolves, checks and exports in one call.
///
/// The forest is returned alongside the document so its diagnostics can be
/// shown next to the rendered tree.
pub fn csv_to_document(
    text: &str,
    markers: &ColumnMarkers,
) -> kinship_core::Result<(FamilyDocument, ResolvedForest)> {
    let forest = resolve_csv(text, markers)?;
    let document = TreeExporter::new().export(&forest);
    Ok((document, forest))
}
