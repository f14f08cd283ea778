//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands. Every
//! command returns its rendered output; `execute` prints it.

use crate::config::Config;
use crate::csv_source::read_purchase_rows;
use cooccur_core::formats::persistence::MAX_PERSISTENCE_PAYLOAD_SIZE;
use cooccur_core::{
    CoOccurrenceGraph, CooccurError, GraphStats, Ingestor, Query, QueryResult, RedbStore, Session,
    graph_from_bytes, graph_to_bytes,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Resolved settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub database: PathBuf,
    pub config: Config,
    pub json_mode: bool,
}

// =============================================================================
// PATH VALIDATION
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CooccurError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CooccurError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CooccurError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize an input path and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CooccurError> {
    let canonical = path.canonicalize().map_err(|e| {
        CooccurError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CooccurError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Canonicalize the parent directory of an output path.
fn validate_output_path(path: &Path) -> Result<PathBuf, CooccurError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CooccurError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CooccurError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CooccurError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// BUILD COMMAND
// =============================================================================

/// Build the database from a purchase CSV.
pub fn cmd_build(ctx: &Context, input: &Path) -> Result<String, CooccurError> {
    let validated_path = validate_file_path(input)?;
    tracing::info!("Reading purchases from {:?}", validated_path);

    let purchases = read_purchase_rows(&validated_path, &ctx.config.csv)?;
    let mut graph = CoOccurrenceGraph::new();
    let report = Ingestor::ingest_grouped(&mut graph, &purchases.rows)?;
    tracing::info!(
        "Ingested {} transactions from {} rows",
        report.transactions,
        purchases.rows.len()
    );

    let store = RedbStore::open(&ctx.database)?;
    store.save(&graph)?;

    if ctx.json_mode {
        return to_json(&serde_json::json!({
            "database": ctx.database.to_string_lossy(),
            "rows": purchases.rows.len(),
            "skipped_rows": purchases.skipped,
            "transactions": report.transactions,
            "item_count": graph.item_count(),
            "pair_count": graph.pair_count()
        }));
    }

    Ok(format!(
        "Wrote {} items and {} pairs to {}",
        graph.item_count(),
        graph.pair_count(),
        ctx.database.display()
    ))
}

// =============================================================================
// QUERY COMMANDS
// =============================================================================

/// Load the database and answer one query.
pub fn cmd_query(ctx: &Context, query: &Query, rank: usize) -> Result<String, CooccurError> {
    let mut session = open_session(&ctx.database)?.with_rank(rank);

    if query.needs_embedding() {
        tracing::info!(
            "Factorizing {} items at rank {}",
            session.graph().item_count(),
            rank
        );
    }
    let result = session.execute(query)?;
    tracing::debug!("Query {:?} -> {} model build(s)", query, session.model_builds());

    if ctx.json_mode {
        to_json(&result)
    } else {
        Ok(render_text(query, &result))
    }
}

// =============================================================================
// EXPORT / IMPORT COMMANDS
// =============================================================================

/// Export the graph as a binary snapshot.
pub fn cmd_export(ctx: &Context, output: &Path) -> Result<String, CooccurError> {
    let session = open_session(&ctx.database)?;
    let data = graph_to_bytes(session.graph())?;

    let validated_path = validate_output_path(output)?;
    std::fs::write(&validated_path, &data)
        .map_err(|e| CooccurError::IoError(format!("Write snapshot: {}", e)))?;
    tracing::info!("Exported {} bytes to {:?}", data.len(), validated_path);

    summary(ctx, "Exported", session.graph(), output)
}

/// Import a binary snapshot into the database.
pub fn cmd_import(ctx: &Context, input: &Path) -> Result<String, CooccurError> {
    let validated_path = validate_file_path(input)?;
    validate_file_size(&validated_path, MAX_PERSISTENCE_PAYLOAD_SIZE as u64)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| CooccurError::IoError(format!("Read snapshot: {}", e)))?;
    let graph = graph_from_bytes(&data)?;

    RedbStore::open(&ctx.database)?.save(&graph)?;
    tracing::info!("Imported snapshot into {:?}", ctx.database);

    summary(ctx, "Imported", &graph, input)
}

fn summary(
    ctx: &Context,
    verb: &str,
    graph: &CoOccurrenceGraph,
    file: &Path,
) -> Result<String, CooccurError> {
    if ctx.json_mode {
        return to_json(&serde_json::json!({
            "file": file.to_string_lossy(),
            "item_count": graph.item_count(),
            "pair_count": graph.pair_count()
        }));
    }
    Ok(format!(
        "{} graph: {} items, {} pairs ({})",
        verb,
        graph.item_count(),
        graph.pair_count(),
        file.display()
    ))
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open an existing database as a session.
pub fn open_session(db_path: &Path) -> Result<Session, CooccurError> {
    if !db_path.exists() {
        return Err(CooccurError::IoError(format!(
            "Database {:?} does not exist. Run `cooccur build <csv>` first.",
            db_path
        )));
    }

    let graph = RedbStore::open(db_path)?.load()?;
    tracing::debug!(
        "Loaded {} items and {} pairs from {:?}",
        graph.item_count(),
        graph.pair_count(),
        db_path
    );
    Ok(Session::with_graph(graph))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CooccurError> {
    serde_json::to_string_pretty(value).map_err(|e| CooccurError::SerializationError(e.to_string()))
}

/// Render a query result as aligned plain text.
pub fn render_text(query: &Query, result: &QueryResult) -> String {
    if result.is_empty() {
        return "No results.".to_string();
    }

    let subject = match query {
        Query::TopWithItem { item, .. } => format!("Items bought with '{}'", item),
        Query::Related { start, depth } => format!("Related to '{}' (depth {})", start, depth),
        Query::RecommendItem { item, .. } => format!("Similar to '{}'", item),
        Query::RecommendBasket { .. } => "Recommended for basket".to_string(),
        Query::RecommendCustomer { .. } => "Recommended for customer".to_string(),
        _ => "Item".to_string(),
    };

    match result {
        QueryResult::Count(count) => match query {
            Query::Count { a, b } => {
                format!("'{}' and '{}' were bought together {} time(s)", a, b, count)
            }
            _ => count.to_string(),
        },
        QueryResult::Flag(flag) => match query {
            Query::OftenCopurchased { a, b, min_count } => format!(
                "'{}' and '{}' {} often co-purchased (min count {})",
                a,
                b,
                if *flag { "are" } else { "are not" },
                min_count
            ),
            _ => flag.to_string(),
        },
        QueryResult::Neighbors(rows) => format_table(
            &[subject.as_str(), "Count"],
            rows.iter()
                .map(|row| vec![row.name.clone(), row.count.to_string()])
                .collect(),
        ),
        QueryResult::Pairs(rows) => format_table(
            &["Item A", "Item B", "Count"],
            rows.iter()
                .map(|row| vec![row.name_a.clone(), row.name_b.clone(), row.count.to_string()])
                .collect(),
        ),
        QueryResult::Items(names) => format_table(
            &[subject.as_str()],
            names.iter().map(|name| vec![name.clone()]).collect(),
        ),
        QueryResult::Recommendations(recs) => format_table(
            &[subject.as_str(), "Similarity"],
            recs.iter()
                .map(|rec| vec![rec.name.clone(), format!("{:.4}", rec.similarity)])
                .collect(),
        ),
        QueryResult::Stats(stats) => format_stats(stats),
    }
}

fn format_stats(stats: &GraphStats) -> String {
    [
        "Co-occurrence Graph Status".to_string(),
        "==========================".to_string(),
        format!("Items:          {}", stats.item_count),
        format!("Pairs:          {}", stats.pair_count),
        format!("Total weight:   {}", stats.total_weight),
        format!("Max weight:     {}", stats.max_weight),
        format!("Isolated items: {}", stats.isolated_items),
        format!("Density:        {} per thousand", stats.density_per_thousand()),
    ]
    .join("\n")
}

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header.
fn format_table(header: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_row = |cells: &[&str]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render_row(header)];
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    lines.push(render_row(
        &rule.iter().map(String::as_str).collect::<Vec<_>>(),
    ));
    for row in &rows {
        lines.push(render_row(&row.iter().map(String::as_str).collect::<Vec<_>>()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cooccur_core::{Neighbor, Recommendation};

    #[test]
    fn table_columns_are_aligned() {
        let text = format_table(
            &["Item", "Count"],
            vec![
                vec!["whole milk".into(), "12".into()],
                vec!["soda".into(), "3".into()],
            ],
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Item        Count");
        assert_eq!(lines[1], "----------  -----");
        assert_eq!(lines[2], "whole milk  12");
        assert_eq!(lines[3], "soda        3");
    }

    #[test]
    fn empty_results_render_placeholder() {
        let text = render_text(&Query::related("x", 2), &QueryResult::Items(Vec::new()));
        assert_eq!(text, "No results.");
    }

    #[test]
    fn neighbors_use_item_header() {
        let text = render_text(
            &Query::top_with_item("milk", 3),
            &QueryResult::Neighbors(vec![Neighbor {
                name: "bread".into(),
                count: 4,
            }]),
        );
        assert!(text.starts_with("Items bought with 'milk'"));
        let header = "Items bought with 'milk'";
        assert_eq!(
            text.lines().last(),
            Some(format!("{:<width$}  4", "bread", width = header.len()).as_str())
        );
    }

    #[test]
    fn similarities_have_four_decimals() {
        let text = render_text(
            &Query::recommend_item("milk", 1),
            &QueryResult::Recommendations(vec![Recommendation {
                name: "bread".into(),
                similarity: 0.5,
            }]),
        );
        assert!(text.contains("0.5000"));
    }

    #[test]
    fn count_sentence() {
        let text = render_text(&Query::count("a", "b"), &QueryResult::Count(2));
        assert_eq!(text, "'a' and 'b' were bought together 2 time(s)");
    }

    #[test]
    fn output_path_without_parent_is_cwd() {
        let path = validate_output_path(Path::new("snapshot.cooc")).expect("validate");
        assert!(path.ends_with("snapshot.cooc"));
    }
}
