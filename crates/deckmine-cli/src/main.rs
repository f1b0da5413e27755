//! Deckmine CLI
//!
//! Usage:
//!   deckmine analyze <path> [--json]
//!   deckmine upload <dir>
//!   deckmine list
//!   deckmine migrate

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use deckmine_core::AppConfig;
use deckmine_extractor::{DocumentResult, SlideDeckExtractor};
use deckmine_graph::GraphMigrator;
use deckmine_parser::PptxParser;
use deckmine_store::DocumentStore;

#[derive(Parser)]
#[command(name = "deckmine")]
#[command(about = "Slide-deck terminology and knowledge extraction")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract terminology, entities, and relations from slide decks
    Analyze {
        /// A .pptx file or a directory of .pptx files
        path: PathBuf,

        /// Emit results as JSON instead of a readable report
        #[arg(long)]
        json: bool,
    },
    /// Upload a directory of source files to the document store
    Upload {
        /// Directory to upload
        dir: PathBuf,
    },
    /// List files in the document store
    List,
    /// Migrate extracted entities and relations into the graph database
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { path, json } => analyze(&path, json)?,
        Commands::Upload { dir } => {
            let store =
                DocumentStore::new(&config.database.postgres_url, config.database.pool_size)
                    .await?;
            store.init_schema().await?;

            let outcomes = store.upload_directory(&dir).await?;
            let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
            println!(
                "uploaded {succeeded} of {} files from {}",
                outcomes.len(),
                dir.display()
            );
        }
        Commands::List => {
            let store =
                DocumentStore::new(&config.database.postgres_url, config.database.pool_size)
                    .await?;

            for file in store.list_files().await? {
                println!(
                    "{}  {}  {} bytes  {}",
                    file.id, file.file_name, file.size, file.content_type
                );
            }
        }
        Commands::Migrate => {
            let migrator = GraphMigrator::connect(&config).await?;
            migrator.init_schema().await?;

            let report = migrator.migrate().await?;
            println!(
                "migrated {} entities, {} relations ({} skipped)",
                report.entities, report.relations, report.skipped
            );
        }
    }

    Ok(())
}

/// Run the extraction pipeline over one deck or a directory of decks.
///
/// One extractor (and thus one catalog) spans all decks, so terms
/// learned early improve matching in later files.
fn analyze(path: &Path, json: bool) -> anyhow::Result<()> {
    let decks = collect_decks(path)?;
    anyhow::ensure!(!decks.is_empty(), "no .pptx files under {}", path.display());

    let parser = PptxParser::new();
    let mut extractor = SlideDeckExtractor::new();
    let mut results: BTreeMap<String, DocumentResult> = BTreeMap::new();

    for deck in &decks {
        let name = deck
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        info!(deck = %name, "processing file");

        let pages = parser
            .parse(deck)
            .with_context(|| format!("parsing {}", deck.display()))?;
        let result = extractor
            .process_document(&pages)
            .with_context(|| format!("extracting from {}", deck.display()))?;

        results.insert(name, result);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for (name, result) in &results {
            print_document(name, result);
        }
    }

    Ok(())
}

/// All .pptx files under `path` (or `path` itself), sorted by name
fn collect_decks(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut decks: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("reading {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pptx"))
        })
        .collect();
    decks.sort();
    Ok(decks)
}

/// Readable report for one document, skipping slides with no findings
fn print_document(name: &str, result: &DocumentResult) {
    println!("\n=== 文件 {name} ===");

    println!("最终术语库:");
    for (category, terms) in &result.terms {
        if terms.is_empty() {
            continue;
        }
        println!("  {}:", category.label());
        for chunk in terms.chunks(5) {
            println!("    {}", chunk.join(", "));
        }
    }

    for page in &result.pages {
        if page.entities.is_empty() && page.relations.is_empty() {
            continue;
        }

        println!("\nSlide {}:", page.page);
        if !page.entities.is_empty() {
            println!("实体:");
            for (category, entities) in &page.entities {
                if !entities.is_empty() {
                    println!("  {}: {}", category.label(), entities.join(", "));
                }
            }
        }
        if !page.relations.is_empty() {
            println!("关系:");
            for rel in &page.relations {
                println!("  {} → {} → {}", rel.subject, rel.relation, rel.object);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_decks_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pptx"), b"x").unwrap();
        std::fs::write(dir.path().join("a.PPTX"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let decks = collect_decks(dir.path()).unwrap();
        assert_eq!(decks.len(), 2);
        assert!(decks[0].file_name().unwrap().to_str().unwrap() < decks[1]
            .file_name()
            .unwrap()
            .to_str()
            .unwrap());
    }

    #[test]
    fn test_collect_decks_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("deck.pptx");
        std::fs::write(&file, b"x").unwrap();

        let decks = collect_decks(&file).unwrap();
        assert_eq!(decks, vec![file]);
    }
}
