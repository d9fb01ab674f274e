//! # chatexport CLI
//!
//! Command-line interface for the chatexport library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatexport::cli::Args;
use chatexport::config::ExportConfig;
use chatexport::core::output::write_document;
use chatexport::document::DocumentBuilder;
use chatexport::format::{ManifestFormat, write_aux_manifest, write_media_manifest};
use chatexport::progress::stderr_progress;
use chatexport::store::MemoryStore;
use chatexport::{ExportError, Result};
use chrono::NaiveDate;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "chatexport=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();
    let config = args.export_config();
    let media_path = args.media_manifest_path();
    let aux_path = args.aux_manifest_path();

    println!("📦 chatexport v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Snapshot: {}", args.snapshot);
    println!("🧵 Thread:   {}", args.thread);
    println!("💾 Output:   {}", args.output);
    println!("📄 Format:   {}", args.format);
    println!();

    println!("⏳ Loading snapshot...");
    let load_start = Instant::now();
    let store = MemoryStore::from_path(&args.snapshot)?;
    println!(
        "   Found {} records ({:.2}s)",
        store.message_count(),
        load_start.elapsed().as_secs_f64()
    );

    let (from, until) = resolve_days(&args, &store, &config)?;
    println!("📅 Window:   {} .. {}", from, until);

    let mut builder = DocumentBuilder::new(&store, config)?;
    if args.progress {
        builder = builder.with_progress(stderr_progress());
    }

    println!("🔨 Building document...");
    let build_start = Instant::now();
    let export = builder.export(args.thread, from, until)?;
    println!(
        "   {} records in {} days ({:.2}s)",
        export.stats.records_rendered,
        export.stats.days,
        build_start.elapsed().as_secs_f64()
    );

    let format: ManifestFormat = args.format.into();
    println!("💾 Writing document and {} manifests...", format);
    write_document(&export.document, &args.output)?;
    write_media_manifest(&export.media, &media_path, format)?;
    write_aux_manifest(&export.aux_files, &aux_path, format)?;

    println!();
    println!("✅ Done! Document saved to {}", args.output);
    println!("   Media manifest: {}", media_path);
    println!("   File manifest:  {}", aux_path);

    let stats = &export.stats;
    println!();
    println!("📊 Summary:");
    println!("   Loaded:     {} records", stats.records_loaded);
    println!("   Rendered:   {} records", stats.records_rendered);
    if stats.view_once_skipped > 0 {
        println!("   View-once:  {} skipped", stats.view_once_skipped);
    }
    if stats.deleted > 0 {
        println!("   Deleted:    {} records", stats.deleted);
    }
    if stats.degraded > 0 {
        println!("   ⚠️  Degraded: {} records (see log)", stats.degraded);
    }
    println!("   Media:      {} files", stats.media_entries);
    println!("   External:   {} files", stats.aux_entries);

    println!();
    println!("⚡ Performance:");
    println!(
        "   Total time:  {:.2}s",
        total_start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Fills missing `--from`/`--until` from the thread's stored records.
fn resolve_days(
    args: &Args,
    store: &MemoryStore,
    config: &ExportConfig,
) -> Result<(NaiveDate, NaiveDate)> {
    let (from, until) = args.date_range()?;
    if let (Some(from), Some(until)) = (from, until) {
        return Ok((from, until));
    }

    let offset = config.offset()?;
    let (first, last) = store.thread_date_range(args.thread).ok_or_else(|| {
        ExportError::configuration(format!(
            "thread {} has no records; pass --from and --until",
            args.thread
        ))
    })?;

    Ok((
        from.unwrap_or_else(|| first.with_timezone(&offset).date_naive()),
        until.unwrap_or_else(|| last.with_timezone(&offset).date_naive()),
    ))
}
