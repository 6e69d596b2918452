use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::app::{AppContext, Result};
use crate::domain::Query;
use crate::export;
use crate::sources::{self, Source, SourceModel};

const PROGRESS_TICK: Duration = Duration::from_millis(500);

/// One line per source: id, display name, search model, page size and how
/// locations are given.
pub fn format_sources() -> Vec<String> {
    sources::registry()
        .iter()
        .map(|source| {
            let model = match source.model() {
                SourceModel::Listing => "listing",
                SourceModel::Detail => "detail",
            };
            let mode = match source.locations() {
                Some(list) => format!("{} fixed locations", list.len()),
                None => "free-text locations".to_string(),
            };
            format!(
                "{:<14} {:<14} {:<8} {:>3}/page  {}",
                source.id(),
                source.display_name(),
                model,
                source.page_size(),
                mode
            )
        })
        .collect()
}

pub fn list_sources() {
    for line in format_sources() {
        println!("{}", line);
    }
}

pub fn list_locations(name: &str) -> Result<()> {
    let source = sources::find(name)?;
    match source.locations() {
        Some(locations) => {
            for location in locations {
                println!("{}", location);
            }
        }
        None => println!("{} accepts any location", source.display_name()),
    }
    Ok(())
}

/// Warn about locations a fixed-location source will not recognise.
fn check_locations(source: &dyn Source, queries: &[Query]) {
    let Some(known) = source.locations() else {
        return;
    };
    for query in queries {
        if !known.iter().any(|location| *location == query.location) {
            tracing::warn!(
                "{} does not list '{}', the site default will be used",
                source.display_name(),
                query.location
            );
        }
    }
}

pub async fn scrape(
    ctx: &AppContext,
    source: &str,
    keywords: &str,
    locations: &str,
    output: &Path,
) -> Result<()> {
    let source = sources::find(source)?;
    let queries = match source.locations() {
        Some(known) => Query::pair_with_known(keywords, locations, &known)?,
        None => Query::pair_lists(keywords, locations)?,
    };
    check_locations(source.as_ref(), &queries);

    println!(
        "Scraping {} with {} quer{}...",
        source.display_name(),
        queries.len(),
        if queries.len() == 1 { "y" } else { "ies" }
    );

    ctx.progress.reset();
    ctx.signal.start();

    let signal = ctx.signal.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping, waiting for requests in flight...");
            signal.stop();
        }
    });

    let progress = ctx.progress.clone();
    let ticker = tokio::spawn(async move {
        let mut timer = tokio::time::interval(PROGRESS_TICK);
        loop {
            timer.tick().await;
            eprint!(
                "\rScraping in progress... Total scraped: {}",
                progress.total()
            );
            let _ = std::io::stderr().flush();
        }
    });

    let started = Instant::now();
    let records = ctx.orchestrator().run(source, queries).await;
    let elapsed = started.elapsed();

    ticker.abort();
    interrupt.abort();
    ctx.signal.stop();
    eprintln!();

    if records.is_empty() {
        eprintln!("No data was scraped.");
        return Ok(());
    }

    let written = export::write_csv_file(&records, output)?;
    println!(
        "Scraped {} records in {:.1}s, saved to {}",
        written,
        elapsed.as_secs_f64(),
        output.display()
    );

    Ok(())
}
