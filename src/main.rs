use clap::Parser;
use nimbus_atlas::{
    display, AtlasError, GazetteerStore, Pagination, QueryNormalizer, ResolvedLocation, Resolver,
    SearchFilters, SearchIndex,
};
use std::path::PathBuf;

/// Nimbus Atlas — location lookup for the Nimbus weather stack.
///
/// Resolves free-form place queries against the bundled gazetteer and
/// browses the dataset.
///
/// Examples:
///   nimbus "london, on"
///   nimbus "Frederick Maryland"
///   nimbus --search spring --country US --limit 10
///   nimbus --suggest Chi
///   nimbus --suggest
///   nimbus --stats
#[derive(Parser)]
#[command(name = "nimbus", version, about, long_about = None)]
struct Cli {
    /// Location query to resolve (positional). Example: nimbus "london, on"
    #[arg(index = 1)]
    query: Option<String>,

    /// Substring search over the city list.
    #[arg(long)]
    search: Option<String>,

    /// Restrict --search to an ISO-2 country code or country name.
    #[arg(long)]
    country: Option<String>,

    /// Restrict --search to a region (e.g. Europe, Americas).
    #[arg(long)]
    region: Option<String>,

    /// Page size for --search and --suggest.
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Page offset for --search.
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Prefix suggestions; pass no value for random discovery picks.
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    suggest: Option<String>,

    /// Print dataset statistics.
    #[arg(long)]
    stats: bool,

    /// Load the gazetteer from a JSON file instead of the bundled dataset.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let loaded;
    let store: &GazetteerStore = match &cli.data {
        Some(path) => {
            loaded = GazetteerStore::from_path(path).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            &loaded
        }
        None => GazetteerStore::embedded(),
    };

    if cli.stats {
        return print_stats(store, cli.json);
    }
    if let Some(ref query) = cli.search {
        return run_search(store, &cli, query);
    }
    if let Some(ref prefix) = cli.suggest {
        return run_suggest(store, &cli, prefix);
    }
    if let Some(ref query) = cli.query {
        return run_resolve(store, &cli, query);
    }

    eprintln!("Error: No query given.");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  nimbus \"london, on\"");
    eprintln!("  nimbus \"Frederick Maryland\"");
    eprintln!("  nimbus --search spring --country US");
    eprintln!("  nimbus --suggest Chi");
    eprintln!("  nimbus --stats");
    std::process::exit(1);
}

fn run_resolve(store: &GazetteerStore, cli: &Cli, query: &str) {
    let normalizer = QueryNormalizer::new(store);
    let resolver = Resolver::new(store);

    let normalized = normalizer.normalize(query);
    match resolver.resolve(&normalized) {
        Ok(resolved) => print_resolved(&resolved, cli.json),
        // A miss is a valid outcome: fall back to the raw query text,
        // formatted, the same way the fetch orchestrator does.
        Err(AtlasError::NotFound(raw)) => {
            eprintln!("  Not in the gazetteer; using the raw query.");
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "resolved": false,
                        "display": display::format(&raw),
                        "query": raw,
                    })
                );
            } else {
                println!("{}", display::format(&raw));
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_resolved(resolved: &ResolvedLocation, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "resolved": true,
                "key": resolved.key,
                "display": display::format(&resolved.display_name()),
                "city": resolved.city,
                "state": resolved.state,
                "country": resolved.country,
            })
        );
    } else {
        println!("{}", display::format(&resolved.display_name()));
        eprintln!("  {} [{}]", resolved.country, resolved.key);
    }
}

fn run_search(store: &GazetteerStore, cli: &Cli, query: &str) {
    let index = SearchIndex::new(store);
    let filters = SearchFilters {
        country: cli.country.clone(),
        region: cli.region.clone(),
    };
    let page = index
        .search(query, &filters, Pagination::new(cli.limit, cli.offset))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "total": page.total,
                "offset": page.offset,
                "limit": page.limit,
                "items": page.items,
            })
        );
        return;
    }

    eprintln!(
        "  {} match(es), showing {}..{}",
        page.total,
        page.offset,
        page.offset + page.items.len()
    );
    for entry in &page.items {
        let place = match &entry.state_code {
            Some(code) => format!("{}, {}", entry.city, code),
            None => entry.city.clone(),
        };
        println!("{} — {} ({})", place, entry.country_name, entry.region);
    }
}

fn run_suggest(store: &GazetteerStore, cli: &Cli, prefix: &str) {
    let index = SearchIndex::new(store);
    let prefix = if prefix.trim().is_empty() {
        None
    } else {
        Some(prefix)
    };
    let picks = index.suggest(prefix, cli.limit).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.json {
        println!("{}", serde_json::json!(picks));
        return;
    }
    for entry in picks {
        println!("{}", display::format(&entry.city));
    }
}

fn print_stats(store: &GazetteerStore, json: bool) {
    let stats = SearchIndex::new(store).stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats).unwrap());
        return;
    }
    println!("dataset {}", stats.version);
    println!(
        "{} cities, {} states/provinces, {} countries",
        stats.cities, stats.states, stats.countries
    );
    for (region, count) in &stats.by_region {
        println!("  {:<10} {}", region, count);
    }
}
