use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, Level};

use crate::analyzers::{SummaryMetrics, WeatherView};
use crate::cache::CachedWarehouse;
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::models::{Scalar, TableFetch, TableIdentifier, TabularResult};
use crate::processors::{browse_tables, distinct_values, Dimension, GroupMean, Selection};
use crate::utils::progress::QuerySpinner;
use crate::warehouse::{check_contract, Connector, PostgresConnector, WarehouseConfig};
use crate::writers::CsvExporter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    // Fail on missing credentials before any query is attempted.
    let config = WarehouseConfig::from_env()?;
    debug!(?config, "warehouse configuration loaded");
    let warehouse = CachedWarehouse::new(PostgresConnector::new(&config));

    match cli.command {
        Commands::Tables { schema, rows } => {
            let spinner = QuerySpinner::start("Listing warehouse tables...", false);
            let fetched = browse_tables(&warehouse, schema.as_deref()).await?;
            spinner.finish_and_clear();

            print_browse(&fetched, rows);
        }

        Commands::Table {
            schema,
            table,
            rows,
        } => {
            let id = TableIdentifier::new(schema, table);
            let spinner = QuerySpinner::start(&format!("Fetching {}...", id), false);
            let result = warehouse.fetch_table(&id).await;
            spinner.finish_and_clear();

            let result = result?;
            println!("{} ({} rows)", id, result.row_count());
            println!("{}", result.render(rows));
        }

        Commands::Charts { json } => {
            let view = load_view(&warehouse, json).await;
            let charts = view.charts();

            if json {
                report_degraded(&view);
                println!("{}", serde_json::to_string_pretty(&charts)?);
            } else {
                report_degraded(&view);
                println!("Average Temperature by City");
                println!("{}\n", series_table("city_name", &charts.by_city).render(usize::MAX));
                println!("Average Temperature Over Time");
                println!("{}", series_table("full_date", &charts.by_date).render(usize::MAX));
            }
        }

        Commands::Filter {
            condition,
            country,
            city,
            ranges,
            show_rows,
            export,
        } => {
            let view = load_view(&warehouse, false).await;
            report_degraded(&view);
            print_filter_options(&view);

            let mut selection: Selection = view.default_selection();
            if let Some(values) = condition {
                selection = selection.with_conditions(values);
            }
            if let Some(values) = country {
                selection = selection.with_countries(values);
            }
            if let Some(values) = city {
                selection = selection.with_cities(values);
            }
            if let Some(values) = ranges {
                selection = selection.with_buckets(values);
            }

            let filtered = view.apply(&selection);
            println!("{}", filtered.metrics.summary());

            let table = filtered.to_table();
            if show_rows > 0 {
                println!("\nFiltered Data Table");
                println!("{}", table.render(show_rows));
            }

            if let Some(dir) = export {
                let path = CsvExporter::new().write_to_dir(&table, &dir)?;
                println!("\nExported {} rows to {}", table.row_count(), path.display());
            }
        }

        Commands::CheckSchema => {
            let spinner = QuerySpinner::start("Reading warehouse catalog...", false);
            let report = check_contract(warehouse.connector()).await;
            spinner.finish_and_clear();

            let report = report?;
            println!("{}", report.summary());
            report.into_result()?;
        }

        Commands::Report { rows } => {
            let spinner = QuerySpinner::start("Listing warehouse tables...", false);
            let fetched = browse_tables(&warehouse, None).await?;
            spinner.finish_and_clear();

            println!("All Tables in '{}' Database\n", config.database);
            print_browse(&fetched, rows);

            let charts_view = load_view(&warehouse, false).await;
            report_degraded(&charts_view);
            let charts = charts_view.charts();
            println!("\nAverage Temperature by City");
            println!("{}", series_table("city_name", &charts.by_city).render(usize::MAX));
            println!("\nAverage Temperature Over Time");
            println!("{}", series_table("full_date", &charts.by_date).render(usize::MAX));

            // Second load of the facts is served from the cache.
            let filter_view = WeatherView::load(&warehouse).await;
            let metrics = SummaryMetrics::compute(filter_view.observations());
            println!("\nSummary\n{}", metrics.summary());
            debug!(entries = warehouse.len(), "query cache populated");
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    // A subscriber may already be installed when embedded; keep the first one.
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .try_init()
                .ok();
        }
        None => {
            builder.with_writer(std::io::stderr).try_init().ok();
        }
    }

    Ok(())
}

/// Checks the schema contract, then loads the facts through the cache. A
/// schema break or catalog failure yields an empty view carrying the error.
async fn load_view<C: Connector>(warehouse: &CachedWarehouse<C>, silent: bool) -> WeatherView {
    let spinner = QuerySpinner::start("Checking warehouse schema...", silent);
    let report = check_contract(warehouse.connector()).await;
    if let Err(e) = report.and_then(|r| r.into_result()) {
        spinner.finish_and_clear();
        return WeatherView::degraded(e);
    }

    spinner.set_message("Loading weather observations...");
    let view = WeatherView::load(warehouse).await;
    spinner.finish_and_clear();

    view
}

fn report_degraded(view: &WeatherView) {
    if let Some(e) = view.load_error() {
        eprintln!("Error loading weather data: {}", e);
    }
}

/// Values each filter can take, in the order they first appear in the data.
fn print_filter_options(view: &WeatherView) {
    let dimensions = [
        ("Conditions", Dimension::Condition),
        ("Countries", Dimension::Country),
        ("Cities", Dimension::City),
        ("Temperature ranges", Dimension::Bucket),
    ];
    for (label, dimension) in dimensions {
        let values = distinct_values(view.observations(), dimension);
        println!("{}: {}", label, values.join(", "));
    }
    println!();
}

fn print_browse(fetched: &[TableFetch], rows: usize) {
    for fetch in fetched {
        match &fetch.result {
            Ok(table) => {
                println!("== {} ({} rows)", fetch.table, table.row_count());
                println!("{}\n", table.render(rows));
            }
            Err(e) => {
                println!("== {}", fetch.table);
                println!("Error loading {}: {}\n", fetch.table, e);
            }
        }
    }

    let failed = fetched.iter().filter(|f| !f.is_ok()).count();
    if failed > 0 {
        println!("{} of {} tables could not be loaded", failed, fetched.len());
    }
}

/// Two-column grid of a chart series with placeholder means.
fn series_table(key_column: &str, series: &[GroupMean]) -> TabularResult {
    let rows = series
        .iter()
        .map(|g| vec![Scalar::Text(g.key.to_string()), Scalar::Text(g.mean_display())])
        .collect();

    TabularResult::new(
        vec![key_column.to_string(), "avg_temp".to_string()],
        rows,
    )
    .unwrap_or_default()
}
