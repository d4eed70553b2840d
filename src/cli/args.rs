use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::TemperatureBucket;
use crate::utils::constants::{DEFAULT_PREVIEW_ROWS, TABLE_ROW_CAP};

#[derive(Parser)]
#[command(name = "weather-dashboard")]
#[command(about = "Read-only dashboard over the weather observation warehouse")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every warehouse table and preview its rows
    Tables {
        #[arg(short, long, help = "Only browse tables in this schema")]
        schema: Option<String>,

        #[arg(short, long, default_value_t = DEFAULT_PREVIEW_ROWS, help = "Rows shown per table")]
        rows: usize,
    },

    /// Show a single table (at most 500 rows are fetched)
    Table {
        #[arg(short, long)]
        schema: String,

        #[arg(short, long)]
        table: String,

        #[arg(short, long, default_value_t = TABLE_ROW_CAP)]
        rows: usize,
    },

    /// Average temperature by city and over time
    Charts {
        #[arg(long, help = "Emit both series as JSON")]
        json: bool,
    },

    /// Filter the weather facts, print summary metrics and optionally export CSV
    Filter {
        #[arg(long, num_args = 0.., help = "Conditions to keep [default: all]")]
        condition: Option<Vec<String>>,

        #[arg(long, num_args = 0.., help = "Countries to keep [default: all]")]
        country: Option<Vec<String>>,

        #[arg(long, num_args = 0.., help = "Cities to keep [default: all]")]
        city: Option<Vec<String>>,

        #[arg(
            long = "range",
            num_args = 0..,
            help = "Temperature ranges to keep, e.g. '<10', '10-20', '20-30', '>=30', 'unknown' [default: all]"
        )]
        ranges: Option<Vec<TemperatureBucket>>,

        #[arg(long, default_value = "0", help = "Filtered rows to print")]
        show_rows: usize,

        #[arg(long, help = "Directory to write filtered_weather_data.csv into")]
        export: Option<PathBuf>,
    },

    /// Check the warehouse against the star schema the dashboard expects
    CheckSchema,

    /// Whole dashboard in one run: tables, charts and unfiltered metrics
    Report {
        #[arg(short, long, default_value = "5", help = "Rows shown per table")]
        rows: usize,
    },
}
