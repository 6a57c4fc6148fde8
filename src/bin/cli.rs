//! Sommelier CLI
//!
//! Command-line interface for Sommelier operations:
//! - Compile a JSON query request against a Pinot schema
//! - Inspect a schema's dimension/metric/date partitions
//! - Generate a default config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sommelier::config::{generate_default_config, Config};
use sommelier::query::{BulkFilterSpec, FilterValue, MetricsTable, Order, QueryTable};
use sommelier::schema::parse_schema_file;

#[derive(Parser)]
#[command(name = "sommelier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fluent SQL query builder for Apache Pinot")]
#[command(long_about = "Sommelier compiles declarative query requests into Pinot SQL.\nTables are described by Pinot schema files.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: user config dir, then ./sommelier.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a query request to SQL
    Sql {
        /// Pinot schema JSON file
        #[arg(short, long)]
        schema: PathBuf,
        /// Query request JSON file
        #[arg(short, long)]
        request: PathBuf,
    },

    /// Show a schema's dimensions, metrics and date columns
    Schema {
        /// Pinot schema JSON file
        path: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// A declarative query against one table
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QueryRequest {
    select: Vec<String>,
    /// Select every dimension
    dimensions: bool,
    /// Select every metric
    metrics: bool,
    filters: BulkFilterSpec,
    group_by: Vec<String>,
    order_by: Vec<String>,
    order: Option<String>,
    limit: Option<usize>,
    start: Option<FilterValue>,
    end: Option<FilterValue>,
    date_column: Option<String>,
}

fn apply_request(table: &mut MetricsTable, request: &QueryRequest) -> Result<()> {
    let order = match request.order.as_deref() {
        None => None,
        Some(s) => Some(Order::parse(s).with_context(|| format!("Invalid order: {}", s))?),
    };

    table.select_columns(request.select.iter().cloned());
    if request.dimensions {
        table.select_all_dimensions();
    }
    if request.metrics {
        table.select_all_metrics();
    }

    table
        .apply_bulk_filters(&request.filters)
        .filter_dates_between(
            request.start.clone(),
            request.end.clone(),
            request.date_column.as_deref(),
        )
        .group_by_columns(request.group_by.iter().cloned());

    if !request.order_by.is_empty() {
        table.order_by(request.order_by.iter().cloned(), order);
    }
    if let Some(limit) = request.limit {
        table.limit(limit);
    }
    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("sommelier={}", config.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config);

    match cli.command {
        Commands::Sql {
            schema,
            request: request_path,
        } => {
            let schema = parse_schema_file(&schema)?;
            let content = std::fs::read_to_string(&request_path)
                .with_context(|| format!("Failed to read request file {:?}", request_path))?;
            let request: QueryRequest = serde_json::from_str(&content)
                .with_context(|| format!("Invalid query request {:?}", request_path))?;

            let mut table = MetricsTable::from_schema(&schema)?.with_format(config.sql_format());
            apply_request(&mut table, &request)?;

            let sql = table.get_sql_query()?;
            if sql.is_empty() {
                tracing::warn!(table = %schema.name, "Request selects no columns");
            }
            println!("{}", sql);
        }

        Commands::Schema { path, json } => {
            let schema = parse_schema_file(&path)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            } else {
                println!("Schema: {}", schema.name);
                println!();
                println!("Dimensions:");
                for (name, data_type) in schema.dimensions.iter() {
                    println!("  {:<30} {}", name, data_type);
                }
                println!();
                println!("Metrics:");
                for (name, data_type) in schema.metrics.iter() {
                    println!("  {:<30} {}", name, data_type);
                }
                println!();
                println!("Date columns:");
                for field in &schema.date_columns {
                    println!(
                        "  {:<30} {:<8} {} ({})",
                        field.name, field.data_type, field.format, field.granularity
                    );
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sommelier::schema::parse_schema;

    fn flights() -> MetricsTable {
        let schema = parse_schema(
            r#"{
                "schemaName": "flights",
                "dimensionFieldSpecs": [
                    {"name": "airport", "dataType": "STRING"},
                    {"name": "model", "dataType": "STRING"}
                ],
                "metricFieldSpecs": [{"name": "price", "dataType": "LONG"}],
                "dateTimeFieldSpecs": [{
                    "name": "date", "dataType": "STRING",
                    "format": "1:DAYS:SIMPLE_DATE_FORMAT:yyyyMMdd", "granularity": "1:DAYS"
                }]
            }"#,
        )
        .unwrap();
        MetricsTable::from_schema(&schema).unwrap()
    }

    #[test]
    fn test_apply_request() {
        let request: QueryRequest = serde_json::from_str(
            r#"{
                "select": ["airport", "SUM(price)"],
                "filters": {"model": {"value": ["B777", "A350"], "op": "in"}},
                "group_by": ["airport"],
                "order_by": ["SUM(price)"],
                "order": "desc",
                "limit": 5,
                "start": "20180101",
                "end": "20180106"
            }"#,
        )
        .unwrap();

        let mut table = flights();
        apply_request(&mut table, &request).unwrap();
        assert_eq!(
            table.get_sql_query().unwrap(),
            "SELECT SUM(price),airport FROM flights WHERE date>='20180101' AND date<='20180106' \
             AND model IN ('B777','A350') GROUP BY airport ORDER BY SUM(price) DESC LIMIT 5"
        );
    }

    #[test]
    fn test_apply_request_all_columns() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"dimensions": true, "metrics": true}"#).unwrap();
        let mut table = flights();
        apply_request(&mut table, &request).unwrap();
        assert_eq!(table.get_sql_query().unwrap(), "SELECT * FROM flights");
    }

    #[test]
    fn test_apply_request_rejects_bad_order() {
        let request: QueryRequest =
            serde_json::from_str(r#"{"select": ["airport"], "order": "up"}"#).unwrap();
        assert!(apply_request(&mut flights(), &request).is_err());
    }
}
