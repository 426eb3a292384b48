//! Atlas Query CLI
//!
//! Command-line interface for country code resolution, filtering and visa
//! queries over a reference data directory.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use atlas_query::{
    audit, load_atlas, project, project_all, Airport, Atlas, Country, FieldView, Filterable,
    Page, QueryError, Severity,
};

#[derive(Parser)]
#[command(name = "atlas-query")]
#[command(about = "Query country, visa and airport reference data")]
#[command(version)]
struct Cli {
    /// Data source: directory or URL prefix holding countries.json,
    /// passports.json and (optionally) airports.json
    #[arg(long, global = true, default_value = "data")]
    data: String,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log snapshot details (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve any country code to its canonical key
    Resolve {
        /// ISO alpha-2, alpha-3, numeric, IOC or FIFA code
        code: String,
    },

    /// List countries matching every --where predicate
    Countries {
        #[command(flatten)]
        query: ListArgs,
    },

    /// Show one country by any of its codes
    Country {
        code: String,

        /// Dotted field paths to project (comma-separated)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// List airports matching every --where predicate
    Airports {
        #[command(flatten)]
        query: ListArgs,
    },

    /// Show one airport by ICAO or IATA code
    Airport {
        code: String,

        /// Dotted field paths to project (comma-separated)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Visa requirements in both directions between two countries
    Visa { from: String, to: String },

    /// Destinations one passport reaches without a pre-arranged visa
    Destinations { code: String },

    /// Destinations every listed passport reaches without a pre-arranged visa
    Common {
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// List the --where predicates each dataset accepts
    Predicates,

    /// Rank passports by favorable-destination count
    Rank {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Report data-quality findings for the loaded datasets
    Audit {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[derive(clap::Args)]
struct ListArgs {
    /// Predicate as name=value (repeatable, all must match)
    #[arg(long = "where", value_name = "NAME=VALUE", value_parser = parse_predicate)]
    predicates: Vec<(String, String)>,

    /// Dotted field paths to project (comma-separated)
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,

    #[arg(long, default_value_t = 0)]
    offset: usize,

    #[arg(long)]
    limit: Option<usize>,
}

impl ListArgs {
    fn predicates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.predicates
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn parse_predicate(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got {:?}", raw)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let atlas = match load_atlas(&cli.data) {
        Ok(atlas) => atlas,
        Err(e) => {
            eprintln!("Error: loading data from {}: {}", cli.data, e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let result = run(&atlas, cli.command, cli.pretty);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run(atlas: &Atlas, command: Commands, pretty: bool) -> Result<(), u8> {
    match command {
        Commands::Resolve { code } => {
            let key = atlas.resolve(&code).map_err(report_query)?;
            emit(&serde_json::json!({ "code": code, "key": key }), pretty)
        }

        Commands::Countries { query } => {
            let found = atlas
                .filter_countries(query.predicates())
                .map_err(report_query)?;
            emit_list(&found, &query, pretty)
        }

        Commands::Country { code, fields } => {
            let country = atlas.country(&code).map_err(report_query)?;
            emit_one(country, &fields, pretty)
        }

        Commands::Airports { query } => {
            let found = atlas
                .filter_airports(query.predicates())
                .map_err(report_query)?;
            emit_list(&found, &query, pretty)
        }

        Commands::Airport { code, fields } => {
            let airport = atlas.airport(&code).map_err(report_query)?;
            emit_one(airport, &fields, pretty)
        }

        Commands::Visa { from, to } => {
            let reciprocal = atlas.reciprocal(&from, &to).map_err(report_query)?;
            emit(&reciprocal, pretty)
        }

        Commands::Destinations { code } => {
            let destinations = atlas
                .favorable_destinations(&code)
                .map_err(report_query)?;
            emit(&destinations, pretty)
        }

        Commands::Common { codes } => {
            let common = atlas.common_favorable(&codes).map_err(report_query)?;
            emit(&common, pretty)
        }

        Commands::Predicates => {
            let table: Vec<Value> = predicate_table::<Country>("countries")
                .chain(predicate_table::<Airport>("airports"))
                .collect();
            emit(&table, pretty)
        }

        Commands::Rank { limit } => {
            let ranking = atlas.rank();
            emit(&Page::new(0, limit).apply(&ranking), pretty)
        }

        Commands::Audit { format, strict } => run_audit(atlas, format, strict),
    }
}

fn predicate_table<R: Filterable>(dataset: &'static str) -> impl Iterator<Item = Value> {
    R::predicates().iter().map(move |def| {
        serde_json::json!({
            "dataset": dataset,
            "name": def.name,
            "match": def.matcher.to_string(),
        })
    })
}

fn emit_list<R: FieldView + Serialize>(found: &[&R], query: &ListArgs, pretty: bool) -> Result<(), u8> {
    let page = Page::new(query.offset, query.limit).apply(found);
    if query.fields.is_empty() {
        emit(&page, pretty)
    } else {
        emit(&project_all(page.iter().copied(), &query.fields), pretty)
    }
}

fn emit_one<R: FieldView + Serialize>(record: &R, fields: &[String], pretty: bool) -> Result<(), u8> {
    if fields.is_empty() {
        emit(record, pretty)
    } else {
        emit(&Value::Object(project(record, fields)), pretty)
    }
}

fn emit<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<(), u8> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    println!("{}", output);
    Ok(())
}

fn report_query(e: QueryError) -> u8 {
    eprintln!("Error: {}", e);
    e.exit_code() as u8
}

fn run_audit(atlas: &Atlas, format: Format, strict: bool) -> Result<(), u8> {
    let report = audit(atlas);

    match format {
        Format::Json => emit(&report, true)?,
        Format::Text => {
            println!(
                "Audited {} countries ({} codes), {} passports, {} airports\n",
                report.countries, report.codes, report.passports, report.airports
            );
            for diag in &report.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                println!(
                    "  {}{}[{}]\x1b[0m: {} - {}",
                    color, label, diag.code, diag.subject, diag.message
                );
            }
            if !report.diagnostics.is_empty() {
                println!();
            }
            if report.is_ok() && (!strict || report.warnings == 0) {
                println!(
                    "\x1b[32m✓ no errors ({} warnings)\x1b[0m",
                    report.warnings
                );
            } else {
                println!(
                    "\x1b[31m✗ {} errors, {} warnings\x1b[0m",
                    report.errors, report.warnings
                );
            }
        }
    }

    if report.is_ok() && (!strict || report.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
