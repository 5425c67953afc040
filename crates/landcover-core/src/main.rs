use chrono::Utc;
use clap::Parser;
use landcover_core::types::DateRange;
use landcover_core::{load_polygon, render_report, ReportFormat, ReportOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "landcover-report", about = "Generate a land-cover change report")]
struct Cli {
    /// Start of the analysis period (YYYY-MM-DD)
    #[arg(long, default_value = "2020-01-01")]
    from: String,

    /// End of the analysis period (YYYY-MM-DD)
    #[arg(long, default_value = "2025-08-01")]
    to: String,

    /// JSON file with the area polygon as [{"lat": .., "lon": ..}, ...]
    #[arg(short, long)]
    area: Option<PathBuf>,

    /// Location label used in the report
    #[arg(short, long, default_value = "Chittagong, Bangladesh")]
    location: String,

    /// Output format (json, html)
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn parse_format(s: &str) -> Result<ReportFormat, String> {
    match s.to_lowercase().as_str() {
        "json" => Ok(ReportFormat::Json),
        "html" => Ok(ReportFormat::Html),
        _ => Err(format!("Unknown format: {s}. Use: json, html")),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let format = match parse_format(&cli.format) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let dates = match DateRange::parse(&cli.from, &cli.to) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let area = match cli.area.as_deref().map(load_polygon).transpose() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error reading area: {e}");
            std::process::exit(1);
        }
    };

    let opts = ReportOptions {
        dates,
        area,
        location: cli.location,
        pretty: cli.pretty,
    };

    match render_report(format, &opts, Utc::now()) {
        Ok(report) => {
            if let Some(output_path) = cli.output {
                if let Err(e) = std::fs::write(&output_path, &report) {
                    eprintln!("Error writing {}: {e}", output_path.display());
                    std::process::exit(1);
                }
                eprintln!("Written to {}", output_path.display());
            } else {
                println!("{report}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
