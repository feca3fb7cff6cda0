use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rfm_segments::config::REFERENCE_DATE_ENV;
use rfm_segments::{
    classify, export, loader, pipeline, report, AnalysisConfig, ColumnMap, Segment,
    SegmentedCustomer,
};

#[derive(Parser)]
#[command(name = "rfm-segments")]
#[command(about = "RFM scoring and customer segmentation for retail transactions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score and segment every customer
    Score {
        #[command(flatten)]
        input: InputArgs,
        /// Only keep customers in this segment, e.g. "Champions"
        #[arg(long)]
        segment: Option<Segment>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Count customers in each segment
    Segments {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        /// Customers listed per segment
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the segment for a composite RFM code such as 455
    Classify { code: String },
}

#[derive(Args)]
struct InputArgs {
    /// Transaction CSV export
    #[arg(long)]
    csv: PathBuf,
    /// Fixed "now" used for recency, e.g. 2012-01-01
    #[arg(long, env = REFERENCE_DATE_ENV)]
    reference_date: Option<String>,
    #[command(flatten)]
    columns: ColumnArgs,
}

#[derive(Args)]
struct ColumnArgs {
    #[arg(long, default_value = "CustomerID")]
    customer_column: String,
    #[arg(long, default_value = "InvoiceNo")]
    invoice_column: String,
    #[arg(long, default_value = "InvoiceDate")]
    date_column: String,
    #[arg(long, default_value = "Quantity")]
    quantity_column: String,
    #[arg(long, default_value = "UnitPrice")]
    price_column: String,
}

impl ColumnArgs {
    fn to_map(&self) -> ColumnMap {
        ColumnMap {
            customer_id: self.customer_column.clone(),
            invoice_id: self.invoice_column.clone(),
            invoice_date: self.date_column.clone(),
            quantity: self.quantity_column.clone(),
            unit_price: self.price_column.clone(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("RFM_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            input,
            segment,
            format,
            out,
        } => {
            let (_, table) = run_analysis(&input)?;
            let rows: Vec<SegmentedCustomer> = match segment {
                Some(segment) => report::filter_by_segment(&table, segment)
                    .into_iter()
                    .cloned()
                    .collect(),
                None => table,
            };

            if rows.is_empty() {
                if matches!(format, OutputFormat::Table) {
                    println!("No customers found.");
                    return Ok(());
                }
                tracing::warn!("no customers found, writing an empty table");
            }

            match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    write_rows(format, &rows, file)?;
                    println!("Wrote {} customers to {}.", rows.len(), path.display());
                }
                None => write_rows(format, &rows, io::stdout().lock())?,
            }
        }
        Commands::Segments { input } => {
            let (_, table) = run_analysis(&input)?;
            println!("Customers per segment:");
            for entry in report::count_by_segment(&table) {
                println!(
                    "- {}: {} ({:.1}%)",
                    entry.segment, entry.count, entry.share
                );
            }
        }
        Commands::Report { input, out, limit } => {
            let (config, table) = run_analysis(&input)?;
            let markdown = report::build_report(config.reference_date, &table, limit);
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Classify { code } => {
            println!("{}", classify(code.trim()));
        }
    }

    Ok(())
}

fn run_analysis(input: &InputArgs) -> anyhow::Result<(AnalysisConfig, Vec<SegmentedCustomer>)> {
    let config = AnalysisConfig::new(input.reference_date.as_deref(), input.columns.to_map())?;
    let loaded = loader::load_csv(&input.csv, &config.columns)?;
    let table = pipeline::analyze(config.reference_date, &loaded.transactions)?;
    Ok((config, table))
}

fn write_rows<W: Write>(
    format: OutputFormat,
    rows: &[SegmentedCustomer],
    mut writer: W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            for row in rows {
                writeln!(
                    writer,
                    "- {} ({}) {}: recency {} days, {} orders, {:.2} spent",
                    row.customer_id, row.code, row.segment, row.recency, row.frequency, row.monetary
                )?;
            }
        }
        OutputFormat::Csv => export::write_csv(rows, writer)?,
        OutputFormat::Json => {
            export::write_json(rows, &mut writer)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
