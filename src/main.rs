use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use env_logger::{Builder, Env};
use log::{debug, info, LevelFilter};

use insurance_costs::chart::{ChartSink, ScatterSpec, SvgScatterChart};
use insurance_costs::frame;
use insurance_costs::report::{JsonSink, Report, ReportSink, TextSink};
use insurance_costs::{load_csv, Result};

/// Descriptive statistics over a medical insurance costs CSV file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV with columns age,sex,bmi,children,smoker,region,charges
    #[arg(short, long, default_value = "insurance.csv")]
    input: PathBuf,

    /// Report the average BMI of clients older than this age
    #[arg(short, long, default_value_t = 60)]
    age_threshold: i64,

    /// Write a charges-by-age scatter plot to this SVG file
    #[arg(short, long)]
    chart: Option<PathBuf>,

    /// Export the typed columns to a .csv or .parquet file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Verbose level, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn run(args: &Args) -> Result<()> {
    let dataset = load_csv(&args.input)?;

    let report = Report::build(&dataset, args.age_threshold)?;
    match args.format {
        ReportFormat::Text => TextSink::new(io::stdout().lock()).emit(&report)?,
        ReportFormat::Json => JsonSink::new(io::stdout().lock()).emit(&report)?,
    }

    if let Some(path) = &args.chart {
        let (ages, charges): (Vec<i64>, Vec<f64>) = dataset.charges_by_age()?.into_iter().unzip();
        SvgScatterChart::new(path).scatter(&ScatterSpec::default(), &ages, &charges)?;
    }

    if let Some(path) = &args.export {
        frame::export(path, dataset.columns()?)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let env = Env::new().filter("INSURANCE_LOG");
    Builder::new()
        .filter(Some("insurance_costs"), log_level)
        .parse_env(env)
        .init();

    debug!("Arguments {:#?}", args);

    let start_time = Instant::now();
    match run(&args) {
        Ok(()) => {
            info!("analysis finished in {:?}", start_time.elapsed());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
