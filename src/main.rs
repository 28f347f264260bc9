use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use pseudofinder::error::EXIT_FILE_IO_ERROR;
use pseudofinder::model::DEFAULT_TOLERANCE_BP;
use pseudofinder::{ClassifyOptions, RunConfig, SvFilter, SvType};

/// Find processed pseudogenes in structural variant calls.
#[derive(Parser, Debug)]
#[command(name = "pseudofinder")]
#[command(author, version, about)]
struct Cli {
    /// Exon table: TSV (chrom, gene_id, transcript_id, exon_index, start, end, strand)
    /// or GTF/GFF3 annotation; .gz accepted
    #[arg(long, value_name = "FILEPATH")]
    exons: PathBuf,

    /// Sample name written to every output row
    #[arg(long)]
    sample: String,

    /// Write a debug log to this file
    #[arg(long, value_name = "FILEPATH")]
    log: Option<PathBuf>,

    /// Max distance (bp) between an SV breakpoint and an exon/intron junction
    #[arg(long, default_value_t = DEFAULT_TOLERANCE_BP)]
    tolerance: u32,

    /// SV types to classify (repeatable). Default: all
    #[arg(long = "sv-type", value_name = "TYPE")]
    sv_types: Vec<SvType>,

    /// Keep only records with FILTER == PASS (or '.')
    #[arg(long)]
    pass_only: bool,

    /// Keep only records with QUAL >= this value
    #[arg(long, value_name = "QUAL")]
    min_qual: Option<f32>,

    /// Structural variant calls (VCF, optionally gzipped)
    #[arg(value_name = "FILEPATH")]
    vcf: PathBuf,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let mut classify = ClassifyOptions {
            tolerance: self.tolerance,
            ..Default::default()
        };
        if !self.sv_types.is_empty() {
            classify.sv_types = self.sv_types.clone();
        }

        RunConfig {
            exons: self.exons.clone(),
            vcf: self.vcf.clone(),
            sample: self.sample.clone(),
            classify,
            filter: SvFilter {
                pass_only: self.pass_only,
                min_qual: self.min_qual,
            },
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .write_style(env_logger::WriteStyle::Never)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} - {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn exit_with_error(msg: &str, code: i32) -> ! {
    error!("{msg}");
    eprintln!("pseudofinder ERROR: {msg}, exiting");
    std::process::exit(code);
}

fn main() {
    let cli = Cli::parse();

    if let Some(path) = &cli.log {
        if let Err(e) = init_logging(path) {
            exit_with_error(&format!("{e:#}"), EXIT_FILE_IO_ERROR);
        }
    }
    info!("program started");
    info!(
        "command line: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );

    let config = cli.run_config();
    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());

    if let Err(e) = pseudofinder::run(&config, out) {
        exit_with_error(&e.to_string(), e.exit_code());
    }

    info!("program finished");
}
