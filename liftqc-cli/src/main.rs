use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use liftqc_core::MergeStrategy;
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use error::{as_cli_error, print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "liftqc")]
#[command(about = "liftqc - quality control for Liftoff annotations")]
#[command(version)]
#[command(long_about = "
liftqc inspects GFF3 annotations produced by Liftoff: it repairs the reading
frame of lifted CDS features, groups genes by the types of their child
features and reports mapping statistics.

Examples:
  liftqc frame -l liftoff.gff3 -f target.fa
  liftqc children --gff liftoff.gff3 --wanted exon:transcript
  liftqc stats --gff liftoff.gff3 --outdir qc/
  liftqc config > liftqc.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recompute the frame column of CDS features in a Liftoff GFF3
    Frame {
        /// GFF3 produced by Liftoff
        #[arg(short = 'l', long)]
        liftoff_gff: PathBuf,

        /// Genome FASTA the annotation was lifted onto
        #[arg(short = 'f', long)]
        genome_fasta: PathBuf,

        /// Output GFF3 (defaults to <liftoff_gff>_new.gff)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Group genes by the types of their child features
    Children {
        /// Input GFF3
        #[arg(long)]
        gff: PathBuf,

        /// Child signatures to report (e.g. 'exon:transcript')
        #[arg(long, num_args = 1..)]
        wanted: Vec<String>,

        /// Output table
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// How duplicate feature ids are handled
        #[arg(long)]
        merge_strategy: Option<MergeStrategyArg>,
    },

    /// Write coverage, per-sequence and whole-genome feature statistics
    Stats {
        /// Input GFF3
        #[arg(long)]
        gff: PathBuf,

        /// Per-sequence feature count table
        #[arg(long)]
        seqstats: Option<PathBuf>,

        /// Whole-genome feature count table
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Directory for <gene_type>.mapping_stats.tab files
        #[arg(long)]
        outdir: Option<PathBuf>,

        /// Gene types that get a coverage report
        #[arg(long, num_args = 1..)]
        gene_types: Vec<String>,

        /// How duplicate feature ids are handled
        #[arg(long)]
        merge_strategy: Option<MergeStrategyArg>,
    },

    /// Print an example configuration file
    Config {
        /// Write the example here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MergeStrategyArg {
    Error,
    CreateUnique,
}

impl From<MergeStrategyArg> for MergeStrategy {
    fn from(arg: MergeStrategyArg) -> Self {
        match arg {
            MergeStrategyArg::Error => MergeStrategy::Error,
            MergeStrategyArg::CreateUnique => MergeStrategy::CreateUnique,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.quiet)?;

    let config = Config::load(cli.config.as_deref())?;

    let threads = cli.threads.unwrap_or(config.general.threads);
    if threads == 0 {
        return Err(CliError::validation("--threads must be at least 1").into());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to set thread count")?;

    match cli.command {
        Commands::Frame {
            liftoff_gff,
            genome_fasta,
            out,
        } => {
            commands::frame::execute(&config, liftoff_gff, genome_fasta, out)?;
        }

        Commands::Children {
            gff,
            wanted,
            out,
            merge_strategy,
        } => {
            commands::children::execute(&config, gff, wanted, out, merge_strategy.map(Into::into))?;
        }

        Commands::Stats {
            gff,
            seqstats,
            summary,
            outdir,
            gene_types,
            merge_strategy,
        } => {
            commands::stats::execute(
                &config,
                commands::stats::StatsArgs {
                    gff,
                    seqstats,
                    summary,
                    outdir,
                    gene_types,
                    merge_strategy: merge_strategy.map(Into::into),
                },
            )?;
        }

        Commands::Config { out } => {
            commands::config::execute(out)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        match as_cli_error(&err) {
            Some(cli_err) => {
                if err.chain().count() > 1 {
                    eprintln!("Error: {}", err);
                }
                print_error_and_exit(&cli_err);
            }
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_frame_flags() {
        let cli = Cli::try_parse_from(["liftqc", "-vv", "frame", "-l", "a.gff3", "-f", "g.fa"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Frame { liftoff_gff, genome_fasta, out } => {
                assert_eq!(liftoff_gff, PathBuf::from("a.gff3"));
                assert_eq!(genome_fasta, PathBuf::from("g.fa"));
                assert!(out.is_none());
            }
            _ => panic!("expected frame command"),
        }
    }

    #[test]
    fn test_parse_merge_strategy() {
        let cli = Cli::try_parse_from([
            "liftqc",
            "children",
            "--gff",
            "a.gff3",
            "--merge-strategy",
            "create-unique",
            "--wanted",
            "exon:transcript",
            "CDS:exon:mRNA:transcript",
        ])
        .unwrap();
        match cli.command {
            Commands::Children { wanted, merge_strategy, .. } => {
                assert_eq!(wanted.len(), 2);
                assert_eq!(MergeStrategy::from(merge_strategy.unwrap()), MergeStrategy::CreateUnique);
            }
            _ => panic!("expected children command"),
        }
    }
}
