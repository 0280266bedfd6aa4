use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use log::{debug, error, info};
use ssviz_core::{
    BundledResources, DirectoryResources, DotBracket, PolygonLayout, ResourceLocator, Visualizer,
};

#[derive(Clone, Copy, clap::ValueEnum)]
enum Format {
    Svg,
    Json,
}

/// Per-residue scores; absent entries leave the residue uncoloured.
#[derive(Clone, Debug)]
struct Scores(Vec<Option<f64>>);

fn parse_scores(s: &str) -> Result<Scores, String> {
    s.split(',')
        .map(|item| match item.trim() {
            "" | "-" => Ok(None),
            t if t.eq_ignore_ascii_case("null") || t.eq_ignore_ascii_case("nan") => Ok(None),
            t => t
                .parse::<f64>()
                .map(Some)
                .map_err(|e| format!("invalid score {t:?}: {e}")),
        })
        .collect::<Result<_, _>>()
        .map(Scores)
}

/// Secondary structure renderer with per-residue score colouring
#[derive(Parser)]
#[command(name = "ssviz", version)]
struct Cli {
    /// Dot-bracket structure notation (`+` separates strands)
    #[arg(short, long)]
    structure: String,

    /// Residue sequence (default: N for every position)
    #[arg(short = 'q', long)]
    sequence: Option<String>,

    /// Comma-separated scores in [0, 1]; `-`, `null`, `nan` or an empty
    /// entry mark a residue without data
    #[arg(short = 'p', long, value_parser = parse_scores)]
    scores: Option<Scores>,

    /// JSON file with rendering options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to load the legend from instead of the bundled one
    #[arg(long)]
    legend_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Svg)]
    format: Format,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Placeholder sequence matching the residue count of `structure`.
fn unknown_sequence(structure: &str) -> String {
    structure
        .chars()
        .map(|c| if c == '+' { '+' } else { 'N' })
        .collect()
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let sequence = cli
        .sequence
        .clone()
        .unwrap_or_else(|| unknown_sequence(&cli.structure));
    let structure = DotBracket::new(sequence, cli.structure.clone());

    let options = match ssviz_core::load_options(cli.config.as_deref()) {
        Ok(o) => o,
        Err(e) => {
            error!("failed to load options: {e}");
            process::exit(2);
        }
    };
    debug!("options: {options:?}");

    let output = match cli.format {
        Format::Json => match ssviz_core::layout_json(&structure, &PolygonLayout::default()) {
            Ok(json) => json,
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        },
        Format::Svg => {
            let resources: Arc<dyn ResourceLocator + Send + Sync> = match &cli.legend_dir {
                Some(dir) => Arc::new(DirectoryResources::new(dir)),
                None => Arc::new(BundledResources),
            };
            let visualizer =
                Visualizer::new(Arc::new(PolygonLayout::default()), resources, options);
            let scores = cli.scores.map(|s| s.0).unwrap_or_default();
            info!(
                "rendering {} residues with {} scores",
                structure.structure().chars().filter(|&c| c != '+').count(),
                scores.len()
            );

            let doc = visualizer.visualize(&structure, &scores);
            if doc.is_blank() {
                error!("nothing was rendered");
                process::exit(1);
            }
            doc.to_string()
        }
    };

    if let Some(path) = cli.output {
        if let Err(e) = std::fs::write(&path, &output) {
            error!("failed to write {}: {e}", path.display());
            process::exit(1);
        }
        info!("wrote {}", path.display());
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = handle.write_all(output.as_bytes()) {
            error!("write failed: {e}");
            process::exit(1);
        }
    }
}
