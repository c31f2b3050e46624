//! outliner CLI - PDF outline extraction and persona-driven section ranking

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use outliner::pipeline::document_id;
use outliner::render::write_output;
use outliner::{
    collect_pdfs, Embedder, HashingEmbedder, JsonFormat, PatternRegistry,
    PersonaDescriptor, Pipeline, PipelineOptions, RankOptions, Ranker, RankingReport,
    SkippedDocument, WordVectorEmbedder,
};

#[derive(Parser)]
#[command(name = "outliner")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract PDF outlines and rank sections for a persona", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one outline JSON per PDF in a directory
    Outline {
        /// Directory containing PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory receiving `<name>.json` outlines
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,

        /// Language code selecting heading patterns
        #[arg(value_name = "LANG", env = "OUTLINER_LANG", default_value = "en")]
        lang: String,

        /// Extra heading patterns (languages.json format)
        #[arg(long, value_name = "FILE", env = "OUTLINER_LANGUAGES")]
        languages: Option<PathBuf>,

        /// Per-document time limit in seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Rank document sections against a persona descriptor
    Rank {
        /// Directory containing PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Persona / job descriptor JSON
        #[arg(value_name = "PERSONA_JSON")]
        persona: PathBuf,

        /// Report output path
        #[arg(value_name = "OUTPUT_JSON")]
        output: PathBuf,

        /// Number of sections to select
        #[arg(long, default_value = "5")]
        top_k: usize,

        /// Pretrained word vectors (GloVe / fastText text format)
        #[arg(long, value_name = "FILE", env = "OUTLINER_VECTORS")]
        vectors: Option<PathBuf>,

        /// Language code selecting heading patterns
        #[arg(long, env = "OUTLINER_LANG", default_value = "en")]
        lang: String,

        /// Extra heading patterns (languages.json format)
        #[arg(long, value_name = "FILE", env = "OUTLINER_LANGUAGES")]
        languages: Option<PathBuf>,

        /// Also write per-document outlines to this directory
        #[arg(long, value_name = "DIR")]
        outline_dir: Option<PathBuf>,

        /// Per-document time limit in seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Omit the processing timestamp for reproducible output
        #[arg(long)]
        no_timestamp: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Outline {
            input,
            output,
            lang,
            languages,
            timeout_secs,
            compact,
        }) => cmd_outline(
            &input,
            &output,
            &lang,
            languages.as_deref(),
            timeout_secs,
            compact,
        ),
        Some(Commands::Rank {
            input,
            persona,
            output,
            top_k,
            vectors,
            lang,
            languages,
            outline_dir,
            timeout_secs,
            compact,
            no_timestamp,
        }) => cmd_rank(RankArgs {
            input: &input,
            persona: &persona,
            output: &output,
            top_k,
            vectors: vectors.as_deref(),
            lang: &lang,
            languages: languages.as_deref(),
            outline_dir: outline_dir.as_deref(),
            timeout_secs,
            compact,
            no_timestamp,
        }),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!(
                "{}",
                "Usage: outliner outline <INPUT_DIR> <OUTPUT_DIR> [LANG]".yellow()
            );
            println!("       outliner rank <INPUT_DIR> <PERSONA_JSON> <OUTPUT_JSON>");
            println!("       outliner --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

struct RankArgs<'a> {
    input: &'a Path,
    persona: &'a Path,
    output: &'a Path,
    top_k: usize,
    vectors: Option<&'a Path>,
    lang: &'a str,
    languages: Option<&'a Path>,
    outline_dir: Option<&'a Path>,
    timeout_secs: Option<u64>,
    compact: bool,
    no_timestamp: bool,
}

fn load_registry(languages: Option<&Path>) -> outliner::Result<PatternRegistry> {
    let registry = PatternRegistry::builtin()?;
    match languages {
        Some(path) => Ok(registry.extend(PatternRegistry::from_path(path)?)),
        None => Ok(registry),
    }
}

fn build_pipeline(
    lang: &str,
    languages: Option<&Path>,
    timeout_secs: Option<u64>,
) -> outliner::Result<Pipeline> {
    let registry = load_registry(languages)?;
    if !registry.contains(lang) {
        log::warn!(
            "no heading patterns for '{}', using '{}'",
            lang,
            registry.resolve(lang)
        );
    }

    let mut options = PipelineOptions::new().with_language(lang);
    if let Some(secs) = timeout_secs {
        options = options.with_timeout(Duration::from_secs(secs));
    }
    Ok(Pipeline::new(registry, options))
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn spinner(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

fn print_skipped(skipped: &[SkippedDocument]) {
    for doc in skipped {
        println!("  {} {} ({})", "✗".red(), doc.id, doc.reason.dimmed());
    }
}

fn cmd_outline(
    input: &Path,
    output: &Path,
    lang: &str,
    languages: Option<&Path>,
    timeout_secs: Option<u64>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(lang, languages, timeout_secs)?;
    let files = collect_pdfs(input)?;
    if files.is_empty() {
        println!("{} {}", "No PDF files in".yellow(), input.display());
        return Ok(());
    }

    let pb = spinner(&format!("Extracting outlines from {} files...", files.len()))?;
    let mut outcome = pipeline.process_batch(&files);
    let written = outcome.write_outlines(output, json_format(compact))?;
    pb.finish_and_clear();

    println!("{}", "Outlines:".green().bold());
    for analysis in &outcome.documents {
        if let Some((_, name)) = written.iter().find(|(id, _)| *id == analysis.id) {
            println!(
                "  {} {} -> {} ({} headings)",
                "✓".green(),
                analysis.id,
                name,
                analysis.outline.len()
            );
        }
    }
    print_skipped(&outcome.skipped);

    println!(
        "\n{} {} written, {} skipped",
        "Done!".green().bold(),
        written.len(),
        outcome.skipped.len()
    );
    Ok(())
}

/// Files named by the descriptor, in descriptor order; every PDF when it
/// lists none. Listed files that do not exist are returned separately.
fn select_inputs(
    input: &Path,
    descriptor: &PersonaDescriptor,
) -> outliner::Result<(Vec<PathBuf>, Vec<SkippedDocument>)> {
    let available = collect_pdfs(input)?;
    if descriptor.documents.is_empty() {
        return Ok((available, Vec::new()));
    }

    let mut selected = Vec::new();
    let mut missing = Vec::new();
    for doc in &descriptor.documents {
        match available.iter().find(|p| document_id(p) == doc.filename) {
            Some(path) if !selected.contains(path) => selected.push(path.clone()),
            Some(_) => {}
            None => missing.push(SkippedDocument {
                id: doc.filename.clone(),
                reason: "not found in input directory".to_string(),
            }),
        }
    }
    Ok((selected, missing))
}

fn cmd_rank(args: RankArgs<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let descriptor = PersonaDescriptor::from_path(args.persona)?;
    let pipeline = build_pipeline(args.lang, args.languages, args.timeout_secs)?;

    let embedder: Box<dyn Embedder> = match args.vectors {
        Some(path) => Box::new(WordVectorEmbedder::from_path(path)?),
        None => Box::new(HashingEmbedder::default()),
    };
    log::info!(
        "embedder: {} (dimension {})",
        embedder.name(),
        embedder.dimension()
    );

    let (files, missing) = select_inputs(args.input, &descriptor)?;

    let pb = spinner(&format!("Analyzing {} documents...", files.len()))?;
    let mut outcome = pipeline.process_batch(&files);
    outcome.skipped.extend(missing);

    if let Some(dir) = args.outline_dir {
        outcome.write_outlines(dir, json_format(args.compact))?;
    }

    pb.set_message("Ranking sections...");
    let sections = outcome.sections();
    let ranker = Ranker::new(
        &*embedder,
        RankOptions::default().with_top_k(args.top_k),
    );
    let ranked = ranker.rank(&descriptor.query, &sections)?;
    let subsections = ranker.subsections(&descriptor.query, &ranked)?;

    let mut report = RankingReport::new(
        outcome.document_ids(),
        &descriptor.query,
        &ranked,
        &subsections,
    );
    if !args.no_timestamp {
        report = report.stamped_now();
    }
    write_output(args.output, &report.to_json(json_format(args.compact))?)?;
    pb.finish_and_clear();

    println!("{}", "Top sections:".green().bold());
    for entry in &ranked {
        println!(
            "  {:>2}. {} {} p.{}",
            entry.rank,
            entry.section.title,
            format!("[{}]", entry.section.document).dimmed(),
            entry.section.start_page
        );
    }
    print_skipped(&outcome.skipped);

    println!(
        "\n{} {} documents ranked, {} skipped -> {}",
        "Done!".green().bold(),
        outcome.documents.len(),
        outcome.skipped.len(),
        args.output.display()
    );
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "outliner".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline extraction and section ranking tool");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/iyulab/outliner".dimmed()
    );
    println!("License: MIT");
}
