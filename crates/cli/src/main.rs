//! CLI tool for building presentations from a PPTX template.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use deck_core::{plan_from_text, GenerationOptions, SlidePlan};
use std::fs;
use std::path::{Path, PathBuf};

/// Build slide decks that inherit the look of a PowerPoint template.
#[derive(Parser, Debug)]
#[command(name = "deck-build")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a presentation from a slide plan or raw text
    Build(BuildArgs),

    /// Print the analysed structure of a template as JSON
    Inspect {
        /// Template file (.pptx)
        template: PathBuf,
    },
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Template file (.pptx)
    #[arg(short, long)]
    template: PathBuf,

    /// Slide plan as JSON
    #[arg(short, long, conflicts_with = "text")]
    plan: Option<PathBuf>,

    /// Raw text (markdown or paragraphs) to plan slides from
    #[arg(long)]
    text: Option<PathBuf>,

    /// Planning guidance; "short" caps the deck at 12 slides
    #[arg(short, long, default_value = "")]
    guidance: String,

    /// Output file (default: <input stem>.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Font family used when neither the template nor its theme names one
    #[arg(long)]
    font: Option<String>,

    /// Base body font size in points
    #[arg(long)]
    body_size: Option<f64>,

    /// Base title font size in points
    #[arg(long)]
    title_size: Option<f64>,

    /// Never place images outside the layout's picture areas
    #[arg(long)]
    no_free_images: bool,

    /// Write the resolved slide plan as JSON to stdout and stop
    #[arg(long)]
    print_plan: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match &cli.command {
        Command::Build(args) => build(args, cli.verbose),
        Command::Inspect { template } => inspect(template),
    }
}

fn build(args: &BuildArgs, verbose: bool) -> Result<()> {
    let plan = load_plan(args)?;
    if args.print_plan {
        println!("{}", plan.to_json().context("Failed to serialize slide plan")?);
        return Ok(());
    }

    let template = read_file(&args.template)?;
    let options = options_from(args);

    if verbose {
        eprintln!("Building {} slides from {}", plan.len(), args.template.display());
    }

    let bytes = deck_pptx::generate(&template, &plan, &options)
        .with_context(|| format!("Failed to build from {}", args.template.display()))?;

    let output_path = get_output_path(args)?;
    fs::write(&output_path, bytes)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if verbose {
        eprintln!("Written to: {}", output_path.display());
    }
    Ok(())
}

fn inspect(template: &Path) -> Result<()> {
    let bytes = read_file(template)?;
    let analyzed = deck_pptx::analyze(&bytes)
        .with_context(|| format!("Failed to analyse {}", template.display()))?;

    let json = serde_json::to_string_pretty(&analyzed.report())
        .context("Failed to serialize template report")?;
    println!("{}", json);
    Ok(())
}

/// Read the plan JSON, or plan from raw text.
fn load_plan(args: &BuildArgs) -> Result<SlidePlan> {
    match (&args.plan, &args.text) {
        (Some(path), _) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            SlidePlan::from_json(&json)
                .with_context(|| format!("Invalid slide plan in {}", path.display()))
        }
        (None, Some(path)) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(plan_from_text(&text, &args.guidance))
        }
        (None, None) => bail!("Either --plan or --text is required"),
    }
}

fn options_from(args: &BuildArgs) -> GenerationOptions {
    let mut options = GenerationOptions::new().with_free_placement(!args.no_free_images);
    if let Some(family) = &args.font {
        options = options.with_default_family(family.clone());
    }
    if let Some(size) = args.body_size {
        options = options.with_body_size(size);
    }
    if let Some(size) = args.title_size {
        options = options.with_title_size(size);
    }
    options
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Determine the output path for the generated deck.
fn get_output_path(args: &BuildArgs) -> Result<PathBuf> {
    if let Some(output) = &args.output {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
        return Ok(output.clone());
    }

    let input = args.plan.as_ref().or(args.text.as_ref()).unwrap_or(&args.template);
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let file_name = format!("{}.pptx", stem);

    Ok(match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    })
}
