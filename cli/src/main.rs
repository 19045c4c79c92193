//! notesetter CLI - block document layout tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use notesetter::{
    parse_document, parse_document_lenient, render::to_json, CleanupPreset, DirectoryFontResolver,
    Document, Engine, FileImageResolver, JsonFormat, LayoutOptions, PageSize,
};

#[derive(Parser)]
#[command(name = "notesetter")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Lay out block documents into paginated draw commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct LayoutArgs {
    /// Repair common JSON mistakes before parsing
    #[arg(long)]
    lenient: bool,

    /// Directory of font faces named <Family_Name>_<variant>.ttf
    #[arg(long, value_name = "DIR", env = "NOTESETTER_FONTS")]
    fonts: Option<PathBuf>,

    /// Directory image sources are resolved against
    #[arg(long, value_name = "DIR")]
    images: Option<PathBuf>,

    /// Repeat the table header row on continuation pages
    #[arg(long)]
    repeat_header: bool,

    /// Override the document's page size
    #[arg(long, value_enum)]
    page_size: Option<PaperSize>,

    /// Override the document's margin, in millimetres
    #[arg(long, value_name = "MM")]
    margin: Option<f64>,

    /// Text cleanup preset
    #[arg(long, value_enum)]
    cleanup: Option<CleanupLevel>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON document to JSON pages
    Render {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Check a document without rendering it
    Validate {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Repair common JSON mistakes before parsing
        #[arg(long)]
        lenient: bool,
    },

    /// Show document and layout statistics
    Info {
        /// Input document (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Render many documents in parallel
    Batch {
        /// Input documents (JSON)
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Unicode normalization only
    Minimal,
    /// Normalization, control characters, tabs (default)
    Standard,
    /// Standard plus ligatures and private-use characters
    Strict,
    /// No cleanup
    Off,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PaperSize {
    A4,
    Letter,
}

impl From<PaperSize> for PageSize {
    fn from(size: PaperSize) -> Self {
        match size {
            PaperSize::A4 => PageSize::A4,
            PaperSize::Letter => PageSize::Letter,
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            input,
            output,
            compact,
            layout,
        } => cmd_render(&input, output.as_deref(), compact, &layout),
        Commands::Validate { input, lenient } => cmd_validate(&input, lenient),
        Commands::Info { input, layout } => cmd_info(&input, &layout),
        Commands::Batch {
            inputs,
            output,
            compact,
            layout,
        } => cmd_batch(&inputs, &output, compact, &layout),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_engine(args: &LayoutArgs) -> Engine {
    let mut options = LayoutOptions::new().with_repeat_table_header(args.repeat_header);
    if let Some(size) = args.page_size {
        options = options.with_page_size(size.into());
    }
    if let Some(margin) = args.margin {
        options = options.with_margin_mm(margin);
    }
    options = match args.cleanup {
        Some(CleanupLevel::Off) => options.without_cleanup(),
        Some(CleanupLevel::Minimal) => options.with_cleanup_preset(CleanupPreset::Minimal),
        Some(CleanupLevel::Strict) => options.with_cleanup_preset(CleanupPreset::Strict),
        Some(CleanupLevel::Standard) | None => options,
    };

    let mut engine = Engine::new().with_options(options);
    if let Some(ref dir) = args.fonts {
        log::debug!("resolving fonts from {}", dir.display());
        engine = engine.with_font_resolver(DirectoryFontResolver::new(dir));
    }
    if let Some(ref dir) = args.images {
        log::debug!("resolving images from {}", dir.display());
        engine = engine.with_image_resolver(FileImageResolver::new(dir));
    }
    engine
}

fn load(input: &Path, lenient: bool) -> CliResult<Document> {
    let json = fs::read_to_string(input)?;
    if !lenient {
        return Ok(parse_document(&json)?);
    }

    let repaired = parse_document_lenient(&json)?;
    for note in &repaired.notes {
        eprintln!("{} {}", "Repaired:".yellow(), note);
    }
    Ok(repaired.document)
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    args: &LayoutArgs,
) -> CliResult<()> {
    let doc = load(input, args.lenient)?;
    let rendered = build_engine(args).render(&doc)?;
    let json = to_json(&rendered, json_format(compact))?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!(
            "{} {} ({} pages)",
            "Saved to".green(),
            path.display(),
            rendered.page_count()
        );
    } else {
        println!("{}", json);
    }

    if rendered.stats.overflow_count > 0 {
        eprintln!(
            "{} {} block(s) did not fit on a page",
            "Warning:".yellow().bold(),
            rendered.stats.overflow_count
        );
    }

    Ok(())
}

fn cmd_validate(input: &Path, lenient: bool) -> CliResult<()> {
    let doc = load(input, lenient)?;
    println!(
        "{} {} ({} blocks)",
        "Valid".green().bold(),
        input.display(),
        doc.block_count()
    );
    Ok(())
}

fn cmd_info(input: &Path, args: &LayoutArgs) -> CliResult<()> {
    let doc = load(input, args.lenient)?;
    let rendered = build_engine(args).render(&doc)?;
    let stats = &rendered.stats;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref title) = rendered.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = rendered.author {
        println!("{}: {}", "Author".bold(), author);
    }
    println!("{}: {}", "Font".bold(), rendered.font_family);
    println!(
        "{}: {:.2} x {:.2} pt",
        "Page".bold(),
        rendered.page_width,
        rendered.page_height
    );

    println!();
    println!("{}", "Layout Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Blocks".bold(), doc.block_count());
    println!("{}: {}", "Lines".bold(), stats.line_count);
    println!("{}: {}", "Headings".bold(), stats.heading_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "List items".bold(), stats.list_item_count);
    println!(
        "{}: {} ({} rows)",
        "Tables".bold(),
        stats.table_count,
        stats.table_row_count
    );
    println!(
        "{}: {} ({} degraded)",
        "Images".bold(),
        stats.image_count,
        stats.degraded_image_count
    );
    println!("{}: {}", "Splits".bold(), stats.split_count);
    println!("{}: {}", "Draw commands".bold(), rendered.command_count());

    if stats.overflow_count > 0 {
        println!(
            "{}: {}",
            "Overflowing blocks".yellow().bold(),
            stats.overflow_count
        );
    }

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    compact: bool,
    args: &LayoutArgs,
) -> CliResult<()> {
    fs::create_dir_all(output_dir)?;
    let engine = build_engine(args);

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let results: Vec<(PathBuf, CliResult<usize>)> = inputs
        .par_iter()
        .map(|input| {
            let result = render_one(&engine, input, output_dir, compact, args.lenient);
            pb.inc(1);
            (input.clone(), result)
        })
        .collect();

    pb.finish_with_message("Done!");

    let mut failed = 0;
    println!("\n{}", "Results:".green().bold());
    for (input, result) in &results {
        match result {
            Ok(pages) => println!("  {} {} ({} pages)", "✓".green(), input.display(), pages),
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), input.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} documents failed", failed, inputs.len()).into());
    }
    Ok(())
}

fn render_one(
    engine: &Engine,
    input: &Path,
    output_dir: &Path,
    compact: bool,
    lenient: bool,
) -> CliResult<usize> {
    let json = fs::read_to_string(input)?;
    let doc = if lenient {
        parse_document_lenient(&json)?.document
    } else {
        parse_document(&json)?
    };
    let rendered = engine.render(&doc)?;

    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let path = output_dir.join(format!("{}.pages.json", stem));
    fs::write(path, to_json(&rendered, json_format(compact))?)?;
    Ok(rendered.page_count())
}

fn cmd_version() {
    println!("{} {}", "notesetter".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Block document layout and pagination engine");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/iyulab/notesetter".dimmed()
    );
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"meta": {"title": "T"}, "blocks": [{"type": "paragraph", "text": [{"text": "Hi"}]}]}"#;

    #[test]
    fn test_render_one_writes_pages() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.json");
        fs::write(&input, DOC).unwrap();

        let pages = render_one(&Engine::new(), &input, dir.path(), true, false).unwrap();
        assert_eq!(pages, 1);

        let written = fs::read_to_string(dir.path().join("notes.pages.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["title"], "T");
        assert_eq!(value["pages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_load_lenient() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.json");
        fs::write(&input, r#"{"blocks": [{"text": "Hi"},]}"#).unwrap();

        assert!(load(&input, false).is_err());
        assert_eq!(load(&input, true).unwrap().block_count(), 1);
    }
}
