use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "checkforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a check JSON document to PNG.
    Render(RenderArgs),
    /// Print an amount in words, as written on a check.
    Words(WordsArgs),
    /// Print the MICR line for routing, account and check numbers.
    Micr(MicrArgs),
    /// Parse a transcript into a check intent (JSON).
    Intent(IntentArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input check JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Device scale factor (1.0 = 96 px per inch).
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Draw bleed guides and crop marks.
    #[arg(long, default_value_t = false)]
    preview: bool,

    /// Root directory for `bg`/`logo` paths (defaults to the input file's directory).
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Font directory; system fonts are used when omitted.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Upper bound on waiting for images and fonts, in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Also write the plain-text check summary to this path.
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct WordsArgs {
    /// Amount, e.g. `1234.56` or `$1,234.56`.
    amount: String,
}

#[derive(Parser, Debug)]
struct MicrArgs {
    #[arg(long)]
    routing: String,
    #[arg(long)]
    account: String,
    #[arg(long)]
    check: String,
    /// Print the letter codes used by MICR fonts instead of E-13B symbols.
    #[arg(long, default_value_t = false)]
    font_text: bool,
}

#[derive(Parser, Debug)]
struct IntentArgs {
    /// Spoken or typed command.
    transcript: String,

    /// Use the fixed mock parser instead of keyword matching.
    #[arg(long, default_value_t = false)]
    mock: bool,

    /// Apply the intent onto this check JSON and print the merged draft instead.
    #[arg(long)]
    draft: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Words(args) => cmd_words(args),
        Command::Micr(args) => cmd_micr(args),
        Command::Intent(args) => cmd_intent(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let def = checkforge::CheckDocumentDef::from_path(&args.in_path)?;
    let assets_root = args.assets.clone().unwrap_or_else(|| {
        args.in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    });

    let mut opts = checkforge::RendererOpts::default()
        .with_image_loader(Arc::new(checkforge::FsImageLoader::new(assets_root)));
    if let Some(dir) = &args.fonts {
        opts = opts.with_font_loader(Arc::new(checkforge::FsFontLoader::new(dir)));
    }
    if let Some(ms) = args.timeout_ms {
        opts = opts.with_resource_timeout(Duration::from_millis(ms));
    }
    let renderer = checkforge::Renderer::new(opts);
    let config = checkforge::RenderConfig::default()
        .with_scale(args.scale)
        .with_preview_mode(args.preview);

    let frame = renderer.render_frame(&def, &config)?;
    let png = checkforge::encode_png(&frame)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {} ({}x{})", args.out.display(), frame.width, frame.height);

    if let Some(path) = &args.summary {
        let summary = checkforge::CheckSummary::from_document(&def.validate()?)?;
        std::fs::write(path, summary.body)
            .with_context(|| format!("write summary '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_words(args: WordsArgs) -> anyhow::Result<()> {
    let amount = checkforge::parse_amount(&args.amount)?;
    println!("{}", checkforge::amount_in_words(amount)?);
    Ok(())
}

fn cmd_micr(args: MicrArgs) -> anyhow::Result<()> {
    let line = checkforge::encode_micr(&args.routing, &args.account, &args.check)?;
    if args.font_text {
        println!("{}", line.to_font_text());
    } else {
        println!("{line}");
    }
    Ok(())
}

fn cmd_intent(args: IntentArgs) -> anyhow::Result<()> {
    let parser: Box<dyn checkforge::IntentParser> = if args.mock {
        Box::new(checkforge::MockIntentParser::default())
    } else {
        Box::new(checkforge::KeywordIntentParser)
    };
    let intent = parser.parse(&args.transcript)?;

    let json = match &args.draft {
        Some(path) => {
            let mut draft = checkforge::CheckDocumentDef::from_path(path)?;
            intent.apply_to(&mut draft);
            serde_json::to_string_pretty(&draft)
        }
        None => serde_json::to_string_pretty(&intent),
    }
    .context("serialize intent output")?;
    println!("{json}");
    Ok(())
}
