use clap::{Parser, Subcommand};
use posthouse::{config, generate, lint, new, output, scan};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that write the site.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the output cache: rewrite every page
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let release = env!("POSTHOUSE_RELEASE");
    if release == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("POSTHOUSE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "posthouse")]
#[command(about = "Static site generator for front-matter Markdown blogs")]
#[command(long_about = "\
Static site generator for front-matter Markdown blogs

Every Markdown file in the posts directory is a post. Its YAML front matter
says what it is called, when it was written, and whether it is published.

Content structure:

  content/
  ├── config.toml                          # Site config (optional)
  ├── assets/                              # Copied to the output root
  │   └── img/property-wrappers.png        # Header images (`img:` key)
  └── _posts/
      ├── 2020-03-28-property-wrappers.md  # → /2020/03/28/property-wrappers/
      └── 2020-05-10-mvvm-combine.md

Front matter:

  ---
  layout: post
  title: \"Property Wrappers in SwiftUI\"
  date: 2020-03-28 11:00:00 +0200
  description: What @State and @Binding really do
  tags: [swift, swiftui]
  comments: true
  sharing: true
  published: true
  img: property-wrappers.png
  ---

Run 'posthouse gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".posthouse-temp", global = true)]
    temp_dir: PathBuf,

    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the posts directory into a manifest
    Scan,
    /// Produce the HTML site from the manifest
    Generate(CacheArgs),
    /// Run the full pipeline: scan → generate
    Build(CacheArgs),
    /// Check every post's front matter without building
    Check,
    /// Create a new post with a complete front-matter block
    New(NewArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct NewArgs {
    /// Post title
    title: String,
    /// Tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// One-line description
    #[arg(long, default_value = "")]
    description: String,
    /// Header image, relative to the image directory
    #[arg(long)]
    img: Option<String>,
    /// Mark the post as published instead of a draft
    #[arg(long)]
    publish: bool,
    /// Show the discussion link
    #[arg(long)]
    comments: bool,
    /// Show share links
    #[arg(long)]
    sharing: bool,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Generate(cache_args) => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let manifest: scan::Manifest =
                serde_json::from_str(&std::fs::read_to_string(&manifest_path)?)?;
            init_thread_pool(&manifest.config.processing);
            let summary = generate::generate(
                &manifest_path,
                &cli.source,
                &cli.output,
                !cache_args.no_cache,
            )?;
            output::print_generate_output(&manifest, &summary);
        }
        Command::Build(cache_args) => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            let manifest_path = write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            init_thread_pool(&manifest.config.processing);
            let summary = generate::generate(
                &manifest_path,
                &cli.source,
                &cli.output,
                !cache_args.no_cache,
            )?;
            output::print_generate_output(&manifest, &summary);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let report = lint::check(&cli.source)?;
            output::print_check_output(&report);
            if !report.is_ok() {
                return Ok(ExitCode::FAILURE);
            }
            println!("==> Content is valid");
        }
        Command::New(args) => {
            let options = new::NewPostOptions {
                description: args.description,
                tags: args.tags,
                img: args.img,
                publish: args.publish,
                comments: args.comments,
                sharing: args.sharing,
                date: None,
            };
            let path = new::new_post(&cli.source, &args.title, &options)?;
            println!("Created {}", path.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Log to stderr; stdout is reserved for command output.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "posthouse=warn",
        1 => "posthouse=debug",
        _ => "posthouse=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn write_manifest(manifest: &scan::Manifest, temp_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(temp_dir)?;
    let manifest_path = temp_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&manifest_path, json)?;
    Ok(manifest_path)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
