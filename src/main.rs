use clap::{Parser, Subcommand};
use petpedia::audit::{self, AuditOptions};
use petpedia::types::Manifest;
use petpedia::{config, generate, output, scan};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that write the site.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the write cache and rewrite every output file
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "petpedia")]
#[command(about = "Static site generator for a localized pet care encyclopedia")]
#[command(long_about = "\
Static site generator for a localized pet care encyclopedia

Every page is a TOML record. Locale directories hold numbered categories,
categories hold numbered pages. Pages that translate each other share a
translation_key, which drives hreflang alternates and the language switcher.

Content structure:

  content/
  ├── config.toml                  # Site config (locales, affiliate, ads, colors)
  ├── assets/                      # Static assets → copied to dist/assets/
  ├── nl/
  │   ├── config.toml              # Locale overrides (site name, labels)
  │   ├── lists.toml               # Named lists ([[veilige-snacks-hond]])
  │   ├── 010-toxiciteit/          # Category (numbered = shown in nav)
  │   │   ├── category.toml        # Optional title and description
  │   │   └── 010-chocolade-hond.toml
  │   └── concepten/               # No number prefix = built but hidden
  └── en/
      └── 010-toxicity/
          └── 010-chocolate-dog.toml

Run 'petpedia gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".petpedia-temp", global = true)]
    temp_dir: PathBuf,

    /// Log debug diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Render the site from the scan manifest
    Generate(CacheArgs),
    /// Run the full pipeline: scan → generate → audit
    Build(CacheArgs),
    /// Validate content directory without building
    Check,
    /// Lint the generated site for content-consistency issues
    Audit,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest);
        }
        Command::Generate(cache_args) => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let manifest = read_manifest(&manifest_path)?;
            init_thread_pool(&manifest.config.processing);
            let result = generate::generate(
                &manifest_path,
                &cli.source,
                &cli.output,
                !cache_args.no_cache,
            )?;
            output::print_generate_output(&result);
        }
        Command::Build(cache_args) => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            init_thread_pool(&manifest.config.processing);
            let result = generate::generate_site(
                &manifest,
                &cli.source,
                &cli.output,
                !cache_args.no_cache,
            )?;
            output::print_generate_output(&result);

            println!("==> Stage 3: Auditing {}", cli.output.display());
            run_audit(&cli.output, &AuditOptions::for_manifest(&manifest))?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest);
            println!("==> Content is valid");
        }
        Command::Audit => {
            let options = audit_options(&cli.temp_dir, &cli.source);
            run_audit(&cli.output, &options)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr through tracing; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "petpedia=debug" } else { "petpedia=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    debug!(threads, "initializing render pool");
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn write_manifest(manifest: &Manifest, temp_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let manifest_path = temp_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&manifest_path, json)?;
    debug!(path = %manifest_path.display(), "wrote manifest");
    Ok(())
}

fn read_manifest(path: &Path) -> Result<Manifest, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Audit options from the last scan manifest, falling back to a fresh scan
/// of the source, then to defaults when auditing a site without its content.
fn audit_options(temp_dir: &Path, source: &Path) -> AuditOptions {
    if let Ok(manifest) = read_manifest(&temp_dir.join("manifest.json")) {
        return AuditOptions::for_manifest(&manifest);
    }
    match scan::scan(source) {
        Ok(manifest) => AuditOptions::for_manifest(&manifest),
        Err(e) => {
            info!("no manifest or content available ({e}); auditing without base URL");
            AuditOptions::default()
        }
    }
}

fn run_audit(output_dir: &Path, options: &AuditOptions) -> Result<(), Box<dyn std::error::Error>> {
    let report = audit::audit(output_dir, options)?;
    output::print_audit_report(&report);
    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("audit reported {} finding(s)", report.findings.len()).into())
    }
}
