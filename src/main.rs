use clap::{Parser, Subcommand};
use print_sheet::imaging::{OutputFormat, RustBackend};
use print_sheet::{batch, catalog, config, output, sheet};
use std::path::{Path, PathBuf};

/// Page and standard selection shared by every command that lays out a sheet.
#[derive(clap::Args, Clone)]
struct SheetArgs {
    /// Page key (see `list`); defaults to `default_page` from the config
    #[arg(long)]
    page: Option<String>,

    /// Photo standard key (see `list`); defaults to `default_standard`
    #[arg(long)]
    standard: Option<String>,
}

impl SheetArgs {
    fn keys(&self, config: &config::SheetConfig) -> (String, String) {
        (
            self.page.clone().unwrap_or_else(|| config.default_page.clone()),
            self.standard
                .clone()
                .unwrap_or_else(|| config.default_standard.clone()),
        )
    }
}

#[derive(Parser)]
#[command(name = "print-sheet")]
#[command(about = "Lay out passport and ID photos on printable sheets")]
#[command(long_about = "\
Lay out passport and ID photos on printable sheets

Give it one photo, a page size and a photo standard; it fills the page with
as many copies as fit, centered, each framed by a dashed cut guide. Photos
are turned 90 degrees only when that fits strictly more and the upright
layout is too sparse.

All sizes are pixels at 300 DPI. Unknown page or standard keys fall back to
the configured defaults with a warning.

Run 'print-sheet list' to see the available keys and 'print-sheet gen-config'
to generate a documented print-sheet.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one photo onto a print sheet
    Render {
        /// Photo to print (JPEG, PNG, TIFF or WebP)
        photo: PathBuf,

        #[command(flatten)]
        sheet: SheetArgs,

        /// Output file or directory (default: suggested name in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format, overriding the config
        #[arg(long, value_parser = parse_format)]
        format: Option<OutputFormat>,

        /// JPEG quality 1-100, overriding the config
        #[arg(long)]
        quality: Option<u32>,

        /// Print the sheet layout as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Show how a sheet would be laid out, without a photo
    Plan {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
    /// List page sizes and photo standards
    List,
    /// Render a sheet for every photo in a directory
    Batch {
        /// Directory of photos
        dir: PathBuf,

        #[command(flatten)]
        sheet: SheetArgs,

        /// Output directory
        #[arg(long, default_value = "print-sheets")]
        out: PathBuf,

        /// Include photos in subdirectories
        #[arg(long)]
        recursive: bool,

        /// Disable the sheet cache and re-render every photo
        #[arg(long)]
        no_cache: bool,
    },
    /// Print a stock print-sheet.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            photo,
            sheet: args,
            out,
            format,
            quality,
            json,
        } => {
            let mut config = config::load_config(&cli.config)?;
            if let Some(format) = format {
                config.output.format = format;
            }
            if let Some(quality) = quality {
                config.output.quality = quality;
            }
            config.validate()?;

            let (page, standard) = args.keys(&config);
            let bytes = std::fs::read(&photo)?;
            let rendered =
                sheet::generate_print_sheet_with(&RustBackend::new(), &config, &bytes, &page, &standard)?;

            let target = resolve_output(out.as_deref(), &rendered.suggested_filename);
            std::fs::write(&target, &rendered.bytes)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rendered.layout)?);
            } else {
                output::print_render(&rendered, &target);
            }
        }
        Command::Plan { sheet: args, json } => {
            let config = config::load_config(&cli.config)?;
            let (page, standard) = args.keys(&config);
            let layout = sheet::plan_print_sheet(&config, &page, &standard);
            if json {
                println!("{}", serde_json::to_string_pretty(&layout)?);
            } else {
                output::print_plan(&layout);
            }
        }
        Command::List => {
            let config = config::load_config(&cli.config)?;
            output::print_catalog(&catalog::Catalog::from_config(&config));
        }
        Command::Batch {
            dir,
            sheet: args,
            out,
            recursive,
            no_cache,
        } => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            let (page, standard) = args.keys(&config);
            let request = batch::BatchRequest {
                page_key: page,
                standard_key: standard,
                recursive,
            };

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::render_directory(&dir, &out, &request, &config, !no_cache, Some(tx));
            printer.join().ok();
            let report = result?;
            output::print_batch_summary(&report);
            if !report.failures.is_empty() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn parse_format(name: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(name).ok_or_else(|| format!("unknown format {name:?} (expected jpeg or png)"))
}

/// `--out` may name a file or an existing directory.
fn resolve_output(out: Option<&Path>, suggested: &str) -> PathBuf {
    match out {
        Some(path) if path.is_dir() => path.join(suggested),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(suggested),
    }
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
