use clap::{Parser, Subcommand};
use gallery_lightbox::{config, logging, output, render, scan, script};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gallery-lightbox")]
#[command(about = "Photo gallery pages with a lightbox viewer and collections")]
#[command(long_about = "\
Photo gallery pages with a lightbox viewer and collections

Images in the content directory become gallery items, ordered by numeric
prefix. The rendered page has a navbar with search, a thumbnail grid, a
lightbox viewer and a collections browser.

Content structure:

  content/
  ├── config.toml                  # Page, timing, selectors, collections (optional)
  ├── thumbs/                      # Optional thumbnails, same filenames
  │   └── 001-dawn.jpg
  ├── 001-dawn.jpg                 # Full-size image (lowest number first)
  ├── 001-dawn.txt                 # Sidecar caption
  ├── 010-dusk.webp                # Non-contiguous numbering OK
  └── snapshot.png                 # No number prefix = listed last

Simulation scripts replay clicks, keys, swipes and waits against the page
in memory and print what the viewer shows after every step.

Run 'gallery-lightbox gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the content directory into manifest.json
    Scan,
    /// Write index.html for the content directory
    Render,
    /// Play a session script against the page
    Simulate {
        /// Script file of [[step]] tables
        #[arg(long)]
        script: PathBuf,
        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate config and content without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            std::fs::create_dir_all(&cli.output)?;
            let manifest_path = cli.output.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Render => {
            let manifest = scan::scan(&cli.source)?;
            let page_path = render::render(&manifest, &cli.output)?;
            output::print_render_output(&manifest, &page_path);
        }
        Command::Simulate {
            script: script_path,
            json,
        } => {
            let manifest = scan::scan(&cli.source)?;
            let session = script::load_script(&script_path)?;
            let transcript = script::run_script(&manifest.items, &manifest.config, &session)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&transcript)?);
            } else {
                output::print_transcript(&transcript);
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            render::render_page(&manifest)?;
            output::print_scan_output(&manifest, &cli.source);
            output::print_check_output(&manifest);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
