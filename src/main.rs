use clap::Parser;
use siteicons::fetch::UreqTransport;
use siteicons::{config, output, process};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "siteicons")]
#[command(about = "Refresh a static site's bookmark favicons, inline CSS and sprite sheet")]
#[command(long_about = "\
Refresh a static site's bookmark favicons, inline CSS and sprite sheet

Reads the site catalog, finds a favicon for every bookmark and writes:

  content/img/{host}.png                 # One icon per host
  static/assets/siteimg.css              # Icons inlined as data URIs
  static/assets/siteimgsprite.css        # Offsets into the sprite sheet
  static/assets/sitesprites.png          # All icons packed, 50 per row
  data/websites.yml                      # Catalog with favicon, classes, search words

The previous run's artifacts are renamed to \"-old\" while the refresh runs,
and icons are reused from there unless --force is given. If a run is
interrupted, --restore puts the previous artifacts back.

Paths can be changed in siteicons.toml; run 'siteicons --print-config' for a
documented stock file.")]
#[command(version)]
struct Cli {
    /// Site root; the catalog and output paths are resolved against it
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Refetch every favicon instead of reusing the previous run's icons
    #[arg(long, conflicts_with = "restore")]
    force: bool,

    /// Roll back an interrupted run from its "-old" artifacts
    #[arg(long)]
    restore: bool,

    /// Print a stock siteicons.toml with all options documented
    #[arg(long, conflicts_with_all = ["force", "restore"])]
    print_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.root)?;

    if cli.restore {
        let report = process::restore(&cli.root, &config)?;
        output::print_restore_output(&report, &cli.root);
        println!("==> Restore complete");
        return Ok(());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event);
        }
    });
    let transport = UreqTransport::new();
    let result = process::refresh(&cli.root, &config, cli.force, &transport, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let stats = result?;
    output::print_run_summary(&stats);

    Ok(())
}
