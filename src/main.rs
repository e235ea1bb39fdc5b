use clap::{Parser, Subcommand};
use photoblog::{config, output, pipeline};
use std::path::PathBuf;
use std::process::ExitCode;

/// Shared flags for commands that write the site.
#[derive(clap::Args, Clone, Copy, Default)]
struct BuildArgs {
    /// Keep the existing thumbnails/ directory instead of regenerating it
    #[arg(long)]
    no_thumbnails: bool,
}

#[derive(Parser)]
#[command(name = "photoblog")]
#[command(about = "Static site generator for a markdown blog and a photo gallery")]
#[command(long_about = "\
Static site generator for a markdown blog and a photo gallery

Project structure:

  site/
  ├── config.toml                  # Optional, overrides stock defaults
  ├── entries/                     # Blog entries: YAML front matter + markdown
  │   └── 2023-01-01-hello.md      # → build/blog/2023-01-01-hello.html
  ├── photos/                      # Originals; EXIF GPS + XPKeywords are read
  ├── templates/                   # index.html, blog.html, photos.html, article.html
  └── assets/                      # → build/assets/
      ├── favicon.svg              # Also copied to the build root
      └── robots.txt               # Optional, also copied to the build root

Entry front matter requires title, summary, date and tags.
Photos tagged with a priority keyword (\"actually good\", then \"ok\") sort first.

Run 'photoblog gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Project root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Build without a subcommand
    #[command(flatten)]
    build: BuildArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site (default)
    Build(BuildArgs),
    /// Read and validate all inputs without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        None => build(&cli.root, cli.build)?,
        Some(Command::Build(args)) => build(
            &cli.root,
            BuildArgs {
                no_thumbnails: args.no_thumbnails || cli.build.no_thumbnails,
            },
        )?,
        Some(Command::Check) => {
            let site_config = config::load_config(&cli.root)?;
            println!("==> Checking {}", cli.root.display());
            let inputs = pipeline::check(&cli.root, &site_config)?;
            output::print_check_output(&inputs);
            println!("==> Content is valid");
        }
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn build(root: &std::path::Path, args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let site_config = config::load_config(root)?;
    let options = pipeline::BuildOptions {
        skip_thumbnails: args.no_thumbnails,
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_build_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = pipeline::build(root, &site_config, &options, Some(tx));
    // The sender is dropped when the build returns, so the printer drains
    // every event before it exits.
    if printer.join().is_err() {
        log::warn!("progress printer panicked");
    }

    let summary = result?;
    output::print_summary(&summary);
    Ok(())
}
