use anyhow::{Context, Result};
use assembler::{Assembler, RunOptions};
use cli::{Cli, Commands, RenderArgs};
use config_wizard::Configuration;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;

mod assembler;
mod cli;
mod config_wizard;
mod detection;
mod editor;
mod exporters;
mod header;
mod notebook;
mod style;
mod typesetter;

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "arxiv_notebook=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Commands::Config => config_wizard::run(),
        Commands::Header(args) => {
            let config = Configuration::load(&args.config)?;
            print!("{}", header::build_header(&config.header));
            Ok(())
        }
        Commands::Render(args) => render(args),
    }
}

fn render(args: &RenderArgs) -> Result<()> {
    println!("Loading configuration...");
    let Configuration {
        mut document,
        header,
        exporter,
        typesetter,
        save,
    } = Configuration::load(&args.config)?;

    if let Some(notebook) = &args.notebook {
        document.notebook = notebook.clone();
    }
    if let Some(name) = &args.name {
        document.name = name.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        document.output_dir = output_dir.clone();
    }

    let mut assembler = Assembler::new(exporter, typesetter);
    if let Some(editor) = save.editor() {
        assembler = assembler.with_editor(editor, save);
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("can parse progress style"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));

    let options = RunOptions {
        save_first: args.save_first,
        verbose: args.verbose,
    };
    let result = assembler
        .assemble(&document, &header, options, &progress, &mut std::io::stdout())
        .with_context(|| format!("Failed to convert {}", document.notebook.display()));
    progress.finish_and_clear();
    let stats = result?;
    log::debug!("{:?}", stats.patch);
    log::debug!("typesetter output:\n{}", stats.typesetter_output);

    println!();
    println!("  LaTeX:     {}", stats.tex_path.display());
    println!("  Resources: {}", stats.resource_count);
    if let Ok(metadata) = std::fs::metadata(&stats.pdf_path) {
        let size = byte_unit::Byte::from_u64(metadata.len())
            .get_appropriate_unit(byte_unit::UnitType::Binary);
        println!("  PDF:       {} ({size:.1})", stats.pdf_path.display());
    } else {
        println!("  PDF:       {} (not found)", stats.pdf_path.display());
    }

    Ok(())
}
