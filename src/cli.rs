use crate::config_wizard::CONFIG_FILE;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generates an arxiv-notebook.toml config file
    Config,
    /// Converts the notebook to a PDF according to the config file
    Render(RenderArgs),
    /// Prints the LaTeX title block generated from the config file
    Header(HeaderArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Config file to read
    #[clap(short, long, default_value = CONFIG_FILE)]
    pub config: PathBuf,
    /// Convert this notebook instead of the configured one
    #[clap(long)]
    pub notebook: Option<PathBuf>,
    /// Name of the generated .tex and .pdf files (without extension)
    #[clap(long)]
    pub name: Option<String>,
    /// Directory to write outputs to
    #[clap(long)]
    pub output_dir: Option<PathBuf>,
    /// Ask the editor to save the notebook before converting it
    #[clap(long)]
    pub save_first: bool,
    /// Print the LaTeX output
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct HeaderArgs {
    /// Config file to read
    #[clap(short, long, default_value = CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Log every step of the conversion
    #[clap(long, global = true)]
    pub debug: bool,
    #[clap(subcommand)]
    pub command: Commands,
}
