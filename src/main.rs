//! duscan — command-line front-end.
//!
//! Thin binary entry point. All scanning logic lives in `duscan-core`;
//! this file only parses flags, runs one scan, and prints the tree.

use anyhow::bail;
use clap::error::ErrorKind;
use clap::Parser;
use duscan_core::model::size::format_size;
use duscan_core::{scan, FileNode, ScanOptions};
use std::path::PathBuf;
use std::process;

/// Measure on-disk usage of a file or directory tree.
#[derive(Parser, Debug)]
#[command(name = "duscan", version, about)]
struct Cli {
    /// File or directory to measure
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Print only the elapsed milliseconds
    #[arg(short = 't', long = "time-only")]
    time_only: bool,

    /// Disable parallel traversal
    #[arg(short = 's', long)]
    sequential: bool,

    /// Maximum number of worker threads (0 = auto)
    #[arg(short = 'j', long = "threads", value_name = "N", default_value_t = 0)]
    threads: usize,

    /// Aggregate sizes as usual but print only the root
    #[arg(short = 'r', long = "root-only")]
    root_only: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    // clap exits with 2 on usage errors by default; this tool's contract
    // is 0 for success (including --help) and 1 for everything else
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    if !cli.path.exists() && !cli.path.is_symlink() {
        bail!("path not found: {}", cli.path.display());
    }

    let options = ScanOptions {
        use_parallel: !cli.sequential,
        max_threads: cli.threads,
        root_only: cli.root_only,
        ..ScanOptions::default()
    };
    let result = scan(&cli.path, options);

    if cli.time_only {
        println!("{:.0}", result.elapsed_ms());
        return Ok(());
    }

    println!("\nResults for: {}\n", cli.path.display());
    print_node(result.root(), 0);
    println!();
    println!("Total size: {}", format_size(result.root().size()));
    println!("Time taken: {:.0} ms", result.elapsed_ms());
    Ok(())
}

fn print_node(node: &FileNode, level: usize) {
    println!(
        "{:indent$}{} ({})",
        "",
        node.path().display(),
        format_size(node.size()),
        indent = level * 2
    );
    for child in node.children() {
        print_node(child, level + 1);
    }
}
