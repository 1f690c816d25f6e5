//! Render the sram23(1) man page from the command line definition
//!
//! Usage: gen-manpage [output-dir], defaulting to `man/`.

use clap::CommandFactory;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;

fn main() -> std::io::Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&dir)?;

    let mut page = Vec::new();
    clap_mangen::Man::new(cli::Cli::command()).render(&mut page)?;

    let path = dir.join("sram23.1");
    std::fs::write(&path, page)?;
    println!("wrote {} (view with `man -l {}`)", path.display(), path.display());
    Ok(())
}
