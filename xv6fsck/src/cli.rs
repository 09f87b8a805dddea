// xv6fsck/src/cli.rs

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "xv6fsck",
    version,
    about = "Consistency checker for xv6 filesystem images",
    long_about = "Loads an xv6 image and runs fifteen ordered structural checks. \
                  Stops at the first violation and exits with status 55.",
    disable_help_flag = true
)]
pub struct Args {
    /// Image to check
    #[arg(short = 'f', long = "file", value_name = "IMAGE")]
    pub file: Option<PathBuf>,

    /// Print usage and exit
    #[arg(short = 'h')]
    pub usage: bool,

    /// Print the full help
    #[arg(long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Expected image size in blocks [default: 1000]
    #[arg(long = "fs-size", value_name = "BLOCKS")]
    pub fs_size: Option<u32>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

pub fn print_usage() {
    println!("Usage: xv6fsck [options]");
    println!("-f image name");
    println!("-h prints this");
    println!("-v verbose logging");
    println!("-c configuration file");
}
