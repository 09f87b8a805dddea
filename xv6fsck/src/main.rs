// xv6fsck/src/main.rs

mod cli;
mod config;
mod output;
mod utils;

use clap::Parser;
use clap::error::ErrorKind;
use colored::*;
use log::debug;
use std::process::ExitCode;

use xv6fs::prelude::*;

use crate::cli::{Args, print_usage};
use crate::config::{Config, Settings};

const EXIT_USAGE: u8 = 1;
const EXIT_ERROR: u8 = 2;
const EXIT_VIOLATION: u8 = 55;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            print_usage();
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if args.usage || args.file.is_none() {
        print_usage();
        return ExitCode::from(EXIT_USAGE);
    }

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let settings = Settings::resolve(args, &config)?;

    utils::log::init(settings.verbose);
    if !settings.color {
        colored::control::set_override(false);
    }
    debug!("{settings:?}");

    let fs = match Xv6Checker::open(&settings.image, settings.fs_size) {
        Ok(fs) => fs,
        Err(FsError::Violation(v)) => {
            output::print_violation(&v);
            return Ok(ExitCode::from(EXIT_VIOLATION));
        }
        Err(e) => return Err(e.into()),
    };

    output::print_header(&settings.image, fs.image().fit());
    output::print_superblock(fs.image().superblock(), &fs.geometry());

    let mut rep = VerifyReport::default();
    let res = fs.check_with(&Xv6CheckOptions::skipping(settings.skip), &mut rep);
    output::print_findings(&rep);

    match res {
        Ok(()) => {
            output::print_clean(&rep);
            Ok(ExitCode::SUCCESS)
        }
        Err(FsError::Violation(v)) => {
            output::print_violation(&v);
            Ok(ExitCode::from(EXIT_VIOLATION))
        }
        Err(e) => Err(e.into()),
    }
}
