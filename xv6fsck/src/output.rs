// xv6fsck/src/output.rs

use colored::*;
use std::path::Path;

use xv6fs::prelude::*;

pub fn print_header(image: &Path, fit: ImageFit) {
    println!("{} {}", "[xv6fsck]".bold(), image.display());
    match fit {
        ImageFit::Exact => {}
        ImageFit::Padded { file_len } => println!(
            "  {} image is {file_len} bytes, zero-padded to the expected size",
            "!".yellow()
        ),
        ImageFit::Truncated { file_len } => println!(
            "  {} image is {file_len} bytes, trailing bytes ignored",
            "!".yellow()
        ),
    }
}

/// Superblock fields next to the region starts they imply.
pub fn print_superblock(sb: &Xv6Superblock, geo: &Geometry) {
    println!("\n{}", "Superblock".bold().underline());
    println!("  FS size in blocks:   {}", sb.size.get());
    println!("  Data blocks:         {}", sb.nblocks.get());
    println!("  Inodes:              {}", sb.ninodes.get());
    println!("  Log blocks:          {}", sb.nlog.get());
    println!("  BM blocks:           {}", geo.bitmap_blocks);
    println!("  Log start:           {}", sb.logstart.get());
    println!("  Inode start:         {}", sb.inodestart.get());
    println!("  BM start:            {}", sb.bmapstart.get());
    println!("  Meta blocks:         {}", geo.meta_blocks());
    println!("  Data start:          {}", geo.data_start());
}

pub fn print_findings(rep: &VerifyReport) {
    println!("\n{}", "Checks".bold().underline());
    for f in rep.iter() {
        let tag = match f.sev {
            Severity::Info => "ok".green(),
            Severity::Warn => "skip".yellow(),
        };
        println!("  {tag:>4} {:<16} {}", f.code.dimmed(), f.msg);
    }
}

pub fn print_violation(v: &Violation) {
    println!("\n{} {}", "✗".red().bold(), v.kind.to_string().red().bold());
    println!("  {}", v.detail.red());
}

pub fn print_clean(rep: &VerifyReport) {
    let skipped = rep.count(Severity::Warn);
    if skipped == 0 {
        println!("\n{} File system is consistent.", "✓ OK".green().bold());
    } else {
        println!(
            "\n{} File system is consistent ({} checks skipped).",
            "✓ OK".green().bold(),
            skipped.to_string().yellow()
        );
    }
}
