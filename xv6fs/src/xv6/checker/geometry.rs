// SPDX-License-Identifier: MIT

use crate::core::errors::*;

use super::{Finding, VerifyReport, Xv6Checker};

fn expect_field(field: &str, expected: u32, actual: u32) -> FsResult<()> {
    if expected != actual {
        return Err(FsError::violation(
            ViolationKind::Superblock,
            format!("Superblock contains an invalid {field} {{Expected: {expected} Actual: {actual}}}"),
        ));
    }
    Ok(())
}

/// Stored region starts must match the ones packed from the counts.
pub(super) fn check_superblock(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let sb = fs.image().superblock();
    let expected_size = fs.image().block_count();
    let geo = fs.geometry();

    expect_field("size", expected_size, sb.size.get())?;
    expect_field("logstart", geo.log_start, sb.logstart.get())?;
    expect_field("inodestart", geo.inode_start, sb.inodestart.get())?;
    expect_field("bmapstart", geo.bmap_start, sb.bmapstart.get())?;

    let total = geo.total_blocks();
    if total != expected_size {
        return Err(FsError::violation(
            ViolationKind::Superblock,
            format!("System size does not add up! Expected: {expected_size} Actual: {total}"),
        ));
    }

    rep.push(Finding::info("SB.GEOMETRY", "Superblock OK"));
    Ok(())
}
