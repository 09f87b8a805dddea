// SPDX-License-Identifier: MIT

use crate::core::errors::*;
use crate::xv6::constant::*;

use super::{Finding, VerifyReport, Xv6Checker};

pub(super) fn check_null_inode(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    if fs.index()?.is_allocated(XV6_NULL_INODE) {
        return Err(FsError::violation(
            ViolationKind::NullInode,
            "Inode 0 is allocated and should not be.",
        ));
    }
    rep.push(Finding::info("INO.NULL", "Inode 0 is free"));
    Ok(())
}

/// Every directory entry must name an allocated inode.
pub(super) fn check_missing_inodes(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let index = fs.index()?;
    let res = fs.resolver();
    for dir in index.dirs() {
        for entry in res.valid_entries_of(dir)? {
            let target = entry.inum();
            if !index.is_allocated(target) {
                return Err(FsError::violation(
                    ViolationKind::MissingInode,
                    format!(
                        "Inode {target} is referenced by a directory but is not allocated."
                    ),
                ));
            }
        }
    }
    rep.push(Finding::info("INO.MISSING", "All entries name allocated inodes"));
    Ok(())
}

/// Every allocated inode but the root must be named by some entry.
pub(super) fn check_unused_inodes(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let counts = fs.entry_counts()?;
    for loc in fs.index()?.allocated() {
        if loc.inum == XV6_ROOT_INODE {
            continue;
        }
        if counts.get(loc.inum as usize).copied().unwrap_or(0) == 0 {
            return Err(FsError::violation(
                ViolationKind::UnusedInode,
                format!(
                    "Inode {} is allocated but not referenced by any directory.",
                    loc.inum
                ),
            ));
        }
    }
    rep.push(Finding::info("INO.UNUSED", "All allocated inodes are referenced"));
    Ok(())
}

pub(super) fn check_link_counts(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let counts = fs.entry_counts()?;
    for loc in fs.index()?.allocated() {
        let stored = loc.inode.nlink.get() as u32;
        let actual = counts.get(loc.inum as usize).copied().unwrap_or(0);
        if stored != actual {
            return Err(FsError::violation(
                ViolationKind::LinkCount,
                format!(
                    "Inode {} contains an invalid link count; Inode Count: {stored} Actual Count: {actual}",
                    loc.inum
                ),
            ));
        }
    }
    rep.push(Finding::info("INO.NLINK", "Link counts OK"));
    Ok(())
}
