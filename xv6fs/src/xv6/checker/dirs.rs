// SPDX-License-Identifier: MIT

//! Per-directory structure: root, special entries and entry names.

use crate::core::errors::*;
use crate::xv6::constant::*;
use crate::xv6::types::Xv6DirEntry;

use super::{Finding, VerifyReport, Xv6Checker};

fn shown(entry: Option<&Xv6DirEntry>) -> String {
    entry.map_or_else(|| "<none>".to_string(), Xv6DirEntry::name_lossy)
}

pub(super) fn check_root(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let index = fs.index()?;
    let root = match index.get(XV6_ROOT_INODE) {
        Some(loc) if loc.inode.is_allocated() => loc,
        _ => {
            return Err(FsError::violation(
                ViolationKind::RootNode,
                "Root inode is marked as unallocated.",
            ));
        }
    };
    if !root.inode.is_dir() {
        return Err(FsError::violation(
            ViolationKind::RootNode,
            "Root inode is not a directory.",
        ));
    }

    let sp = fs.resolver().special_entries(root)?;
    for (label, entry) in [(XV6_DOT_NAME, sp.dot), (XV6_DOTDOT_NAME, sp.dotdot)] {
        if entry.map(|e| e.inum()) != Some(XV6_ROOT_INODE) {
            return Err(FsError::violation(
                ViolationKind::RootNode,
                format!("Root directory does not refer to itself via '{label}'"),
            ));
        }
    }

    rep.push(Finding::info("ROOT", "Root directory OK"));
    Ok(())
}

/// The first two entries of every directory are `.` then `..`.
pub(super) fn check_special_names(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let res = fs.resolver();
    for dir in fs.index()?.dirs() {
        let sp = res.special_entries(dir)?;
        if !sp.dot.is_some_and(|e| e.is_named(XV6_DOT_NAME)) {
            return Err(FsError::violation(
                ViolationKind::SpecialEntryName,
                format!(
                    "Directory {}'s first file name is not '.'; Actual: {}",
                    dir.inum,
                    shown(sp.dot.as_ref())
                ),
            ));
        }
        if !sp.dotdot.is_some_and(|e| e.is_named(XV6_DOTDOT_NAME)) {
            return Err(FsError::violation(
                ViolationKind::SpecialEntryName,
                format!(
                    "Directory {}'s second file name is not '..'; Actual: {}",
                    dir.inum,
                    shown(sp.dotdot.as_ref())
                ),
            ));
        }
    }
    rep.push(Finding::info("DIR.SPECIAL", "Special entry names OK"));
    Ok(())
}

/// `.` and `..` must lead to directories.
pub(super) fn check_special_types(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let index = fs.index()?;
    let res = fs.resolver();
    for dir in index.dirs() {
        let sp = res.special_entries(dir)?;
        for (label, entry) in [(XV6_DOT_NAME, sp.dot), (XV6_DOTDOT_NAME, sp.dotdot)] {
            let Some(entry) = entry else { continue };
            if !index.is_dir(entry.inum()) {
                return Err(FsError::violation(
                    ViolationKind::NonDirSpecialEntry,
                    format!(
                        "Directory Inode {} contains a non-directory as '{label}'",
                        dir.inum
                    ),
                ));
            }
        }
    }
    rep.push(Finding::info("DIR.SPECIAL_TYPE", "Special entries are directories"));
    Ok(())
}

/// Only the root may name itself as inode 1 through `.`.
pub(super) fn check_self_root(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let res = fs.resolver();
    for dir in fs.index()?.dirs() {
        if dir.inum == XV6_ROOT_INODE {
            continue;
        }
        let sp = res.special_entries(dir)?;
        if sp
            .dot
            .is_some_and(|e| e.is_named(XV6_DOT_NAME) && e.inum() == XV6_ROOT_INODE)
        {
            return Err(FsError::violation(
                ViolationKind::NonRootSelfRef,
                format!(
                    "Directory inode {} listed itself via '.' as Root Inode ({XV6_ROOT_INODE})",
                    dir.inum
                ),
            ));
        }
    }
    rep.push(Finding::info("DIR.SELF_ROOT", "No directory claims to be root"));
    Ok(())
}

pub(super) fn check_printable_names(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let res = fs.resolver();
    for dir in fs.index()?.dirs() {
        for entry in res.valid_entries_of(dir)? {
            if !entry.is_printable() {
                return Err(FsError::violation(
                    ViolationKind::NonPrintableName,
                    format!(
                        "Inode {} contains an entry with a non-printable name ({})",
                        dir.inum,
                        entry.name_bytes().escape_ascii()
                    ),
                ));
            }
        }
    }
    rep.push(Finding::info("DIR.NAMES", "Entry names are printable"));
    Ok(())
}
