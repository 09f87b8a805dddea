// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use log::debug;

pub use crate::core::checker::stats::WalkerStats;
use crate::core::errors::*;
use crate::xv6::constant::*;
use crate::xv6::index::InodeIndex;
use crate::xv6::resolver::Xv6Resolver;

use super::{Finding, VerifyReport, Xv6Checker};

/// One directory on the current path, with the subdirectories still to visit.
struct Frame {
    inum: u32,
    children: Vec<u32>,
    next: usize,
}

/// Depth-first walk of the directory tree that keeps the current path and
/// fails as soon as a directory links back to one of its ancestors.
pub struct Xv6Walker<'a> {
    index: &'a InodeIndex,
    res: Xv6Resolver<'a>,
    seen: HashSet<u32>,
    pub stats: WalkerStats,
}

impl<'a> Xv6Walker<'a> {
    pub fn new(index: &'a InodeIndex, res: Xv6Resolver<'a>) -> Self {
        Self {
            index,
            res,
            seen: HashSet::new(),
            stats: WalkerStats::default(),
        }
    }

    /// Subdirectories named by `inum`'s entries, `.` and `..` excluded.
    fn frame(&mut self, inum: u32) -> FsResult<Frame> {
        self.stats.dirs_visited += 1;
        if !self.seen.insert(inum) {
            self.stats.revisits += 1;
        }
        let mut children = Vec::new();
        if let Some(dir) = self.index.get(inum) {
            for entry in self.res.valid_entries_of(dir)? {
                self.stats.entries_scanned += 1;
                if entry.is_special() {
                    continue;
                }
                if self.index.is_dir(entry.inum()) {
                    children.push(entry.inum());
                }
            }
        }
        Ok(Frame {
            inum,
            children,
            next: 0,
        })
    }

    pub fn detect_cycle(&mut self, root: u32) -> FsResult<()> {
        let mut path = vec![self.frame(root)?];

        while let Some(top) = path.last_mut() {
            let tail = top.inum;
            let Some(child) = top.children.get(top.next).copied() else {
                path.pop();
                continue;
            };
            top.next += 1;

            if path.iter().any(|f| f.inum == child) {
                return Err(FsError::violation(
                    ViolationKind::DirectoryLoop,
                    format!(
                        "Inode {tail} refers to a non-parent ancestor ({child}) thus causing a loop."
                    ),
                ));
            }

            let frame = self.frame(child)?;
            path.push(frame);
            self.stats.max_depth = self.stats.max_depth.max(path.len() - 1);
        }
        Ok(())
    }
}

pub(super) fn check_directory_loop(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let mut walker = Xv6Walker::new(fs.index()?, fs.resolver());
    walker.detect_cycle(XV6_ROOT_INODE)?;

    let s = walker.stats;
    debug!(
        "walked {} dirs, {} entries, max depth {}",
        s.dirs_visited, s.entries_scanned, s.max_depth
    );
    if s.revisits > 0 {
        debug!(
            "{} of {} dir visits reached an already walked directory through another path",
            s.revisits, s.dirs_visited
        );
    }
    rep.push(Finding::info(
        "DIR.LOOP",
        format!("No directory loops ({} dirs walked)", s.dirs_visited),
    ));
    Ok(())
}
