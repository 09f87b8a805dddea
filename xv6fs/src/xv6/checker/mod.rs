// SPDX-License-Identifier: MIT

use std::cell::OnceCell;
use std::path::Path;

pub use crate::core::checker::*;
use crate::xv6::image::Image;
use crate::xv6::index::InodeIndex;
use crate::xv6::layout::Geometry;
use crate::xv6::resolver::{BlockRefs, Xv6Resolver};

mod blocks;
mod dirs;
mod geometry;
mod inodes;
mod sizes;
pub mod walker;

pub use sizes::recomputed_size;

#[derive(Clone, Debug)]
pub struct Xv6CheckOptions {
    pub phases: CheckPhases,
}

impl Default for Xv6CheckOptions {
    fn default() -> Self {
        Self {
            phases: CheckPhases::ALL,
        }
    }
}

impl Xv6CheckOptions {
    /// All phases except `skip`.
    pub fn skipping(skip: CheckPhases) -> Self {
        Self {
            phases: CheckPhases::ALL.difference(skip),
        }
    }
}

impl VerifierOptionsLike for Xv6CheckOptions {
    fn phases(&self) -> CheckPhases {
        self.phases
    }
}

/// Consistency checker over one loaded xv6 image.
///
/// Derived indices are built on first use, so a corrupt superblock is
/// reported before anything trusts its counts.
pub struct Xv6Checker {
    img: Image,
    index: OnceCell<InodeIndex>,
    refs: OnceCell<BlockRefs>,
}

impl Xv6Checker {
    pub fn new(img: Image) -> Self {
        Self {
            img,
            index: OnceCell::new(),
            refs: OnceCell::new(),
        }
    }

    pub fn open(path: impl AsRef<Path>, fs_size: u32) -> FsResult<Self> {
        Ok(Self::new(Image::load(path, fs_size)?))
    }

    #[inline]
    pub fn image(&self) -> &Image {
        &self.img
    }

    /// Layout implied by the superblock counts.
    pub fn geometry(&self) -> Geometry {
        Geometry::compute(self.img.superblock())
    }

    pub fn resolver(&self) -> Xv6Resolver<'_> {
        Xv6Resolver::new(&self.img)
    }

    pub fn index(&self) -> FsResult<&InodeIndex> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let built = InodeIndex::build(&self.img)?;
        Ok(self.index.get_or_init(|| built))
    }

    pub fn block_refs(&self) -> FsResult<&BlockRefs> {
        if let Some(refs) = self.refs.get() {
            return Ok(refs);
        }
        let built = BlockRefs::build(&self.resolver(), self.index()?)?;
        Ok(self.refs.get_or_init(|| built))
    }

    /// Number of valid directory entries naming each inode, indexed by inode
    /// number. Targets past the inode table are not counted.
    pub fn entry_counts(&self) -> FsResult<Vec<u32>> {
        let index = self.index()?;
        let res = self.resolver();
        let mut counts = vec![0u32; index.len()];
        for dir in index.dirs() {
            for entry in res.valid_entries_of(dir)? {
                if let Some(n) = counts.get_mut(entry.inum() as usize) {
                    *n += 1;
                }
            }
        }
        Ok(counts)
    }
}

impl FsChecker for Xv6Checker {
    type Options = Xv6CheckOptions;

    const CHECKS: &'static [Check<Self>] = &[
        Check {
            phase: CheckPhases::GEOMETRY,
            code: "SB.GEOMETRY",
            run: geometry::check_superblock,
        },
        Check {
            phase: CheckPhases::NULL_INODE,
            code: "INO.NULL",
            run: inodes::check_null_inode,
        },
        Check {
            phase: CheckPhases::MISSING_BLOCK,
            code: "BLK.MISSING",
            run: blocks::check_missing_blocks,
        },
        Check {
            phase: CheckPhases::UNALLOCATED_BLOCK,
            code: "BLK.UNALLOC",
            run: blocks::check_unallocated_blocks,
        },
        Check {
            phase: CheckPhases::MULTI_BLOCK,
            code: "BLK.MULTI",
            run: blocks::check_multiply_allocated,
        },
        Check {
            phase: CheckPhases::MISSING_INODE,
            code: "INO.MISSING",
            run: inodes::check_missing_inodes,
        },
        Check {
            phase: CheckPhases::UNUSED_INODE,
            code: "INO.UNUSED",
            run: inodes::check_unused_inodes,
        },
        Check {
            phase: CheckPhases::ROOT,
            code: "ROOT",
            run: dirs::check_root,
        },
        Check {
            phase: CheckPhases::SPECIAL_NAMES,
            code: "DIR.SPECIAL",
            run: dirs::check_special_names,
        },
        Check {
            phase: CheckPhases::LOOP,
            code: "DIR.LOOP",
            run: walker::check_directory_loop,
        },
        Check {
            phase: CheckPhases::SPECIAL_TYPES,
            code: "DIR.SPECIAL_TYPE",
            run: dirs::check_special_types,
        },
        Check {
            phase: CheckPhases::SELF_ROOT,
            code: "DIR.SELF_ROOT",
            run: dirs::check_self_root,
        },
        Check {
            phase: CheckPhases::NLINK,
            code: "INO.NLINK",
            run: inodes::check_link_counts,
        },
        Check {
            phase: CheckPhases::SIZE,
            code: "INO.SIZE",
            run: sizes::check_file_sizes,
        },
        Check {
            phase: CheckPhases::NAMES,
            code: "DIR.NAMES",
            run: dirs::check_printable_names,
        },
    ];
}
