// SPDX-License-Identifier: MIT

//! Decoded inode table and the working sets derived from it.

use log::debug;

use crate::core::{FsError, FsResult, ViolationKind};
use crate::xv6::{constant::*, image::Image, layout::Geometry, types::Xv6Dinode};

/// An inode number paired with its decoded on-disk inode.
#[derive(Debug, Clone, Copy)]
pub struct InodeLoc<'a> {
    pub inum: u32,
    pub inode: &'a Xv6Dinode,
}

/// Every inode slot of the table, decoded once.
#[derive(Debug, Clone, Default)]
pub struct InodeIndex {
    inodes: Vec<Xv6Dinode>,
    allocated: Vec<u32>,
    dirs: Vec<u32>,
}

impl InodeIndex {
    /// Decodes slots `0..ninodes` starting at `inodestart`.
    pub fn build(img: &Image) -> FsResult<Self> {
        let sb = img.superblock();
        let ninodes = sb.ninodes.get();
        let start = sb.inodestart.get();

        // ninodes is untrusted: the table must fit before we size anything by it
        let end = start.saturating_add(Geometry::inode_blocks_for(ninodes));
        if end > img.block_count() {
            return Err(FsError::violation(
                ViolationKind::BadAddress,
                format!(
                    "Inode table of {ninodes} inodes at block {start} runs past the image ({} blocks)",
                    img.block_count()
                ),
            ));
        }

        let mut inodes = Vec::with_capacity(ninodes as usize);
        let mut allocated = Vec::new();
        let mut dirs = Vec::new();

        for inum in 0..ninodes {
            let block_no = start.saturating_add(inum / XV6_IPB);
            let block = img.block(block_no).map_err(|_| {
                FsError::violation(
                    ViolationKind::BadAddress,
                    format!("Inode {inum} lies in block {block_no}, outside the image"),
                )
            })?;
            let inode = Xv6Dinode::decode_slot(block, (inum % XV6_IPB) as usize)?;

            if inode.is_allocated() {
                allocated.push(inum);
            }
            if inode.is_dir() {
                dirs.push(inum);
            }
            inodes.push(inode);
        }

        debug!(
            "inode index: {} slots, {} allocated, {} directories",
            inodes.len(),
            allocated.len(),
            dirs.len()
        );

        Ok(Self {
            inodes,
            allocated,
            dirs,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inodes.is_empty()
    }

    pub fn get(&self, inum: u32) -> Option<InodeLoc<'_>> {
        self.inodes
            .get(inum as usize)
            .map(|inode| InodeLoc { inum, inode })
    }

    /// False for free slots and for numbers past the end of the table.
    pub fn is_allocated(&self, inum: u32) -> bool {
        self.get(inum).is_some_and(|loc| loc.inode.is_allocated())
    }

    pub fn is_dir(&self, inum: u32) -> bool {
        self.get(inum).is_some_and(|loc| loc.inode.is_dir())
    }

    /// All slots in inode-number order.
    pub fn all(&self) -> impl Iterator<Item = InodeLoc<'_>> {
        self.inodes.iter().enumerate().map(|(i, inode)| InodeLoc {
            inum: i as u32,
            inode,
        })
    }

    /// Slots with a non-zero type tag.
    pub fn allocated(&self) -> impl Iterator<Item = InodeLoc<'_>> {
        self.locs(&self.allocated)
    }

    /// Slots whose type tag is a directory.
    pub fn dirs(&self) -> impl Iterator<Item = InodeLoc<'_>> {
        self.locs(&self.dirs)
    }

    fn locs<'a>(&'a self, nums: &'a [u32]) -> impl Iterator<Item = InodeLoc<'a>> {
        nums.iter().filter_map(|&inum| self.get(inum))
    }
}
