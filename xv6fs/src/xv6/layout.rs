// SPDX-License-Identifier: MIT

use crate::xv6::{constant::*, types::Xv6Superblock};

/// Region packing of an xv6 image, computed from the superblock counts.
///
/// `[ boot | super | log | inodes | bitmap | data ]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub size: u32,
    pub nlog: u32,
    pub ninodes: u32,
    pub nblocks: u32,
    pub log_start: u32,
    pub inode_start: u32,
    pub inode_blocks: u32,
    pub bmap_start: u32,
    pub bitmap_blocks: u32,
}

impl Geometry {
    /// Expected region starts for the counts stored in `sb`.
    pub fn compute(sb: &Xv6Superblock) -> Self {
        Self::from_counts(
            sb.size.get(),
            sb.nlog.get(),
            sb.ninodes.get(),
            sb.nblocks.get(),
        )
    }

    pub fn from_counts(size: u32, nlog: u32, ninodes: u32, nblocks: u32) -> Self {
        let log_start = XV6_HEADER_BLOCKS;
        // Counts come straight from an untrusted superblock.
        let inode_start = log_start.saturating_add(nlog);
        let inode_blocks = Self::inode_blocks_for(ninodes);
        let bmap_start = inode_start.saturating_add(inode_blocks);
        Self {
            size,
            nlog,
            ninodes,
            nblocks,
            log_start,
            inode_start,
            inode_blocks,
            bmap_start,
            bitmap_blocks: Self::bitmap_blocks_for(size),
        }
    }

    /// Layout the reference builder uses: everything after the metadata is data.
    pub fn for_format(size: u32, nlog: u32, ninodes: u32) -> Self {
        let mut geo = Self::from_counts(size, nlog, ninodes, 0);
        geo.nblocks = size.saturating_sub(geo.meta_blocks());
        geo
    }

    #[inline]
    pub fn inode_blocks_for(ninodes: u32) -> u32 {
        ninodes.div_ceil(XV6_IPB)
    }

    #[inline]
    pub fn bitmap_blocks_for(size: u32) -> u32 {
        size.div_ceil(XV6_BPB)
    }

    /// Boot, superblock, log, inode table and bitmap.
    pub fn meta_blocks(&self) -> u32 {
        XV6_HEADER_BLOCKS
            .saturating_add(self.nlog)
            .saturating_add(self.inode_blocks)
            .saturating_add(self.bitmap_blocks)
    }

    /// Total block count implied by the counts.
    pub fn total_blocks(&self) -> u32 {
        self.meta_blocks().saturating_add(self.nblocks)
    }

    pub fn data_start(&self) -> u32 {
        self.size.saturating_sub(self.nblocks)
    }

    /// Superblock describing this layout.
    pub fn superblock(&self) -> Xv6Superblock {
        Xv6Superblock::new(
            self.size,
            self.nblocks,
            self.ninodes,
            self.nlog,
            self.log_start,
            self.inode_start,
            self.bmap_start,
        )
    }
}
