// SPDX-License-Identifier: MIT

//! Block pointers, block references and directory contents of inodes.

use std::collections::HashMap;

use log::{debug, trace};

use crate::core::{FsError, FsResult, ViolationKind};
use crate::xv6::constant::*;
use crate::xv6::image::Image;
use crate::xv6::index::{InodeIndex, InodeLoc};
use crate::xv6::types::{Xv6DirEntry, indirect_entry};

/// Which pointer of an inode names a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSlot {
    Direct(usize),
    /// The indirect block itself.
    Indirect,
    IndirectEntry(usize),
}

/// One (inode, pointer slot) claim on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub inum: u32,
    pub slot: PointerSlot,
}

/// The `.` and `..` candidates of a directory: its first two valid entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecialEntries {
    pub dot: Option<Xv6DirEntry>,
    pub dotdot: Option<Xv6DirEntry>,
}

pub struct Xv6Resolver<'a> {
    img: &'a Image,
}

impl<'a> Xv6Resolver<'a> {
    pub fn new(img: &'a Image) -> Self {
        Self { img }
    }

    /// Block `block` as dereferenced through inode `inum`.
    fn block_via(&self, inum: u32, block: u32) -> FsResult<&'a [u8]> {
        self.img.block(block).map_err(|_| {
            FsError::violation(
                ViolationKind::BadAddress,
                format!(
                    "Inode {inum} references block {block}, outside the image ({} blocks)",
                    self.img.block_count()
                ),
            )
        })
    }

    /// Non-zero entries of the inode's indirect block, in array order.
    fn indirect_entries(&self, loc: InodeLoc<'_>) -> FsResult<Vec<(usize, u32)>> {
        let ind = loc.inode.indirect();
        if ind == 0 {
            return Ok(Vec::new());
        }
        let block = self.block_via(loc.inum, ind)?;
        Ok((0..XV6_NINDIRECT)
            .filter_map(|i| indirect_entry(block, i).map(|b| (i, b)))
            .filter(|&(_, b)| b != 0)
            .collect())
    }

    /// Data blocks of an inode: non-zero direct pointers in slot order, then
    /// the non-zero entries of the indirect block.
    pub fn blocks_of(&self, loc: InodeLoc<'_>) -> FsResult<Vec<u32>> {
        let mut blocks: Vec<u32> = loc.inode.direct().filter(|&b| b != 0).collect();
        blocks.extend(self.indirect_entries(loc)?.into_iter().map(|(_, b)| b));
        Ok(blocks)
    }

    /// Every block the inode claims, the indirect block included.
    pub fn claimed_blocks(&self, loc: InodeLoc<'_>) -> FsResult<Vec<(u32, PointerSlot)>> {
        let mut claims: Vec<(u32, PointerSlot)> = loc
            .inode
            .direct()
            .enumerate()
            .filter(|&(_, b)| b != 0)
            .map(|(i, b)| (b, PointerSlot::Direct(i)))
            .collect();

        let ind = loc.inode.indirect();
        if ind != 0 {
            claims.push((ind, PointerSlot::Indirect));
            claims.extend(
                self.indirect_entries(loc)?
                    .into_iter()
                    .map(|(i, b)| (b, PointerSlot::IndirectEntry(i))),
            );
        }
        Ok(claims)
    }

    /// Entries of one directory block with a non-zero inode number.
    pub fn valid_entries_in_block(&self, inum: u32, block: u32) -> FsResult<Vec<Xv6DirEntry>> {
        let data = self.block_via(inum, block)?;
        let mut out = Vec::new();
        for slot in 0..XV6_DIRENT_PER_BLOCK {
            let entry = Xv6DirEntry::decode_slot(data, slot)?;
            if !entry.is_free() {
                out.push(entry);
            }
        }
        trace!("dir {inum}: block {block} holds {} entries", out.len());
        Ok(out)
    }

    /// Valid entries of a directory, in block order then slot order.
    pub fn valid_entries_of(&self, dir: InodeLoc<'_>) -> FsResult<Vec<Xv6DirEntry>> {
        let mut out = Vec::new();
        for block in self.blocks_of(dir)? {
            out.extend(self.valid_entries_in_block(dir.inum, block)?);
        }
        Ok(out)
    }

    pub fn special_entries(&self, dir: InodeLoc<'_>) -> FsResult<SpecialEntries> {
        let mut it = self.valid_entries_of(dir)?.into_iter();
        Ok(SpecialEntries {
            dot: it.next(),
            dotdot: it.next(),
        })
    }
}

/// Block number → every (inode, slot) that claims it, over allocated inodes.
#[derive(Debug, Default)]
pub struct BlockRefs {
    refs: HashMap<u32, Vec<BlockRef>>,
}

impl BlockRefs {
    pub fn build(res: &Xv6Resolver<'_>, index: &InodeIndex) -> FsResult<Self> {
        let mut refs: HashMap<u32, Vec<BlockRef>> = HashMap::new();
        let mut claims = 0usize;
        for loc in index.allocated() {
            for (block, slot) in res.claimed_blocks(loc)? {
                refs.entry(block).or_default().push(BlockRef {
                    inum: loc.inum,
                    slot,
                });
                claims += 1;
            }
        }
        debug!("block refs: {claims} claims on {} blocks", refs.len());
        Ok(Self { refs })
    }

    /// One element per claim; an inode claiming a block twice shows up twice.
    pub fn referencing_inodes(&self, block: u32) -> &[BlockRef] {
        self.refs.get(&block).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_referenced(&self, block: u32) -> bool {
        !self.referencing_inodes(block).is_empty()
    }
}
