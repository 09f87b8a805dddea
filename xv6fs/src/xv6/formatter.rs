// SPDX-License-Identifier: MIT

//! Reference image builder.
//!
//! Lays out an empty filesystem the way xv6's `mkfs` does and populates it
//! with directories, files and device nodes. The raw mutators at the bottom
//! let callers corrupt a built image on purpose.

use log::{debug, trace};
use zerocopy::FromBytes;

use crate::core::traits::BitmapOps;
use crate::core::{FsError, FsResult};
use crate::xv6::image::Image;
use crate::xv6::layout::Geometry;
use crate::xv6::types::{InodeType, Xv6DirEntry, Xv6Dinode, Xv6Superblock, indirect_entry};
use crate::xv6::constant::*;

pub struct Xv6Formatter {
    geo: Geometry,
    bytes: Vec<u8>,
}

impl Xv6Formatter {
    /// Formats a `size`-block image with `nlog` log blocks and `ninodes`
    /// inode slots, root directory included.
    pub fn new(size: u32, nlog: u32, ninodes: u32) -> FsResult<Self> {
        let geo = Geometry::for_format(size, nlog, ninodes);
        if geo.meta_blocks() >= size {
            return Err(FsError::Format(format!(
                "{size} blocks cannot hold {} metadata blocks and any data",
                geo.meta_blocks()
            )));
        }
        if !(2..=u16::MAX as u32 + 1).contains(&ninodes) {
            return Err(FsError::Format(format!(
                "inode count {ninodes} out of range"
            )));
        }

        let mut fmt = Self {
            geo,
            bytes: vec![0u8; size as usize * XV6_BSIZE],
        };
        fmt.write_superblock()?;
        fmt.write_bitmap();
        fmt.write_root_dir()?;

        debug!(
            "formatted {size} blocks: {} meta, {} data, {ninodes} inodes",
            geo.meta_blocks(),
            geo.nblocks
        );
        Ok(fmt)
    }

    /// `FSSIZE` blocks with the stock log and inode counts.
    pub fn with_defaults() -> FsResult<Self> {
        Self::new(XV6_FSSIZE, XV6_DEFAULT_NLOG, XV6_DEFAULT_NINODES)
    }

    fn write_superblock(&mut self) -> FsResult<()> {
        let sb = self.geo.superblock();
        sb.encode(self.block_mut(XV6_SUPERBLOCK_BLOCK)?)
    }

    fn write_bitmap(&mut self) {
        for b in 0..self.geo.data_start() {
            self.set_block_bit(b, true);
        }
    }

    fn write_root_dir(&mut self) -> FsResult<()> {
        let root = self.ialloc(InodeType::Dir)?;
        if root != XV6_ROOT_INODE {
            return Err(FsError::Format(format!("root landed on inode {root}")));
        }
        self.link(root, XV6_DOT_NAME, root)?;
        self.link(root, XV6_DOTDOT_NAME, root)
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geo
    }

    // --- Blocks ---

    pub fn block(&self, block: u32) -> FsResult<&[u8]> {
        let start = block as usize * XV6_BSIZE;
        self.bytes
            .get(start..start + XV6_BSIZE)
            .ok_or_else(|| FsError::Format(format!("block {block} out of image")))
    }

    pub fn block_mut(&mut self, block: u32) -> FsResult<&mut [u8]> {
        let start = block as usize * XV6_BSIZE;
        self.bytes
            .get_mut(start..start + XV6_BSIZE)
            .ok_or_else(|| FsError::Format(format!("block {block} out of image")))
    }

    fn bitmap_range(&self) -> core::ops::Range<usize> {
        let start = self.geo.bmap_start as usize * XV6_BSIZE;
        start..start + self.geo.bitmap_blocks as usize * XV6_BSIZE
    }

    pub fn block_bit(&self, block: u32) -> bool {
        self.bytes
            .get(self.bitmap_range())
            .unwrap_or_default()
            .block_bit(block)
            .unwrap_or(false)
    }

    pub fn set_block_bit(&mut self, block: u32, used: bool) {
        let range = self.bitmap_range();
        self.bytes
            .get_mut(range)
            .unwrap_or_default()
            .mark_block(block, used);
    }

    /// Allocates and zeroes the first free data block.
    pub fn balloc(&mut self) -> FsResult<u32> {
        let bitmap = self.bytes.get(self.bitmap_range()).unwrap_or_default();
        let block = bitmap
            .first_free_in(self.geo.data_start()..self.geo.size)
            .ok_or_else(|| FsError::Format("out of data blocks".into()))?;

        self.set_block_bit(block, true);
        self.block_mut(block)?.fill(0);
        trace!("balloc: block {block}");
        Ok(block)
    }

    // --- Inodes ---

    fn inode_pos(&self, inum: u32) -> FsResult<(u32, usize)> {
        if inum >= self.geo.ninodes {
            return Err(FsError::Format(format!(
                "inode {inum} out of table ({} slots)",
                self.geo.ninodes
            )));
        }
        Ok((
            self.geo.inode_start + inum / XV6_IPB,
            (inum % XV6_IPB) as usize,
        ))
    }

    pub fn inode(&self, inum: u32) -> FsResult<Xv6Dinode> {
        let (block, slot) = self.inode_pos(inum)?;
        Xv6Dinode::decode_slot(self.block(block)?, slot)
    }

    pub fn inode_mut(&mut self, inum: u32) -> FsResult<&mut Xv6Dinode> {
        let (block, slot) = self.inode_pos(inum)?;
        Xv6Dinode::slot_mut(self.block_mut(block)?, slot)
    }

    /// Claims the first free inode slot after the null inode.
    pub fn ialloc(&mut self, kind: InodeType) -> FsResult<u32> {
        for inum in 1..self.geo.ninodes {
            let ino = self.inode_mut(inum)?;
            if !ino.is_allocated() {
                *ino = Xv6Dinode::new(kind);
                trace!("ialloc: inode {inum} as {kind:?}");
                return Ok(inum);
            }
        }
        Err(FsError::Format("out of inodes".into()))
    }

    /// Block backing logical block `n` of an inode, if any.
    fn block_at(&self, inum: u32, n: usize) -> FsResult<Option<u32>> {
        let ino = self.inode(inum)?;
        let b = if n < XV6_NDIRECT {
            ino.addrs[n].get()
        } else {
            match ino.indirect() {
                0 => 0,
                ind => indirect_entry(self.block(ind)?, n - XV6_NDIRECT).unwrap_or(0),
            }
        };
        Ok((b != 0).then_some(b))
    }

    /// Block backing logical block `n` of an inode, allocated on demand.
    fn bmap(&mut self, inum: u32, n: usize) -> FsResult<u32> {
        if n >= XV6_MAXFILE {
            return Err(FsError::Format(format!(
                "inode {inum}: block {n} past MAXFILE"
            )));
        }
        if let Some(b) = self.block_at(inum, n)? {
            return Ok(b);
        }

        if n < XV6_NDIRECT {
            let b = self.balloc()?;
            self.inode_mut(inum)?.addrs[n].set(b);
            return Ok(b);
        }

        let mut ind = self.inode(inum)?.indirect();
        if ind == 0 {
            ind = self.balloc()?;
            self.inode_mut(inum)?.addrs[XV6_NDIRECT].set(ind);
        }
        let b = self.balloc()?;
        let off = (n - XV6_NDIRECT) * size_of::<u32>();
        if let Some(slot) = self.block_mut(ind)?.get_mut(off..off + size_of::<u32>()) {
            slot.copy_from_slice(&b.to_le_bytes());
        }
        Ok(b)
    }

    /// Writes `data` into fresh blocks of `inum`. The stored size counts
    /// whole blocks.
    fn write_data(&mut self, inum: u32, data: &[u8]) -> FsResult<()> {
        if data.len() > XV6_MAXFILE_SIZE as usize {
            return Err(FsError::Format(format!(
                "{} bytes exceed the maximum file size",
                data.len()
            )));
        }
        for (n, chunk) in data.chunks(XV6_BSIZE).enumerate() {
            let b = self.bmap(inum, n)?;
            self.block_mut(b)?[..chunk.len()].copy_from_slice(chunk);
        }
        let blocks = data.len().div_ceil(XV6_BSIZE);
        self.inode_mut(inum)?.size.set((blocks * XV6_BSIZE) as u32);
        Ok(())
    }

    // --- Namespace ---

    /// Adds `name -> target` to `dir` and bumps the target's link count.
    pub fn link(&mut self, dir: u32, name: &str, target: u32) -> FsResult<()> {
        let nlink = self
            .inode(target)?
            .nlink
            .get()
            .checked_add(1)
            .ok_or_else(|| FsError::Format(format!("inode {target} has too many links")))?;
        self.add_raw_entry(dir, name, target)?;
        self.inode_mut(target)?.nlink.set(nlink);
        Ok(())
    }

    pub fn mkdir(&mut self, parent: u32, name: &str) -> FsResult<u32> {
        let inum = self.ialloc(InodeType::Dir)?;
        self.link(inum, XV6_DOT_NAME, inum)?;
        self.link(inum, XV6_DOTDOT_NAME, parent)?;
        self.link(parent, name, inum)?;
        Ok(inum)
    }

    pub fn create_file(&mut self, parent: u32, name: &str, data: &[u8]) -> FsResult<u32> {
        let inum = self.ialloc(InodeType::File)?;
        self.write_data(inum, data)?;
        self.link(parent, name, inum)?;
        Ok(inum)
    }

    pub fn mknod(&mut self, parent: u32, name: &str, major: u16, minor: u16) -> FsResult<u32> {
        let inum = self.ialloc(InodeType::Device)?;
        {
            let ino = self.inode_mut(inum)?;
            ino.major.set(major);
            ino.minor.set(minor);
        }
        self.link(parent, name, inum)?;
        Ok(inum)
    }

    // --- Raw mutators ---

    /// Writes an entry into the first free slot of `dir`, growing it by a
    /// block when full. The target is not checked and its link count is
    /// left alone.
    pub fn add_raw_entry(&mut self, dir: u32, name: &str, target: u32) -> FsResult<()> {
        if !self.inode(dir)?.is_dir() {
            return Err(FsError::Format(format!("inode {dir} is not a directory")));
        }
        let inum = u16::try_from(target)
            .map_err(|_| FsError::Format(format!("inode {target} does not fit a dirent")))?;
        let entry = Xv6DirEntry::new(inum, name);

        for n in 0..XV6_MAXFILE {
            let b = self.bmap(dir, n)?;
            let blk = self.block(b)?;
            let free = (0..XV6_DIRENT_PER_BLOCK)
                .find(|&s| Xv6DirEntry::decode_slot(blk, s).is_ok_and(|e| e.is_free()));
            if let Some(slot) = free {
                *Xv6DirEntry::slot_mut(self.block_mut(b)?, slot)? = entry;
                let ino = self.inode_mut(dir)?;
                ino.size.set(ino.size.get() + XV6_DIRENT_SIZE as u32);
                return Ok(());
            }
        }
        Err(FsError::Format(format!("directory {dir} is full")))
    }

    fn find_entry(&self, dir: u32, name: &str) -> FsResult<(u32, usize)> {
        for n in 0..XV6_MAXFILE {
            let Some(b) = self.block_at(dir, n)? else {
                continue;
            };
            let blk = self.block(b)?;
            for slot in 0..XV6_DIRENT_PER_BLOCK {
                let e = Xv6DirEntry::decode_slot(blk, slot)?;
                if !e.is_free() && e.is_named(name) {
                    return Ok((b, slot));
                }
            }
        }
        Err(FsError::Format(format!(
            "no entry {name:?} in directory {dir}"
        )))
    }

    /// The live entry called `name` in `dir`.
    pub fn entry_mut(&mut self, dir: u32, name: &str) -> FsResult<&mut Xv6DirEntry> {
        let (b, slot) = self.find_entry(dir, name)?;
        Xv6DirEntry::slot_mut(self.block_mut(b)?, slot)
    }

    /// Frees the entry's slot without touching sizes or link counts.
    pub fn clear_entry(&mut self, dir: u32, name: &str) -> FsResult<()> {
        *self.entry_mut(dir, name)? = Xv6DirEntry::default();
        Ok(())
    }

    pub fn superblock_mut(&mut self) -> FsResult<&mut Xv6Superblock> {
        Xv6Superblock::mut_from_prefix(self.block_mut(XV6_SUPERBLOCK_BLOCK)?)
            .map(|(sb, _)| sb)
            .map_err(|_| FsError::Format("superblock does not fit its block".into()))
    }

    // --- Output ---

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn into_image(self) -> FsResult<Image> {
        let size = self.geo.size;
        Image::from_bytes(self.bytes, size)
    }
}
