// SPDX-License-Identifier: MIT
//! xv6 on-disk inode (dinode)

use zerocopy::little_endian::{U16, U32};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::core::{FsError, FsResult, ViolationKind};
use crate::xv6::constant::*;

/// Decoded inode type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeType {
    Free,
    Dir,
    File,
    Device,
    /// Any other non-zero tag. Counts as allocated, never as a directory.
    Unknown(u16),
}

impl From<u16> for InodeType {
    fn from(raw: u16) -> Self {
        match raw {
            XV6_T_FREE => InodeType::Free,
            XV6_T_DIR => InodeType::Dir,
            XV6_T_FILE => InodeType::File,
            XV6_T_DEV => InodeType::Device,
            other => InodeType::Unknown(other),
        }
    }
}

impl From<InodeType> for u16 {
    fn from(t: InodeType) -> Self {
        match t {
            InodeType::Free => XV6_T_FREE,
            InodeType::Dir => XV6_T_DIR,
            InodeType::File => XV6_T_FILE,
            InodeType::Device => XV6_T_DEV,
            InodeType::Unknown(raw) => raw,
        }
    }
}

/// xv6 on-disk inode (64 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct Xv6Dinode {
    /// File type
    pub kind: U16,
    /// Major device number (T_DEV only)
    pub major: U16,
    /// Minor device number (T_DEV only)
    pub minor: U16,
    /// Number of links to inode in file system
    pub nlink: U16,
    /// Size of file (bytes)
    pub size: U32,
    /// Data block addresses: `NDIRECT` direct pointers, then the indirect one
    pub addrs: [U32; XV6_NDIRECT + 1],
}

impl Xv6Dinode {
    pub const SIZE: usize = size_of::<Self>();

    pub fn new(kind: InodeType) -> Self {
        let mut inode = Self::new_zeroed();
        inode.set_type(kind);
        inode
    }

    #[inline]
    pub fn set_type(&mut self, kind: InodeType) {
        self.kind = U16::new(kind.into());
    }

    /// Decodes slot `index` of an inode-table block.
    pub fn decode_slot(block: &[u8], index: usize) -> FsResult<Self> {
        let off = index * Self::SIZE;
        block
            .get(off..off + Self::SIZE)
            .and_then(|raw| Self::read_from_bytes(raw).ok())
            .ok_or_else(|| {
                FsError::violation(
                    ViolationKind::BadAddress,
                    format!("Inode slot {index} lies outside its inode block"),
                )
            })
    }

    /// Mutable view of slot `index` of an inode-table block.
    pub fn slot_mut(block: &mut [u8], index: usize) -> FsResult<&mut Self> {
        let off = index * Self::SIZE;
        block
            .get_mut(off..off + Self::SIZE)
            .and_then(|raw| Self::mut_from_bytes(raw).ok())
            .ok_or_else(|| FsError::Format(format!("inode slot {index} out of block")))
    }

    #[inline]
    pub fn inode_type(&self) -> InodeType {
        InodeType::from(self.kind.get())
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.kind.get() != XV6_T_FREE
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind.get() == XV6_T_DIR
    }

    /// Direct block pointers, zero entries included.
    #[inline]
    pub fn direct(&self) -> impl Iterator<Item = u32> + '_ {
        self.addrs[..XV6_NDIRECT].iter().map(|a| a.get())
    }

    /// The single indirect block pointer (0 = none).
    #[inline]
    pub fn indirect(&self) -> u32 {
        self.addrs[XV6_NDIRECT].get()
    }
}

impl Default for Xv6Dinode {
    fn default() -> Self {
        Self::new_zeroed()
    }
}

/// Decodes entry `index` of an indirect block.
pub fn indirect_entry(block: &[u8], index: usize) -> Option<u32> {
    let off = index * size_of::<u32>();
    let raw: [u8; 4] = block.get(off..off + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}
