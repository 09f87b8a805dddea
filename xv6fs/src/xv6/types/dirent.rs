// SPDX-License-Identifier: MIT
//! xv6 Directory Entry structure

use zerocopy::little_endian::U16;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::core::{FsError, FsResult, ViolationKind};
use crate::xv6::constant::*;

/// xv6 directory entry (16 bytes, fixed width)
///
/// An entry with `inum == 0` is a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct Xv6DirEntry {
    /// Inode number
    pub inum: U16,
    /// Entry name, NUL padded (not terminated when all 14 bytes are used)
    pub name: [u8; XV6_DIRSIZ],
}

impl Xv6DirEntry {
    pub const SIZE: usize = size_of::<Self>();

    /// Create a new directory entry; the name is truncated to `DIRSIZ` bytes.
    pub fn new(inum: u16, name: &str) -> Self {
        Self::from_raw_name(inum, name.as_bytes())
    }

    pub fn from_raw_name(inum: u16, name: &[u8]) -> Self {
        let mut entry = Self::new_zeroed();
        entry.inum = U16::new(inum);
        let len = name.len().min(XV6_DIRSIZ);
        entry.name[..len].copy_from_slice(&name[..len]);
        entry
    }

    /// Create a "." entry for a directory
    pub fn dot(current_inode: u16) -> Self {
        Self::new(current_inode, XV6_DOT_NAME)
    }

    /// Create a ".." entry for a directory
    pub fn dotdot(parent_inode: u16) -> Self {
        Self::new(parent_inode, XV6_DOTDOT_NAME)
    }

    /// Decodes slot `index` of a directory block.
    pub fn decode_slot(block: &[u8], index: usize) -> FsResult<Self> {
        let off = index * Self::SIZE;
        block
            .get(off..off + Self::SIZE)
            .and_then(|raw| Self::read_from_bytes(raw).ok())
            .ok_or_else(|| {
                FsError::violation(
                    ViolationKind::BadAddress,
                    format!("Directory slot {index} lies outside its block"),
                )
            })
    }

    /// Mutable view of slot `index` of a directory block.
    pub fn slot_mut(block: &mut [u8], index: usize) -> FsResult<&mut Self> {
        let off = index * Self::SIZE;
        block
            .get_mut(off..off + Self::SIZE)
            .and_then(|raw| Self::mut_from_bytes(raw).ok())
            .ok_or_else(|| FsError::Format(format!("directory slot {index} out of block")))
    }

    #[inline]
    pub fn inum(&self) -> u32 {
        self.inum.get() as u32
    }

    /// Check if this is an empty/free slot
    #[inline]
    pub fn is_free(&self) -> bool {
        self.inum.get() == 0
    }

    /// Name bytes up to the first NUL.
    pub fn name_bytes(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(XV6_DIRSIZ);
        &self.name[..end]
    }

    /// Name for diagnostics; invalid UTF-8 is replaced.
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(self.name_bytes()).into_owned()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name_bytes() == name.as_bytes()
    }

    /// Check if this is the "." or ".." entry
    pub fn is_special(&self) -> bool {
        self.is_named(XV6_DOT_NAME) || self.is_named(XV6_DOTDOT_NAME)
    }

    /// Every name byte is printable ASCII (`isprint` in the C locale).
    pub fn is_printable(&self) -> bool {
        self.name_bytes().iter().all(|&c| (0x20..=0x7E).contains(&c))
    }
}

impl Default for Xv6DirEntry {
    fn default() -> Self {
        Self::new_zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirent_layout() {
        assert_eq!(Xv6DirEntry::SIZE, XV6_DIRENT_SIZE);
        assert_eq!(XV6_DIRENT_PER_BLOCK, 32);

        let e = Xv6DirEntry::new(7, "README");
        assert_eq!(&e.as_bytes()[0..2], &7u16.to_le_bytes());
        assert_eq!(&e.as_bytes()[2..8], b"README");
        assert_eq!(e.name_bytes(), b"README");
        assert_eq!(e.inum(), 7);
    }

    #[test]
    fn test_full_width_name() {
        let e = Xv6DirEntry::new(3, "abcdefghijklmnopq");
        assert_eq!(e.name_bytes(), b"abcdefghijklmn");
        assert_eq!(e.name_lossy(), "abcdefghijklmn");
    }

    #[test]
    fn test_special_and_printable() {
        assert!(Xv6DirEntry::dot(1).is_special());
        assert!(Xv6DirEntry::dotdot(1).is_named(".."));
        assert!(!Xv6DirEntry::new(2, "...").is_special());

        assert!(Xv6DirEntry::new(2, "cat").is_printable());
        assert!(!Xv6DirEntry::from_raw_name(2, b"ca\x07t").is_printable());
        assert!(!Xv6DirEntry::from_raw_name(2, b"\xffx").is_printable());
    }

    #[test]
    fn test_free_slot() {
        let block = [0u8; XV6_BSIZE];
        let e = Xv6DirEntry::decode_slot(&block, 31).unwrap();
        assert!(e.is_free());
        assert!(Xv6DirEntry::decode_slot(&block, 32).is_err());
    }
}
