// SPDX-License-Identifier: MIT
//! xv6 Superblock structure

use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::core::{FsError, FsResult, ViolationKind};

/// xv6 superblock (28 bytes at the start of block 1)
///
/// All fields are little-endian block counts or block numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct Xv6Superblock {
    /// Size of file system image (blocks)
    pub size: U32,
    /// Number of data blocks
    pub nblocks: U32,
    /// Number of inodes
    pub ninodes: U32,
    /// Number of log blocks
    pub nlog: U32,
    /// Block number of first log block
    pub logstart: U32,
    /// Block number of first inode block
    pub inodestart: U32,
    /// Block number of first free map block
    pub bmapstart: U32,
}

impl Xv6Superblock {
    pub const SIZE: usize = size_of::<Self>();

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        size: u32,
        nblocks: u32,
        ninodes: u32,
        nlog: u32,
        logstart: u32,
        inodestart: u32,
        bmapstart: u32,
    ) -> Self {
        Self {
            size: U32::new(size),
            nblocks: U32::new(nblocks),
            ninodes: U32::new(ninodes),
            nlog: U32::new(nlog),
            logstart: U32::new(logstart),
            inodestart: U32::new(inodestart),
            bmapstart: U32::new(bmapstart),
        }
    }

    /// Decodes a superblock from the start of `block`.
    pub fn decode(block: &[u8]) -> FsResult<Self> {
        Self::read_from_prefix(block)
            .map(|(sb, _)| sb)
            .map_err(|_| {
                FsError::violation(
                    ViolationKind::Superblock,
                    format!(
                        "Superblock needs {} bytes but only {} are available",
                        Self::SIZE,
                        block.len()
                    ),
                )
            })
    }

    /// Encodes the superblock at the start of `block`.
    pub fn encode(&self, block: &mut [u8]) -> FsResult<()> {
        self.write_to_prefix(block)
            .map_err(|_| FsError::Format("block too small for superblock".into()))
    }

    /// First block of the data region.
    pub fn data_start(&self) -> u32 {
        self.size.get().saturating_sub(self.nblocks.get())
    }
}

impl Default for Xv6Superblock {
    fn default() -> Self {
        Self::new_zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superblock_layout() {
        assert_eq!(Xv6Superblock::SIZE, 28);

        let sb = Xv6Superblock::new(1000, 941, 200, 30, 2, 32, 57);
        let mut block = [0u8; 512];
        sb.encode(&mut block).unwrap();

        assert_eq!(&block[0..4], &1000u32.to_le_bytes());
        assert_eq!(&block[24..28], &57u32.to_le_bytes());
        assert_eq!(Xv6Superblock::decode(&block).unwrap(), sb);
        assert_eq!(sb.data_start(), 59);
    }

    #[test]
    fn test_decode_short_buffer() {
        let err = Xv6Superblock::decode(&[0u8; 10]).unwrap_err();
        assert_eq!(err.kind(), Some(ViolationKind::Superblock));
    }
}
