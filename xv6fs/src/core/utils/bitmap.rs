// SPDX-License-Identifier: MIT

//! Block-allocation bitmap access.
//!
//! One bit per block number, packed LSB first from the first bitmap byte.
//! A set bit marks the block as in use.

use core::ops::Range;

/// Block-number view over the raw bitmap bytes.
pub trait BitmapOps {
    /// Allocation bit of `block`, or `None` when the bitmap is too short.
    fn block_bit(&self, block: u32) -> Option<bool>;

    /// Marks `block` used or free. Blocks past the bitmap are ignored.
    fn mark_block(&mut self, block: u32, used: bool);

    /// First free block within `blocks`.
    fn first_free_in(&self, blocks: Range<u32>) -> Option<u32>;
}

#[inline]
fn locate(block: u32) -> (usize, u8) {
    (block as usize / 8, 1 << (block % 8))
}

impl BitmapOps for [u8] {
    #[inline]
    fn block_bit(&self, block: u32) -> Option<bool> {
        let (byte, mask) = locate(block);
        self.get(byte).map(|b| b & mask != 0)
    }

    fn mark_block(&mut self, block: u32, used: bool) {
        let (byte, mask) = locate(block);
        if let Some(b) = self.get_mut(byte) {
            if used {
                *b |= mask;
            } else {
                *b &= !mask;
            }
        }
    }

    fn first_free_in(&self, blocks: Range<u32>) -> Option<u32> {
        blocks
            .take_while(|&b| locate(b).0 < self.len())
            .find(|&b| self.block_bit(b) == Some(false))
    }
}
