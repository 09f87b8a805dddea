// SPDX-License-Identifier: MIT

//! In-memory image store.

use std::path::Path;

use log::{debug, warn};

use crate::core::traits::BitmapOps;
use crate::core::{FsError, FsResult, ViolationKind};
use crate::xv6::{constant::*, types::Xv6Superblock};

/// How the file on disk compared to the expected image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFit {
    Exact,
    /// The file was shorter; the tail is zero-filled.
    Padded { file_len: usize },
    /// The file was longer; bytes past the expected size are ignored.
    Truncated { file_len: usize },
}

/// A whole xv6 image held in memory, never mutated after construction.
#[derive(Debug, Clone)]
pub struct Image {
    bytes: Vec<u8>,
    sb: Xv6Superblock,
    fit: ImageFit,
}

impl Image {
    /// Reads the image at `path`, sized to `fs_size` blocks.
    ///
    /// The file handle is closed before this returns.
    pub fn load(path: impl AsRef<Path>, fs_size: u32) -> FsResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(bytes, fs_size)
    }

    /// Builds an image from an in-memory buffer, sized to `fs_size` blocks.
    pub fn from_bytes(mut bytes: Vec<u8>, fs_size: u32) -> FsResult<Self> {
        let expected = fs_size as usize * XV6_BSIZE;
        let file_len = bytes.len();
        let fit = match file_len.cmp(&expected) {
            core::cmp::Ordering::Equal => ImageFit::Exact,
            core::cmp::Ordering::Less => {
                warn!("image is {file_len} bytes, zero-filling to {expected}");
                ImageFit::Padded { file_len }
            }
            core::cmp::Ordering::Greater => {
                warn!("image is {file_len} bytes, ignoring everything past {expected}");
                ImageFit::Truncated { file_len }
            }
        };
        bytes.resize(expected, 0);

        let sb_off = XV6_SUPERBLOCK_BLOCK as usize * XV6_BSIZE;
        let sb_block = bytes.get(sb_off..).unwrap_or(&[]);
        let sb = Xv6Superblock::decode(sb_block)?;

        Ok(Self { bytes, sb, fit })
    }

    #[inline]
    pub fn superblock(&self) -> &Xv6Superblock {
        &self.sb
    }

    #[inline]
    pub fn fit(&self) -> ImageFit {
        self.fit
    }

    /// Number of whole blocks held in memory.
    #[inline]
    pub fn block_count(&self) -> u32 {
        (self.bytes.len() / XV6_BSIZE) as u32
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read-only view of block `block`, `BSIZE` bytes long.
    pub fn block(&self, block: u32) -> FsResult<&[u8]> {
        let start = block as usize * XV6_BSIZE;
        self.bytes.get(start..start + XV6_BSIZE).ok_or_else(|| {
            FsError::violation(
                ViolationKind::BadAddress,
                format!(
                    "Block {block} lies outside the image ({} blocks)",
                    self.block_count()
                ),
            )
        })
    }

    /// Allocation bit of `block` in the bitmap region.
    pub fn bitmap_bit(&self, block: u32) -> FsResult<bool> {
        let region = self.sb.bmapstart.get() as usize * XV6_BSIZE;
        self.bytes
            .get(region..)
            .and_then(|bitmap| bitmap.block_bit(block))
            .ok_or_else(|| {
                FsError::violation(
                    ViolationKind::BadAddress,
                    format!("Bitmap bit for block {block} lies outside the image"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xv6::layout::Geometry;

    fn raw_image(fs_size: u32) -> Vec<u8> {
        let geo = Geometry::for_format(fs_size, 4, 16);
        let mut bytes = vec![0u8; fs_size as usize * XV6_BSIZE];
        geo.superblock()
            .encode(&mut bytes[XV6_BSIZE..2 * XV6_BSIZE])
            .unwrap();
        bytes
    }

    #[test]
    fn test_block_views() {
        let mut bytes = raw_image(64);
        bytes[10 * XV6_BSIZE] = 0xAB;
        let img = Image::from_bytes(bytes, 64).unwrap();

        assert_eq!(img.fit(), ImageFit::Exact);
        assert_eq!(img.block_count(), 64);
        assert_eq!(img.superblock().size.get(), 64);
        assert_eq!(img.block(10).unwrap()[0], 0xAB);
        assert_eq!(img.block(10).unwrap().len(), XV6_BSIZE);
        assert_eq!(
            img.block(64).unwrap_err().kind(),
            Some(ViolationKind::BadAddress)
        );
    }

    #[test]
    fn test_short_image_is_padded() {
        let mut bytes = raw_image(64);
        bytes.truncate(3 * XV6_BSIZE);
        let img = Image::from_bytes(bytes, 64).unwrap();
        assert_eq!(
            img.fit(),
            ImageFit::Padded {
                file_len: 3 * XV6_BSIZE
            }
        );
        assert_eq!(img.block_count(), 64);
        assert!(img.block(63).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_long_image_is_truncated() {
        let mut bytes = raw_image(64);
        bytes.extend_from_slice(&[0xFF; XV6_BSIZE]);
        let img = Image::from_bytes(bytes, 64).unwrap();
        assert!(matches!(img.fit(), ImageFit::Truncated { .. }));
        assert_eq!(img.block_count(), 64);
    }

    #[test]
    fn test_bitmap_bit() {
        let mut bytes = raw_image(64);
        let bmap = Geometry::for_format(64, 4, 16).bmap_start as usize;
        bytes[bmap * XV6_BSIZE + 1] = 0b0000_0100; // block 10
        let img = Image::from_bytes(bytes, 64).unwrap();
        assert!(img.bitmap_bit(10).unwrap());
        assert!(!img.bitmap_bit(11).unwrap());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Image::load("/definitely/not/here.img", 64).unwrap_err();
        assert!(matches!(err, FsError::Io { .. }));
    }

    #[test]
    fn test_image_without_superblock() {
        let err = Image::from_bytes(Vec::new(), 1).unwrap_err();
        assert_eq!(err.kind(), Some(ViolationKind::Superblock));
    }
}
