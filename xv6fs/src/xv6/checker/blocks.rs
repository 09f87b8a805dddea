// SPDX-License-Identifier: MIT

//! Bitmap against block references, over the data region.

use core::ops::Range;

use log::trace;

use crate::core::errors::*;

use super::{Finding, VerifyReport, Xv6Checker};

fn data_region(fs: &Xv6Checker) -> Range<u32> {
    let sb = fs.image().superblock();
    sb.data_start()..sb.size.get()
}

/// Allocated on the bitmap, but claimed by nobody.
pub(super) fn check_missing_blocks(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let refs = fs.block_refs()?;
    for b in data_region(fs) {
        if fs.image().bitmap_bit(b)? && !refs.is_referenced(b) {
            return Err(FsError::violation(
                ViolationKind::MissingBlock,
                format!(
                    "Block {b} is marked as allocated on the bitmap, but is not referenced by any inode."
                ),
            ));
        }
    }
    rep.push(Finding::info("BLK.MISSING", "No missing blocks"));
    Ok(())
}

/// Free on the bitmap, but claimed by an allocated inode.
pub(super) fn check_unallocated_blocks(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let refs = fs.block_refs()?;
    for b in data_region(fs) {
        if !fs.image().bitmap_bit(b)? && refs.is_referenced(b) {
            trace!("block {b}: free but claimed by {:?}", refs.referencing_inodes(b));
            return Err(FsError::violation(
                ViolationKind::UnallocatedBlock,
                format!(
                    "Block {b} is marked as free on the bitmap, but is referenced by a valid inode."
                ),
            ));
        }
    }
    rep.push(Finding::info("BLK.UNALLOC", "No unallocated blocks in use"));
    Ok(())
}

/// At most one (inode, slot) claim per data block.
pub(super) fn check_multiply_allocated(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let refs = fs.block_refs()?;
    for b in data_region(fs) {
        let claims = refs.referencing_inodes(b);
        if claims.len() > 1 {
            let inodes = claims
                .iter()
                .map(|r| r.inum.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(FsError::violation(
                ViolationKind::MultiplyAllocatedBlock,
                format!("Block {b} is referenced multiple times by the following inodes: {inodes}"),
            ));
        }
    }
    rep.push(Finding::info("BLK.MULTI", "No multiply allocated blocks"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xv6::constant::*;
    use crate::xv6::formatter::Xv6Formatter;

    fn checker(fmt: Xv6Formatter) -> Xv6Checker {
        Xv6Checker::new(fmt.into_image().unwrap())
    }

    #[test]
    fn test_clean_bitmap() {
        let mut fmt = Xv6Formatter::new(256, 4, 16).unwrap();
        fmt.create_file(XV6_ROOT_INODE, "f", &[7u8; 3000]).unwrap();
        let fs = checker(fmt);
        let mut rep = VerifyReport::default();
        check_missing_blocks(&fs, &mut rep).unwrap();
        check_unallocated_blocks(&fs, &mut rep).unwrap();
        check_multiply_allocated(&fs, &mut rep).unwrap();
        assert_eq!(rep.findings.len(), 3);
    }

    #[test]
    fn test_missing_block_named() {
        let mut fmt = Xv6Formatter::new(256, 4, 16).unwrap();
        fmt.set_block_bit(200, true);
        let err = check_missing_blocks(&checker(fmt), &mut VerifyReport::default()).unwrap_err();
        assert_eq!(err.kind(), Some(ViolationKind::MissingBlock));
        assert_eq!(
            err.to_string(),
            "Block 200 is marked as allocated on the bitmap, but is not referenced by any inode."
        );
    }

    #[test]
    fn test_unallocated_block_named() {
        let mut fmt = Xv6Formatter::new(256, 4, 16).unwrap();
        let f = fmt.create_file(XV6_ROOT_INODE, "f", b"data").unwrap();
        let b = fmt.inode(f).unwrap().addrs[0].get();
        fmt.set_block_bit(b, false);
        let err =
            check_unallocated_blocks(&checker(fmt), &mut VerifyReport::default()).unwrap_err();
        assert_eq!(err.kind(), Some(ViolationKind::UnallocatedBlock));
        assert!(err.to_string().starts_with(&format!("Block {b} ")));
    }

    #[test]
    fn test_indirect_block_counts_as_referenced() {
        let mut fmt = Xv6Formatter::new(256, 4, 16).unwrap();
        let f = fmt
            .create_file(XV6_ROOT_INODE, "big", &vec![1u8; (XV6_NDIRECT + 1) * XV6_BSIZE])
            .unwrap();
        assert_ne!(fmt.inode(f).unwrap().indirect(), 0);
        check_missing_blocks(&checker(fmt), &mut VerifyReport::default()).unwrap();
    }

    #[test]
    fn test_shared_block_lists_inodes() {
        let mut fmt = Xv6Formatter::new(256, 4, 16).unwrap();
        let a = fmt.create_file(XV6_ROOT_INODE, "a", b"a").unwrap();
        let b = fmt.create_file(XV6_ROOT_INODE, "b", b"b").unwrap();
        let shared = fmt.inode(a).unwrap().addrs[0];
        fmt.inode_mut(b).unwrap().addrs[0] = shared;

        let err =
            check_multiply_allocated(&checker(fmt), &mut VerifyReport::default()).unwrap_err();
        assert_eq!(err.kind(), Some(ViolationKind::MultiplyAllocatedBlock));
        assert_eq!(
            err.to_string(),
            format!(
                "Block {} is referenced multiple times by the following inodes: {a}, {b}",
                shared.get()
            )
        );
    }
}
