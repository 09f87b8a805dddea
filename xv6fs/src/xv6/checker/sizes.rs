// SPDX-License-Identifier: MIT

use crate::core::errors::*;
use crate::xv6::constant::*;
use crate::xv6::index::InodeLoc;
use crate::xv6::resolver::Xv6Resolver;

use super::{Finding, VerifyReport, Xv6Checker};

/// Size an inode should carry given its blocks.
///
/// Directories count 16 bytes per valid entry; everything else counts whole
/// blocks.
pub fn recomputed_size(res: &Xv6Resolver<'_>, loc: InodeLoc<'_>) -> FsResult<u64> {
    let blocks = res.blocks_of(loc)?;
    if !loc.inode.is_dir() {
        return Ok(blocks.len() as u64 * XV6_BSIZE as u64);
    }
    let mut size = 0u64;
    for b in blocks {
        size += (res.valid_entries_in_block(loc.inum, b)?.len() * XV6_DIRENT_SIZE) as u64;
    }
    Ok(size)
}

pub(super) fn check_file_sizes(fs: &Xv6Checker, rep: &mut VerifyReport) -> FsResult<()> {
    let res = fs.resolver();
    for loc in fs.index()?.allocated() {
        let stored = loc.inode.size.get();
        if stored > XV6_MAXFILE_SIZE {
            return Err(FsError::violation(
                ViolationKind::FileSize,
                format!(
                    "Inode {} exceeds the maximum file size; MAX: {XV6_MAXFILE_SIZE} Actual: {stored}",
                    loc.inum
                ),
            ));
        }
        let actual = recomputed_size(&res, loc)?;
        if actual != stored as u64 {
            return Err(FsError::violation(
                ViolationKind::FileSize,
                format!(
                    "Inode {} contains an incorrect size. Inode Size: {stored} Actual: {actual}",
                    loc.inum
                ),
            ));
        }
    }
    rep.push(Finding::info("INO.SIZE", "File sizes OK"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xv6::formatter::Xv6Formatter;

    #[test]
    fn test_sizes_of_built_tree() {
        let mut fmt = Xv6Formatter::new(512, 4, 16).unwrap();
        let d = fmt.mkdir(XV6_ROOT_INODE, "d").unwrap();
        let f = fmt.create_file(d, "f", &[3u8; 1300]).unwrap();
        let e = fmt.create_file(d, "empty", b"").unwrap();
        let fs = Xv6Checker::new(fmt.into_image().unwrap());
        let idx = fs.index().unwrap();
        let res = fs.resolver();

        assert_eq!(recomputed_size(&res, idx.get(d).unwrap()).unwrap(), 4 * 16);
        assert_eq!(recomputed_size(&res, idx.get(f).unwrap()).unwrap(), 3 * 512);
        assert_eq!(recomputed_size(&res, idx.get(e).unwrap()).unwrap(), 0);

        let mut rep = VerifyReport::default();
        check_file_sizes(&fs, &mut rep).unwrap();
        assert!(rep.contains_code("INO.SIZE"));
    }

    #[test]
    fn test_directory_spanning_blocks() {
        let mut fmt = Xv6Formatter::new(512, 4, 64).unwrap();
        for i in 0..40 {
            fmt.create_file(XV6_ROOT_INODE, &format!("f{i}"), b"").unwrap();
        }
        let fs = Xv6Checker::new(fmt.into_image().unwrap());
        let root = fs.index().unwrap().get(XV6_ROOT_INODE).unwrap();
        assert_eq!(fs.resolver().blocks_of(root).unwrap().len(), 2);
        assert_eq!(recomputed_size(&fs.resolver(), root).unwrap(), 42 * 16);
        check_file_sizes(&fs, &mut VerifyReport::default()).unwrap();
    }

    #[test]
    fn test_corrupted_size() {
        let mut fmt = Xv6Formatter::new(256, 4, 16).unwrap();
        let f = fmt.create_file(XV6_ROOT_INODE, "f", &[1u8; 100]).unwrap();
        fmt.inode_mut(f).unwrap().size.set(100);
        let err = check_file_sizes(
            &Xv6Checker::new(fmt.into_image().unwrap()),
            &mut VerifyReport::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Inode {f} contains an incorrect size. Inode Size: 100 Actual: 512")
        );
    }

    #[test]
    fn test_size_over_maximum() {
        let mut fmt = Xv6Formatter::new(256, 4, 16).unwrap();
        let f = fmt.create_file(XV6_ROOT_INODE, "f", b"").unwrap();
        fmt.inode_mut(f).unwrap().size.set(XV6_MAXFILE_SIZE + 1);
        let err = check_file_sizes(
            &Xv6Checker::new(fmt.into_image().unwrap()),
            &mut VerifyReport::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), Some(ViolationKind::FileSize));
        assert!(err.to_string().contains("MAX: 71680 Actual: 71681"));
    }
}
