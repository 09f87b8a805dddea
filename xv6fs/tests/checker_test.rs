// SPDX-License-Identifier: MIT

use std::io::Write;

use xv6fs::prelude::*;

/// Root with a small tree: two nested dirs, a multi-block file, a file
/// large enough to need the indirect block, a hard link and a device.
fn sample() -> Xv6Formatter {
    let mut fmt = Xv6Formatter::with_defaults().expect("format failed");
    let bin = fmt.mkdir(XV6_ROOT_INODE, "bin").unwrap();
    let etc = fmt.mkdir(XV6_ROOT_INODE, "etc").unwrap();
    let deep = fmt.mkdir(etc, "deep").unwrap();

    fmt.create_file(bin, "sh", &vec![0x90u8; 3 * XV6_BSIZE + 17])
        .unwrap();
    let big = fmt
        .create_file(deep, "big.bin", &vec![0xEEu8; 40 * XV6_BSIZE])
        .unwrap();
    fmt.link(XV6_ROOT_INODE, "big-link", big).unwrap();
    fmt.create_file(etc, "README", b"hello xv6\n").unwrap();
    fmt.create_file(XV6_ROOT_INODE, "empty", b"").unwrap();
    fmt.mknod(XV6_ROOT_INODE, "console", 1, 1).unwrap();
    fmt
}

fn check(fmt: Xv6Formatter) -> (VerifyReport, FsResult<()>) {
    let fs = Xv6Checker::new(fmt.into_image().expect("image"));
    let mut rep = VerifyReport::default();
    let res = fs.check_with(&Xv6CheckOptions::default(), &mut rep);
    (rep, res)
}

fn violation(fmt: Xv6Formatter) -> (VerifyReport, Violation) {
    let (rep, res) = check(fmt);
    match res {
        Err(FsError::Violation(v)) => (rep, v),
        other => panic!("expected a violation, got {other:?}"),
    }
}

#[test]
fn test_valid_image_passes_every_check() {
    let (rep, res) = check(sample());
    res.expect("valid image rejected");
    assert_eq!(rep.count(Severity::Info), Xv6Checker::CHECKS.len());
    for c in Xv6Checker::CHECKS {
        assert!(rep.contains_code(c.code), "{} missing from report", c.code);
    }
}

#[test]
fn test_image_round_trips_through_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(sample().as_bytes()).unwrap();
    file.flush().unwrap();

    let fs = Xv6Checker::open(file.path(), XV6_FSSIZE).unwrap();
    assert_eq!(fs.image().fit(), ImageFit::Exact);
    fs.check_all().unwrap();
}

#[test]
fn test_root_invariant() {
    let fs = Xv6Checker::new(sample().into_image().unwrap());
    let root = fs.index().unwrap().get(XV6_ROOT_INODE).unwrap();
    assert!(root.inode.is_dir());

    let sp = fs.resolver().special_entries(root).unwrap();
    let dot = sp.dot.unwrap();
    let dotdot = sp.dotdot.unwrap();
    assert!(dot.is_named(".") && dot.inum() == XV6_ROOT_INODE);
    assert!(dotdot.is_named("..") && dotdot.inum() == XV6_ROOT_INODE);
}

#[test]
fn test_block_50_marked_but_unreferenced() {
    // Small log and inode table so that block 50 falls in the data region.
    let mut fmt = Xv6Formatter::new(XV6_FSSIZE, 2, 16).unwrap();
    assert!(fmt.geometry().data_start() < 50);
    assert!(!fmt.block_bit(50));
    fmt.set_block_bit(50, true);

    let (rep, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::MissingBlock);
    assert_eq!(
        v.to_string(),
        "Block 50 is marked as allocated on the bitmap, but is not referenced by any inode."
    );
    // nothing after the failing check ran
    assert!(rep.contains_code("INO.NULL"));
    assert!(!rep.contains_code("BLK.MISSING"));
    assert!(!rep.contains_code("BLK.UNALLOC"));
}

#[test]
fn test_free_bit_under_used_block() {
    let mut fmt = sample();
    let f = fmt.create_file(XV6_ROOT_INODE, "victim", b"abc").unwrap();
    let b = fmt.inode(f).unwrap().addrs[0].get();
    fmt.set_block_bit(b, false);

    let (_, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::UnallocatedBlock);
    assert!(v.to_string().contains(&format!("Block {b} ")));
}

#[test]
fn test_cross_linked_block() {
    let mut fmt = sample();
    let a = fmt.create_file(XV6_ROOT_INODE, "a", b"a").unwrap();
    let b = fmt.create_file(XV6_ROOT_INODE, "b", b"b").unwrap();
    let shared = fmt.inode(a).unwrap().addrs[0];
    let lost = fmt.inode(b).unwrap().addrs[0].get();
    fmt.inode_mut(b).unwrap().addrs[0] = shared;
    fmt.set_block_bit(lost, false);

    let (_, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::MultiplyAllocatedBlock);
    assert!(v.to_string().ends_with(&format!("inodes: {a}, {b}")));
}

#[test]
fn test_corrupted_size_reports_both_values() {
    let mut fmt = sample();
    let f = fmt.create_file(XV6_ROOT_INODE, "sized", &[1u8; 700]).unwrap();
    fmt.inode_mut(f).unwrap().size.set(700);

    let (rep, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::FileSize);
    assert_eq!(
        v.to_string(),
        format!("Inode {f} contains an incorrect size. Inode Size: 700 Actual: 1024")
    );
    assert!(rep.contains_code("INO.NLINK"));
}

#[test]
fn test_removed_entry_leaves_stale_nlink() {
    let mut fmt = sample();
    let f = fmt.create_file(XV6_ROOT_INODE, "twice", b"x").unwrap();
    fmt.link(XV6_ROOT_INODE, "again", f).unwrap();
    fmt.clear_entry(XV6_ROOT_INODE, "again").unwrap();

    let (_, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::LinkCount);
    assert!(v.to_string().starts_with(&format!("Inode {f} ")));
}

#[test]
fn test_back_reference_to_ancestor() {
    let mut fmt = sample();
    let a = fmt.mkdir(XV6_ROOT_INODE, "a").unwrap();
    let d = fmt.mkdir(a, "d").unwrap();
    fmt.link(d, "loop", a).unwrap();

    let (_, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::DirectoryLoop);
    assert_eq!(
        v.to_string(),
        format!("Inode {d} refers to a non-parent ancestor ({a}) thus causing a loop.")
    );
}

#[test]
fn test_orphaned_inode() {
    let mut fmt = sample();
    let f = fmt.create_file(XV6_ROOT_INODE, "lost", b"").unwrap();
    fmt.clear_entry(XV6_ROOT_INODE, "lost").unwrap();

    let (_, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::UnusedInode);
    assert!(v.to_string().starts_with(&format!("Inode {f} ")));
}

#[test]
fn test_null_inode_in_use() {
    let mut fmt = sample();
    fmt.inode_mut(0).unwrap().set_type(InodeType::File);

    let (rep, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::NullInode);
    assert_eq!(rep.findings.len(), 1);
}

#[test]
fn test_bad_superblock_stops_before_index() {
    let mut fmt = sample();
    fmt.superblock_mut().unwrap().inodestart.set(900_000);

    let (rep, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::Superblock);
    assert!(rep.findings.is_empty());
}

#[test]
fn test_non_printable_name() {
    let mut fmt = sample();
    let f = fmt.create_file(XV6_ROOT_INODE, "tab", b"").unwrap();
    *fmt.entry_mut(XV6_ROOT_INODE, "tab").unwrap() =
        Xv6DirEntry::from_raw_name(f as u16, b"t\tb");

    let (rep, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::NonPrintableName);
    assert_eq!(rep.count(Severity::Info), Xv6Checker::CHECKS.len() - 1);
}

#[test]
fn test_dangling_pointer_is_bad_address() {
    let mut fmt = sample();
    let d = fmt.mkdir(XV6_ROOT_INODE, "d").unwrap();
    fmt.inode_mut(d).unwrap().addrs[XV6_NDIRECT].set(123_456);

    let (_, v) = violation(fmt);
    assert_eq!(v.kind, ViolationKind::BadAddress);
    assert!(v.to_string().contains("123456"));
}
