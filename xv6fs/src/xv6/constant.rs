// SPDX-License-Identifier: MIT
// xv6fs/xv6/constant.rs

// === Blocks ===

// Block size in bytes
pub const XV6_BSIZE: usize = 512;

// Default total block count of an image (FSSIZE)
pub const XV6_FSSIZE: u32 = 1000;

// Block numbers of the fixed header blocks
pub const XV6_BOOT_BLOCK: u32 = 0;
pub const XV6_SUPERBLOCK_BLOCK: u32 = 1;

// Boot block + superblock precede the log region
pub const XV6_HEADER_BLOCKS: u32 = 2;

// === Inodes ===

pub const XV6_NDIRECT: usize = 12;
pub const XV6_NINDIRECT: usize = XV6_BSIZE / size_of::<u32>();
pub const XV6_MAXFILE: usize = XV6_NDIRECT + XV6_NINDIRECT;

// Largest size field an inode can legitimately carry
pub const XV6_MAXFILE_SIZE: u32 = (XV6_MAXFILE * XV6_BSIZE) as u32;

// On-disk dinode size
pub const XV6_DINODE_SIZE: usize = 64;

// Inodes per block
pub const XV6_IPB: u32 = (XV6_BSIZE / XV6_DINODE_SIZE) as u32;

pub const XV6_ROOT_INODE: u32 = 1;
pub const XV6_NULL_INODE: u32 = 0;

// Inode type tags
pub const XV6_T_FREE: u16 = 0;
pub const XV6_T_DIR: u16 = 1;
pub const XV6_T_FILE: u16 = 2;
pub const XV6_T_DEV: u16 = 3;

// === Directories ===

pub const XV6_DIRSIZ: usize = 14;
pub const XV6_DIRENT_SIZE: usize = 16;
pub const XV6_DIRENT_PER_BLOCK: usize = XV6_BSIZE / XV6_DIRENT_SIZE;

pub const XV6_DOT_NAME: &str = ".";
pub const XV6_DOTDOT_NAME: &str = "..";

// === Bitmap ===

// Bitmap bits per block
pub const XV6_BPB: u32 = (XV6_BSIZE * 8) as u32;

// === Defaults used by the reference builder ===

pub const XV6_DEFAULT_NINODES: u32 = 200;
pub const XV6_DEFAULT_NLOG: u32 = 30;
