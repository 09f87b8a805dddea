// SPDX-License-Identifier: MIT
pub mod dirent;
pub mod inode;
pub mod superblock;

pub use dirent::Xv6DirEntry;
pub use inode::{InodeType, Xv6Dinode, indirect_entry};
pub use superblock::Xv6Superblock;
