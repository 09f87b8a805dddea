// SPDX-License-Identifier: MIT

use core::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which structural invariant a [`Violation`] breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    Superblock,
    NullInode,
    MissingBlock,
    UnallocatedBlock,
    MultiplyAllocatedBlock,
    MissingInode,
    UnusedInode,
    RootNode,
    SpecialEntryName,
    DirectoryLoop,
    NonDirSpecialEntry,
    NonRootSelfRef,
    LinkCount,
    FileSize,
    NonPrintableName,
    BadAddress,
}

impl ViolationKind {
    pub fn msg(&self) -> &'static str {
        match self {
            ViolationKind::Superblock => "Invalid superblock",
            ViolationKind::NullInode => "Null inode allocated",
            ViolationKind::MissingBlock => "Missing block",
            ViolationKind::UnallocatedBlock => "Unallocated block",
            ViolationKind::MultiplyAllocatedBlock => "Multiply allocated block",
            ViolationKind::MissingInode => "Missing inode",
            ViolationKind::UnusedInode => "Unused inode",
            ViolationKind::RootNode => "Invalid root inode",
            ViolationKind::SpecialEntryName => "Invalid special entry name",
            ViolationKind::DirectoryLoop => "Directory loop",
            ViolationKind::NonDirSpecialEntry => "Special entry is not a directory",
            ViolationKind::NonRootSelfRef => "Directory claims to be root",
            ViolationKind::LinkCount => "Invalid link count",
            ViolationKind::FileSize => "Invalid file size",
            ViolationKind::NonPrintableName => "Non-printable name",
            ViolationKind::BadAddress => "Bad block address",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.msg())
    }
}

/// A structural invariant failure found in an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub detail: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

/// Top-level error
#[derive(Debug, Error)]
pub enum FsError {
    #[error("Could not open file: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Violation(Violation),
    #[error("Format error: {0}")]
    Format(String),
}

impl FsError {
    pub fn violation(kind: ViolationKind, detail: impl Into<String>) -> Self {
        FsError::Violation(Violation::new(kind, detail))
    }

    /// The violation carried by this error, if it is one.
    pub fn as_violation(&self) -> Option<&Violation> {
        match self {
            FsError::Violation(v) => Some(v),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<ViolationKind> {
        self.as_violation().map(|v| v.kind)
    }
}

impl From<Violation> for FsError {
    #[inline]
    fn from(v: Violation) -> Self {
        FsError::Violation(v)
    }
}

pub type FsResult<T = ()> = Result<T, FsError>;
