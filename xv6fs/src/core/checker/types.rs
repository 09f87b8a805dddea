// SPDX-License-Identifier: MIT
// core/checker/types.rs

use core::fmt;

use bitflags::bitflags;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
}

#[derive(Clone, Debug)]
pub struct Finding {
    pub sev: Severity,
    pub code: &'static str,
    pub msg: String,
}

impl Finding {
    pub fn info(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Info,
            code,
            msg: msg.into(),
        }
    }
    pub fn warn(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Warn,
            code,
            msg: msg.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.sev {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
        };
        write!(f, "{tag}: {:<16} {}", self.code, self.msg)
    }
}

/// Findings of the checks that completed. A violation is not a finding: it
/// ends the run as an error.
#[derive(Clone, Debug, Default)]
pub struct VerifyReport {
    pub findings: Vec<Finding>,
}

impl VerifyReport {
    pub fn push(&mut self, f: Finding) {
        self.findings.push(f)
    }

    pub fn count(&self, s: Severity) -> usize {
        self.findings.iter().filter(|f| f.sev == s).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for it in &self.findings {
            writeln!(f, "{it}")?;
        }
        Ok(())
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CheckPhases: u32 {
        const GEOMETRY          = 1 << 0;
        const NULL_INODE        = 1 << 1;
        const MISSING_BLOCK     = 1 << 2;
        const UNALLOCATED_BLOCK = 1 << 3;
        const MULTI_BLOCK       = 1 << 4;
        const MISSING_INODE     = 1 << 5;
        const UNUSED_INODE      = 1 << 6;
        const ROOT              = 1 << 7;
        const SPECIAL_NAMES     = 1 << 8;
        const LOOP              = 1 << 9;
        const SPECIAL_TYPES     = 1 << 10;
        const SELF_ROOT         = 1 << 11;
        const NLINK             = 1 << 12;
        const SIZE              = 1 << 13;
        const NAMES             = 1 << 14;
        const ALL               = u32::MAX;
    }
}

impl CheckPhases {
    /// Parses the kebab-case phase name used in configuration files.
    pub fn from_kebab(name: &str) -> Option<Self> {
        let phase = match name {
            "geometry" => Self::GEOMETRY,
            "null-inode" => Self::NULL_INODE,
            "missing-block" => Self::MISSING_BLOCK,
            "unallocated-block" => Self::UNALLOCATED_BLOCK,
            "multi-block" => Self::MULTI_BLOCK,
            "missing-inode" => Self::MISSING_INODE,
            "unused-inode" => Self::UNUSED_INODE,
            "root" => Self::ROOT,
            "special-names" => Self::SPECIAL_NAMES,
            "loop" => Self::LOOP,
            "special-types" => Self::SPECIAL_TYPES,
            "self-root" => Self::SELF_ROOT,
            "nlink" => Self::NLINK,
            "size" => Self::SIZE,
            "names" => Self::NAMES,
            _ => return None,
        };
        Some(phase)
    }
}

/// Generic options that a filesystem checker can encapsulate/extend.
pub trait VerifierOptionsLike {
    fn phases(&self) -> CheckPhases {
        CheckPhases::ALL
    }
}
