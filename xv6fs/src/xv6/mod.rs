// SPDX-License-Identifier: MIT
pub mod checker;
pub mod constant;
pub mod formatter;
pub mod image;
pub mod index;
pub mod layout;
pub mod resolver;
pub mod types;

// Public Interface
pub mod traits {
    pub use super::checker::{Xv6CheckOptions, Xv6Checker};
    pub use super::formatter::Xv6Formatter;
    pub use super::image::{Image, ImageFit};
    pub use super::index::{InodeIndex, InodeLoc};
    pub use super::layout::Geometry;
    pub use super::resolver::{BlockRef, BlockRefs, PointerSlot, Xv6Resolver};
}

pub mod prelude {
    pub use super::constant::*;
    pub use super::traits::*;
    pub use super::types::*;
    pub use crate::core::checker::{
        CheckPhases, Finding, Severity, VerifyReport, WalkerStats,
    };
    pub use crate::core::errors::*;
    pub use crate::core::traits::*;
}
