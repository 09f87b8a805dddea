// SPDX-License-Identifier: MIT

// === Sub-modules ===
pub mod checker;
pub mod errors;
pub mod utils;

// === Core Traits ===
pub mod traits {
    pub use super::checker::FsChecker;
    pub use super::checker::VerifierOptionsLike;
    pub use super::utils::BitmapOps;
}

// === Error types ===
pub use errors::*;
