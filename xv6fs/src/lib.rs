// SPDX-License-Identifier: MIT
// Core Modules
pub mod core;
pub mod xv6;

// Reusable types and traits
pub use crate::core::traits::*;

/// xv6 filesystem: on-disk model, consistency checker and reference builder.
///
/// See [`prelude::Xv6Checker`] and [`prelude::Xv6Formatter`].
pub mod prelude {
    pub use super::xv6::prelude::*;
}
