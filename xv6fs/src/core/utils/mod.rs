// SPDX-License-Identifier: MIT
pub mod bitmap;

pub use bitmap::BitmapOps;
