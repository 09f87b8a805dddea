// SPDX-License-Identifier: MIT

/// Statistics collected during a directory tree walk.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkerStats {
    /// Number of directories visited.
    pub dirs_visited: usize,
    /// Number of directory entries scanned, `.` and `..` included.
    pub entries_scanned: usize,
    /// Maximum directory depth reached (root is depth 0).
    pub max_depth: usize,
    /// Visits to a directory already walked through another path.
    pub revisits: usize,
}
