// xv6fsck/src/utils/log.rs

use log::LevelFilter;

/// Installs the process-wide logger. Library diagnostics go to stderr; the
/// report itself is printed on stdout.
pub fn init(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .format_timestamp(None)
        .format_target(false)
        .init();
}
