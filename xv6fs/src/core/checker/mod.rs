// SPDX-License-Identifier: MIT

pub mod stats;
mod types;

pub use stats::WalkerStats;
pub use types::{CheckPhases, Finding, Severity, VerifierOptionsLike, VerifyReport};

use log::debug;

pub use crate::core::errors::{FsError, FsResult};

/// Signature of one check: inspects the filesystem, records a finding on
/// success and returns the first violation otherwise.
pub type CheckFn<C> = fn(&C, &mut VerifyReport) -> FsResult<()>;

/// One entry of a checker's ordered check list.
pub struct Check<C> {
    pub phase: CheckPhases,
    pub code: &'static str,
    pub run: CheckFn<C>,
}

/// Trait for verifying the integrity of a filesystem.
///
/// Implementors list their checks in [`FsChecker::CHECKS`]; the checks run in
/// that order and the run stops at the first violation.
pub trait FsChecker: Sized + 'static {
    type Options: VerifierOptionsLike + Default;

    const CHECKS: &'static [Check<Self>];

    /// Runs every selected check in order, appending findings to `rep`.
    ///
    /// Findings of the checks that passed stay in `rep` when a later check
    /// fails, so callers can still print them.
    fn check_with(&self, opt: &Self::Options, rep: &mut VerifyReport) -> FsResult<()> {
        for check in Self::CHECKS {
            self.run_phase(opt, rep, check)?;
        }
        Ok(())
    }

    fn check_all(&self) -> FsResult<VerifyReport> {
        let mut rep = VerifyReport::default();
        self.check_with(&Self::Options::default(), &mut rep)?;
        Ok(rep)
    }

    fn run_phase(
        &self,
        opt: &Self::Options,
        rep: &mut VerifyReport,
        check: &Check<Self>,
    ) -> FsResult<()> {
        if opt.phases().contains(check.phase) {
            debug!("running check {}", check.code);
            (check.run)(self, rep)?;
        } else {
            rep.push(Finding::warn(check.code, "skipped"));
        }
        Ok(())
    }
}
