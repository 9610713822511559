//! The branch rules that turn the current tag into the next one.
//!
//! | branch   | current tag                 | next tag                  |
//! |----------|-----------------------------|---------------------------|
//! | `master` | anything `1.2.3...`         | `1.2.4` (first free)      |
//! | `dev`    | anything `1.2.3...`         | `1.2.4-rc1`               |
//! | other    | `1.2.3-rc1[-2-gabc]`        | `1.2.3.<pico>-dev1+name`  |
//! | other    | `1.2.3.4-dev2+name[-1-gab]` | `1.2.3.4-dev3+name`       |

use crate::{
    branch::{Branch, BranchClass},
    error::BumpError,
    git::TagStore,
    index::PicoSource,
    level::BumpLevel,
    version::{bump_core, Form, Version},
    Error,
};
use tracing::{debug, info};

/// Computes next versions. Consults the tag store on `master` and the pico source on the first
/// build of a feature branch.
pub struct Bumper<'a> {
    tags: &'a dyn TagStore,
    picos: &'a dyn PicoSource,
}

impl<'a> Bumper<'a> {
    /// A bumper checking tags in `tags` and allocating picos from `picos`.
    pub fn new(tags: &'a dyn TagStore, picos: &'a dyn PicoSource) -> Self {
        Self { tags, picos }
    }

    /// The version that follows `current` on `branch`.
    ///
    /// `level` only matters on `master` and `dev`; feature branches always bump their `dev<N>`
    /// counter.
    ///
    /// # Errors
    ///
    /// - On a feature branch, if `current` is neither a release, a release candidate nor a branch
    ///   version with a `dev<N>` counter, returns [BumpError::UnexpectedPrerelease].
    /// - Tag store and pico source failures are passed through.
    pub fn next(
        &self,
        current: &Version,
        branch: &Branch,
        level: BumpLevel,
    ) -> Result<Version, Error> {
        debug!(
            major = current.major(),
            minor = current.minor(),
            patch = current.patch(),
            pico = ?current.pico(),
            pre = current.prerelease(),
            build = current.build(),
            "parsed current version"
        );

        match branch.class() {
            BranchClass::Master => self.next_release(current, level),
            BranchClass::Dev => {
                let core = bump_core(&current.core(), level);
                Ok(Version::release_candidate(&core, 1)?)
            }
            BranchClass::Other => self.next_branch_build(current, branch),
        }
    }

    /// Bumps the core and keeps bumping while the tag is taken, which happens when an out of date
    /// branch is merged.
    fn next_release(&self, current: &Version, level: BumpLevel) -> Result<Version, Error> {
        let mut candidate = bump_core(&current.core(), level);
        while self.tags.tag_exists(&candidate.to_string())? {
            debug!(%candidate, "release tag already exists");
            candidate = bump_core(&candidate, level);
        }
        Ok(Version::release(&candidate))
    }

    fn next_branch_build(&self, current: &Version, branch: &Branch) -> Result<Version, Error> {
        let current = current.without_describe_suffix()?;
        let unexpected = || BumpError::UnexpectedPrerelease {
            version: current.to_string(),
            prerelease: current.prerelease().to_owned(),
        };

        match current.form() {
            // first build of the branch: it was cut from a `dev` or `master` tag
            Form::ReleaseCandidate | Form::Release => {
                let core = current.core();
                let pico = self.picos.next_pico(&core)?;
                info!(%core, pico, %branch, "starting branch versions");
                Ok(Version::branch(&core, pico, 1, branch.name())?)
            }
            Form::Branch => {
                let (Some(pico), Some(counter)) = (current.pico(), current.dev_counter()) else {
                    return Err(unexpected().into());
                };
                Ok(Version::branch(
                    &current.core(),
                    pico,
                    counter + 1,
                    current.build(),
                )?)
            }
            Form::Other => Err(unexpected().into()),
        }
    }
}
