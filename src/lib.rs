//! # nexttag
//!
//! nexttag derives the next git tag for a CI pipeline, following a three-branch scheme:
//!
//! | branch              | tag                       | example                   |
//! |---------------------|---------------------------|---------------------------|
//! | `master`            | release                   | `1.2.3`                   |
//! | `dev`               | release candidate         | `1.2.3-rc1`               |
//! | feature / MR branch | branch build              | `1.2.3.1-dev1+biomed1234` |
//!
//! The fourth component of a branch build, the *pico* version, tells apart feature branches cut
//! from the same release candidate. It is allocated by looking at what has already been published
//! to a package index (see [index]). Once a branch has its pico and build metadata, only its
//! `dev<N>` counter moves.
//!
//! ## Flow
//!
//! ```text
//! dev:       10.2.20-rc1
//! branch foo 10.2.20-rc1 -> 10.2.20.1-dev1+foo -> 10.2.20.1-dev2+foo
//! branch bar 10.2.20-rc1 -> 10.2.20.2-dev1+bar -> 10.2.20.2-dev2+bar
//! bar -> dev 10.2.21-rc1
//! foo -> dev 10.2.22-rc1
//! ```
//!
//! ## Usage
//!
//! The pieces can be driven directly:
//!
//! ```
//! use nexttag::prelude::*;
//!
//! struct NoTags;
//!
//! impl TagStore for NoTags {
//!     fn describe(&self) -> Result<Option<String>, GitError> {
//!         Ok(None)
//!     }
//!     fn tag_exists(&self, _tag: &str) -> Result<bool, GitError> {
//!         Ok(false)
//!     }
//!     fn create_and_push(&self, _tag: &str) -> Result<Published, GitError> {
//!         Ok(Published::DryRun)
//!     }
//! }
//!
//! let bumper = Bumper::new(&NoTags, &Unconfigured);
//! let current: Version = "2.1.6.1-dev1+devops1234-1-g8e51be0".parse().unwrap();
//! let branch = Branch::parse("DEVOPS-1234").unwrap();
//! let next = bumper.next(&current, &branch, BumpLevel::Patch).unwrap();
//! assert_eq!("2.1.6.1-dev2+devops1234", next.to_string());
//! ```
//!
//! The `nexttag` binary wires them to git, the Nexus search API and the GitLab CI environment.
#![warn(missing_docs)]

mod branch;
mod bumper;
mod context;
mod error;
pub mod git;
pub mod index;
mod level;
mod orchestrator;
mod version;

pub use crate::branch::{Branch, BranchClass};
pub use crate::bumper::Bumper;
pub use crate::context::{CiContext, CiVariables, PipelineSource};
pub use crate::error::{BumpError, ConfigError, Error, GitError, IndexError, VersionError};
pub use crate::level::BumpLevel;
pub use crate::orchestrator::{Orchestrator, Outcome, DEFAULT_MAX_ATTEMPTS};
pub use crate::version::{bump_core, Form, Version};

/// A convenience module appropriate for glob imports (`use nexttag::prelude::*;`).
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::git::{Git, Publish, Published, TagStore};
    #[doc(no_inline)]
    pub use crate::index::{Allocator, IndexSettings, NexusIndex, PicoSource, Unconfigured};
    #[doc(no_inline)]
    pub use crate::Branch;
    #[doc(no_inline)]
    pub use crate::BumpLevel;
    #[doc(no_inline)]
    pub use crate::Bumper;
    #[doc(no_inline)]
    pub use crate::CiContext;
    #[doc(no_inline)]
    pub use crate::Error;
    #[doc(no_inline)]
    pub use crate::GitError;
    #[doc(no_inline)]
    pub use crate::Orchestrator;
    #[doc(no_inline)]
    pub use crate::Outcome;
    #[doc(no_inline)]
    pub use crate::Version;
}
