use crate::{
    error::{BumpError, VersionError},
    level::BumpLevel,
};
use core::{
    fmt::{self, Display},
    str::FromStr,
};
use regex::Regex;
use semver::{BuildMetadata, Prerelease};
use std::sync::LazyLock;

/// `major.minor.patch.pico`, then an optional prerelease and build. Prerelease and build are
/// checked by the semver parser afterwards.
static BRANCH_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)\.(\d+)(?:-([^+]*))?(?:\+(.*))?$")
        .expect("branch form pattern is valid")
});

/// What `git describe` appends when HEAD is past the tag: `-<commits>-g<sha>`. A bare release tag
/// gets it as the whole prerelease, hence the `^` alternative.
static DESCRIBE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|-)(\d+)-g([0-9a-f]+)$").expect("describe suffix pattern is valid")
});

const RC_LABEL: &str = "rc";
const DEV_LABEL: &str = "dev";

/// The shape of a version, as far as the branch rules care.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Form {
    /// `major.minor.patch`, as tagged on `master`.
    Release,
    /// `major.minor.patch-rc<N>`, as tagged on `dev`.
    ReleaseCandidate,
    /// `major.minor.patch.pico-dev<N>+build`, as tagged on feature branches.
    Branch,
    /// A three-component version with some other prerelease label.
    Other,
}

/// A version as found in a tag: a semver core plus an optional fourth "pico" component.
///
/// Both plain semver tags (`1.2.3`, `1.2.3-rc1`, `1.2.3-rc1-2-g2af9c73`) and branch tags
/// (`1.2.3.1-dev2+biomed1234`) parse into this type, and [Display] writes them back as
/// `major.minor.patch[.pico][-pre][+build]`.
///
/// ```
/// use nexttag::Version;
///
/// let version: Version = "2.1.6.1-dev1+devops1234".parse().unwrap();
/// assert_eq!(Some(1), version.pico());
/// assert_eq!("dev1", version.prerelease());
/// assert_eq!("devops1234", version.build());
/// assert_eq!("2.1.6.1-dev1+devops1234", version.to_string());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Version {
    core: semver::Version,
    pico: Option<u64>,
}

impl Version {
    /// The version a repository without any tag starts at.
    pub fn initial() -> Self {
        Self::release(&semver::Version::new(1, 0, 0))
    }

    /// A bare `major.minor.patch` release.
    pub fn release(core: &semver::Version) -> Self {
        Self {
            core: semver::Version::new(core.major, core.minor, core.patch),
            pico: None,
        }
    }

    /// `major.minor.patch-rc<counter>`.
    pub fn release_candidate(core: &semver::Version, counter: u64) -> Result<Self, BumpError> {
        let mut release = Self::release(core);
        release.core.pre = prerelease(&format!("{RC_LABEL}{counter}"))?;
        Ok(release)
    }

    /// `major.minor.patch.pico-dev<counter>+build`.
    pub fn branch(
        core: &semver::Version,
        pico: u64,
        counter: u64,
        build: &str,
    ) -> Result<Self, BumpError> {
        let mut release = Self::release(core);
        release.pico = Some(pico);
        release.core.pre = prerelease(&format!("{DEV_LABEL}{counter}"))?;
        release.core.build =
            BuildMetadata::new(build).map_err(|source| BumpError::InvalidIdentifier {
                identifier: build.to_owned(),
                source,
            })?;
        Ok(release)
    }

    /// The major component.
    pub fn major(&self) -> u64 {
        self.core.major
    }

    /// The minor component.
    pub fn minor(&self) -> u64 {
        self.core.minor
    }

    /// The patch component.
    pub fn patch(&self) -> u64 {
        self.core.patch
    }

    /// The fourth component, present on branch tags only.
    pub fn pico(&self) -> Option<u64> {
        self.pico
    }

    /// The prerelease label, or an empty string.
    pub fn prerelease(&self) -> &str {
        self.core.pre.as_str()
    }

    /// The build metadata, or an empty string.
    pub fn build(&self) -> &str {
        self.core.build.as_str()
    }

    /// The bare `major.minor.patch` of this version.
    pub fn core(&self) -> semver::Version {
        semver::Version::new(self.core.major, self.core.minor, self.core.patch)
    }

    /// Classifies this version, looking through any `git describe` suffix.
    pub fn form(&self) -> Form {
        if self.pico.is_some() {
            return Form::Branch;
        }
        let pre = DESCRIBE_SUFFIX.replace(self.prerelease(), "");
        if pre.is_empty() {
            Form::Release
        } else if pre.starts_with(RC_LABEL) {
            Form::ReleaseCandidate
        } else {
            Form::Other
        }
    }

    /// Returns true if `git describe` appended `-<commits>-g<sha>` to the tag this came from.
    pub fn has_describe_suffix(&self) -> bool {
        DESCRIBE_SUFFIX.is_match(self.describe_field())
    }

    /// Drops the `-<commits>-g<sha>` that `git describe` appends when HEAD is past the tag.
    ///
    /// On a branch tag (`2.1.6.1-dev1+devops1234-1-g8e51be0`) the suffix ends up in the build
    /// metadata; otherwise (`2.1.6-rc1-1-g75f461d`) it ends up in the prerelease.
    pub fn without_describe_suffix(&self) -> Result<Self, VersionError> {
        let mut stripped = self.clone();
        let invalid = |source| VersionError::Semver {
            tag: self.to_string(),
            source,
        };
        if self.core.build.is_empty() {
            let pre = DESCRIBE_SUFFIX.replace(self.prerelease(), "");
            stripped.core.pre = Prerelease::new(&pre).map_err(invalid)?;
        } else {
            let build = DESCRIBE_SUFFIX.replace(self.build(), "");
            stripped.core.build = BuildMetadata::new(&build).map_err(invalid)?;
        }
        Ok(stripped)
    }

    /// The `N` of a `dev<N>` prerelease.
    pub fn dev_counter(&self) -> Option<u64> {
        self.counter(DEV_LABEL)
    }

    /// The `N` of an `rc<N>` prerelease.
    pub fn rc_counter(&self) -> Option<u64> {
        self.counter(RC_LABEL)
    }

    fn counter(&self, label: &str) -> Option<u64> {
        self.prerelease().strip_prefix(label)?.parse().ok()
    }

    fn describe_field(&self) -> &str {
        if self.core.build.is_empty() {
            self.prerelease()
        } else {
            self.build()
        }
    }
}

fn prerelease(text: &str) -> Result<Prerelease, BumpError> {
    Prerelease::new(text).map_err(|source| BumpError::InvalidIdentifier {
        identifier: text.to_owned(),
        source,
    })
}

/// Bumps a `major.minor.patch` by `level`: the targeted component goes up by one, lower ones go
/// to zero, and any prerelease or build is dropped.
///
/// ```
/// use nexttag::{bump_core, BumpLevel};
///
/// let core = semver::Version::new(2, 1, 6);
/// assert_eq!("3.0.0", bump_core(&core, BumpLevel::Major).to_string());
/// assert_eq!("2.2.0", bump_core(&core, BumpLevel::Minor).to_string());
/// assert_eq!("2.1.7", bump_core(&core, BumpLevel::Patch).to_string());
/// ```
pub fn bump_core(core: &semver::Version, level: BumpLevel) -> semver::Version {
    match level {
        BumpLevel::Major => semver::Version::new(core.major + 1, 0, 0),
        BumpLevel::Minor => semver::Version::new(core.major, core.minor + 1, 0),
        BumpLevel::Patch => semver::Version::new(core.major, core.minor, core.patch + 1),
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let invalid = |source| VersionError::Semver {
            tag: tag.to_owned(),
            source,
        };

        let Some(caps) = BRANCH_FORM.captures(tag) else {
            let core = semver::Version::parse(tag).map_err(|_| VersionError::Unparseable {
                tag: tag.to_owned(),
            })?;
            return Ok(Self { core, pico: None });
        };

        let pico = caps[4].parse().map_err(|_| VersionError::Unparseable {
            tag: tag.to_owned(),
        })?;
        let mut three = format!("{}.{}.{}", &caps[1], &caps[2], &caps[3]);
        if let Some(pre) = caps.get(5) {
            three.push('-');
            three.push_str(pre.as_str());
        }
        if let Some(build) = caps.get(6) {
            three.push('+');
            three.push_str(build.as_str());
        }
        let core = semver::Version::parse(&three).map_err(invalid)?;

        Ok(Self {
            core,
            pico: Some(pico),
        })
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.core.major, self.core.minor, self.core.patch)?;
        if let Some(pico) = self.pico {
            write!(f, ".{pico}")?;
        }
        if !self.core.pre.is_empty() {
            write!(f, "-{}", self.core.pre)?;
        }
        if !self.core.build.is_empty() {
            write!(f, "+{}", self.core.build)?;
        }
        Ok(())
    }
}
