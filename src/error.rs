use std::process::ExitStatus;

/// Errors raised while reading a tag string as a [crate::Version].
#[derive(thiserror::Error, Debug)]
pub enum VersionError {
    /// The tag does not look like a version at all.
    #[error("Tag `{tag}` should be a 3- or 4-component version")]
    Unparseable {
        /// The offending tag.
        tag: String,
    },

    /// The tag has the right shape, but its prerelease or build is not valid semver.
    #[error("Tag `{tag}` should be valid semver once its pico component is removed: {source}")]
    Semver {
        /// The offending tag.
        tag: String,
        /// The semver parser's complaint.
        source: semver::Error,
    },
}

/// Errors raised by the branch state machine.
#[derive(thiserror::Error, Debug)]
pub enum BumpError {
    /// A branch-form version whose prerelease is not a `dev<N>` counter.
    #[error("Branch version `{version}` should carry a `dev<N>` prerelease, found `{prerelease}`")]
    UnexpectedPrerelease {
        /// The version being bumped.
        version: String,
        /// Its prerelease label.
        prerelease: String,
    },

    /// A label or build value that semver rejects.
    #[error("Generated identifier `{identifier}` should be valid semver: {source}")]
    InvalidIdentifier {
        /// The rejected text.
        identifier: String,
        /// The semver parser's complaint.
        source: semver::Error,
    },
}

/// Errors raised while querying the package index.
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// Transport, status or JSON decoding failure.
    #[error("Package index request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The index kept returning continuation tokens.
    #[error("Package index should finish paginating within {max_pages} pages")]
    TooManyPages {
        /// The configured bound.
        max_pages: usize,
    },
}

/// Errors raised while running git.
#[derive(thiserror::Error, Debug)]
pub enum GitError {
    /// git could not be started.
    #[error("Could not run `git {args}`: {source}")]
    Spawn {
        /// The arguments passed to git.
        args: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// git ran and reported failure.
    #[error("`git {args}` failed with {status}: {stderr}")]
    Failed {
        /// The arguments passed to git.
        args: String,
        /// git's exit status.
        status: ExitStatus,
        /// Whatever git wrote to stderr.
        stderr: String,
    },

    /// Pushing on CI needs the repository URL to derive the SSH push URL.
    #[error("CI_REPOSITORY_URL should be set to push tags on CI")]
    MissingRepositoryUrl,
}

/// Errors in the settings the run was started with.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    /// A pico had to be allocated but no index is configured.
    #[error("Package index settings (url, repository, package) should be set to allocate a pico version")]
    MissingIndex,

    /// The branch name has nothing left once sanitized.
    #[error("Branch name `{ref_name}` should contain at least one letter or digit")]
    EmptyBranch {
        /// The raw branch name.
        ref_name: String,
    },
}

/// Any failure of a run.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// See [VersionError].
    #[error(transparent)]
    Version(#[from] VersionError),

    /// See [BumpError].
    #[error(transparent)]
    Bump(#[from] BumpError),

    /// See [IndexError].
    #[error(transparent)]
    Index(#[from] IndexError),

    /// See [GitError].
    #[error(transparent)]
    Git(#[from] GitError),

    /// See [ConfigError].
    #[error(transparent)]
    Config(#[from] ConfigError),
}
