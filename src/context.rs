use crate::{branch::Branch, error::ConfigError, git::Publish, level::BumpLevel};
use core::{
    convert::Infallible,
    fmt::{self, Display},
    str::FromStr,
};
use tracing::debug;

/// What triggered the pipeline (`CI_PIPELINE_SOURCE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineSource {
    /// `merge_request_event`: a merge request pipeline, run on the source branch.
    MergeRequestEvent,
    /// `push`: a branch pipeline, typically after a merge into `dev` or `master`.
    Push,
    /// Schedules, web triggers and anything else.
    Other(String),
}

impl FromStr for PipelineSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "merge_request_event" => PipelineSource::MergeRequestEvent,
            "push" => PipelineSource::Push,
            other => PipelineSource::Other(other.to_owned()),
        })
    }
}

impl Display for PipelineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineSource::MergeRequestEvent => f.write_str("merge_request_event"),
            PipelineSource::Push => f.write_str("push"),
            PipelineSource::Other(other) => f.write_str(other),
        }
    }
}

/// The CI variables a run reads, before interpretation.
#[derive(Debug, Clone, Default)]
pub struct CiVariables {
    /// `CI_PIPELINE_SOURCE`.
    pub pipeline_source: String,
    /// `CI_COMMIT_REF_NAME`.
    pub ref_name: String,
    /// `CI_MERGE_REQUEST_LABELS`, already split on commas.
    pub labels: Vec<String>,
    /// `CI_COMMIT_BRANCH`, only set on branch pipelines.
    pub commit_branch: Option<String>,
    /// `CI`, `"true"` on a CI runner.
    pub ci: Option<String>,
    /// `CI_REPOSITORY_URL`.
    pub repository_url: Option<String>,
}

/// The interpreted CI environment of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiContext {
    /// What triggered the pipeline.
    pub source: PipelineSource,
    /// The sanitized branch the pipeline runs on.
    pub branch: Branch,
    /// How far a `master` or `dev` bump goes.
    pub level: BumpLevel,
    /// `CI_COMMIT_BRANCH`, for the logs.
    pub commit_branch: Option<String>,
    /// Whether tags are really pushed.
    pub publish: Publish,
}

impl TryFrom<CiVariables> for CiContext {
    type Error = ConfigError;

    /// Interprets the raw variables.
    ///
    /// Merge request labels are only defined on merge request pipelines, so they are ignored on
    /// every other source and the bump level falls back to patch.
    ///
    /// # Errors
    ///
    /// If the branch name sanitizes to nothing, returns [ConfigError::EmptyBranch].
    fn try_from(vars: CiVariables) -> Result<Self, Self::Error> {
        let source = match PipelineSource::from_str(&vars.pipeline_source) {
            Ok(source) => source,
            Err(never) => match never {},
        };
        let branch = Branch::parse(&vars.ref_name)?;

        let level = if source == PipelineSource::MergeRequestEvent {
            BumpLevel::from_labels(&vars.labels)
        } else {
            if !vars.labels.is_empty() {
                debug!(%source, labels = ?vars.labels, "ignoring labels outside merge request pipelines");
            }
            BumpLevel::Patch
        };

        let publish = if vars.ci.as_deref() == Some("true") {
            Publish::Push {
                repository_url: vars.repository_url.filter(|url| !url.is_empty()),
            }
        } else {
            Publish::DryRun
        };

        Ok(Self {
            source,
            branch,
            level,
            commit_branch: vars.commit_branch.filter(|b| !b.is_empty()),
            publish,
        })
    }
}
