use crate::{
    branch::Branch,
    bumper::Bumper,
    context::{CiContext, PipelineSource},
    git::{Published, TagStore},
    index::PicoSource,
    version::Version,
    Error,
};
use tracing::{info, warn};

/// How many candidate tags a push pipeline tries before giving up and using the last one.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The repository had no tag; it starts at `1.0.0`.
    Initialized {
        /// The first tag.
        tag: String,
        /// Whether it was pushed.
        published: Published,
    },
    /// A new tag was derived from `previous`.
    Tagged {
        /// What `git describe` reported.
        previous: String,
        /// The new tag.
        tag: String,
        /// Whether it was pushed.
        published: Published,
    },
    /// The pipeline does not bump versions, e.g. a merge request from `dev` into `master`.
    Skipped {
        /// The pipeline source.
        source: PipelineSource,
        /// The branch the pipeline runs on.
        branch: Branch,
    },
}

impl Outcome {
    /// The new tag, if any.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Outcome::Initialized { tag, .. } | Outcome::Tagged { tag, .. } => Some(tag),
            Outcome::Skipped { .. } => None,
        }
    }
}

/// Runs one versioning pass for a pipeline.
pub struct Orchestrator<'a> {
    ctx: &'a CiContext,
    tags: &'a dyn TagStore,
    picos: &'a dyn PicoSource,
    max_attempts: usize,
}

impl<'a> Orchestrator<'a> {
    /// An orchestrator for the pipeline described by `ctx`.
    pub fn new(ctx: &'a CiContext, tags: &'a dyn TagStore, picos: &'a dyn PicoSource) -> Self {
        Self {
            ctx,
            tags,
            picos,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets how many candidate tags a push pipeline tries. At least one is always tried.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Derives the next tag and publishes it.
    ///
    /// - Without any tag, the repository is tagged `1.0.0`.
    /// - Merge request pipelines on feature branches bump once.
    /// - Push pipelines bump until the tag is free, trying at most `max_attempts` candidates.
    /// - Everything else, notably merge requests from `dev` or `master`, is skipped.
    pub fn run(&self) -> Result<Outcome, Error> {
        let ctx = self.ctx;
        info!(
            source = %ctx.source,
            branch = %ctx.branch,
            commit_branch = ctx.commit_branch.as_deref().unwrap_or("none"),
            level = %ctx.level,
            "starting version bump"
        );

        let Some(previous) = self.tags.describe()? else {
            let tag = Version::initial().to_string();
            info!(%tag, "no tags in the repository, initializing");
            let published = self.tags.create_and_push(&tag)?;
            return Ok(Outcome::Initialized { tag, published });
        };
        info!(current = %previous, "current tag");

        let bumper = Bumper::new(self.tags, self.picos);
        let next = match &ctx.source {
            PipelineSource::MergeRequestEvent if !ctx.branch.is_long_lived() => {
                bumper.next(&previous.parse::<Version>()?, &ctx.branch, ctx.level)?
            }
            PipelineSource::Push => self.next_free(&bumper, &previous.parse::<Version>()?)?,
            source => {
                info!(%source, branch = %ctx.branch, "not bumping version in this pipeline");
                return Ok(Outcome::Skipped {
                    source: source.clone(),
                    branch: ctx.branch.clone(),
                });
            }
        };

        let tag = next.to_string();
        info!(%tag, "new tag");
        let published = self.tags.create_and_push(&tag)?;
        Ok(Outcome::Tagged {
            previous,
            tag,
            published,
        })
    }

    /// Bumps `current`, then keeps bumping the candidate while its tag exists. Out of date
    /// branches merged into `dev` or `master` would otherwise reuse a tag.
    fn next_free(&self, bumper: &Bumper<'_>, current: &Version) -> Result<Version, Error> {
        let ctx = self.ctx;
        let mut candidate = bumper.next(current, &ctx.branch, ctx.level)?;
        let mut attempts = 1;

        while self.tags.tag_exists(&candidate.to_string())? {
            if attempts >= self.max_attempts {
                warn!(
                    %candidate,
                    attempts,
                    "tag still exists after the last attempt, using it anyway"
                );
                break;
            }
            info!(%candidate, "tag exists, bumping");
            candidate = bumper.next(&candidate, &ctx.branch, ctx.level)?;
            attempts += 1;
        }

        Ok(candidate)
    }
}
