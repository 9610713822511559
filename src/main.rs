use clap::Parser;
use nexttag::prelude::*;
use nexttag::{CiVariables, DEFAULT_MAX_ATTEMPTS};
use std::{path::PathBuf, time::Duration};
use tracing_subscriber::EnvFilter;

/// Derives the next version tag for a GitLab CI pipeline and, on CI, tags and pushes it.
///
/// Every option falls back to an environment variable, so in a pipeline the binary normally runs
/// without arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// What triggered the pipeline: `merge_request_event`, `push`, ...
    #[arg(long, env = "CI_PIPELINE_SOURCE")]
    pipeline_source: String,

    /// The branch the pipeline runs on (the source branch for merge requests)
    #[arg(long, env = "CI_COMMIT_REF_NAME")]
    ref_name: String,

    /// Merge request labels; `major` or `minor` pick the bump level, otherwise patch
    #[arg(long, env = "CI_MERGE_REQUEST_LABELS", value_delimiter = ',')]
    labels: Vec<String>,

    /// The branch of a branch pipeline
    #[arg(long, env = "CI_COMMIT_BRANCH")]
    commit_branch: Option<String>,

    /// Tags are only created and pushed when this is `true`
    #[arg(long, env = "CI")]
    ci: Option<String>,

    /// The repository URL; its SSH form is used to push tags
    #[arg(long, env = "CI_REPOSITORY_URL")]
    repository_url: Option<String>,

    #[command(flatten)]
    index: IndexArgs,

    /// How many candidate tags a push pipeline tries
    #[arg(long, env = "NEXTTAG_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,

    /// The git working directory
    #[arg(short = 'C', long = "repo", default_value = ".")]
    repo: PathBuf,
}

/// Where published versions are looked up when a feature branch needs a pico version.
#[derive(clap::Args, Debug)]
struct IndexArgs {
    /// The Nexus asset search endpoint
    #[arg(long, env = "NEXTTAG_INDEX_URL")]
    index_url: Option<String>,

    /// The Nexus repository holding the package
    #[arg(long, env = "NEXTTAG_INDEX_REPOSITORY")]
    index_repository: Option<String>,

    /// The package name
    #[arg(long, env = "NEXTTAG_PACKAGE")]
    package: Option<String>,

    /// Upper bound on the number of result pages read from the index
    #[arg(long, env = "NEXTTAG_INDEX_MAX_PAGES", default_value_t = nexttag::index::DEFAULT_MAX_PAGES)]
    index_max_pages: usize,

    /// Timeout of a single index request, in seconds
    #[arg(long, env = "NEXTTAG_INDEX_TIMEOUT", default_value_t = nexttag::index::DEFAULT_TIMEOUT.as_secs())]
    index_timeout_secs: u64,
}

impl IndexArgs {
    /// The index settings, if all of url, repository and package are given.
    fn settings(&self) -> Option<IndexSettings> {
        Some(IndexSettings {
            url: self.index_url.clone()?,
            repository: self.index_repository.clone()?,
            package: self.package.clone()?,
            timeout: Duration::from_secs(self.index_timeout_secs),
        })
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match do_work(cli) {
        Ok(tag) => {
            if !tag.is_empty() {
                println!("{tag}");
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Runs one pass and returns the new tag, empty if the pipeline was skipped.
fn do_work(cli: Cli) -> Result<String, Error> {
    let ctx = CiContext::try_from(CiVariables {
        pipeline_source: cli.pipeline_source,
        ref_name: cli.ref_name,
        labels: cli.labels,
        commit_branch: cli.commit_branch,
        ci: cli.ci,
        repository_url: cli.repository_url,
    })?;

    let git = Git::new(cli.repo, ctx.publish.clone());
    let picos: Box<dyn PicoSource> = match cli.index.settings() {
        Some(settings) => Box::new(Allocator::new(
            NexusIndex::new(settings)?,
            cli.index.index_max_pages,
        )),
        None => Box::new(Unconfigured),
    };

    let outcome = Orchestrator::new(&ctx, &git, &*picos)
        .max_attempts(cli.max_attempts)
        .run()?;

    Ok(outcome.tag().unwrap_or_default().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{error::ErrorKind, CommandFactory};
    use std::{path::Path, process::Command};

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=nexttag", "-c", "user.email=nexttag@example.com"])
            .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?}");
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_from_args() {
        let cli = Cli::try_parse_from([
            "nexttag",
            "--pipeline-source",
            "merge_request_event",
            "--ref-name",
            "DEVOPS-1234",
            "--labels",
            "major,something",
            "--index-url",
            "https://nexus.example.com/service/rest/v1/search/assets",
            "--index-repository",
            "pypi-internal",
            "--package",
            "mypackage",
        ])
        .unwrap();

        assert_eq!(vec!["major", "something"], cli.labels);
        assert_eq!(PathBuf::from("."), cli.repo);
        assert_eq!(DEFAULT_MAX_ATTEMPTS, cli.max_attempts);
        let settings = cli.index.settings().unwrap();
        assert_eq!("pypi-internal", settings.repository);
        assert_eq!(nexttag::index::DEFAULT_TIMEOUT, settings.timeout);
    }

    #[test]
    fn test_partial_index_settings() {
        let index = IndexArgs {
            index_url: Some("https://nexus.example.com".to_owned()),
            index_repository: None,
            package: Some("mypackage".to_owned()),
            index_max_pages: 10,
            index_timeout_secs: 5,
        };
        assert_eq!(None, index.settings());
    }

    #[test]
    fn test_missing_pipeline_source() {
        if std::env::var_os("CI_PIPELINE_SOURCE").is_some() {
            return;
        }
        let err = Cli::try_parse_from(["nexttag", "--ref-name", "x"]).unwrap_err();
        assert_eq!(ErrorKind::MissingRequiredArgument, err.kind());
    }

    #[test]
    fn test_skipped_pipeline_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "--quiet"]);
        git(dir.path(), &["commit", "--allow-empty", "--quiet", "-m", "first"]);
        git(dir.path(), &["tag", "2.1.7-rc1"]);

        let cli = Cli::try_parse_from([
            "nexttag",
            "--pipeline-source",
            "merge_request_event",
            "--ref-name",
            "dev",
            "--ci",
            "false",
            "--repo",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!("", do_work(cli).unwrap());
    }

    #[test]
    fn test_dry_run_prints_tag() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "--quiet"]);
        git(dir.path(), &["commit", "--allow-empty", "--quiet", "-m", "first"]);
        git(dir.path(), &["tag", "2.1.7-rc1"]);

        let cli = Cli::try_parse_from([
            "nexttag",
            "--pipeline-source",
            "push",
            "--ref-name",
            "dev",
            "--ci",
            "false",
            "--repo",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!("2.1.8-rc1", do_work(cli).unwrap());
    }
}
