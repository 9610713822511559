//! Pico allocation against a package index.
//!
//! Several feature branches can be cut from the same release candidate. Each one needs its own
//! fourth version component ("pico"), so the published packages are the only shared record of
//! which picos are taken.

use crate::error::IndexError;
use regex::Regex;
use serde::Deserialize;
use std::{collections::BTreeSet, sync::LazyLock, time::Duration};
use tracing::{debug, info};

/// Leading `major.minor.patch[.pico]` of a published version. PEP 440 versions such as
/// `14.1.38.1.dev5+bs` or `14.1.38rc1` both match.
static LEADING_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:\.(\d+))?").expect("leading run pattern is valid")
});

/// Default bound on the number of pages fetched from the index.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Default timeout of a single index request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One page of a Nexus asset search.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// The assets on this page.
    #[serde(default)]
    pub items: Vec<Asset>,
    /// Token for the next page, absent on the last one.
    #[serde(default)]
    pub continuation_token: Option<String>,
}

/// A published asset. Only PyPI assets carry a version.
#[derive(Debug, Deserialize, PartialEq)]
pub struct Asset {
    /// PyPI attributes of the asset.
    #[serde(default)]
    pub pypi: Option<PypiAttributes>,
}

/// PyPI attributes of an asset.
#[derive(Debug, Deserialize, PartialEq)]
pub struct PypiAttributes {
    /// The published version string.
    pub version: String,
}

impl Page {
    fn versions(self) -> impl Iterator<Item = String> {
        self.items
            .into_iter()
            .filter_map(|asset| asset.pypi.map(|pypi| pypi.version))
    }
}

/// A source of published version strings, one page at a time.
pub trait PackageIndex {
    /// Fetches the page after `continuation_token`, or the first page if it is `None`.
    fn page(&self, continuation_token: Option<&str>) -> Result<Page, IndexError>;
}

/// Hands out picos for a `major.minor.patch` base.
pub trait PicoSource {
    /// Returns the lowest pico not used by any published version of `base`.
    fn next_pico(&self, base: &semver::Version) -> Result<u64, crate::Error>;
}

/// Where to find the index and which package to look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// The search endpoint, e.g. `https://nexus.example.com/service/rest/v1/search/assets`.
    pub url: String,
    /// Value of the `repository` query parameter.
    pub repository: String,
    /// Value of the `name` query parameter.
    pub package: String,
    /// Timeout of a single request.
    pub timeout: Duration,
}

/// The Nexus REST search API.
#[derive(Debug)]
pub struct NexusIndex {
    settings: IndexSettings,
    client: reqwest::blocking::Client,
}

impl NexusIndex {
    /// Builds a client for the index described by `settings`.
    pub fn new(settings: IndexSettings) -> Result<Self, IndexError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    fn query<'a>(&'a self, continuation_token: Option<&'a str>) -> Vec<(&'static str, &'a str)> {
        let mut query = vec![
            ("repository", self.settings.repository.as_str()),
            ("name", self.settings.package.as_str()),
        ];
        if let Some(token) = continuation_token {
            query.push(("continuationToken", token));
        }
        query
    }
}

impl PackageIndex for NexusIndex {
    fn page(&self, continuation_token: Option<&str>) -> Result<Page, IndexError> {
        debug!(url = %self.settings.url, ?continuation_token, "fetching index page");
        let page = self
            .client
            .get(&self.settings.url)
            .query(&self.query(continuation_token))
            .send()?
            .error_for_status()?
            .json()?;
        Ok(page)
    }
}

/// Every version string the index knows about, following continuation tokens.
///
/// # Errors
///
/// - If the index still returns a continuation token after `max_pages` pages, returns
///   [IndexError::TooManyPages].
/// - Request and decoding failures are returned as [IndexError::Request].
pub fn published_versions(
    index: &impl PackageIndex,
    max_pages: usize,
) -> Result<BTreeSet<String>, IndexError> {
    let mut versions = BTreeSet::new();
    let mut token: Option<String> = None;

    for _ in 0..max_pages {
        let page = index.page(token.as_deref())?;
        token = page.continuation_token.clone();
        versions.extend(page.versions());
        if token.is_none() {
            return Ok(versions);
        }
    }

    Err(IndexError::TooManyPages { max_pages })
}

/// The pico of `version` if its leading `major.minor.patch` is exactly `base`.
///
/// Returns `Some(None)` for a three-component match, `None` if `version` belongs to another base.
fn pico_of(version: &str, base: &semver::Version) -> Option<Option<u64>> {
    let caps = LEADING_RUN.captures(version)?;
    let component = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());

    if (component(1)?, component(2)?, component(3)?) != (base.major, base.minor, base.patch) {
        return None;
    }
    Some(component(4))
}

/// Returns `M + 1` where `M` is the largest pico published for `base`, or `1` if there is none.
///
/// Only versions whose leading numeric run starts with exactly `base` count: for base `1.2.3`,
/// `1.2.3.4.dev1` counts, `11.2.3.4` and `1.2.30.4` do not.
pub fn allocate_pico(
    index: &impl PackageIndex,
    base: &semver::Version,
    max_pages: usize,
) -> Result<u64, IndexError> {
    info!(%base, "querying package index for used pico versions");
    let versions = published_versions(index, max_pages)?;
    debug!(count = versions.len(), "published versions");

    let highest = versions
        .iter()
        .filter_map(|version| {
            let pico = pico_of(version, base)?;
            debug!(%version, "found version on the same base");
            pico
        })
        .max();

    Ok(highest.map_or(1, |pico| pico + 1))
}

/// [PicoSource] backed by a [PackageIndex].
#[derive(Debug)]
pub struct Allocator<I> {
    index: I,
    max_pages: usize,
}

impl<I: PackageIndex> Allocator<I> {
    /// Allocates picos from `index`, reading at most `max_pages` pages.
    pub fn new(index: I, max_pages: usize) -> Self {
        Self { index, max_pages }
    }
}

impl<I: PackageIndex> PicoSource for Allocator<I> {
    fn next_pico(&self, base: &semver::Version) -> Result<u64, crate::Error> {
        let pico = allocate_pico(&self.index, base, self.max_pages)?;
        info!(%base, pico, "allocated pico version");
        Ok(pico)
    }
}

/// [PicoSource] used when no index is configured. Fails if a pico is actually needed.
#[derive(Debug, Default)]
pub struct Unconfigured;

impl PicoSource for Unconfigured {
    fn next_pico(&self, _base: &semver::Version) -> Result<u64, crate::Error> {
        Err(crate::error::ConfigError::MissingIndex.into())
    }
}
