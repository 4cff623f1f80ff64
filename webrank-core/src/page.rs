//! Web pages: a URL identity plus a mutable rank.

use std::fmt;

use crate::error::{PageError, RankSign};

/// Rank assigned to every page at ingestion and at the start of each run.
pub const INITIAL_RANK: f64 = 1.0;

/// A named page carrying its current rank.
///
/// Pages are identified by URL alone: two pages with the same URL compare
/// equal whatever their ranks. The rank is always strictly positive.
///
/// # Examples
/// ```
/// use webrank_core::{Page, RankSign};
///
/// let page = Page::new("example.org/index", 1.0).expect("rank is positive");
/// assert_eq!(page.domain(), "example.org");
///
/// let err = Page::new("example.org/index", 0.0).expect_err("zero is rejected");
/// assert_eq!(err.rank_sign(), Some(RankSign::Zero));
/// ```
#[derive(Clone, Debug)]
pub struct Page {
    url: String,
    rank: f64,
}

impl Page {
    /// Creates a page with an explicit initial rank.
    ///
    /// # Errors
    /// Returns [`PageError::EmptyUrl`] for an empty URL,
    /// [`PageError::NonPositiveRank`] tagged [`RankSign::Zero`] or
    /// [`RankSign::Negative`] when `rank <= 0`, and
    /// [`PageError::NonFiniteRank`] for NaN or infinite ranks.
    pub fn new(url: impl Into<String>, rank: f64) -> Result<Self, PageError> {
        let url = url.into();
        if url.is_empty() {
            return Err(PageError::EmptyUrl);
        }
        if let Some(sign) = RankSign::classify(rank) {
            return Err(PageError::NonPositiveRank { url, rank, sign });
        }
        if !rank.is_finite() {
            return Err(PageError::NonFiniteRank { url });
        }
        Ok(Self { url, rank })
    }

    /// Creates a page with [`INITIAL_RANK`].
    ///
    /// # Errors
    /// Returns [`PageError::EmptyUrl`] for an empty URL.
    pub fn with_default_rank(url: impl Into<String>) -> Result<Self, PageError> {
        Self::new(url, INITIAL_RANK)
    }

    /// Returns the page URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the current rank.
    #[must_use]
    pub fn rank(&self) -> f64 {
        self.rank
    }

    /// Replaces the rank, refusing values that are not strictly positive and finite.
    pub fn set_rank(&mut self, rank: f64) -> bool {
        if !(rank > 0.0 && rank.is_finite()) {
            return false;
        }
        self.rank = rank;
        true
    }

    /// Replaces the URL, refusing an empty one.
    ///
    /// Only pages that are not yet part of a [`crate::Graph`] can be renamed;
    /// the graph never hands out mutable pages.
    pub fn set_url(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if url.is_empty() {
            return false;
        }
        self.url = url;
        true
    }

    /// Returns the domain part of the URL: everything before the first `/`.
    ///
    /// A URL without any `/` is its own domain.
    ///
    /// # Examples
    /// ```
    /// use webrank_core::Page;
    ///
    /// let page = Page::with_default_rank("localhost").expect("url is valid");
    /// assert_eq!(page.domain(), "localhost");
    /// ```
    #[must_use]
    pub fn domain(&self) -> &str {
        domain_of(&self.url)
    }

    /// Returns whether both pages share the same domain.
    #[must_use]
    pub fn is_sibling_of(&self, other: &Self) -> bool {
        self.domain() == other.domain()
    }
}

pub(crate) fn domain_of(url: &str) -> &str {
    url.split_once('/').map_or(url, |(domain, _)| domain)
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Page {}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "URL : {}  |  Page Rank : {}", self.url, self.rank)
    }
}
