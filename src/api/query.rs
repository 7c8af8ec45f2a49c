//! Movie query builder.
//!
//! Every function here is pure: it maps a category or filter to the path and
//! query parameters of one catalog request. Nothing is validated locally;
//! a malformed rating or year goes upstream as-is and the upstream error
//! response is the only signal.

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SORT: &str = "popularity.desc";
pub const REGION: &str = "KR";

/// Path plus ordered query parameters for one upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub path: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl RequestDescriptor {
    fn new(path: &'static str) -> Self {
        Self { path, params: Vec::new() }
    }

    fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    fn with_opt<T: ToString>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Look up a parameter value by name.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Requested page, or 1 when the request is not paginated.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.param("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(1)
    }
}

/// Fixed list endpoints under `/movie`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
}

impl Category {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Popular => "/movie/popular",
            Self::TopRated => "/movie/top_rated",
            Self::NowPlaying => "/movie/now_playing",
            Self::Upcoming => "/movie/upcoming",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::TopRated => "top-rated",
            Self::NowPlaying => "now-playing",
            Self::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "popular" => Ok(Self::Popular),
            "top-rated" => Ok(Self::TopRated),
            "now-playing" => Ok(Self::NowPlaying),
            "upcoming" => Ok(Self::Upcoming),
            other => Err(format!(
                "unknown category '{other}' (expected popular, top-rated, now-playing or upcoming)"
            )),
        }
    }
}

/// Discovery filter. Absent fields are left out of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFilter {
    pub genre_id: Option<u32>,
    pub min_rating: Option<f64>,
    pub year: Option<String>,
    pub sort_by: Option<String>,
    pub page: u32,
}

impl Default for MovieFilter {
    fn default() -> Self {
        Self { genre_id: None, min_rating: None, year: None, sort_by: None, page: 1 }
    }
}

fn page_or_first(page: u32) -> u32 {
    page.max(1)
}

#[must_use]
pub fn category(category: Category, page: u32) -> RequestDescriptor {
    RequestDescriptor::new(category.path()).with("page", page_or_first(page))
}

#[must_use]
pub fn popular(page: u32) -> RequestDescriptor {
    category(Category::Popular, page)
}

#[must_use]
pub fn top_rated(page: u32) -> RequestDescriptor {
    category(Category::TopRated, page)
}

#[must_use]
pub fn now_playing(page: u32) -> RequestDescriptor {
    category(Category::NowPlaying, page)
}

#[must_use]
pub fn upcoming(page: u32) -> RequestDescriptor {
    category(Category::Upcoming, page)
}

/// Discover movies in one genre, most popular first.
#[must_use]
pub fn by_genre(genre_id: u32, page: u32) -> RequestDescriptor {
    RequestDescriptor::new("/discover/movie")
        .with("with_genres", genre_id)
        .with("page", page_or_first(page))
        .with("sort_by", DEFAULT_SORT)
}

/// Discover movies matching `filter`, restricted to the KR region.
#[must_use]
pub fn by_filters(filter: &MovieFilter) -> RequestDescriptor {
    RequestDescriptor::new("/discover/movie")
        .with_opt("with_genres", filter.genre_id)
        .with_opt("vote_average.gte", filter.min_rating)
        .with_opt("primary_release_year", filter.year.as_deref())
        .with(
            "sort_by",
            filter
                .sort_by
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SORT),
        )
        .with("page", page_or_first(filter.page))
        .with("region", REGION)
}

#[must_use]
pub fn search(query: &str, page: u32) -> RequestDescriptor {
    RequestDescriptor::new("/search/movie")
        .with("query", query)
        .with("page", page_or_first(page))
        .with("region", REGION)
        .with("include_adult", false)
}

#[must_use]
pub fn genres() -> RequestDescriptor {
    RequestDescriptor::new("/genre/movie/list")
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
