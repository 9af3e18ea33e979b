//! Validation and translation of incoming filter parameters, either into a
//! TMDb request or a local store filter. Invalid or out-of-range values fail
//! with a descriptive `ApiError::Validation`.

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Minimum vote count applied to genre-based discovery so results are not
/// dominated by barely rated entries.
pub const DEFAULT_MIN_VOTE_COUNT: i32 = 50;

#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

pub fn pagination(page: Option<&str>, page_size: Option<&str>) -> ApiResult<Pagination> {
    let page = parse_page(page)? as u64;
    let page_size = match page_size {
        None => DEFAULT_PAGE_SIZE,
        Some(raw) => {
            let n: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::validation("Invalid page_size"))?;
            if n == 0 || n > MAX_PAGE_SIZE {
                return Err(ApiError::validation(format!(
                    "page_size must be between 1 and {MAX_PAGE_SIZE}"
                )));
            }
            n
        },
    };
    Ok(Pagination { page, page_size })
}

/// Page number for upstream passthrough endpoints; defaults to 1.
pub fn parse_page(raw: Option<&str>) -> ApiResult<u32> {
    match raw {
        None => Ok(1),
        Some(raw) => {
            let n: u32 =
                raw.trim().parse().map_err(|_| ApiError::validation("Invalid page number"))?;
            if n == 0 {
                return Err(ApiError::validation("Invalid page number"));
            }
            Ok(n)
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PopularityDesc,
    VoteAverageDesc,
    ReleaseDateDesc,
    RevenueDesc,
}

impl SortKey {
    pub const VALID: [&'static str; 4] =
        ["popularity.desc", "vote_average.desc", "release_date.desc", "revenue.desc"];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "popularity.desc",
            SortKey::VoteAverageDesc => "vote_average.desc",
            SortKey::ReleaseDateDesc => "release_date.desc",
            SortKey::RevenueDesc => "revenue.desc",
        }
    }

    pub fn parse(raw: Option<&str>) -> ApiResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(SortKey::PopularityDesc),
            Some("popularity.desc") => Ok(SortKey::PopularityDesc),
            Some("vote_average.desc") => Ok(SortKey::VoteAverageDesc),
            Some("release_date.desc") => Ok(SortKey::ReleaseDateDesc),
            Some("revenue.desc") => Ok(SortKey::RevenueDesc),
            Some(_) => Err(ApiError::validation(format!(
                "sort_by must be one of: {}",
                Self::VALID.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }

    pub fn parse(raw: Option<&str>) -> ApiResult<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("day") => Ok(TimeWindow::Day),
            Some("week") => Ok(TimeWindow::Week),
            Some(_) => Err(ApiError::validation(r#"time_window must be "day" or "week""#)),
        }
    }
}

/// Comma-separated genre id list, e.g. `28,12,16`.
pub fn parse_genre_list(raw: &str) -> ApiResult<Vec<i32>> {
    raw.split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ApiError::validation("Invalid genre IDs"))
}

pub fn parse_min_rating(raw: &str) -> ApiResult<f64> {
    let rating: f64 =
        raw.trim().parse().map_err(|_| ApiError::validation("Invalid minimum rating"))?;
    if !(0.0..=10.0).contains(&rating) {
        return Err(ApiError::validation("Minimum rating must be between 0 and 10"));
    }
    Ok(rating)
}

/// Translated parameter set for TMDb's `discover/movie` endpoint.
#[derive(Debug, Clone)]
pub struct DiscoverParams {
    pub with_genres: Option<Vec<i32>>,
    pub primary_release_year: Option<i32>,
    pub vote_average_gte: Option<f64>,
    pub vote_count_gte: i32,
    pub sort_by: SortKey,
    pub page: u32,
}

impl DiscoverParams {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(genres) = &self.with_genres {
            let joined =
                genres.iter().map(|g| g.to_string()).collect::<Vec<_>>().join(",");
            params.push(("with_genres".to_string(), joined));
        }
        if let Some(year) = self.primary_release_year {
            params.push(("primary_release_year".to_string(), year.to_string()));
        }
        if let Some(rating) = self.vote_average_gte {
            params.push(("vote_average.gte".to_string(), rating.to_string()));
        }
        params.push(("vote_count.gte".to_string(), self.vote_count_gte.to_string()));
        params.push(("sort_by".to_string(), self.sort_by.as_str().to_string()));
        params.push(("page".to_string(), self.page.to_string()));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let pg = pagination(None, None).unwrap();
        assert_eq!(pg.page, 1);
        assert_eq!(pg.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_size_over_limit_rejected() {
        let err = pagination(None, Some("101")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn page_size_zero_rejected() {
        assert!(pagination(None, Some("0")).is_err());
    }

    #[test]
    fn page_must_be_positive_integer() {
        assert!(parse_page(Some("0")).is_err());
        assert!(parse_page(Some("abc")).is_err());
        assert_eq!(parse_page(Some("3")).unwrap(), 3);
    }

    #[test]
    fn sort_key_whitelist() {
        assert_eq!(SortKey::parse(None).unwrap(), SortKey::PopularityDesc);
        assert_eq!(SortKey::parse(Some("revenue.desc")).unwrap(), SortKey::RevenueDesc);
        assert!(SortKey::parse(Some("title.asc")).is_err());
    }

    #[test]
    fn time_window_whitelist() {
        assert_eq!(TimeWindow::parse(Some("week")).unwrap(), TimeWindow::Week);
        assert!(TimeWindow::parse(Some("month")).is_err());
    }

    #[test]
    fn genre_list_parsing() {
        assert_eq!(parse_genre_list("28, 12,16").unwrap(), vec![28, 12, 16]);
        assert!(parse_genre_list("28,action").is_err());
        assert!(parse_genre_list("").is_err());
        assert!(parse_genre_list("28,,12").is_err());
    }

    #[test]
    fn min_rating_bounds() {
        assert_eq!(parse_min_rating("7.5").unwrap(), 7.5);
        assert!(parse_min_rating("10.5").is_err());
        assert!(parse_min_rating("-1").is_err());
    }

    #[test]
    fn discover_params_translation() {
        let params = DiscoverParams {
            with_genres: Some(vec![28, 12]),
            primary_release_year: Some(2020),
            vote_average_gte: Some(7.0),
            vote_count_gte: DEFAULT_MIN_VOTE_COUNT,
            sort_by: SortKey::VoteAverageDesc,
            page: 2,
        };
        let q = params.to_query();
        assert!(q.contains(&("with_genres".to_string(), "28,12".to_string())));
        assert!(q.contains(&("vote_average.gte".to_string(), "7".to_string())));
        assert!(q.contains(&("vote_count.gte".to_string(), "50".to_string())));
        assert!(q.contains(&("sort_by".to_string(), "vote_average.desc".to_string())));
        assert!(q.contains(&("page".to_string(), "2".to_string())));
    }
}
