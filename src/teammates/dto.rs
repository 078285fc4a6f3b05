use serde::{Deserialize, Serialize};

use crate::teammates::repo_types::Teammate;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Raw query string. Numbers stay strings so that junk like `page=abc`
/// falls back to the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct TeammatesQuery {
    pub skill: Option<String>,
    pub availability: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// 1-based page request; both numbers are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

impl PageRequest {
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: positive(page, DEFAULT_PAGE),
            limit: positive(limit, DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(total: u64, req: PageRequest) -> Self {
        Self {
            total,
            page: req.page,
            limit: req.limit,
            pages: total.div_ceil(req.limit),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeammatePage {
    pub items: Vec<Teammate>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct TeammatesResponse {
    pub success: bool,
    pub teammates: Vec<Teammate>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        assert_eq!(PageRequest::parse(Some("abc"), Some("-3")), PageRequest::default());
        assert_eq!(PageRequest::parse(Some("0"), Some("0")), PageRequest::default());
        assert_eq!(PageRequest::parse(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::parse(Some(" 3 "), Some("25")),
            PageRequest { page: 3, limit: 25 }
        );
    }

    #[test]
    fn offset_does_not_overflow() {
        let req = PageRequest { page: u64::MAX, limit: u64::MAX };
        assert_eq!(req.offset(), u64::MAX);
        assert_eq!(PageRequest { page: 3, limit: 10 }.offset(), 20);
    }

    #[test]
    fn pages_round_up() {
        let req = PageRequest { page: 1, limit: 10 };
        assert_eq!(Pagination::new(0, req).pages, 0);
        assert_eq!(Pagination::new(5, req).pages, 1);
        assert_eq!(Pagination::new(10, req).pages, 1);
        assert_eq!(Pagination::new(11, req).pages, 2);
    }
}
