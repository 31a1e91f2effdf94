// Handlers are split by how much a caller must prove:
// public (nothing), protected (session cookie, plus a resource permission
// for everything except the caller's own account).
use serde::Deserialize;

pub mod protected;
pub mod public;

/// `?page=N` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Requested page; missing or non-numeric input means page 1
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
        }
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(query(None).page(), 1);
        assert_eq!(query(Some("abc")).page(), 1);
        assert_eq!(query(Some("")).page(), 1);
    }

    #[test]
    fn page_passes_through_numbers() {
        assert_eq!(query(Some("3")).page(), 3);
        assert_eq!(query(Some(" 2 ")).page(), 2);
        // out-of-range pages are left for pagination to clamp
        assert_eq!(query(Some("0")).page(), 0);
        assert_eq!(query(Some("-4")).page(), -4);
    }
}
