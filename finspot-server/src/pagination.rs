//! Page arithmetic for list endpoints

/// Rows per page
pub const PAGE_SIZE: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Clamp `requested_page` into `[1, total_pages]` and compute the offset
///
/// # Examples
/// ```
/// use finspot_server::pagination::calculate_pagination;
///
/// let p = calculate_pagination(120, 2);
/// assert_eq!((p.page, p.total_pages, p.offset), (2, 3, 50));
///
/// let p = calculate_pagination(120, 99);
/// assert_eq!((p.page, p.offset), (3, 100));
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * PAGE_SIZE;

    Pagination {
        page,
        total_pages,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        assert_eq!(
            calculate_pagination(120, 0),
            Pagination { page: 1, total_pages: 3, offset: 0 }
        );
        assert_eq!(
            calculate_pagination(100, 2),
            Pagination { page: 2, total_pages: 2, offset: 50 }
        );
        assert_eq!(
            calculate_pagination(101, 5),
            Pagination { page: 3, total_pages: 3, offset: 100 }
        );
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 4);
        assert_eq!((p.page, p.total_pages, p.offset), (1, 0, 0));
    }
}
