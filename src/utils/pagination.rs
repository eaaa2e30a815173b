/// One page of an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Zero-based page actually shown, after clamping.
    pub page: usize,
    /// Total page count, never below 1.
    pub pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.pages
    }
}

/// Slices `items` for `page`, clamping it into `[0, pages - 1]`.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let pages = items.len().div_ceil(per_page).max(1);
    let page = page.min(pages - 1);
    let start = (page * per_page).min(items.len());
    let end = (start + per_page).min(items.len());
    Page {
        items: &items[start..end],
        page,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let items: Vec<u32> = (0..45).collect();
        let page = paginate(&items, 0, 20);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.pages, 3);
        assert!(!page.has_prev());
        assert!(page.has_next());
    }

    #[test]
    fn test_clamps_past_end() {
        let items: Vec<u32> = (0..45).collect();
        let page = paginate(&items, 99, 20);
        assert_eq!(page.page, 2);
        assert_eq!(page.items, &items[40..]);
        assert!(!page.has_next());
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 3, 20);
        assert_eq!(page.page, 0);
        assert_eq!(page.pages, 1);
        assert!(page.items.is_empty());
    }
}
