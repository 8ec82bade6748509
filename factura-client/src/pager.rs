//! Invoice list and client-side pagination
//!
//! The whole tenant history is fetched in one call, deduplicated by UUID,
//! sorted newest first and paged in memory. Changing page never refetches.

use shared::Factura;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Maximum number of numbered page buttons
pub const PAGE_WINDOW: usize = 5;

/// Keep the first occurrence of every UUID
pub fn dedup_by_uuid(facturas: Vec<Factura>) -> Vec<Factura> {
    let before = facturas.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<Factura> = facturas
        .into_iter()
        .filter(|f| seen.insert(f.uuid.clone()))
        .collect();
    let removed = before - unique.len();
    if removed > 0 {
        tracing::info!(removed, kept = unique.len(), "Removed duplicated invoices");
    }
    unique
}

/// Stable sort, newest first; invoices without a date go last
pub fn sort_by_date_desc(facturas: &mut [Factura]) {
    facturas.sort_by(|a, b| match (a.best_date(), b.best_date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// In-memory invoice pager with 1-based pages
#[derive(Debug, Clone)]
pub struct InvoicePager {
    items: Vec<Factura>,
    page_size: usize,
    page: usize,
}

impl InvoicePager {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page_size: page_size.max(1),
            page: 1,
        }
    }

    /// Replace the list: dedup, sort, back to page 1
    pub fn load(&mut self, facturas: Vec<Factura>) {
        let mut items = dedup_by_uuid(facturas);
        sort_by_date_desc(&mut items);
        self.items = items;
        self.page = 1;
    }

    pub fn items(&self) -> &[Factura] {
        &self.items
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// At least 1, so an empty list still has a (blank) first page
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size).max(1)
    }

    /// Rows of the current page
    pub fn rows(&self) -> &[Factura] {
        let start = ((self.page - 1) * self.page_size).min(self.items.len());
        let end = (self.page * self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    /// Jump to `page`, clamped to the valid range
    pub fn go_to(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.total_pages());
        self.page
    }

    pub fn first(&mut self) -> usize {
        self.go_to(1)
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.page.saturating_sub(1))
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.page + 1)
    }

    pub fn last(&mut self) -> usize {
        self.go_to(self.total_pages())
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Numbered buttons: up to five pages, sliding with the current one
    pub fn page_buttons(&self) -> Vec<usize> {
        let total = self.total_pages();
        let half = PAGE_WINDOW / 2;
        let end = (self.page.saturating_sub(half).max(1) + PAGE_WINDOW - 1).min(total);
        let start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
        (start..=end).collect()
    }

    pub fn find(&self, uuid: &str) -> Option<&Factura> {
        self.items.iter().find(|f| f.uuid == uuid)
    }
}

impl Default for InvoicePager {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn factura(uuid: &str, day: Option<u32>) -> Factura {
        Factura {
            uuid: uuid.to_string(),
            fecha_emision: day.map(|d| {
                NaiveDate::from_ymd_opt(2024, 1, d)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap()
            }),
            ..Default::default()
        }
    }

    fn many(n: usize) -> Vec<Factura> {
        (0..n)
            .map(|i| factura(&format!("F{i}"), Some((i % 28) as u32 + 1)))
            .collect()
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut first = factura("ABC", Some(1));
        first.tienda = Some("primera".into());
        let mut second = factura("ABC", Some(2));
        second.tienda = Some("segunda".into());

        let unique = dedup_by_uuid(vec![first, factura("XYZ", None), second]);
        assert_eq!(unique.len(), 2);
        let abc: Vec<_> = unique.iter().filter(|f| f.uuid == "ABC").collect();
        assert_eq!(abc.len(), 1);
        assert_eq!(abc[0].tienda.as_deref(), Some("primera"));
    }

    #[test]
    fn test_uuids_unique_after_load() {
        let mut input = many(40);
        input.extend(many(15));
        let mut pager = InvoicePager::new(10);
        pager.load(input);

        let uuids: HashSet<_> = pager.items().iter().map(|f| f.uuid.as_str()).collect();
        assert_eq!(uuids.len(), pager.total());
        assert_eq!(pager.total(), 40);
    }

    #[test]
    fn test_sorted_desc_missing_last() {
        let mut items = vec![
            factura("A", Some(3)),
            factura("B", None),
            factura("C", Some(9)),
            factura("D", Some(1)),
            factura("E", None),
        ];
        sort_by_date_desc(&mut items);

        let order: Vec<_> = items.iter().map(|f| f.uuid.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "D", "B", "E"]);

        for pair in items.windows(2) {
            match (pair[0].best_date(), pair[1].best_date()) {
                (Some(a), Some(b)) => assert!(a >= b),
                (None, Some(_)) => panic!("missing date sorted before a dated invoice"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_rows_match_slice_for_every_page() {
        for total in [1usize, 9, 10, 11, 37] {
            let mut pager = InvoicePager::new(10);
            pager.load(many(total));
            let sorted = pager.items().to_vec();

            for page in 1..=pager.total_pages() {
                pager.go_to(page);
                let size = pager.page_size();
                assert!(pager.page() * size < pager.total() + size);
                let start = (page - 1) * size;
                let end = (page * size).min(total);
                assert_eq!(pager.rows(), &sorted[start..end]);
            }
        }
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut pager = InvoicePager::new(10);
        pager.load(many(35));

        assert_eq!(pager.total_pages(), 4);
        assert_eq!(pager.prev(), 1);
        assert!(!pager.has_prev());
        assert_eq!(pager.next(), 2);
        assert_eq!(pager.last(), 4);
        assert_eq!(pager.rows().len(), 5);
        assert_eq!(pager.next(), 4);
        assert!(!pager.has_next());
        assert_eq!(pager.go_to(0), 1);
        assert_eq!(pager.go_to(99), 4);
        assert_eq!(pager.first(), 1);
    }

    #[test]
    fn test_empty_list() {
        let pager = InvoicePager::new(10);
        assert_eq!(pager.total_pages(), 1);
        assert!(pager.rows().is_empty());
        assert_eq!(pager.page_buttons(), vec![1]);
    }

    #[test]
    fn test_page_buttons_window() {
        let mut pager = InvoicePager::new(1);
        pager.load(many(9));

        assert_eq!(pager.page_buttons(), vec![1, 2, 3, 4, 5]);
        pager.go_to(3);
        assert_eq!(pager.page_buttons(), vec![1, 2, 3, 4, 5]);
        pager.go_to(5);
        assert_eq!(pager.page_buttons(), vec![3, 4, 5, 6, 7]);
        pager.go_to(8);
        assert_eq!(pager.page_buttons(), vec![5, 6, 7, 8, 9]);
        pager.last();
        assert_eq!(pager.page_buttons(), vec![5, 6, 7, 8, 9]);

        pager.load(many(3));
        assert_eq!(pager.page_buttons(), vec![1, 2, 3]);
    }

    #[test]
    fn test_load_resets_page() {
        let mut pager = InvoicePager::new(5);
        pager.load(many(20));
        pager.last();
        pager.load(many(20));
        assert_eq!(pager.page(), 1);
        assert!(pager.find("F3").is_some());
        assert!(pager.find("nope").is_none());
    }
}
