//! Fixed size pagination over a slice.
//!
//! Pages are 1-indexed. Passing page `0` is a caller error: it is not rejected
//! and behaves like page `1`. Pages past the end give an empty slice.

/// The visible part of a sequence for one page.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub total_pages: usize,
}

/// A page selector as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControl {
    pub number: usize,
    pub active: bool,
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let total_pages = total_pages(items.len(), page_size);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if total_pages == 0 || start >= items.len() {
        return Page {
            items: &[],
            total_pages,
        };
    }
    let end = std::cmp::min(start.saturating_add(page_size), items.len());
    Page {
        items: &items[start..end],
        total_pages,
    }
}

/// Controls `1..=total_pages`, with `current_page` marked active.
pub fn page_controls(total_pages: usize, current_page: usize) -> Vec<PageControl> {
    (1..=total_pages)
        .map(|number| PageControl {
            number,
            active: number == current_page,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_items_make_three_pages() {
        let data: Vec<u32> = (0..12).collect();
        let p1 = paginate(&data, 1, 5);
        assert_eq!(p1.total_pages, 3);
        assert_eq!(p1.items, &data[0..5]);

        let p3 = paginate(&data, 3, 5);
        assert_eq!(p3.items, &data[10..12]);

        let p4 = paginate(&data, 4, 5);
        assert_eq!(p4.total_pages, 3);
        assert!(p4.items.is_empty());
    }

    #[test]
    fn empty_input_has_no_pages() {
        let data: Vec<u32> = Vec::new();
        for page in [1, 2, 100] {
            let p = paginate(&data, page, 5);
            assert_eq!(p.total_pages, 0);
            assert!(p.items.is_empty());
        }
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let data: Vec<u32> = (0..10).collect();
        assert_eq!(paginate(&data, 1, 5).total_pages, 2);
        assert!(paginate(&data, 3, 5).items.is_empty());
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let data: Vec<u32> = (0..3).collect();
        assert!(paginate(&data, usize::MAX, 5).items.is_empty());
    }

    #[test]
    fn zero_page_size_has_no_pages() {
        let data: Vec<u32> = (0..3).collect();
        let p = paginate(&data, 1, 0);
        assert_eq!(p.total_pages, 0);
        assert!(p.items.is_empty());
    }

    #[test]
    fn controls_mark_current_page() {
        let controls = page_controls(3, 2);
        let numbers: Vec<usize> = controls.iter().map(|c| c.number).collect();
        assert_eq!(numbers, [1, 2, 3]);
        let active: Vec<usize> = controls
            .iter()
            .filter(|c| c.active)
            .map(|c| c.number)
            .collect();
        assert_eq!(active, [2]);
        assert!(page_controls(0, 1).is_empty());
    }
}
