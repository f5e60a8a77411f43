//! Paging, sorting and selection state for one table instance.
//!
//! Selection is keyed by row id values. Because the visible window only
//! holds one page, selected rows from other pages keep their full payload
//! in a side cache; the cache and the key set are always updated in the
//! same transition so a page change never strands a selected row.

use serde_json::Value;
use tracing::debug;

use crate::table::column::value_at;
use crate::table::sort::{SortDirection, comparator, stable_sort};

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub key: String,
    pub direction: SortDirection,
}

pub struct TableState {
    page: usize,
    rows_per_page: usize,
    sort: Option<Sort>,
    single_select: bool,
    /// Ordered set of selected row keys, insertion order.
    selected: Vec<Value>,
    /// Full payloads for selected keys, kept in lockstep with `selected`.
    selected_cache: Vec<(Value, Value)>,
}

impl TableState {
    #[must_use]
    pub const fn new(rows_per_page: usize) -> Self {
        Self {
            page: 0,
            rows_per_page,
            sort: None,
            single_select: false,
            selected: Vec::new(),
            selected_cache: Vec::new(),
        }
    }

    #[must_use]
    pub const fn single_select(mut self) -> Self {
        self.single_select = true;
        self
    }

    pub const fn page(&self) -> usize {
        self.page
    }

    pub const fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub const fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    pub fn set_page(&mut self, page: usize) {
        debug!(page, "table page change");
        self.page = page;
    }

    /// Changing the page size restarts from the first page.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page.max(1);
        self.page = 0;
    }

    /// Sort by `key`; repeated on the same key, flip the direction.
    pub fn set_sort(&mut self, key: &str) {
        let direction = match &self.sort {
            Some(sort) if sort.key == key => sort.direction.reversed(),
            _ => SortDirection::Ascending,
        };
        debug!(key, ?direction, "table sort change");
        self.sort = Some(Sort {
            key: key.to_string(),
            direction,
        });
    }

    pub fn reverse_sort(&mut self) {
        if let Some(sort) = &mut self.sort {
            sort.direction = sort.direction.reversed();
        }
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    pub fn is_selected(&self, key: &Value) -> bool {
        self.selected.contains(key)
    }

    pub fn selected_keys(&self) -> &[Value] {
        &self.selected
    }

    pub const fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Toggle one row's membership in the selection.
    ///
    /// In single-select mode a new key replaces the whole selection and
    /// re-selecting the current key clears it.
    pub fn toggle_row(&mut self, key: Value, row: &Value) {
        if self.single_select {
            let was_selected = self.is_selected(&key);
            self.selected.clear();
            self.selected_cache.clear();
            if !was_selected {
                self.selected.push(key.clone());
                self.selected_cache.push((key, row.clone()));
            }
            return;
        }

        if let Some(pos) = self.selected.iter().position(|k| k == &key) {
            self.selected.remove(pos);
            self.selected_cache.retain(|(k, _)| k != &key);
        } else {
            self.selected.push(key.clone());
            self.selected_cache.push((key, row.clone()));
        }
    }

    /// Select every given row, or deselect them all when every one is
    /// already selected. Selection on other pages is left alone.
    pub fn toggle_all<'a>(&mut self, rows: impl IntoIterator<Item = (Value, &'a Value)>) {
        let rows: Vec<(Value, &Value)> = rows.into_iter().collect();
        if rows.is_empty() || self.single_select {
            return;
        }
        let all_selected = rows.iter().all(|(key, _)| self.is_selected(key));
        for (key, row) in rows {
            match (all_selected, self.is_selected(&key)) {
                (true, _) => {
                    self.selected.retain(|k| k != &key);
                    self.selected_cache.retain(|(k, _)| k != &key);
                }
                (false, false) => {
                    self.selected.push(key.clone());
                    self.selected_cache.push((key, row.clone()));
                }
                (false, true) => {}
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.selected_cache.clear();
    }

    /// Full payloads for the current selection, resolved first from the
    /// given visible rows and then from the cache. Keys that resolve from
    /// neither are skipped rather than failing the whole lookup.
    #[must_use]
    pub fn selected_rows(&self, visible: &[Value], row_id: &str) -> Vec<Value> {
        self.selected
            .iter()
            .filter_map(|key| {
                visible
                    .iter()
                    .find(|row| value_at(row, row_id) == Some(key))
                    .or_else(|| {
                        self.selected_cache
                            .iter()
                            .find(|(k, _)| k == key)
                            .map(|(_, row)| row)
                    })
                    .cloned()
            })
            .collect()
    }

    /// The stably-sorted rows of the current page.
    ///
    /// Slicing only happens when client paging is enabled and the data
    /// outgrows one page; sorting always runs over whatever `data`
    /// currently holds, including server-paged subsets.
    #[must_use]
    pub fn visible_rows(&self, data: &[Value], paging_enabled: bool) -> Vec<Value> {
        let sorted = match &self.sort {
            Some(sort) => stable_sort(data.to_vec(), comparator(sort.direction, &sort.key)),
            None => data.to_vec(),
        };
        if paging_enabled && sorted.len() > self.rows_per_page {
            let start = (self.page * self.rows_per_page).min(sorted.len());
            let end = (start + self.rows_per_page).min(sorted.len());
            sorted[start..end].to_vec()
        } else {
            sorted
        }
    }

    #[must_use]
    pub const fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.rows_per_page)
    }
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "A", "amount": 100}),
            json!({"id": 2, "name": "B", "amount": 50}),
        ]
    }

    #[test]
    fn one_row_per_page_paginates_two_rows() {
        let mut state = TableState::new(1);
        let data = data();

        assert_eq!(state.page_count(data.len()), 2);
        let page_one = state.visible_rows(&data, true);
        assert_eq!(page_one.len(), 1);
        assert_eq!(page_one[0]["id"], json!(1));

        state.set_page(1);
        let page_two = state.visible_rows(&data, true);
        assert_eq!(page_two.len(), 1);
        assert_eq!(page_two[0]["id"], json!(2));
    }

    #[test]
    fn selection_survives_paging_with_payload_recovery() {
        let mut state = TableState::new(1);
        let data = data();

        // Select row 1 on page 0, then move to page 1.
        let page_one = state.visible_rows(&data, true);
        state.toggle_row(json!(1), &page_one[0]);
        state.set_page(1);

        let page_two = state.visible_rows(&data, true);
        assert!(state.is_selected(&json!(1)));
        // Row 1 is off-screen; its payload still resolves through the cache.
        let selected = state.selected_rows(&page_two, "id");
        assert_eq!(selected, vec![json!({"id": 1, "name": "A", "amount": 100})]);

        // It can still be toggled off while invisible.
        state.toggle_row(json!(1), &json!(null));
        assert!(!state.has_selection());
    }

    #[test]
    fn single_select_replaces_and_reselect_clears() {
        let mut state = TableState::new(10).single_select();
        let data = data();

        state.toggle_row(json!(1), &data[0]);
        state.toggle_row(json!(2), &data[1]);
        assert_eq!(state.selected_keys(), &[json!(2)]);

        state.toggle_row(json!(2), &data[1]);
        assert!(!state.has_selection());
    }

    #[test]
    fn toggle_all_is_transactional_with_the_cache() {
        let mut state = TableState::new(10);
        let data = data();

        state.toggle_all(data.iter().map(|r| (r["id"].clone(), r)));
        assert_eq!(state.selected_keys().len(), 2);
        assert_eq!(state.selected_rows(&[], "id").len(), 2);

        state.toggle_all(data.iter().map(|r| (r["id"].clone(), r)));
        assert!(!state.has_selection());
        assert!(state.selected_rows(&[], "id").is_empty());
    }

    #[test]
    fn unresolvable_selected_key_is_skipped_not_fatal() {
        let mut state = TableState::new(10);
        state.toggle_row(json!(99), &json!({"id": 99}));
        state.selected_cache.clear(); // simulate a stale key

        assert!(state.selected_rows(&data(), "id").is_empty());
    }

    #[test]
    fn sort_toggles_direction_on_the_same_key() {
        let mut state = TableState::default();
        state.set_sort("amount");
        assert_eq!(state.sort().unwrap().direction, SortDirection::Ascending);
        state.set_sort("amount");
        assert_eq!(state.sort().unwrap().direction, SortDirection::Descending);
        state.set_sort("name");
        assert_eq!(state.sort().unwrap().direction, SortDirection::Ascending);
    }

    #[test]
    fn page_size_change_resets_the_page() {
        let mut state = TableState::new(1);
        state.set_page(3);
        state.set_rows_per_page(5);
        assert_eq!(state.page(), 0);
        assert_eq!(state.rows_per_page(), 5);
    }

    #[test]
    fn disabled_paging_sorts_without_slicing() {
        let mut state = TableState::new(1);
        state.set_sort("amount");
        let visible = state.visible_rows(&data(), false);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0]["id"], json!(2));
    }
}
