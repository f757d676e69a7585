//! Pure search/filter/sort/paginate pipeline over already-fetched rows.

use std::cmp::Ordering;

use shared::{domain::SortDirection, protocol::parse_amount};

use crate::rows::ListRow;

pub const ALL_FILTER: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

/// Transient view parameters. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: String,
    pub filter: String,
    pub sort: Option<SortSpec>,
    pub page: usize,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            filter: ALL_FILTER.to_string(),
            sort: None,
            page: 1,
        }
    }
}

#[derive(Debug)]
pub struct DerivedView<'a, R> {
    pub rows: Vec<&'a R>,
    pub filtered_count: usize,
    pub total_pages: usize,
    pub page: usize,
}

impl<R> DerivedView<'_, R> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

pub fn matches_search<R: ListRow>(row: &R, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    row.search_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(&term))
}

pub fn matches_filter<R: ListRow>(row: &R, filter: &str) -> bool {
    let filter = filter.trim().to_lowercase();
    if filter.is_empty() || filter == ALL_FILTER {
        return true;
    }
    row.matches_filter(&filter)
}

#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
    Missing,
}

fn sort_value<R: ListRow>(row: &R, key: &str, numeric: bool) -> SortValue {
    let cell = row.cell(key);
    if numeric {
        return parse_amount(&cell).map_or(SortValue::Missing, SortValue::Number);
    }
    SortValue::Text(cell.to_lowercase())
}

/// Numbers before text, unparseable numeric cells last.
fn compare_values(left: &SortValue, right: &SortValue) -> Ordering {
    match (left, right) {
        (SortValue::Number(l), SortValue::Number(r)) => l.total_cmp(r),
        (SortValue::Text(l), SortValue::Text(r)) => l.cmp(r),
        (SortValue::Number(_), _) => Ordering::Less,
        (_, SortValue::Number(_)) => Ordering::Greater,
        (SortValue::Text(_), SortValue::Missing) => Ordering::Less,
        (SortValue::Missing, SortValue::Text(_)) => Ordering::Greater,
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
    }
}

/// Filtered and sorted rows, before pagination. Unknown sort keys leave the
/// server order untouched.
pub fn filter_and_sort<'a, R: ListRow>(items: &'a [R], query: &ViewQuery) -> Vec<&'a R> {
    let filtered = items
        .iter()
        .filter(|row| matches_search(*row, &query.search))
        .filter(|row| matches_filter(*row, &query.filter));

    let Some(spec) = &query.sort else {
        return filtered.collect();
    };
    let Some(column) = R::column(&spec.key) else {
        return filtered.collect();
    };

    let mut keyed: Vec<(SortValue, &R)> = filtered
        .map(|row| (sort_value(row, column.key, column.numeric), row))
        .collect();
    // `sort_by` is stable, so ties keep server order in both directions.
    keyed.sort_by(|(left, _), (right, _)| {
        let ordering = compare_values(left, right);
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    keyed.into_iter().map(|(_, row)| row).collect()
}

/// Runs the full pipeline for one page. A page past the end yields no rows.
pub fn derive<'a, R: ListRow>(
    items: &'a [R],
    query: &ViewQuery,
    page_size: usize,
) -> DerivedView<'a, R> {
    let ordered = filter_and_sort(items, query);
    let filtered_count = ordered.len();
    let page = query.page.max(1);
    let start = (page - 1).saturating_mul(page_size);
    let rows = ordered.into_iter().skip(start).take(page_size).collect();

    DerivedView {
        rows,
        filtered_count,
        total_pages: total_pages(filtered_count, page_size),
        page,
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
