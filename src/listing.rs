use std::{borrow::Cow, cmp::Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// A column a list can be sorted on.
pub trait SortColumn: Copy + Eq + 'static {
    const ALL: &'static [Self];

    fn name(self) -> &'static str;
    fn label(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<C> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: SortColumn> SortState<C> {
    pub const fn ascending(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    /// Clicking the current column while ascending flips to descending, anything else starts
    /// ascending on `clicked`.
    #[must_use]
    pub fn toggled(self, clicked: C) -> Self {
        let direction = if self.column == clicked && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };

        Self {
            column: clicked,
            direction,
        }
    }

    pub fn arrow_for(self, column: C) -> Option<&'static str> {
        (self.column == column).then(|| self.direction.arrow())
    }
}

pub trait Listable {
    type Column: SortColumn;

    fn search_fields(&self) -> Vec<Cow<'_, str>>;
    fn compare_by(&self, other: &Self, column: Self::Column) -> Ordering;

    fn matches_filter(&self, lowered_needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(lowered_needle))
    }
}

pub fn filter_items<'a, T: Listable>(items: &'a [T], filter: &str) -> Vec<&'a T> {
    let needle = filter.to_lowercase();
    items
        .iter()
        .filter(|item| needle.is_empty() || item.matches_filter(&needle))
        .collect()
}

pub fn sort_items<T: Listable>(items: &mut [&T], sort: SortState<T::Column>) {
    items.sort_by(|a, b| {
        let ordering = a.compare_by(b, sort.column);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

pub fn filter_and_sort<'a, T: Listable>(
    items: &'a [T],
    filter: &str,
    sort: SortState<T::Column>,
) -> Vec<&'a T> {
    let mut visible = filter_items(items, filter);
    sort_items(&mut visible, sort);
    visible
}

/// Case-insensitive `starts_with` against any of `fields`. Empty queries match nothing.
pub fn prefix_matches<'a>(query: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let query = query.to_lowercase();
    !query.is_empty()
        && fields
            .into_iter()
            .any(|field| field.to_lowercase().starts_with(&query))
}

pub const ROWS_PER_PAGE_CHOICES: [usize; 3] = [5, 10, 25];
pub const DEFAULT_ROWS_PER_PAGE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub count: usize,
    pub rows_per_page: usize,
}

impl Page {
    pub fn has_previous(self) -> bool {
        self.index > 0
    }

    pub fn has_next(self) -> bool {
        self.index + 1 < self.count
    }
}

/// Slices out one page. Out-of-range pages clamp to the last page; there is always at least one
/// (possibly empty) page.
pub fn paginate<T>(items: &[T], requested: usize, rows_per_page: usize) -> (&[T], Page) {
    let rows_per_page = if ROWS_PER_PAGE_CHOICES.contains(&rows_per_page) {
        rows_per_page
    } else {
        DEFAULT_ROWS_PER_PAGE
    };

    let count = items.len().div_ceil(rows_per_page).max(1);
    let index = requested.min(count - 1);
    let start = (index * rows_per_page).min(items.len());
    let end = (start + rows_per_page).min(items.len());

    (
        &items[start..end],
        Page {
            index,
            count,
            rows_per_page,
        },
    )
}

/// Everything a listing fragment gets told by the browser: the filter box, the sort currently
/// shown, the header that was just clicked, pagination, and any checked rows.
///
/// Parsed from raw pairs because checkbox groups repeat their key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub filter: String,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub toggle: Option<String>,
    pub page: usize,
    pub rows_per_page: usize,
    pub selected: Vec<String>,
}

impl ListingQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            ..Self::default()
        };

        for (key, value) in pairs {
            match key.as_str() {
                "filter" => query.filter = value,
                "sort" => query.sort = Some(value),
                "direction" => query.direction = Some(value),
                "toggle" => query.toggle = Some(value),
                "page" => query.page = value.parse().unwrap_or_default(),
                "rows_per_page" => {
                    query.rows_per_page = value.parse().unwrap_or(DEFAULT_ROWS_PER_PAGE);
                }
                "selected" => query.selected.push(value),
                _ => {}
            }
        }

        query
    }

    /// The sort to render with: what the page last showed (or `default`), with any clicked
    /// header applied on top.
    pub fn sort_state<C: SortColumn>(&self, default: C) -> SortState<C> {
        let column = self
            .sort
            .as_deref()
            .and_then(C::from_name)
            .unwrap_or(default);
        let current = match self.direction.as_deref().and_then(SortDirection::from_name) {
            Some(direction) => SortState { column, direction },
            None => SortState::ascending(column),
        };

        match self.toggle.as_deref().and_then(C::from_name) {
            Some(clicked) => current.toggled(clicked),
            None => current,
        }
    }
}
