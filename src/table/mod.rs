//! Generic sortable, paginated table presenter.
//!
//! The presenter owns only its interaction state (sort, page, cursor). The
//! records are borrowed on every render, so the owner is free to replace or
//! shrink them between frames.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;
use std::time::{SystemTime, UNIX_EPOCH};

use derive_setters::Setters;
use ratatui::layout::Constraint;
use ratatui::text::Line;
use tracing::{debug, trace};

pub mod collate;
pub mod row;

pub use collate::TextCollator;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 5;
pub const EMPTY_TABLE_TEXT: &str = "No data to display";

/// Comparable and displayable projection of one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Object(serde_json::Value),
    Empty,
}

impl CellValue {
    /// Orders two values of the same primitive kind, text by `collator`.
    /// Mismatched or unsupported pairs compare equal so they keep their
    /// relative order.
    pub fn compare(&self, other: &CellValue, collator: &TextCollator) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => collator.compare(a, b),
            (CellValue::Number(a), CellValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Object(v) => write!(f, "{v}"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            other => CellValue::Object(other),
        }
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

pub type Accessor<R> = Box<dyn Fn(&R) -> CellValue>;
pub type CellRenderer<R> = Box<dyn Fn(&R) -> Line<'static>>;
pub type RowAction<R, M> = Box<dyn Fn(&R) -> M>;

/// Describes how one column is labeled, sorted and rendered.
#[derive(Setters)]
pub struct Column<R> {
    #[setters(skip)]
    pub key: String,
    #[setters(into)]
    pub header: String,
    #[setters(skip)]
    value: Accessor<R>,
    #[setters(skip)]
    render: Option<CellRenderer<R>>,
    pub sortable: bool,
    /// Layout hint for the terminal table, `Fill(1)` when unset.
    #[setters(strip_option)]
    pub width: Option<Constraint>,
}

impl<R> Column<R> {
    pub fn new(
        key: impl Into<String>,
        header: impl Into<String>,
        value: impl Fn(&R) -> CellValue + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            value: Box::new(value),
            render: None,
            sortable: true,
            width: None,
        }
    }

    /// Custom cell renderer, its output is displayed verbatim.
    pub fn render_with(mut self, render: impl Fn(&R) -> Line<'static> + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    pub fn value(&self, record: &R) -> CellValue {
        (self.value)(record)
    }

    pub fn renderer(&self) -> Option<&CellRenderer<R>> {
        self.render.as_ref()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Active sort key and direction. Single column only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// A new key always starts ascending, repeated requests alternate.
    pub fn request(&mut self, key: &str) {
        let direction = if self.key.as_deref() == Some(key)
            && self.direction == SortDirection::Ascending
        {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        self.key = Some(key.to_string());
        self.direction = direction;
    }
}

/// How a row's key is derived.
pub enum RowKey<R> {
    /// A named field read through an accessor. Missing values fall back to
    /// [`fallback_key`].
    Field(String, Accessor<R>),
    Derive(Box<dyn Fn(&R) -> String>),
}

impl<R> RowKey<R> {
    pub fn field(name: impl Into<String>, value: impl Fn(&R) -> CellValue + 'static) -> Self {
        RowKey::Field(name.into(), Box::new(value))
    }

    pub fn derive(key: impl Fn(&R) -> String + 'static) -> Self {
        RowKey::Derive(Box::new(key))
    }

    pub fn key_for(&self, record: &R, index: usize) -> String {
        match self {
            RowKey::Field(name, value) => match value(record) {
                CellValue::Empty => {
                    debug!("Row {index} has no \"{name}\", using fallback key");
                    fallback_key(index)
                }
                other => other.to_string(),
            },
            RowKey::Derive(key) => key(record),
        }
    }
}

/// Position plus render time. Not stable across renders, it only keeps rows
/// apart within one frame.
pub fn fallback_key(index: usize) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("row-{index}-{millis}")
}

pub struct HeaderView {
    pub key: String,
    pub label: String,
    pub indicator: Option<&'static str>,
    pub focused: bool,
    pub width: Option<Constraint>,
}

pub struct RowView<'a, R> {
    pub key: String,
    pub record: &'a R,
    pub cells: Vec<Line<'static>>,
}

/// Everything needed to draw one frame of the table.
pub struct PageView<'a, R> {
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView<'a, R>>,
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub selected_row: Option<usize>,
    pub has_actions: bool,
}

impl<R> PageView<'_, R> {
    /// Controls are hidden for a single page or an empty table.
    pub fn show_pagination(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub struct TablePresenter<R, M = ()> {
    columns: Vec<Column<R>>,
    items_per_page: usize,
    row_key: Option<RowKey<R>>,
    on_edit: Option<RowAction<R, M>>,
    on_delete: Option<RowAction<R, M>>,
    collator: TextCollator,
    sort: SortState,
    page: usize,
    focused_column: usize,
    selected_row: usize,
}

impl<R, M> TablePresenter<R, M> {
    pub fn new(columns: Vec<Column<R>>) -> Self {
        Self {
            columns,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            row_key: None,
            on_edit: None,
            on_delete: None,
            collator: TextCollator::root(),
            sort: SortState::default(),
            page: 1,
            focused_column: 0,
            selected_row: 0,
        }
    }

    pub fn items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page.max(1);
        self
    }

    pub fn collator(mut self, collator: TextCollator) -> Self {
        self.collator = collator;
        self
    }

    pub fn row_key(mut self, row_key: RowKey<R>) -> Self {
        self.row_key = Some(row_key);
        self
    }

    pub fn on_edit(mut self, action: impl Fn(&R) -> M + 'static) -> Self {
        self.on_edit = Some(Box::new(action));
        self
    }

    pub fn on_delete(mut self, action: impl Fn(&R) -> M + 'static) -> Self {
        self.on_delete = Some(Box::new(action));
        self
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn focused_column(&self) -> usize {
        self.focused_column
    }

    pub fn selected_row(&self) -> usize {
        self.selected_row
    }

    pub fn has_actions(&self) -> bool {
        self.on_edit.is_some() || self.on_delete.is_some()
    }

    // ------------------------------ Sorting ------------------------------- //

    /// Header click. Returns false for unknown or non sortable keys.
    pub fn request_sort(&mut self, key: &str) -> bool {
        if !self.columns.iter().any(|c| c.key == key && c.sortable) {
            trace!("Ignoring sort request for \"{key}\"");
            return false;
        }
        self.sort.request(key);
        trace!("Sorting by {key} {:?}", self.sort.direction);
        true
    }

    /// Header click on the focused column.
    pub fn sort_focused(&mut self) -> bool {
        match self.columns.get(self.focused_column) {
            Some(column) => {
                let key = column.key.clone();
                self.request_sort(&key)
            }
            None => false,
        }
    }

    pub fn sort_indicator(&self, column: &Column<R>) -> Option<&'static str> {
        if !column.sortable {
            return None;
        }
        if self.sort.key.as_deref() == Some(column.key.as_str()) {
            Some(self.sort.direction.indicator())
        } else {
            Some("↕")
        }
    }

    /// Sorted copy of `records`, the input order is left untouched.
    pub fn sorted<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        let column = self
            .sort
            .key
            .as_deref()
            .and_then(|key| self.columns.iter().find(|c| c.key == key));
        let Some(column) = column else {
            return records.iter().collect();
        };

        let direction = self.sort.direction;
        let mut keyed: Vec<(CellValue, &R)> =
            records.iter().map(|r| (column.value(r), r)).collect();
        // sort_by is stable, equal pairs keep their input order
        keyed.sort_by(|(a, _), (b, _)| direction.apply(a.compare(b, &self.collator)));
        keyed.into_iter().map(|(_, r)| r).collect()
    }

    // ----------------------------- Pagination ----------------------------- //

    pub fn total_pages(&self, record_count: usize) -> usize {
        record_count.div_ceil(self.items_per_page)
    }

    /// Slice of the sorted rows shown on the current page. Empty when the
    /// page lies past the data.
    pub fn page_bounds(&self, record_count: usize) -> Range<usize> {
        let end = (self.page * self.items_per_page).min(record_count);
        let start = ((self.page - 1) * self.items_per_page).min(end);
        start..end
    }

    pub fn set_page(&mut self, page: usize, record_count: usize) -> bool {
        if page == 0 || page > self.total_pages(record_count) {
            return false;
        }
        self.go_to(page);
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.go_to(self.page - 1);
        true
    }

    pub fn next_page(&mut self, record_count: usize) -> bool {
        if self.page >= self.total_pages(record_count) {
            return false;
        }
        self.go_to(self.page + 1);
        true
    }

    pub fn first_page(&mut self) -> bool {
        if self.page == 1 {
            return false;
        }
        self.go_to(1);
        true
    }

    pub fn last_page(&mut self, record_count: usize) -> bool {
        self.set_page(self.total_pages(record_count), record_count)
    }

    /// Pulls the page (and the row cursor) back inside the data after it
    /// shrank. The presenter never does this on its own.
    pub fn clamp_page(&mut self, record_count: usize) {
        let last = self.total_pages(record_count).max(1);
        if self.page > last {
            debug!("Clamping page {} to {last}", self.page);
            self.page = last;
        }
        let rows = self.page_bounds(record_count).len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
    }

    fn go_to(&mut self, page: usize) {
        trace!("Page {} -> {page}", self.page);
        self.page = page;
        self.selected_row = 0;
    }

    // ------------------------------- Cursor ------------------------------- //

    pub fn focus_next_column(&mut self) {
        if self.focused_column + 1 < self.columns.len() {
            self.focused_column += 1;
        }
    }

    pub fn focus_prev_column(&mut self) {
        self.focused_column = self.focused_column.saturating_sub(1);
    }

    pub fn select_next_row(&mut self, record_count: usize) {
        let rows = self.page_bounds(record_count).len();
        if self.selected_row + 1 < rows {
            self.selected_row += 1;
        }
    }

    pub fn select_prev_row(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    /// Record under the cursor on the current page.
    pub fn selected<'a>(&self, records: &'a [R]) -> Option<&'a R> {
        let sorted = self.sorted(records);
        let bounds = self.page_bounds(sorted.len());
        sorted[bounds].get(self.selected_row).copied()
    }

    pub fn edit_selected(&self, records: &[R]) -> Option<M> {
        let action = self.on_edit.as_ref()?;
        self.selected(records).map(|r| action(r))
    }

    pub fn delete_selected(&self, records: &[R]) -> Option<M> {
        let action = self.on_delete.as_ref()?;
        self.selected(records).map(|r| action(r))
    }

    // ------------------------------ Rendering ----------------------------- //

    pub fn view<'a>(&self, records: &'a [R]) -> PageView<'a, R> {
        let sorted = self.sorted(records);
        let bounds = self.page_bounds(sorted.len());
        let offset = bounds.start;

        let rows: Vec<RowView<'a, R>> = sorted[bounds]
            .iter()
            .enumerate()
            .map(|(idx, &record)| RowView {
                key: self.key_for(record, offset + idx),
                record,
                cells: row::render_row(&self.columns, record),
            })
            .collect();

        let headers = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| HeaderView {
                key: column.key.clone(),
                label: column.header.clone(),
                indicator: self.sort_indicator(column),
                focused: idx == self.focused_column,
                width: column.width,
            })
            .collect();

        let selected_row = (!rows.is_empty()).then(|| self.selected_row.min(rows.len() - 1));

        PageView {
            headers,
            rows,
            page: self.page,
            total_pages: self.total_pages(sorted.len()),
            total_records: sorted.len(),
            selected_row,
            has_actions: self.has_actions(),
        }
    }

    fn key_for(&self, record: &R, index: usize) -> String {
        match &self.row_key {
            Some(row_key) => row_key.key_for(record, index),
            None => fallback_key(index),
        }
    }
}
