//! Generic data table: columns, sorting, paging, selection, rendering.

mod column;
mod renderer;
mod sort;
mod state;

pub use column::{CellKind, ColumnDescriptor, DEFAULT_CURRENCY, EMPTY_CELL, value_at};
pub use renderer::{
    CardRender, CollapseRender, DataTable, PagingConfig, RowAction, TableConfig, TableEvent,
};
pub use sort::{SortDirection, comparator, stable_sort};
pub use state::{DEFAULT_ROWS_PER_PAGE, Sort, TableState};
