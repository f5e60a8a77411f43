#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    NextField,
    PrevField,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    ToggleRow,
    ToggleAll,
    ClearSelection,
    SortColumn,
    SortReverse,
    NextPage,
    PrevPage,
    PageSize,
    Collapse,
}
