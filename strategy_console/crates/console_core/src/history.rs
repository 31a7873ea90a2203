use strategy_protocol::StrategyRequest;

pub const HISTORY_TITLE: &str = "Strategy History";
pub const EMPTY_PLACEHOLDER: &str = "No strategy history available";

/// A previously issued request, as kept by the history log.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    seq: u64,
    request: StrategyRequest,
}

impl HistoryItem {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &StrategyRequest {
        &self.request
    }

    pub fn name(&self) -> &str {
        &self.request.strategy_name
    }

    pub fn path(&self) -> Option<&str> {
        self.request.strategy_path.as_deref()
    }
}

/// Append-only log of issued requests, in issue order.
#[derive(Debug, Default)]
pub struct HistoryLog {
    items: Vec<HistoryItem>,
    next_seq: u64,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: StrategyRequest) -> &HistoryItem {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.items.push(HistoryItem { seq, request });
        &self.items[self.items.len() - 1]
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, seq: u64) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.seq == seq)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryRow<'a> {
    pub item: &'a HistoryItem,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryView<'a> {
    Empty { placeholder: &'static str },
    Rows(Vec<HistoryRow<'a>>),
}

/// Most-recent-first projection of a history slice.
///
/// Reads the caller's items without touching them; activating a row hands
/// that exact item to `on_select`.
pub struct HistorySelector<'a, F>
where
    F: FnMut(&'a HistoryItem),
{
    rows: Vec<HistoryRow<'a>>,
    on_select: F,
}

impl<'a, F> HistorySelector<'a, F>
where
    F: FnMut(&'a HistoryItem),
{
    pub fn new(items: &'a [HistoryItem], selected: Option<&HistoryItem>, on_select: F) -> Self {
        let rows = items
            .iter()
            .rev()
            .map(|item| HistoryRow {
                item,
                selected: selected.is_some_and(|s| s == item),
            })
            .collect();
        Self { rows, on_select }
    }

    pub fn view(&self) -> HistoryView<'a> {
        if self.rows.is_empty() {
            HistoryView::Empty {
                placeholder: EMPTY_PLACEHOLDER,
            }
        } else {
            HistoryView::Rows(self.rows.clone())
        }
    }

    /// Interactive rows, most recent first. Empty when there is no history.
    pub fn rows(&self) -> &[HistoryRow<'a>] {
        &self.rows
    }

    /// Activates the row at `row` (0-based, display order).
    ///
    /// Returns `false` without calling back when there is no such row.
    pub fn activate(&mut self, row: usize) -> bool {
        let Some(item) = self.rows.get(row).map(|r| r.item) else {
            return false;
        };
        (self.on_select)(item);
        true
    }

    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![HISTORY_TITLE.to_string()];
        match self.view() {
            HistoryView::Empty { placeholder } => lines.push(format!("  {placeholder}")),
            HistoryView::Rows(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    let marker = if row.selected { '>' } else { ' ' };
                    lines.push(format!("{marker} {:>2}. {}", i + 1, row.item.name()));
                    lines.push(format!("      {}", row.item.path().unwrap_or("-")));
                }
            }
        }
        lines
    }
}
