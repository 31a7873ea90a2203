use crate::dispatcher::CommandDispatcher;
use crate::history::{HistoryItem, HistoryLog, HistorySelector};
use strategy_protocol::StrategyRequest;

/// The console's side of the core: it owns the history log and the current
/// selection, and feeds selected items back into the dispatcher.
pub struct ConsoleSession {
    dispatcher: CommandDispatcher,
    log: HistoryLog,
    selected: Option<u64>,
}

impl ConsoleSession {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self {
            dispatcher,
            log: HistoryLog::new(),
            selected: None,
        }
    }

    /// Dispatches `request` and records it, whatever the delivery outcome.
    pub fn issue(&mut self, request: StrategyRequest) {
        self.dispatcher.dispatch(&request);
        self.log.push(request);
    }

    pub fn history(&self) -> &HistoryLog {
        &self.log
    }

    /// `None` also covers a selection whose item is gone from the log.
    pub fn selected_item(&self) -> Option<&HistoryItem> {
        self.selected.and_then(|seq| self.log.get(seq))
    }

    /// Selects the `row`-th displayed entry (0-based, most recent first).
    pub fn select_row(&mut self, row: usize) -> bool {
        let current = self.selected.and_then(|seq| self.log.get(seq));
        let chosen = &mut self.selected;
        let mut selector = HistorySelector::new(self.log.items(), current, |item: &HistoryItem| {
            *chosen = Some(item.seq());
        });
        selector.activate(row)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Issues the selected request again. Returns `false` when nothing is selected.
    pub fn rerun_selected(&mut self) -> bool {
        let Some(request) = self.selected_item().map(|item| item.request().clone()) else {
            return false;
        };
        self.issue(request);
        true
    }

    pub fn render_history(&self) -> Vec<String> {
        HistorySelector::new(self.log.items(), self.selected_item(), |_| {}).render_lines()
    }
}
