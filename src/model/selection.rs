//! Run/table selection shared by the run list and run detail panels
//!
//! Mutated only through `select_run`, `select_table` and `clear`. Fetch
//! completions never write here directly.

/// Which of the three reachable selection states we are in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    NoRun,
    RunOnly,
    RunAndTable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    run_id: Option<String>,
    table_name: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn phase(&self) -> SelectionPhase {
        match (&self.run_id, &self.table_name) {
            (None, _) => SelectionPhase::NoRun,
            (Some(_), None) => SelectionPhase::RunOnly,
            (Some(_), Some(_)) => SelectionPhase::RunAndTable,
        }
    }

    /// Select a run. The table selection is always cleared.
    pub fn select_run(&mut self, run_id: impl Into<String>) {
        self.run_id = Some(run_id.into());
        self.table_name = None;
    }

    /// Select (or clear) the table within the current run.
    ///
    /// Returns false and leaves the state untouched when no run is selected.
    pub fn select_table(&mut self, table_name: Option<String>) -> bool {
        if self.run_id.is_none() {
            return false;
        }
        self.table_name = table_name;
        true
    }

    /// Back to no run and no table
    pub fn clear(&mut self) {
        self.run_id = None;
        self.table_name = None;
    }

    /// The (run, table) pair, only when both are set
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (&self.run_id, &self.table_name) {
            (Some(run), Some(table)) => Some((run.as_str(), table.as_str())),
            _ => None,
        }
    }
}
