//! Poll list presentation variants.
//!
//! A single list component configured by [`ListLayout`] instead of one
//! screen per variant. The layout decides which columns, controls and row
//! actions appear; the data always comes from the view-model.

/// Column shown in a poll list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    Status,
    Options,
    Votes,
    Creator,
    Created,
}

impl Column {
    /// Header label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Status => "Status",
            Self::Options => "Options",
            Self::Votes => "Votes",
            Self::Creator => "Creator",
            Self::Created => "Created",
        }
    }
}

/// Per-row owner action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAction {
    pub key: &'static str,
    pub label: &'static str,
    /// Cannot be undone. Every row action is confirmed first either way;
    /// this only marks the ones that lose data.
    pub destructive: bool,
}

impl RowAction {
    /// Close or reopen, depending on the current status.
    pub const TOGGLE_STATUS: Self = Self {
        key: "toggle_status",
        label: "Close / reopen",
        destructive: false,
    };

    pub const DELETE: Self = Self {
        key: "delete",
        label: "Delete",
        destructive: true,
    };
}

/// Presentation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListLayout {
    /// Title, status and vote count only.
    Compact,
    /// One card per poll with per-option results.
    #[default]
    Cards,
    /// Dense table with every column.
    Table,
}

/// Resolved configuration for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    pub layout: ListLayout,
    pub columns: Vec<Column>,
    /// Show per-option bars and percentages.
    pub show_results: bool,
    pub show_stats: bool,
    pub empty_message: &'static str,
    /// Empty unless the viewer is the owner.
    pub row_actions: Vec<RowAction>,
}

impl ListLayout {
    /// Build the configuration for this layout.
    #[must_use]
    pub fn config(self, is_owner: bool) -> ListConfig {
        let (columns, show_results, show_stats) = match self {
            Self::Compact => (vec![Column::Title, Column::Status, Column::Votes], false, false),
            Self::Cards => (
                vec![Column::Title, Column::Status, Column::Votes, Column::Creator],
                true,
                true,
            ),
            Self::Table => (
                vec![
                    Column::Title,
                    Column::Status,
                    Column::Options,
                    Column::Votes,
                    Column::Creator,
                    Column::Created,
                ],
                false,
                true,
            ),
        };

        let row_actions = if is_owner && self != Self::Compact {
            vec![RowAction::TOGGLE_STATUS, RowAction::DELETE]
        } else {
            Vec::new()
        };

        ListConfig {
            layout: self,
            columns,
            show_results,
            show_stats,
            empty_message: "No polls match your filters",
            row_actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_actions_only_for_owner() {
        assert!(ListLayout::Table.config(false).row_actions.is_empty());
        let owner = ListLayout::Table.config(true);
        assert_eq!(owner.row_actions, vec![RowAction::TOGGLE_STATUS, RowAction::DELETE]);
        assert!(owner.row_actions.iter().any(|a| a.destructive));
    }

    #[test]
    fn test_only_delete_is_destructive() {
        assert!(RowAction::DELETE.destructive);
        assert!(!RowAction::TOGGLE_STATUS.destructive);
    }

    #[test]
    fn test_table_has_every_column() {
        assert_eq!(ListLayout::Table.config(false).columns.len(), 6);
        assert!(!ListLayout::Compact.config(true).show_results);
        assert!(ListLayout::Cards.config(false).show_results);
    }
}
