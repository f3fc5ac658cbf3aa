use crate::hostgroup::{Column, GaleraHostgroup};

/// Target existence of the hostgroup row.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum State {
    /// The row must exist with the desired column values.
    #[default]
    Present,
    /// The row must not exist.
    Absent,
}

/// One column that has to move, with old and new wire-rendered values.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub column: Column,
    pub old: String,
    pub new: String,
}

/// Minimal set of actions converging the table on the desired state.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Insert the full desired row.
    Create,
    /// Update exactly the listed columns, keyed on `writer_hostgroup`.
    Update(Vec<FieldChange>),
    /// Delete the row.
    Delete,
    /// The table already matches; issue nothing.
    Unchanged,
}

impl Plan {
    /// Whether executing this plan mutates the table.
    #[must_use]
    pub const fn changes_row(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Decide what to do to `mysql_galera_hostgroups` for one writer hostgroup.
///
/// `current` is the row presently in the table (selected by
/// `desired.writer_hostgroup`), or `None` when absent. The result is
/// idempotent: planning against a table that already converged yields
/// [`Plan::Unchanged`].
#[must_use]
pub fn plan(state: State, desired: &GaleraHostgroup, current: Option<&GaleraHostgroup>) -> Plan {
    let plan = match (state, current) {
        (State::Present, None) => Plan::Create,
        (State::Present, Some(current)) => {
            let changes: Vec<FieldChange> = Column::ALL
                .into_iter()
                .filter_map(|column| {
                    let old = current.wire_value(column);
                    let new = desired.wire_value(column);
                    (old != new).then_some(FieldChange { column, old, new })
                })
                .collect();
            if changes.is_empty() {
                Plan::Unchanged
            } else {
                Plan::Update(changes)
            }
        }
        (State::Absent, Some(_)) => Plan::Delete,
        (State::Absent, None) => Plan::Unchanged,
    };
    tracing::debug!(
        ?state,
        writer_hostgroup = desired.writer_hostgroup,
        ?plan,
        "computed plan"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostgroup::WriterIsAlsoReader;

    fn desired() -> GaleraHostgroup {
        GaleraHostgroup::new(10, 11, 20, 30)
    }

    #[test]
    fn present_without_row_creates() {
        assert_eq!(plan(State::Present, &desired(), None), Plan::Create);
    }

    #[test]
    fn present_with_identical_row_is_unchanged() {
        let row = desired();
        assert_eq!(plan(State::Present, &row, Some(&row)), Plan::Unchanged);
    }

    #[test]
    fn present_with_drifted_row_updates_only_drifted_columns() {
        let mut current = desired();
        current.reader_hostgroup = 21;
        current.comment = "old note".to_owned();

        let Plan::Update(changes) = plan(State::Present, &desired(), Some(&current)) else {
            panic!("expected an update plan");
        };
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].column, Column::ReaderHostgroup);
        assert_eq!(changes[0].old, "21");
        assert_eq!(changes[0].new, "20");
        assert_eq!(changes[1].column, Column::Comment);
        assert_eq!(changes[1].old, "old note");
        assert_eq!(changes[1].new, "");
    }

    #[test]
    fn policy_drift_is_detected() {
        let mut wanted = desired();
        wanted.writer_is_also_reader = WriterIsAlsoReader::Always;
        let Plan::Update(changes) = plan(State::Present, &wanted, Some(&desired())) else {
            panic!("expected an update plan");
        };
        assert_eq!(
            changes,
            vec![FieldChange {
                column: Column::WriterIsAlsoReader,
                old: "0".to_owned(),
                new: "1".to_owned(),
            }]
        );
    }

    #[test]
    fn absent_with_row_deletes() {
        let row = desired();
        assert_eq!(plan(State::Absent, &row, Some(&row)), Plan::Delete);
    }

    #[test]
    fn absent_without_row_is_unchanged() {
        assert_eq!(plan(State::Absent, &desired(), None), Plan::Unchanged);
    }

    #[test]
    fn unchanged_is_the_only_non_mutating_plan() {
        assert!(Plan::Create.changes_row());
        assert!(Plan::Delete.changes_row());
        assert!(Plan::Update(vec![]).changes_row());
        assert!(!Plan::Unchanged.changes_row());
    }
}
