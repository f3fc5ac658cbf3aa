//! The apply engine: plan against the live table, execute, propagate.

use proxyconf_core::{FieldChange, GaleraHostgroup, Plan, State};
use serde::Serialize;

use crate::conn::AdminConn;
use crate::error::Result;
use crate::sql;

/// Knobs for one apply run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOpts {
    /// Report what would change without executing anything.
    pub check_mode: bool,
    /// Run `SAVE MYSQL SERVERS TO DISK` after a successful mutation.
    pub save_to_disk: bool,
    /// Run `LOAD MYSQL SERVERS TO RUNTIME` after a successful mutation.
    pub load_to_runtime: bool,
}

impl Default for ApplyOpts {
    fn default() -> Self {
        Self {
            check_mode: false,
            save_to_disk: true,
            load_to_runtime: true,
        }
    }
}

/// Outcome of one apply run, in the shape operators expect from
/// configuration-management tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub state: State,
    pub changed: bool,
    pub msg: String,
    /// Post-image of the row (pre-image for deletes; absent when the row
    /// never existed).
    pub galera_group: Option<GaleraHostgroup>,
    /// Column-level diff for update plans.
    pub changes: Vec<FieldChange>,
}

/// Human message for a computed plan.
fn plan_message(plan: &Plan, state: State, check_mode: bool) -> &'static str {
    match (plan, state, check_mode) {
        (Plan::Create, _, true) => {
            "Galera hostgroup would have been added to mysql_galera_hostgroups, \
             however check mode is enabled"
        }
        (Plan::Create, _, false) => "Added Galera hostgroup to mysql_galera_hostgroups",
        (Plan::Update(_), _, true) => {
            "Galera hostgroup would have been updated in mysql_galera_hostgroups, \
             however check mode is enabled"
        }
        (Plan::Update(_), _, false) => "Updated Galera hostgroup in mysql_galera_hostgroups",
        (Plan::Delete, _, true) => {
            "Galera hostgroup would have been deleted from mysql_galera_hostgroups, \
             however check mode is enabled"
        }
        (Plan::Delete, _, false) => "Deleted Galera hostgroup from mysql_galera_hostgroups",
        (Plan::Unchanged, State::Present, _) => {
            "Galera hostgroup already matches the desired configuration"
        }
        (Plan::Unchanged, State::Absent, _) => {
            "Galera hostgroup is already absent from mysql_galera_hostgroups"
        }
    }
}

/// Ordered statements [`apply`] executes for a computed plan.
///
/// Empty in check mode and for [`Plan::Unchanged`]. Otherwise the mutation
/// statement comes first, then `SAVE MYSQL SERVERS TO DISK` and
/// `LOAD MYSQL SERVERS TO RUNTIME`, in that order, each suppressible.
fn execution_statements(plan: &Plan, desired: &GaleraHostgroup, opts: &ApplyOpts) -> Vec<String> {
    if opts.check_mode {
        return Vec::new();
    }
    let mut statements = match plan {
        Plan::Create => vec![sql::insert_galera_hostgroup(desired)],
        Plan::Update(changes) => {
            vec![sql::update_galera_hostgroup(desired.writer_hostgroup, changes)]
        }
        Plan::Delete => vec![sql::delete_galera_hostgroup(desired.writer_hostgroup)],
        Plan::Unchanged => return Vec::new(),
    };
    if opts.save_to_disk {
        statements.push(sql::SAVE_SERVERS_TO_DISK.to_owned());
    }
    if opts.load_to_runtime {
        statements.push(sql::LOAD_SERVERS_TO_RUNTIME.to_owned());
    }
    statements
}

/// Converge `mysql_galera_hostgroups` on the desired state for one writer
/// hostgroup.
///
/// Fetches the current row, computes the minimal plan, executes it (unless
/// `check_mode`), and -- only when something actually changed -- saves the
/// servers config to disk and loads it to runtime as requested.
///
/// # Errors
///
/// Returns an error when the desired row fails validation, or on any admin
/// interface failure. A failed SAVE/LOAD surfaces after the mutation has
/// already happened; rerunning is safe because planning is idempotent.
pub async fn apply(
    conn: &mut AdminConn,
    state: State,
    desired: &GaleraHostgroup,
    opts: &ApplyOpts,
) -> Result<ApplyReport> {
    // For `Absent` only the key matters; the other desired columns are
    // placeholders and must not be validated.
    if state == State::Present {
        desired.validate()?;
    }

    let current = conn.fetch_galera_hostgroup(desired.writer_hostgroup).await?;
    let plan = proxyconf_core::plan(state, desired, current.as_ref());
    let changed = plan.changes_row();
    let msg = plan_message(&plan, state, opts.check_mode).to_owned();
    let changes = match &plan {
        Plan::Update(changes) => changes.clone(),
        _ => Vec::new(),
    };

    for statement in execution_statements(&plan, desired, opts) {
        conn.execute(&statement).await?;
    }

    let galera_group = match (&plan, opts.check_mode) {
        // Post-image of the row after a real mutation.
        (Plan::Create | Plan::Update(_), false) => {
            conn.fetch_galera_hostgroup(desired.writer_hostgroup).await?
        }
        // Pre-image for deletes, current row otherwise.
        _ => current,
    };

    Ok(ApplyReport {
        state,
        changed,
        msg,
        galera_group,
        changes,
    })
}

/// Standalone SAVE/LOAD, for batching several applies run with propagation
/// suppressed.
///
/// # Errors
///
/// Returns an error when the admin interface rejects either statement.
pub async fn commit(conn: &mut AdminConn, save_to_disk: bool, load_to_runtime: bool) -> Result<()> {
    if save_to_disk {
        conn.save_servers_to_disk().await?;
    }
    if load_to_runtime {
        conn.load_servers_to_runtime().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proxyconf_core::Column;

    use super::*;

    #[test]
    fn defaults_propagate_to_disk_and_runtime() {
        let opts = ApplyOpts::default();
        assert!(!opts.check_mode);
        assert!(opts.save_to_disk);
        assert!(opts.load_to_runtime);
    }

    #[test]
    fn check_mode_messages_say_so() {
        for plan in [Plan::Create, Plan::Update(vec![]), Plan::Delete] {
            let msg = plan_message(&plan, State::Present, true);
            assert!(msg.contains("check mode is enabled"), "{msg}");
        }
    }

    #[test]
    fn unchanged_messages_depend_on_state_not_check_mode() {
        for check_mode in [false, true] {
            assert_eq!(
                plan_message(&Plan::Unchanged, State::Present, check_mode),
                "Galera hostgroup already matches the desired configuration"
            );
            assert_eq!(
                plan_message(&Plan::Unchanged, State::Absent, check_mode),
                "Galera hostgroup is already absent from mysql_galera_hostgroups"
            );
        }
    }

    fn desired() -> GaleraHostgroup {
        GaleraHostgroup::new(10, 11, 20, 30)
    }

    fn update_plan() -> Plan {
        Plan::Update(vec![FieldChange {
            column: Column::ReaderHostgroup,
            old: "21".to_owned(),
            new: "20".to_owned(),
        }])
    }

    #[test]
    fn check_mode_issues_no_statements() {
        let opts = ApplyOpts {
            check_mode: true,
            ..ApplyOpts::default()
        };
        for plan in [Plan::Create, update_plan(), Plan::Delete, Plan::Unchanged] {
            assert_eq!(execution_statements(&plan, &desired(), &opts), Vec::<String>::new());
        }
    }

    #[test]
    fn unchanged_plan_skips_save_and_load() {
        // No mutation happened, so nothing is propagated either.
        assert_eq!(
            execution_statements(&Plan::Unchanged, &desired(), &ApplyOpts::default()),
            Vec::<String>::new()
        );
    }

    #[test]
    fn mutations_are_followed_by_save_then_load() {
        for plan in [Plan::Create, update_plan(), Plan::Delete] {
            let statements = execution_statements(&plan, &desired(), &ApplyOpts::default());
            assert_eq!(statements.len(), 3);
            assert!(!statements[0].starts_with("SAVE") && !statements[0].starts_with("LOAD"));
            assert_eq!(statements[1], sql::SAVE_SERVERS_TO_DISK);
            assert_eq!(statements[2], sql::LOAD_SERVERS_TO_RUNTIME);
        }
    }

    #[test]
    fn save_and_load_are_individually_suppressible() {
        let no_save = ApplyOpts {
            save_to_disk: false,
            ..ApplyOpts::default()
        };
        let statements = execution_statements(&Plan::Create, &desired(), &no_save);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], sql::LOAD_SERVERS_TO_RUNTIME);

        let no_load = ApplyOpts {
            load_to_runtime: false,
            ..ApplyOpts::default()
        };
        let statements = execution_statements(&Plan::Create, &desired(), &no_load);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], sql::SAVE_SERVERS_TO_DISK);

        let neither = ApplyOpts {
            save_to_disk: false,
            load_to_runtime: false,
            ..ApplyOpts::default()
        };
        let statements = execution_statements(&Plan::Delete, &desired(), &neither);
        assert_eq!(
            statements,
            vec![sql::delete_galera_hostgroup(desired().writer_hostgroup)]
        );
    }

    #[test]
    fn update_statement_carries_the_planned_changes() {
        let statements = execution_statements(&update_plan(), &desired(), &ApplyOpts::default());
        assert_eq!(
            statements[0],
            "UPDATE mysql_galera_hostgroups SET reader_hostgroup = 20 \
             WHERE writer_hostgroup = 10"
        );
    }

    #[test]
    fn report_serializes_in_operator_shape() {
        let report = ApplyReport {
            state: State::Present,
            changed: true,
            msg: "Updated Galera hostgroup in mysql_galera_hostgroups".to_owned(),
            galera_group: Some(GaleraHostgroup::new(10, 11, 20, 30)),
            changes: vec![FieldChange {
                column: Column::ReaderHostgroup,
                old: "21".to_owned(),
                new: "20".to_owned(),
            }],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state"], "present");
        assert_eq!(json["changed"], true);
        assert_eq!(json["galera_group"]["writer_hostgroup"], 10);
        assert_eq!(json["changes"][0]["column"], "reader_hostgroup");
    }
}
