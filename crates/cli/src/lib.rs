//! proxyconf CLI -- declarative ProxySQL Galera hostgroup management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use proxyconf_admin::{AdminOpts, ApplyOpts};
use proxyconf_core::{GaleraHostgroup, WriterIsAlsoReader};

#[derive(Debug, Parser)]
#[command(
    name = "proxyconf",
    about = "Declarative management of ProxySQL Galera hostgroups over the admin interface"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ensure a Galera hostgroup row exists with the given configuration
    Apply(ApplyArgs),
    /// Remove a Galera hostgroup row
    Remove(RemoveArgs),
    /// Print the Galera hostgroup row for one writer hostgroup
    Show(ShowArgs),
    /// Print every row of mysql_galera_hostgroups
    List(ListArgs),
    /// Save the servers config to disk and load it to runtime
    Commit(CommitArgs),
    /// Check connectivity and print the admin interface version
    Ping(PingArgs),
    /// Print the JSON Schema for the Galera hostgroup document to stdout
    Schema,
}

/// How to reach the admin interface; flags override the config file,
/// which overrides stock-install defaults.
#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Admin interface host
    #[arg(long)]
    pub host: Option<String>,
    /// Admin interface port
    #[arg(long)]
    pub port: Option<u16>,
    /// Admin user
    #[arg(long)]
    pub user: Option<String>,
    /// Admin password
    #[arg(long)]
    pub password: Option<String>,
    /// TOML file with connection options
    #[arg(long)]
    pub config_file: Option<PathBuf>,
    /// Connect timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl ConnectArgs {
    /// Resolve the effective connection options.
    ///
    /// # Errors
    ///
    /// Returns an error when the config file cannot be read or parsed.
    pub fn admin_opts(&self) -> Result<AdminOpts, proxyconf_admin::Error> {
        let mut opts = match &self.config_file {
            Some(path) => AdminOpts::from_file(path)?,
            None => AdminOpts::default(),
        };
        if let Some(host) = &self.host {
            opts.host.clone_from(host);
        }
        if let Some(port) = self.port {
            opts.port = port;
        }
        if let Some(user) = &self.user {
            opts.user.clone_from(user);
        }
        if let Some(password) = &self.password {
            opts.password.clone_from(password);
        }
        if let Some(timeout) = self.timeout {
            opts.connect_timeout_secs = timeout;
        }
        Ok(opts)
    }
}

/// Column values for the desired row. Defaults mirror the admin table's
/// column defaults.
#[derive(Debug, Args)]
pub struct RowArgs {
    /// Id of the writer hostgroup
    #[arg(long)]
    pub writer_hostgroup: u32,
    /// Id of the backup writer hostgroup
    #[arg(long)]
    pub backup_writer_hostgroup: u32,
    /// Id of the reader hostgroup
    #[arg(long)]
    pub reader_hostgroup: u32,
    /// Id of the offline hostgroup
    #[arg(long)]
    pub offline_hostgroup: u32,
    /// Whether ProxySQL monitors and enforces this grouping
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    pub active: bool,
    /// Maximum number of simultaneous writers
    #[arg(long, default_value_t = 1)]
    pub max_writers: u32,
    /// Whether writer nodes also serve reads
    #[arg(long, value_enum, default_value = "never")]
    pub writer_is_also_reader: WriterPolicy,
    /// Replication lag above which a node is shunned
    #[arg(long, default_value_t = 0)]
    pub max_transactions_behind: u32,
    /// Free-form operator note
    #[arg(long, default_value = "")]
    pub comment: String,
}

impl RowArgs {
    #[must_use]
    pub fn to_row(&self) -> GaleraHostgroup {
        GaleraHostgroup {
            writer_hostgroup: self.writer_hostgroup,
            backup_writer_hostgroup: self.backup_writer_hostgroup,
            reader_hostgroup: self.reader_hostgroup,
            offline_hostgroup: self.offline_hostgroup,
            active: self.active,
            max_writers: self.max_writers,
            writer_is_also_reader: self.writer_is_also_reader.into(),
            max_transactions_behind: self.max_transactions_behind,
            comment: self.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WriterPolicy {
    Never,
    Always,
    BackupOnly,
}

impl From<WriterPolicy> for WriterIsAlsoReader {
    fn from(policy: WriterPolicy) -> Self {
        match policy {
            WriterPolicy::Never => Self::Never,
            WriterPolicy::Always => Self::Always,
            WriterPolicy::BackupOnly => Self::BackupOnly,
        }
    }
}

/// Flags shared by the mutating subcommands.
#[derive(Debug, Args)]
pub struct MutateArgs {
    /// Report what would change without executing anything
    #[arg(long)]
    pub check: bool,
    /// Skip SAVE MYSQL SERVERS TO DISK after a change
    #[arg(long)]
    pub no_save_to_disk: bool,
    /// Skip LOAD MYSQL SERVERS TO RUNTIME after a change
    #[arg(long)]
    pub no_load_to_runtime: bool,
    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl MutateArgs {
    #[must_use]
    pub const fn apply_opts(&self) -> ApplyOpts {
        ApplyOpts {
            check_mode: self.check,
            save_to_disk: !self.no_save_to_disk,
            load_to_runtime: !self.no_load_to_runtime,
        }
    }
}

#[derive(Debug, Parser)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    #[command(flatten)]
    pub row: RowArgs,
    #[command(flatten)]
    pub mutate: MutateArgs,
}

#[derive(Debug, Parser)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Id of the writer hostgroup to remove
    #[arg(long)]
    pub writer_hostgroup: u32,
    #[command(flatten)]
    pub mutate: MutateArgs,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Id of the writer hostgroup to show
    #[arg(long)]
    pub writer_hostgroup: u32,
    /// Output the row as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Output the rows as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CommitArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Skip SAVE MYSQL SERVERS TO DISK
    #[arg(long)]
    pub no_save_to_disk: bool,
    /// Skip LOAD MYSQL SERVERS TO RUNTIME
    #[arg(long)]
    pub no_load_to_runtime: bool,
}

#[derive(Debug, Parser)]
pub struct PingArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::CommandFactory;
    use proxyconf_core::State;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        App::command().debug_assert();
    }

    #[test]
    fn apply_parses_with_table_defaults() {
        let app = App::parse_from([
            "proxyconf",
            "apply",
            "--writer-hostgroup",
            "10",
            "--backup-writer-hostgroup",
            "11",
            "--reader-hostgroup",
            "20",
            "--offline-hostgroup",
            "30",
        ]);
        let Command::Apply(args) = app.command else {
            panic!("expected apply");
        };
        let row = args.row.to_row();
        assert_eq!(row, GaleraHostgroup::new(10, 11, 20, 30));
        assert_eq!(args.mutate.apply_opts(), ApplyOpts::default());
    }

    #[test]
    fn apply_flags_reach_the_row_and_opts() {
        let app = App::parse_from([
            "proxyconf",
            "apply",
            "--writer-hostgroup",
            "10",
            "--backup-writer-hostgroup",
            "11",
            "--reader-hostgroup",
            "20",
            "--offline-hostgroup",
            "30",
            "--active",
            "false",
            "--writer-is-also-reader",
            "backup-only",
            "--max-transactions-behind",
            "100",
            "--comment",
            "shard A",
            "--check",
            "--no-load-to-runtime",
        ]);
        let Command::Apply(args) = app.command else {
            panic!("expected apply");
        };
        let row = args.row.to_row();
        assert!(!row.active);
        assert_eq!(row.writer_is_also_reader, WriterIsAlsoReader::BackupOnly);
        assert_eq!(row.max_transactions_behind, 100);
        assert_eq!(row.comment, "shard A");

        let opts = args.mutate.apply_opts();
        assert!(opts.check_mode);
        assert!(opts.save_to_disk);
        assert!(!opts.load_to_runtime);
    }

    #[test]
    fn remove_needs_only_the_writer_hostgroup() {
        let app = App::parse_from(["proxyconf", "remove", "--writer-hostgroup", "10"]);
        let Command::Remove(args) = app.command else {
            panic!("expected remove");
        };
        assert_eq!(args.writer_hostgroup, 10);
        assert_eq!(State::default(), State::Present);
    }

    #[test]
    fn connect_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"from-file\"\nport = 16032").unwrap();

        let app = App::parse_from([
            "proxyconf",
            "ping",
            "--config-file",
            file.path().to_str().unwrap(),
            "--host",
            "from-flag",
        ]);
        let Command::Ping(args) = app.command else {
            panic!("expected ping");
        };
        let opts = args.connect.admin_opts().unwrap();
        assert_eq!(opts.host, "from-flag");
        assert_eq!(opts.port, 16032);
        assert_eq!(opts.user, "admin");
    }

    #[test]
    fn connect_defaults_without_file_or_flags() {
        let app = App::parse_from(["proxyconf", "ping"]);
        let Command::Ping(args) = app.command else {
            panic!("expected ping");
        };
        assert_eq!(args.connect.admin_opts().unwrap(), AdminOpts::default());
    }
}
