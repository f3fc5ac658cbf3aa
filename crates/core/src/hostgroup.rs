use core::fmt::{Display, Formatter, Result as FmtResult};

/// Policy for whether writer nodes also serve reads.
///
/// ProxySQL stores this as an integer; only 0, 1, and 2 are accepted.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WriterIsAlsoReader {
    /// Writers serve writes only (wire value 0).
    #[default]
    Never,
    /// Writers are also placed in the reader hostgroup (wire value 1).
    Always,
    /// Only backup writers are placed in the reader hostgroup (wire value 2).
    BackupOnly,
}

impl WriterIsAlsoReader {
    /// Integer stored in the `writer_is_also_reader` column.
    #[must_use]
    pub const fn as_wire(self) -> u8 {
        match self {
            Self::Never => 0,
            Self::Always => 1,
            Self::BackupOnly => 2,
        }
    }

    /// Parse the column value back; `None` for anything outside 0..=2.
    #[must_use]
    pub const fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Never),
            1 => Some(Self::Always),
            2 => Some(Self::BackupOnly),
            _ => None,
        }
    }
}

/// One row of `mysql_galera_hostgroups`.
///
/// `writer_hostgroup` is the table's primary key; every other column is
/// mutable in place. Defaults for the non-hostgroup columns mirror the
/// column defaults of the admin table itself.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaleraHostgroup {
    /// Hostgroup receiving writes while healthy.
    pub writer_hostgroup: u32,
    /// Standby writers, promoted when the writer hostgroup drains.
    pub backup_writer_hostgroup: u32,
    /// Hostgroup receiving reads (nodes with `read_only=1`).
    pub reader_hostgroup: u32,
    /// Parking hostgroup for nodes that left the cluster.
    pub offline_hostgroup: u32,
    /// Whether ProxySQL monitors and enforces this grouping.
    #[cfg_attr(feature = "serde", serde(default = "default_active"))]
    pub active: bool,
    /// Maximum number of simultaneous writers.
    #[cfg_attr(feature = "serde", serde(default = "default_max_writers"))]
    pub max_writers: u32,
    /// Whether writer nodes also serve reads.
    #[cfg_attr(feature = "serde", serde(default))]
    pub writer_is_also_reader: WriterIsAlsoReader,
    /// Replication lag (wsrep queue depth) above which a node is shunned.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_transactions_behind: u32,
    /// Free-form operator note.
    #[cfg_attr(feature = "serde", serde(default))]
    pub comment: String,
}

#[cfg(feature = "serde")]
const fn default_active() -> bool {
    true
}

#[cfg(feature = "serde")]
const fn default_max_writers() -> u32 {
    1
}

impl GaleraHostgroup {
    /// Row with the given hostgroup ids and table-default remaining columns.
    #[must_use]
    pub const fn new(
        writer_hostgroup: u32,
        backup_writer_hostgroup: u32,
        reader_hostgroup: u32,
        offline_hostgroup: u32,
    ) -> Self {
        Self {
            writer_hostgroup,
            backup_writer_hostgroup,
            reader_hostgroup,
            offline_hostgroup,
            active: true,
            max_writers: 1,
            writer_is_also_reader: WriterIsAlsoReader::Never,
            max_transactions_behind: 0,
            comment: String::new(),
        }
    }

    /// Reject hostgroup combinations ProxySQL would misbehave on.
    ///
    /// # Errors
    ///
    /// Returns an error when the reader and writer hostgroups are the same
    /// id, which would defeat read/write splitting entirely.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        if self.reader_hostgroup == self.writer_hostgroup {
            return Err(ValidationError::ReaderEqualsWriter {
                hostgroup: self.writer_hostgroup,
            });
        }
        Ok(())
    }

    /// Value of `column` as the admin interface's text protocol renders it.
    ///
    /// Numeric columns become decimal strings and `active` becomes `0`/`1`,
    /// matching what a `SELECT` against the admin table returns. The comment
    /// is returned unescaped.
    #[must_use]
    pub fn wire_value(&self, column: Column) -> String {
        match column {
            Column::BackupWriterHostgroup => self.backup_writer_hostgroup.to_string(),
            Column::ReaderHostgroup => self.reader_hostgroup.to_string(),
            Column::OfflineHostgroup => self.offline_hostgroup.to_string(),
            Column::Active => u8::from(self.active).to_string(),
            Column::MaxWriters => self.max_writers.to_string(),
            Column::WriterIsAlsoReader => self.writer_is_also_reader.as_wire().to_string(),
            Column::MaxTransactionsBehind => self.max_transactions_behind.to_string(),
            Column::Comment => self.comment.clone(),
        }
    }
}

/// Mutable columns of `mysql_galera_hostgroups` (everything except the key).
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    BackupWriterHostgroup,
    ReaderHostgroup,
    OfflineHostgroup,
    Active,
    MaxWriters,
    WriterIsAlsoReader,
    MaxTransactionsBehind,
    Comment,
}

impl Column {
    /// All mutable columns, in table order.
    pub const ALL: [Self; 8] = [
        Self::BackupWriterHostgroup,
        Self::ReaderHostgroup,
        Self::OfflineHostgroup,
        Self::Active,
        Self::MaxWriters,
        Self::WriterIsAlsoReader,
        Self::MaxTransactionsBehind,
        Self::Comment,
    ];

    /// Column name as it appears in the admin table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BackupWriterHostgroup => "backup_writer_hostgroup",
            Self::ReaderHostgroup => "reader_hostgroup",
            Self::OfflineHostgroup => "offline_hostgroup",
            Self::Active => "active",
            Self::MaxWriters => "max_writers",
            Self::WriterIsAlsoReader => "writer_is_also_reader",
            Self::MaxTransactionsBehind => "max_transactions_behind",
            Self::Comment => "comment",
        }
    }

    /// Whether the column holds text (and so needs quoting in SQL).
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Comment)
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Error returned when a desired row fails validation.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, ::derive_more::Display)]
pub enum ValidationError {
    /// The reader and writer hostgroups share an id.
    #[display(
        "reader_hostgroup and writer_hostgroup must be different hostgroup ids (both are {hostgroup})"
    )]
    ReaderEqualsWriter { hostgroup: u32 },
}

impl core::error::Error for ValidationError {}
