//! Table, column, index and foreign key value objects
//!
//! These are the payloads carried by [`Action`](crate::plan::Action)s. They
//! hold no behavior beyond construction-time validation: anything that would
//! make an action meaningless (an empty table name, an index over no columns)
//! is rejected here so the planner never has to check for it.

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Validation errors raised while building schema value objects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("cannot use an empty table name")]
    EmptyTableName,

    #[error("column on table `{table}` must have a name")]
    EmptyColumnName { table: String },

    #[error("invalid column type `{0}`")]
    InvalidColumnType(String),

    #[error("index on table `{table}` must cover at least one column")]
    EmptyIndexColumns { table: String },

    #[error("foreign key on table `{table}` must reference at least one column")]
    EmptyForeignKeyColumns { table: String },

    #[error("unknown referential action `{0}`")]
    UnknownReferentialAction(String),
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A reference to a table: its name plus creation options.
///
/// Grouping throughout planning is by [`Table::name`] only; two references
/// with different options but the same name address the same table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    #[serde(default)]
    options: TableOptions,
}

/// Options used when a table is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Explicit primary key columns. `None` lets the adapter decide.
    pub primary_key: Option<Vec<String>>,
    pub engine: Option<String>,
    pub collation: Option<String>,
    pub comment: Option<String>,
    /// Signedness of an adapter-generated identity column.
    pub signed: Option<bool>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Result<Self, SchemaError> {
        Self::with_options(name, TableOptions::default())
    }

    pub fn with_options(
        name: impl Into<String>,
        options: TableOptions,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchemaError::EmptyTableName);
        }
        Ok(Self { name, options })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Same options under a different name. Used when a rename is inverted.
    pub fn renamed(&self, name: impl Into<String>) -> Result<Self, SchemaError> {
        Self::with_options(name, self.options.clone())
    }

    pub(crate) fn validate(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyTableName);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Abstract column types understood by every adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ColumnType {
    BigInteger,
    SmallInteger,
    Integer,
    Binary,
    BinaryUuid,
    Blob,
    Boolean,
    Char,
    Cidr,
    Date,
    Datetime,
    Decimal,
    Enum,
    Float,
    Inet,
    Interval,
    Json,
    Jsonb,
    Macaddr,
    Set,
    String,
    Text,
    Time,
    Timestamp,
    Uuid,
    Year,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Parse a type name, mapping failures onto [`SchemaError`].
    pub fn parse(name: &str) -> Result<Self, SchemaError> {
        name.parse()
            .map_err(|_| SchemaError::InvalidColumnType(name.to_string()))
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColumnType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        ColumnType::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Defaults applied to columns built through a
/// [`MigrationTable`](crate::table::MigrationTable).
///
/// Loaded from the `[columns]` config section and passed down explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDefaults {
    /// Whether new columns accept NULL unless told otherwise.
    pub null_default: bool,
    /// Whether identity (primary key) columns are created unsigned.
    pub unsigned_primary_keys: bool,
}

impl Default for ColumnDefaults {
    fn default() -> Self {
        Self {
            null_default: true,
            unsigned_primary_keys: true,
        }
    }
}

impl ColumnDefaults {
    /// Build a column carrying these defaults.
    pub fn column(&self, name: impl Into<String>, column_type: ColumnType) -> Column {
        let mut column = Column::new(name, column_type);
        column.null = self.null_default;
        column
    }

    /// Build an auto-incrementing, non-null identity column.
    pub fn identity_column(&self, name: impl Into<String>, column_type: ColumnType) -> Column {
        let mut column = Column::new(name, column_type);
        column.identity = true;
        column.null = false;
        column.signed = !self.unsigned_primary_keys;
        column
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub null: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub identity: bool,
    #[serde(default = "default_signed")]
    pub signed: bool,
    #[serde(default)]
    pub comment: Option<String>,
    /// Column this one should be placed after (adapters that support it).
    #[serde(default)]
    pub after: Option<String>,
    /// Allowed values for `enum`/`set` columns.
    #[serde(default)]
    pub values: Vec<String>,
}

fn default_signed() -> bool {
    true
}

impl Column {
    /// A NOT NULL, signed column with no extra attributes.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            limit: None,
            scale: None,
            null: false,
            default: None,
            identity: false,
            signed: true,
            comment: None,
            after: None,
            values: Vec::new(),
        }
    }

    pub fn with_null(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_precision_and_scale(mut self, precision: u32, scale: u32) -> Self {
        self.limit = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    pub fn with_values(mut self, values: &[&str]) -> Self {
        self.values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub(crate) fn validate(&self, table: &str) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyColumnName {
                table: table.to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Indexes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    #[default]
    Index,
    Unique,
    Fulltext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub columns: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: IndexKind,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Index {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            name: None,
            kind: IndexKind::Index,
            limit: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.kind = IndexKind::Unique;
        self
    }

    pub fn fulltext(mut self) -> Self {
        self.kind = IndexKind::Fulltext;
        self
    }

    pub(crate) fn validate(&self, table: &str) -> Result<(), SchemaError> {
        if self.columns.is_empty() {
            return Err(SchemaError::EmptyIndexColumns {
                table: table.to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Foreign keys
// ---------------------------------------------------------------------------

/// What the database does to referencing rows on delete/update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum ReferentialAction {
    #[strum(serialize = "CASCADE")]
    Cascade,
    #[strum(serialize = "RESTRICT")]
    Restrict,
    #[strum(to_string = "SET NULL", serialize = "SET_NULL")]
    SetNull,
    #[strum(to_string = "NO ACTION", serialize = "NO_ACTION")]
    NoAction,
}

impl ReferentialAction {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Parse a referential action, tolerating surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        s.trim()
            .parse()
            .map_err(|_| SchemaError::UnknownReferentialAction(s.to_string()))
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReferentialAction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReferentialAction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        ReferentialAction::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: Option<ReferentialAction>,
    #[serde(default)]
    pub on_update: Option<ReferentialAction>,
    /// Explicit constraint name.
    #[serde(default)]
    pub constraint: Option<String>,
}

impl ForeignKey {
    pub fn new(columns: &[&str], referenced_table: &str, referenced_columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_table: referenced_table.to_string(),
            referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
            on_delete: None,
            on_update: None,
            constraint: None,
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    pub fn constraint(mut self, name: impl Into<String>) -> Self {
        self.constraint = Some(name.into());
        self
    }

    pub(crate) fn validate(&self, table: &str) -> Result<(), SchemaError> {
        if self.columns.is_empty() || self.referenced_columns.is_empty() {
            return Err(SchemaError::EmptyForeignKeyColumns {
                table: table.to_string(),
            });
        }
        if self.referenced_table.trim().is_empty() {
            return Err(SchemaError::EmptyTableName);
        }
        Ok(())
    }
}
