//! Column descriptors and the two type vocabularies they speak
//!
//! The warehouse side reports types out of `information_schema.columns`;
//! the file side reports types inferred from raw CSV values. The diff
//! engine joins the two, so both vocabularies live here, closed, with an
//! explicit mapping between them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DriftError;

/// Type vocabulary of the warehouse catalog
///
/// `Other` preserves the raw catalog name for types the pipeline does not
/// compare (dates, variants, ...). Those columns are matched by name but
/// never produce type-change records.
///
/// Serializes as the display string (`"TEXT"`, `"NUMBER"`, ...), so
/// reports and history rows read in warehouse vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WarehouseType {
    /// Character data with an optional declared maximum length
    Text,

    /// Fixed-point numeric
    Number,

    /// Floating point
    Float,

    /// Any other catalog type, kept verbatim
    Other(String),
}

impl WarehouseType {
    /// Parse a raw `DATA_TYPE` value from the catalog
    ///
    /// Precision suffixes like `NUMBER(38,0)` are stripped before matching.
    pub fn from_catalog(raw: &str) -> Self {
        let base = raw.split('(').next().unwrap_or(raw).trim().to_uppercase();

        match base.as_str() {
            "TEXT" | "VARCHAR" | "STRING" | "CHAR" | "CHARACTER" => Self::Text,
            "NUMBER" | "DECIMAL" | "NUMERIC" | "INT" | "INTEGER" | "BIGINT" | "SMALLINT" => {
                Self::Number
            }
            "FLOAT" | "FLOAT4" | "FLOAT8" | "DOUBLE" | "DOUBLE PRECISION" | "REAL" => Self::Float,
            _ => Self::Other(base),
        }
    }
}

impl std::fmt::Display for WarehouseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "TEXT"),
            Self::Number => write!(f, "NUMBER"),
            Self::Float => write!(f, "FLOAT"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for WarehouseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WarehouseType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_catalog(&raw))
    }
}

/// Type vocabulary inferred from file values
///
/// Closed on purpose: anything the inference cannot place in this
/// vocabulary must be rejected at parse time, never smuggled through as a
/// free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    /// Non-numeric character data
    Text,

    /// Whole numbers only
    Integer,

    /// Numeric with a fractional component
    Float,
}

impl InferredType {
    /// Parse an inferred-type name
    ///
    /// Unrecognized names (for example `boolean`) are a configuration
    /// error: the downstream vocabulary has no slot for them.
    pub fn parse(raw: &str) -> Result<Self, DriftError> {
        match raw.trim().to_lowercase().as_str() {
            "text" | "string" | "object" => Ok(Self::Text),
            "integer" | "int" | "int64" => Ok(Self::Integer),
            "float" | "float64" | "double" => Ok(Self::Float),
            other => Err(DriftError::Configuration(format!(
                "unsupported inferred type '{}'",
                other
            ))),
        }
    }

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
        }
    }
}

impl std::fmt::Display for InferredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One column as registered in the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name as declared in the catalog
    pub name: String,

    /// Declared type
    pub declared_type: WarehouseType,

    /// Declared maximum character length, when the catalog reports one
    pub max_length: Option<u32>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, declared_type: WarehouseType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            max_length: None,
        }
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

/// One column as observed in an incoming file
///
/// `raw_name` is the header exactly as it appeared; it may carry
/// punctuation the warehouse name for the same logical column does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredColumnDescriptor {
    /// Header exactly as read from the file
    pub raw_name: String,

    /// Primitive type inferred from the column's values
    pub inferred_type: InferredType,

    /// Longest textual rendering observed among the column's values
    pub observed_max_length: u32,
}

impl InferredColumnDescriptor {
    pub fn new(raw_name: impl Into<String>, inferred_type: InferredType, observed_max_length: u32) -> Self {
        Self {
            raw_name: raw_name.into(),
            inferred_type,
            observed_max_length,
        }
    }
}

/// An inferred column plus the punctuation-free join key
///
/// `trimmed_name` exists only for matching against warehouse names;
/// display always uses `column.raw_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedColumn {
    /// The observed column, untouched
    pub column: InferredColumnDescriptor,

    /// `raw_name` with every ASCII punctuation character removed
    pub trimmed_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warehouse_type_display() {
        assert_eq!(WarehouseType::Text.to_string(), "TEXT");
        assert_eq!(WarehouseType::Number.to_string(), "NUMBER");
        assert_eq!(WarehouseType::Float.to_string(), "FLOAT");
        assert_eq!(WarehouseType::Other("DATE".into()).to_string(), "DATE");
    }

    #[test]
    fn warehouse_type_from_catalog() {
        assert_eq!(WarehouseType::from_catalog("TEXT"), WarehouseType::Text);
        assert_eq!(WarehouseType::from_catalog("VARCHAR(255)"), WarehouseType::Text);
        assert_eq!(WarehouseType::from_catalog("NUMBER(38,0)"), WarehouseType::Number);
        assert_eq!(WarehouseType::from_catalog("FLOAT"), WarehouseType::Float);
        assert_eq!(
            WarehouseType::from_catalog("TIMESTAMP_NTZ"),
            WarehouseType::Other("TIMESTAMP_NTZ".into())
        );
    }

    #[test]
    fn inferred_type_parse() {
        assert_eq!(InferredType::parse("integer").unwrap(), InferredType::Integer);
        assert_eq!(InferredType::parse("int64").unwrap(), InferredType::Integer);
        assert_eq!(InferredType::parse("float64").unwrap(), InferredType::Float);
        assert_eq!(InferredType::parse("object").unwrap(), InferredType::Text);
    }

    #[test]
    fn warehouse_type_serializes_as_display_string() {
        assert_eq!(serde_json::to_string(&WarehouseType::Number).unwrap(), "\"NUMBER\"");
        let parsed: WarehouseType = serde_json::from_str("\"TIMESTAMP_NTZ\"").unwrap();
        assert_eq!(parsed, WarehouseType::Other("TIMESTAMP_NTZ".into()));
        let text: WarehouseType = serde_json::from_str("\"TEXT\"").unwrap();
        assert_eq!(text, WarehouseType::Text);
    }

    #[test]
    fn inferred_type_rejects_unknown() {
        let err = InferredType::parse("boolean").unwrap_err();
        assert!(matches!(err, DriftError::Configuration(_)));
        assert!(err.to_string().contains("boolean"));
    }
}
