//! Driftwatch ingest - file-side schema inference
//!
//! Derives an [`InferredColumnDescriptor`] per column from a headered CSV
//! stream: the narrowest primitive type every non-empty value fits, and
//! the longest textual rendering observed. This is the file half of the
//! Fetcher contract; the warehouse half lives in driftwatch-catalog.

use std::io::Read;

use thiserror::Error;
use tracing::debug;

use driftwatch_core::{InferredColumnDescriptor, InferredType};

/// Errors raised while reading an incoming file
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file has no header row or no columns
    #[error("file has no usable header row")]
    MissingHeader,

    /// Malformed CSV (ragged rows, bad quoting, invalid UTF-8)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Per-column state while scanning records
///
/// Starts at the narrowest candidate and only ever widens: Integer until
/// a non-integer value appears, Float until a non-numeric one does.
struct ColumnState {
    name: String,
    all_integer: bool,
    all_float: bool,
    saw_value: bool,
    max_length: u32,
}

impl ColumnState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            all_integer: true,
            all_float: true,
            saw_value: false,
            max_length: 0,
        }
    }

    fn observe(&mut self, field: &str) {
        self.max_length = self.max_length.max(field.len() as u32);

        // Empty fields stay out of the type decision.
        if field.is_empty() {
            return;
        }
        self.saw_value = true;

        if self.all_integer && field.parse::<i64>().is_err() {
            self.all_integer = false;
        }
        if self.all_float && field.parse::<f64>().is_err() {
            self.all_float = false;
        }
    }

    fn finish(self) -> InferredColumnDescriptor {
        let inferred_type = if !self.saw_value {
            InferredType::Text
        } else if self.all_integer {
            InferredType::Integer
        } else if self.all_float {
            InferredType::Float
        } else {
            InferredType::Text
        };

        InferredColumnDescriptor::new(self.name, inferred_type, self.max_length)
    }
}

/// Infer the schema of a headered CSV stream
///
/// The header row supplies the raw column names; every following record
/// narrows the per-column type and widens the observed maximum length.
/// Column order follows the header.
pub fn infer_file_schema(reader: impl Read) -> Result<Vec<InferredColumnDescriptor>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::MissingHeader);
    }

    let mut states: Vec<ColumnState> = headers.iter().map(ColumnState::new).collect();

    let mut rows = 0usize;
    for record in csv_reader.records() {
        let record = record?;
        for (state, field) in states.iter_mut().zip(record.iter()) {
            state.observe(field);
        }
        rows += 1;
    }

    debug!(columns = states.len(), rows, "inferred file schema");
    Ok(states.into_iter().map(ColumnState::finish).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(data: &str) -> Vec<InferredColumnDescriptor> {
        infer_file_schema(data.as_bytes()).unwrap()
    }

    #[test]
    fn integer_float_and_text_columns() {
        let schema = infer(
            "id,amount,name\n\
             1,19.99,alice\n\
             2,5,bob\n\
             30,0.5,carol\n",
        );

        assert_eq!(schema.len(), 3);
        assert_eq!(schema[0].raw_name, "id");
        assert_eq!(schema[0].inferred_type, InferredType::Integer);
        assert_eq!(schema[1].inferred_type, InferredType::Float);
        assert_eq!(schema[2].inferred_type, InferredType::Text);
    }

    #[test]
    fn one_stray_value_widens_the_column() {
        let schema = infer("id\n1\n2\nx\n");
        assert_eq!(schema[0].inferred_type, InferredType::Text);

        let schema = infer("id\n1\n2\n3.5\n");
        assert_eq!(schema[0].inferred_type, InferredType::Float);
    }

    #[test]
    fn max_length_is_the_widest_rendering() {
        let schema = infer(
            "id,notes\n\
             1,short\n\
             22,a much longer note\n",
        );

        assert_eq!(schema[0].observed_max_length, 2);
        assert_eq!(schema[1].observed_max_length, 18);
    }

    #[test]
    fn empty_fields_do_not_decide_the_type() {
        let schema = infer("id\n1\n\n3\n");
        assert_eq!(schema[0].inferred_type, InferredType::Integer);
    }

    #[test]
    fn all_empty_column_is_text() {
        let schema = infer("id,blank\n1,\n2,\n");
        assert_eq!(schema[1].inferred_type, InferredType::Text);
        assert_eq!(schema[1].observed_max_length, 0);
    }

    #[test]
    fn header_only_file_yields_text_columns() {
        let schema = infer("id,name\n");
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0].inferred_type, InferredType::Text);
    }

    #[test]
    fn headers_keep_their_punctuation() {
        let schema = infer("user_id,first-name!\n1,alice\n");
        assert_eq!(schema[0].raw_name, "user_id");
        assert_eq!(schema[1].raw_name, "first-name!");
    }

    #[test]
    fn blank_header_row_is_rejected() {
        let err = infer_file_schema(" , ,\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader));
    }

    #[test]
    fn ragged_rows_are_a_csv_error() {
        let err = infer_file_schema("id,name\n1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::Csv(_)));
    }
}
