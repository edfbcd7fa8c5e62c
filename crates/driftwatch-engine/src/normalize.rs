//! Column-name normalization and type-vocabulary mapping
//!
//! File headers drift in punctuation (`user_id`, `user-id!`) while the
//! warehouse registers bare names. Matching happens on the trimmed form;
//! display always keeps the raw header.

use driftwatch_core::{InferredColumnDescriptor, InferredType, NormalizedColumn, WarehouseType};

/// Remove every ASCII punctuation character from a column name
///
/// No case folding, no whitespace collapsing. Total and deterministic.
pub fn trim_name(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

/// Attach the punctuation-free join key to each inferred column
pub fn normalize(columns: Vec<InferredColumnDescriptor>) -> Vec<NormalizedColumn> {
    columns
        .into_iter()
        .map(|column| {
            let trimmed_name = trim_name(&column.raw_name);
            NormalizedColumn { column, trimmed_name }
        })
        .collect()
}

/// Map an inferred type into the warehouse vocabulary for display
pub fn to_warehouse_type(inferred: InferredType) -> WarehouseType {
    match inferred {
        InferredType::Text => WarehouseType::Text,
        InferredType::Integer => WarehouseType::Number,
        InferredType::Float => WarehouseType::Float,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_ascii_punctuation_only() {
        assert_eq!(trim_name("user_id"), "userid");
        assert_eq!(trim_name("user-id!"), "userid");
        assert_eq!(trim_name("first.name"), "firstname");
        // whitespace and case survive
        assert_eq!(trim_name("First Name"), "First Name");
        assert_eq!(trim_name("plain"), "plain");
    }

    #[test]
    fn trim_is_total_on_odd_input() {
        assert_eq!(trim_name(""), "");
        assert_eq!(trim_name("!!!"), "");
        assert_eq!(trim_name("héllo_wörld"), "héllowörld");
    }

    #[test]
    fn normalize_keeps_order_and_raw_names() {
        let columns = vec![
            InferredColumnDescriptor::new("user_id", InferredType::Integer, 6),
            InferredColumnDescriptor::new("name", InferredType::Text, 12),
        ];
        let normalized = normalize(columns);

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].trimmed_name, "userid");
        assert_eq!(normalized[0].column.raw_name, "user_id");
        assert_eq!(normalized[1].trimmed_name, "name");
    }

    #[test]
    fn maps_into_warehouse_vocabulary() {
        assert_eq!(to_warehouse_type(InferredType::Text), WarehouseType::Text);
        assert_eq!(to_warehouse_type(InferredType::Integer), WarehouseType::Number);
        assert_eq!(to_warehouse_type(InferredType::Float), WarehouseType::Float);
    }
}
