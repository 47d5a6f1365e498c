use super::ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};
use super::parser::parse_filter_date;
use crate::models::MessageRecord;

/// Keep the records matching `filter`, preserving order
///
/// Filters combine left to right with their operators; there is no precedence.
pub fn apply_filters(records: Vec<MessageRecord>, filter: &FilterExpr) -> Vec<MessageRecord> {
    if filter.is_empty() {
        return records;
    }
    records.into_iter().filter(|record| matches_filter(record, filter)).collect()
}

/// Evaluate a whole expression against one record
pub fn matches_filter(record: &MessageRecord, filter: &FilterExpr) -> bool {
    let Some((first, rest)) = filter.filters.split_first() else {
        return true;
    };

    let mut result = matches_field(record, first);
    for (operator, next) in filter.operators.iter().zip(rest) {
        let next_result = matches_field(record, next);
        result = match operator {
            FilterOperator::And => result && next_result,
            FilterOperator::Or => result || next_result,
        };
    }
    result
}

fn matches_field(record: &MessageRecord, filter: &FieldFilter) -> bool {
    match filter.field {
        FilterField::Sender => record.sender.to_lowercase().contains(&filter.value.to_lowercase()),
        FilterField::Since => compare_date(record, &filter.value, |day, bound| day >= bound),
        FilterField::Until => compare_date(record, &filter.value, |day, bound| day <= bound),
        FilterField::Has => match filter.value.to_lowercase().as_str() {
            "media" => record.has_media(),
            "text" => !record.text.trim().is_empty(),
            "ephemeral" => record.is_ephemeral,
            _ => false,
        },
    }
}

/// Records whose timestamp cannot be normalized never match a date bound
fn compare_date(
    record: &MessageRecord,
    value: &str,
    accept: impl Fn(chrono::NaiveDate, chrono::NaiveDate) -> bool,
) -> bool {
    match (record.normalized_timestamp(), parse_filter_date(value)) {
        (Some(timestamp), Some(bound)) => accept(timestamp.date(), bound),
        _ => false,
    }
}
