//! Field comparator between a desired value and an observed payload.

use tracing::trace;

use super::value::{AttributeMap, FieldValue};

/// Compares one populated desired field against the observed attributes.
///
/// The key is looked up case-insensitively. A key that is missing from the
/// observed side is always unequal. Callers skip zero-valued desired fields
/// before calling this; a zero value passed here is compared like any other.
#[must_use]
pub fn values_equal(field: &str, desired: FieldValue<'_>, observed: &AttributeMap) -> bool {
    let Some(actual) = observed.get_ignore_case(field) else {
        trace!("Field {field} missing from observed attributes");
        return false;
    };

    let equal = desired.matches(actual);
    if !equal {
        trace!("Field {field} differs: desired {desired}, observed {actual}");
    }
    equal
}
