//! Filter evaluation

use crate::context::EvaluationContext;
use crate::engine::matcher;
use stagegate_core::Filter;
use tracing::{debug, warn};

/// Returns true if at least one of the filter's conditions matches
///
/// An absent attribute never matches, and a condition that cannot be applied
/// to the attribute counts as not matching. This never fails.
pub fn filter_matches(filter: &Filter, context: &EvaluationContext) -> bool {
    let filter_type = filter.filter_type;
    let Some(attribute) = context.lookup(filter_type) else {
        debug!("Attribute '{}' absent, filter does not match", filter_type);
        return false;
    };

    filter.conditions.iter().any(|condition| {
        match matcher::matches(condition, &attribute, filter_type.kind()) {
            Ok(matched) => matched,
            Err(e) => {
                warn!("Condition on '{}' skipped: {}", filter_type, e);
                false
            }
        }
    })
}
