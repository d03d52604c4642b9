//! Export, offramp, onramp, import and clean steps.
//!
//! Every step works against a [`crate::store::Store`] and, when it talks to a
//! vendor, an already authenticated client. Resources are processed one at a
//! time in listing order; a failure on one resource is recorded in the
//! returned [`crate::report::Report`] and the batch moves on. Only local
//! filesystem failures abort a step with an error.

pub mod apigee;
pub mod apihub;
pub mod aws;
pub mod azure;
pub mod general;

/// Name filter shared by all steps: `None` selects everything.
pub(crate) fn selected(filter: Option<&str>, name: &str) -> bool {
    filter.is_none_or(|wanted| wanted == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected() {
        assert!(selected(None, "orders"));
        assert!(selected(Some("orders"), "orders"));
        assert!(!selected(Some("orders"), "payments"));
    }
}
