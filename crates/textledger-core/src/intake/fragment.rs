//! Delivered message fragments.

use serde::{Deserialize, Serialize};

/// One platform-delivered SMS fragment.
///
/// A long message arrives as an ordered batch of fragments sharing one
/// originating address; the batch order is the delivery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingFragment {
    /// Originating address as delivered by the platform.
    pub address: String,
    /// Body text carried by this fragment, absent for non-text parts.
    pub body: Option<String>,
    /// Delivery timestamp in milliseconds since the epoch.
    pub timestamp_millis: i64,
}

impl IncomingFragment {
    /// Create a fragment carrying body text.
    #[must_use]
    pub fn new(address: &str, body: &str, timestamp_millis: i64) -> Self {
        Self {
            address: address.to_string(),
            body: Some(body.to_string()),
            timestamp_millis,
        }
    }
}

/// Reassemble the full message text from a fragment batch.
///
/// Bodies are concatenated in batch order; fragments without a body
/// contribute nothing (they are skipped, not treated as empty-string gaps).
/// Returns `None` when no fragment carries a body.
#[must_use]
pub fn compose_body(fragments: &[IncomingFragment]) -> Option<String> {
    let mut composed: Option<String> = None;
    for fragment in fragments {
        if let Some(body) = &fragment.body {
            composed.get_or_insert_with(String::new).push_str(body);
        }
    }
    composed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compose_skips_absent_bodies() {
        let fragments = vec![
            IncomingFragment::new("555", "A", 100),
            IncomingFragment {
                address: "555".to_string(),
                body: None,
                timestamp_millis: 200,
            },
            IncomingFragment::new("555", "B", 300),
        ];

        assert_eq!(compose_body(&fragments), Some("AB".to_string()));
    }

    #[test]
    fn test_compose_empty_batch_is_none() {
        assert_eq!(compose_body(&[]), None);
    }

    #[test]
    fn test_compose_all_absent_is_none() {
        let fragments = vec![IncomingFragment {
            address: "555".to_string(),
            body: None,
            timestamp_millis: 100,
        }];

        assert_eq!(compose_body(&fragments), None);
    }

    #[test]
    fn test_compose_present_but_empty_body_yields_empty_string() {
        let fragments = vec![IncomingFragment::new("555", "", 100)];

        assert_eq!(compose_body(&fragments), Some(String::new()));
    }

    proptest! {
        #[test]
        fn prop_compose_equals_ordered_concatenation(
            bodies in proptest::collection::vec(proptest::option::of(".{0,8}"), 0..8)
        ) {
            let fragments: Vec<IncomingFragment> = bodies
                .iter()
                .enumerate()
                .map(|(i, body)| IncomingFragment {
                    address: "555".to_string(),
                    body: body.clone(),
                    timestamp_millis: i64::try_from(i).unwrap_or_default(),
                })
                .collect();

            let expected: String = bodies.iter().flatten().map(String::as_str).collect();
            let composed = compose_body(&fragments);

            if bodies.iter().all(Option::is_none) {
                prop_assert_eq!(composed, None);
            } else {
                prop_assert_eq!(composed, Some(expected));
            }
        }
    }
}
