//! Non-destructive header injection.
//!
//! # Responsibilities
//! - Merge default response headers into an existing `HeaderMap`
//! - Never overwrite, remove or rename a header the response already carries
//! - Skip proposals whose condition does not hold for this response
//!
//! # Design Decisions
//! - Set-if-absent via `HeaderMap::entry`; names are compared
//!   case-insensitively because `HeaderName` is normalised
//! - First applicable proposal wins when several target the same name
//! - Pure: no logging or metrics here, callers use the returned report

use axum::http::header::{Entry, HeaderMap, HeaderName, HeaderValue};

use crate::security::PolicyError;

/// A default header the caller would like to see on a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderProposal {
    pub name: HeaderName,
    pub value: HeaderValue,
    /// Condition evaluated by the caller, e.g. "the request is secure".
    pub applies: bool,
}

impl HeaderProposal {
    /// An unconditional proposal.
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self {
            name,
            value,
            applies: true,
        }
    }

    /// Attach the caller's condition.
    pub fn when(mut self, applies: bool) -> Self {
        self.applies = applies;
        self
    }

    /// Build a proposal from raw strings, validating both parts.
    pub fn parse(name: &str, value: &str, applies: bool) -> Result<Self, PolicyError> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
            PolicyError::InvalidName {
                name: name.to_string(),
                source,
            }
        })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|source| PolicyError::InvalidValue {
                name: name.to_string(),
                source,
            })?;

        Ok(Self::new(header_name, header_value).when(applies))
    }
}

/// What happened to each proposal during one application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Proposals written into the header map.
    pub inserted: usize,
    /// Applicable proposals discarded because the name was already present.
    pub preserved: usize,
    /// Proposals whose condition was false.
    pub skipped: usize,
}

impl ApplyReport {
    /// Number of proposals examined.
    pub fn total(&self) -> usize {
        self.inserted + self.preserved + self.skipped
    }
}

/// Write each applicable proposal into `headers` unless the name is already present.
///
/// Returns the same map for chaining.
pub fn apply<'a>(headers: &'a mut HeaderMap, proposals: &[HeaderProposal]) -> &'a mut HeaderMap {
    apply_with_report(headers, proposals);
    headers
}

/// Same as [`apply`], returning per-outcome counts instead of the map.
pub fn apply_with_report(headers: &mut HeaderMap, proposals: &[HeaderProposal]) -> ApplyReport {
    let mut report = ApplyReport::default();

    for proposal in proposals {
        if !proposal.applies {
            report.skipped += 1;
            continue;
        }

        match headers.entry(&proposal.name) {
            Entry::Occupied(_) => report.preserved += 1,
            Entry::Vacant(slot) => {
                slot.insert(proposal.value.clone());
                report.inserted += 1;
            }
        }
    }

    report
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    const NAMES: &[&str] = &[
        "X-Foo",
        "x-foo",
        "X-FOO",
        "X-Bar",
        "x-bar",
        "Referrer-Policy",
        "referrer-policy",
    ];

    fn header_map() -> impl Strategy<Value = HeaderMap> {
        prop::collection::vec((prop::sample::select(NAMES), "[a-z0-9]{1,8}"), 0..6).prop_map(
            |pairs| {
                let mut headers = HeaderMap::new();
                for (name, value) in pairs {
                    headers.append(
                        HeaderName::from_bytes(name.as_bytes()).unwrap(),
                        HeaderValue::from_str(&value).unwrap(),
                    );
                }
                headers
            },
        )
    }

    fn proposals() -> impl Strategy<Value = Vec<HeaderProposal>> {
        prop::collection::vec(
            (prop::sample::select(NAMES), "[a-z0-9]{1,8}", any::<bool>()),
            0..8,
        )
        .prop_map(|triples| {
            triples
                .into_iter()
                .map(|(name, value, applies)| HeaderProposal::parse(name, &value, applies).unwrap())
                .collect()
        })
    }

    fn values<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Vec<&'a HeaderValue> {
        headers.get_all(name).iter().collect()
    }

    proptest! {
        #[test]
        fn second_application_is_a_no_op(original in header_map(), proposals in proposals()) {
            let mut headers = original;
            apply(&mut headers, &proposals);
            let once = headers.clone();

            let report = apply_with_report(&mut headers, &proposals);

            prop_assert_eq!(&headers, &once);
            prop_assert_eq!(report.inserted, 0);
        }

        #[test]
        fn each_name_resolves_to_existing_or_first_applicable(
            original in header_map(),
            proposals in proposals()
        ) {
            let mut headers = original.clone();
            apply(&mut headers, &proposals);

            for name in headers.keys() {
                prop_assert!(
                    original.contains_key(name)
                        || proposals.iter().any(|p| p.applies && p.name == *name),
                    "unexpected header {}", name
                );
            }

            for proposal in &proposals {
                let name = &proposal.name;
                if original.contains_key(name) {
                    prop_assert_eq!(values(&headers, name), values(&original, name));
                } else if let Some(first) = proposals.iter().find(|p| p.applies && p.name == *name) {
                    prop_assert_eq!(values(&headers, name), vec![&first.value]);
                } else {
                    prop_assert!(!headers.contains_key(name));
                }
            }
        }

        #[test]
        fn report_accounts_for_every_proposal(
            original in header_map(),
            proposals in proposals()
        ) {
            let mut headers = original.clone();
            let report = apply_with_report(&mut headers, &proposals);

            prop_assert_eq!(report.total(), proposals.len());
            prop_assert_eq!(report.skipped, proposals.iter().filter(|p| !p.applies).count());
            prop_assert_eq!(headers.keys_len(), original.keys_len() + report.inserted);
        }
    }
}
