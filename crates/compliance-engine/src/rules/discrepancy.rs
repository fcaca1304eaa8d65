//! Numeric discrepancy detection between an uploaded chunk and a reference text

use std::fmt;

use shared_types::QuantityKind;

use crate::extractors::{extract_quantities, format_value};

/// Separator between discrepancy descriptions in a `potential_issue` string
pub const ISSUE_SEPARATOR: &str = " | ";

/// One conflicting pair of values for a quantity category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discrepancy {
    pub kind: QuantityKind,
    pub uploaded: f64,
    pub reference: f64,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Uploaded says {}, reference says {}",
            self.kind.label(),
            format_value(self.uploaded),
            format_value(self.reference)
        )
    }
}

/// Every differing (uploaded, reference) pair, category by category
pub fn find_discrepancies(uploaded: &str, reference: &str) -> Vec<Discrepancy> {
    let mut found = Vec::new();

    for kind in QuantityKind::ALL {
        let uploaded_values = extract_quantities(uploaded, kind);
        if uploaded_values.is_empty() {
            continue;
        }
        let reference_values = extract_quantities(reference, kind);

        for &u in &uploaded_values {
            for &r in &reference_values {
                if u != r {
                    found.push(Discrepancy {
                        kind,
                        uploaded: u,
                        reference: r,
                    });
                }
            }
        }
    }

    found
}

/// `potential_issue` description for a pair of texts, `None` when the numbers agree
pub fn detect(uploaded: &str, reference: &str) -> Option<String> {
    let discrepancies = find_discrepancies(uploaded, reference);
    if discrepancies.is_empty() {
        return None;
    }

    Some(
        discrepancies
            .iter()
            .map(Discrepancy::to_string)
            .collect::<Vec<_>>()
            .join(ISSUE_SEPARATOR),
    )
}
