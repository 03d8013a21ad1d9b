//! Client-side promo codes.

use crate::models::{round2, Money};
use subtle::ConstantTimeEq;

#[derive(Debug, Clone, PartialEq)]
pub struct PromoCode {
    pub code: String,
    /// Fraction of the total taken off, 0.0..=1.0
    pub discount: f64,
    pub label: String,
}

impl PromoCode {
    pub fn new(code: &str, discount: f64, label: &str) -> Self {
        Self {
            code: code.to_uppercase(),
            discount: discount.clamp(0.0, 1.0),
            label: label.to_string(),
        }
    }
}

/// Static code table. Codes are stored upper-case.
#[derive(Debug, Clone, Default)]
pub struct PromoTable {
    codes: Vec<PromoCode>,
}

impl PromoTable {
    pub fn new(codes: Vec<PromoCode>) -> Self {
        Self { codes }
    }

    /// The codes the site ships with.
    pub fn builtin() -> Self {
        Self::new(vec![PromoCode::new("DM23102901TEST100BBPR", 1.0, "100%")])
    }

    /// Find a code, ignoring case and surrounding whitespace. Every entry is
    /// compared in constant time so lookups do not leak prefix matches.
    pub fn lookup(&self, input: &str) -> Option<&PromoCode> {
        let normalized = normalize(input);
        let mut found = None;
        for promo in &self.codes {
            if constant_time_compare(&promo.code, &normalized) && found.is_none() {
                found = Some(promo);
            }
        }
        found
    }
}

pub fn normalize(input: &str) -> String {
    input.trim().to_uppercase()
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// A code applied to the current offer selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromo {
    pub code: String,
    pub discount: f64,
    pub label: String,
}

impl From<&PromoCode> for AppliedPromo {
    fn from(promo: &PromoCode) -> Self {
        Self {
            code: promo.code.clone(),
            discount: promo.discount,
            label: promo.label.clone(),
        }
    }
}

/// Result of pressing "apply".
#[derive(Debug, Clone, PartialEq)]
pub enum PromoOutcome {
    Applied(AppliedPromo),
    Invalid,
    Empty,
}

/// `round2(total * (1 - discount))`, or the total unchanged without a promo.
pub fn discounted_total(total: &Money, promo: Option<&AppliedPromo>) -> Money {
    let amount = match promo {
        Some(promo) => total.amount * (1.0 - promo.discount),
        None => total.amount,
    };
    Money {
        amount: round2(amount),
        currency: total.currency.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> PromoTable {
        PromoTable::new(vec![
            PromoCode::new("SUMMER10", 0.10, "10%"),
            PromoCode::new("free100", 1.0, "100%"),
        ])
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_trimmed() {
        let table = table();
        assert_eq!(table.lookup("  summer10 ").map(|p| p.label.as_str()), Some("10%"));
        assert_eq!(table.lookup("FREE100").map(|p| p.discount), Some(1.0));
    }

    #[test]
    fn test_lookup_unknown_code() {
        let table = table();
        assert!(table.lookup("SUMMER1").is_none());
        assert!(table.lookup("SUMMER100").is_none());
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn test_builtin_table() {
        let table = PromoTable::builtin();
        let promo = table.lookup("dm23102901test100bbpr").expect("builtin code");
        assert_eq!(promo.discount, 1.0);
        assert_eq!(promo.label, "100%");
    }

    #[test]
    fn test_discount_is_clamped() {
        assert_eq!(PromoCode::new("X", 1.5, "x").discount, 1.0);
        assert_eq!(PromoCode::new("X", -0.2, "x").discount, 0.0);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("SUMMER10", "SUMMER10"));
        assert!(!constant_time_compare("SUMMER10", "SUMMER11"));
        assert!(!constant_time_compare("SUMMER10", "SUMMER1"));
        assert!(!constant_time_compare("", "SUMMER10"));
    }

    #[test]
    fn test_discounted_total() {
        let total = Money::new(333.33, "CHF");
        let promo = AppliedPromo {
            code: "SUMMER10".to_string(),
            discount: 0.10,
            label: "10%".to_string(),
        };
        assert_eq!(discounted_total(&total, Some(&promo)), Money::new(300.0, "CHF"));
        assert_eq!(discounted_total(&total, None), Money::new(333.33, "CHF"));
    }

    #[test]
    fn test_full_discount_is_zero() {
        let promo = AppliedPromo::from(&PromoCode::new("FREE", 1.0, "100%"));
        assert_eq!(discounted_total(&Money::new(480.0, "EUR"), Some(&promo)).amount, 0.0);
    }

    proptest! {
        #[test]
        fn prop_discounted_total_matches_formula(
            cents in 0u64..10_000_000,
            discount in 0.0f64..=1.0,
        ) {
            let total = Money::new(cents as f64 / 100.0, "CHF");
            let promo = AppliedPromo::from(&PromoCode::new("P", discount, "p"));
            let result = discounted_total(&total, Some(&promo));

            prop_assert_eq!(result.amount, round2(total.amount * (1.0 - discount)));
            prop_assert!(result.amount <= total.amount);
            prop_assert_eq!(result.currency, "CHF");
        }
    }
}
