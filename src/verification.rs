//! Verification gate for new requests.
//!
//! A request is held for a district POC when its resource name looks
//! financial or its quantity is unreasonably large for the category.
//! Everything else goes live immediately and is offered to the reverse
//! allocator.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::VerificationConfig;
use crate::store::{StoreResult, UserQuery, UserStore};
use crate::types::{AssignedPoc, UserKind};

/// Why a request was held
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldReason {
    /// Resource name contains this keyword
    SensitiveResource(String),
    /// Quantity is above the category threshold
    ExceedsThreshold(Decimal),
}

/// Outcome of running a request through the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Active,
    Hold(HoldReason),
}

impl GateDecision {
    #[inline]
    pub fn is_held(&self) -> bool {
        matches!(self, GateDecision::Hold(_))
    }
}

/// Keyword and threshold rules.
///
/// # Example
///
/// ```
/// use relief_hub::verification::{VerificationGate, GateDecision};
/// use rust_decimal::Decimal;
///
/// let gate = VerificationGate::default();
/// assert_eq!(gate.classify("food-nutrition", "Rice", Decimal::from(50)), GateDecision::Active);
/// assert!(gate.classify("other", "Emergency Fund", Decimal::ONE).is_held());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationGate {
    keywords: Vec<String>,
    thresholds: BTreeMap<String, Decimal>,
    default_threshold: Decimal,
}

impl Default for VerificationGate {
    fn default() -> Self {
        Self::from_config(&VerificationConfig::default())
    }
}

impl VerificationGate {
    pub fn from_config(config: &VerificationConfig) -> Self {
        Self {
            keywords: config
                .sensitive_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            thresholds: config
                .thresholds
                .iter()
                .map(|(category, limit)| (category.clone(), Decimal::from(*limit)))
                .collect(),
            default_threshold: Decimal::from(config.default_threshold),
        }
    }

    /// Quantity above which a request in `category` is held
    pub fn threshold(&self, category: &str) -> Decimal {
        self.thresholds
            .get(category)
            .copied()
            .unwrap_or(self.default_threshold)
    }

    /// First sensitive keyword found in the lowercased resource name
    pub fn sensitive_keyword(&self, specific_resource: &str) -> Option<&str> {
        let lowered = specific_resource.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn classify(
        &self,
        category: &str,
        specific_resource: &str,
        quantity: Decimal,
    ) -> GateDecision {
        if let Some(keyword) = self.sensitive_keyword(specific_resource) {
            return GateDecision::Hold(HoldReason::SensitiveResource(keyword.to_string()));
        }
        let threshold = self.threshold(category);
        if quantity > threshold {
            return GateDecision::Hold(HoldReason::ExceedsThreshold(threshold));
        }
        GateDecision::Active
    }
}

/// Find the POC registered for `district` (case-insensitive, first registered wins)
pub fn assign_poc<S: UserStore + ?Sized>(
    store: &S,
    district: &str,
) -> StoreResult<Option<AssignedPoc>> {
    let query = UserQuery {
        kind: Some(UserKind::Poc),
        district: Some(district.to_string()),
    };
    Ok(store
        .find_users(&query)?
        .into_iter()
        .next()
        .map(|poc| AssignedPoc {
            id: poc.id,
            name: poc.name,
            email: poc.email,
        }))
}
