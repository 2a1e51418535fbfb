//! Trait Weights
//!
//! Personality tags nudge the configured base weights additively, then the
//! result is floored at zero and renormalized.

use serde::Serialize;

use crate::config::BaseWeights;

/// Five normalized weights summing to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraitWeights {
    pub threat: f64,
    pub loyalty: f64,
    pub relationship: f64,
    pub pledge: f64,
    pub strategic: f64,
}

impl TraitWeights {
    pub fn sum(&self) -> f64 {
        self.threat + self.loyalty + self.relationship + self.pledge + self.strategic
    }

    fn equal() -> Self {
        Self {
            threat: 0.2,
            loyalty: 0.2,
            relationship: 0.2,
            pledge: 0.2,
            strategic: 0.2,
        }
    }

    fn apply(&mut self, modifier: &WeightModifier) {
        self.threat += modifier.threat;
        self.loyalty += modifier.loyalty;
        self.relationship += modifier.relationship;
        self.pledge += modifier.pledge;
        self.strategic += modifier.strategic;
    }

    fn normalized(self) -> Self {
        let floored = Self {
            threat: self.threat.max(0.0),
            loyalty: self.loyalty.max(0.0),
            relationship: self.relationship.max(0.0),
            pledge: self.pledge.max(0.0),
            strategic: self.strategic.max(0.0),
        };
        let total = floored.sum();
        if total <= f64::EPSILON {
            return Self::equal();
        }
        Self {
            threat: floored.threat / total,
            loyalty: floored.loyalty / total,
            relationship: floored.relationship / total,
            pledge: floored.pledge / total,
            strategic: floored.strategic / total,
        }
    }
}

impl From<&BaseWeights> for TraitWeights {
    fn from(base: &BaseWeights) -> Self {
        Self {
            threat: base.threat,
            loyalty: base.loyalty,
            relationship: base.relationship,
            pledge: base.pledge,
            strategic: base.strategic,
        }
    }
}

/// Additive nudge a single trait tag applies
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightModifier {
    pub threat: f64,
    pub loyalty: f64,
    pub relationship: f64,
    pub pledge: f64,
    pub strategic: f64,
}

/// Modifier for a known trait tag, matched case-insensitively
pub fn trait_modifier(tag: &str) -> Option<WeightModifier> {
    let m = WeightModifier::default();
    let modifier = match tag.trim().to_ascii_lowercase().as_str() {
        "strategic" => WeightModifier { threat: 0.15, relationship: -0.10, strategic: 0.10, ..m },
        "loyal" => WeightModifier { loyalty: 0.20, pledge: 0.15, threat: -0.10, ..m },
        "social" => WeightModifier { relationship: 0.15, loyalty: 0.05, ..m },
        "competitive" => WeightModifier { threat: 0.20, relationship: -0.05, ..m },
        "sneaky" => WeightModifier { loyalty: -0.10, pledge: -0.10, strategic: 0.10, ..m },
        "manipulative" => WeightModifier { strategic: 0.15, pledge: -0.10, ..m },
        "emotional" => WeightModifier { relationship: 0.20, strategic: -0.10, ..m },
        "confrontational" => WeightModifier { threat: 0.10, pledge: -0.05, ..m },
        "floater" => WeightModifier { relationship: 0.10, threat: -0.10, ..m },
        "analytical" => WeightModifier { strategic: 0.10, threat: 0.05, ..m },
        _ => return None,
    };
    Some(modifier)
}

/// Weights for an agent with the given tags. Unknown tags are ignored.
pub fn trait_weights<S: AsRef<str>>(tags: &[S], base: &BaseWeights) -> TraitWeights {
    let mut weights = TraitWeights::from(base);
    for tag in tags {
        if let Some(modifier) = trait_modifier(tag.as_ref()) {
            weights.apply(&modifier);
        }
    }
    weights.normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_no_traits_keeps_base_proportions() {
        let weights = trait_weights::<&str>(&[], &BaseWeights::default());
        assert!(close(weights.relationship, 0.30));
        assert!(close(weights.sum(), 1.0));
    }

    #[test]
    fn test_loyal_shifts_toward_loyalty() {
        let weights = trait_weights(&["Loyal"], &BaseWeights::default());
        // 0.40 / 1.25
        assert!(close(weights.loyalty, 0.32));
        assert!(close(weights.threat, 0.12));
        assert!(close(weights.sum(), 1.0));
    }

    #[test]
    fn test_tags_are_case_insensitive_and_unknown_ignored() {
        let base = BaseWeights::default();
        assert_eq!(
            trait_weights(&["sTrAtEgIc", "Telepathic"], &base),
            trait_weights(&["Strategic"], &base)
        );
    }

    #[test]
    fn test_negative_weights_floor_at_zero() {
        let base = BaseWeights {
            threat: 0.05,
            loyalty: 0.05,
            relationship: 0.5,
            pledge: 0.05,
            strategic: 0.35,
        };
        let weights = trait_weights(&["Sneaky", "Manipulative"], &base);
        assert_eq!(weights.loyalty, 0.0);
        assert_eq!(weights.pledge, 0.0);
        assert!(close(weights.sum(), 1.0));
    }

    #[test]
    fn test_all_zero_falls_back_to_equal() {
        let base = BaseWeights {
            threat: 0.0,
            loyalty: 0.0,
            relationship: 0.0,
            pledge: 0.0,
            strategic: 0.0,
        };
        let weights = trait_weights(&["Floater"], &base);
        // floater adds relationship only, threat floors at zero
        assert!(close(weights.relationship, 1.0));

        let weights = trait_weights::<&str>(&[], &base);
        assert!(close(weights.threat, 0.2));
    }
}
