//! Precaution rules: (condition, scaled AQI range) → advice text.

use serde::{Deserialize, Serialize};

use crate::profile::Condition;

/// A single row of the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecautionRule {
    pub condition: Condition,

    /// Inclusive lower bound on the scaled AQI
    pub min_aqi: f64,

    /// Inclusive upper bound on the scaled AQI
    pub max_aqi: f64,

    pub precaution: String,
}

impl PrecautionRule {
    pub fn new(
        condition: impl Into<Condition>,
        min_aqi: f64,
        max_aqi: f64,
        precaution: impl Into<String>,
    ) -> Self {
        Self {
            condition: condition.into(),
            min_aqi,
            max_aqi,
            precaution: precaution.into(),
        }
    }

    /// Whether this rule applies to `condition` at `scaled_aqi`.
    ///
    /// Conditions compare as exact strings. Unrecognized conditions never
    /// match, even against a rule carrying the same unrecognized string.
    pub fn matches(&self, condition: &Condition, scaled_aqi: i64) -> bool {
        let v = scaled_aqi as f64;
        condition.is_recognized()
            && self.condition == *condition
            && self.min_aqi <= v
            && v <= self.max_aqi
    }
}

/// An ordered rule table. Order is significant: overlapping ranges resolve
/// to the earliest matching row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    pub rules: Vec<PrecautionRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<PrecautionRule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule in table order matching `condition` at `scaled_aqi`,
    /// together with its index.
    pub fn first_match(&self, condition: &Condition, scaled_aqi: i64) -> Option<(usize, &PrecautionRule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, r)| r.matches(condition, scaled_aqi))
    }

    /// The built-in table written by `onboard`. Covers every known
    /// condition across the scaled range 0–250.
    pub fn builtin() -> Self {
        let bands: [(f64, f64); 3] = [(0.0, 100.0), (101.0, 150.0), (151.0, 250.0)];
        let advice: [(Condition, [&str; 3]); 8] = [
            (Condition::None, [
                "Air quality is acceptable. Enjoy outdoor activities.",
                "Consider shortening long or intense outdoor activities.",
                "Limit prolonged outdoor exertion and keep windows closed.",
            ]),
            (Condition::General, [
                "Air quality is acceptable. Enjoy outdoor activities.",
                "Sensitive individuals should reduce prolonged outdoor exertion.",
                "Reduce outdoor activity and consider wearing an N95 mask outside.",
            ]),
            (Condition::Asthma, [
                "Keep your reliever inhaler with you during outdoor activities.",
                "Limit outdoor exertion and keep your inhaler close at hand.",
                "Avoid outdoor exertion, stay indoors with windows closed, and follow your asthma action plan.",
            ]),
            (Condition::Heart, [
                "Normal activity is fine; watch for unusual fatigue.",
                "Avoid strenuous outdoor activity and take frequent breaks.",
                "Stay indoors, avoid exertion, and seek care for chest pain or palpitations.",
            ]),
            (Condition::Pregnant, [
                "Outdoor activity is fine; stay hydrated.",
                "Limit time outdoors near traffic and take rest breaks.",
                "Stay indoors where possible and use air purification if available.",
            ]),
            (Condition::Children, [
                "Outdoor play is fine.",
                "Shorten outdoor play and watch for coughing or wheezing.",
                "Keep children indoors and reschedule outdoor sports.",
            ]),
            (Condition::Senior, [
                "Light outdoor activity is fine.",
                "Reduce prolonged outdoor exertion.",
                "Stay indoors and keep any prescribed medication at hand.",
            ]),
            (Condition::Copd, [
                "Keep rescue medication with you outdoors.",
                "Limit outdoor exposure and pace your activity.",
                "Stay indoors, use prescribed oxygen or inhalers as directed, and contact your doctor if breathing worsens.",
            ]),
        ];

        let rules = advice
            .into_iter()
            .flat_map(|(condition, texts)| {
                bands
                    .iter()
                    .zip(texts)
                    .map(move |(&(lo, hi), text)| PrecautionRule::new(condition.clone(), lo, hi, text))
            })
            .collect();
        Self { rules }
    }
}
