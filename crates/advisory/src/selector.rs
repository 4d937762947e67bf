//! Precaution selection: condition + scaled AQI → advice text.

use airadvisor_core::advisory::PrecautionOrigin;
use airadvisor_core::error::RuleError;
use airadvisor_core::profile::Condition;
use airadvisor_core::rule::RuleTable;

/// Returned when no rule applies or no AQI is available.
pub const DEFAULT_PRECAUTION: &str = "General guidance.";

/// The selected text and how it was chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct Precaution {
    pub text: String,
    pub origin: PrecautionOrigin,
}

/// Select the precaution for `condition` at `scaled_aqi`.
///
/// Scans `rules` in table order and takes the first row whose condition
/// equals `condition` and whose inclusive range contains `scaled_aqi`.
/// Overlapping rows are never compared for a "better" fit.
///
/// A rule-resource error wins over everything else and yields a diagnostic
/// text embedding the error. A missing AQI, an unrecognized condition, or
/// no matching row all yield [`DEFAULT_PRECAUTION`].
pub fn select_precaution(
    condition: &Condition,
    scaled_aqi: Option<i64>,
    rules: Result<&RuleTable, &RuleError>,
) -> Precaution {
    let table = match rules {
        Ok(table) => table,
        Err(e) => {
            return Precaution {
                text: format!("(rules error: {e})"),
                origin: PrecautionOrigin::RuleError {
                    detail: e.to_string(),
                },
            };
        }
    };

    let matched = scaled_aqi.and_then(|v| table.first_match(condition, v));
    match matched {
        Some((index, rule)) => Precaution {
            text: rule.precaution.clone(),
            origin: PrecautionOrigin::Rule { index },
        },
        None => Precaution {
            text: DEFAULT_PRECAUTION.to_string(),
            origin: PrecautionOrigin::Default,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airadvisor_core::rule::PrecautionRule;
    use std::path::PathBuf;

    fn table() -> RuleTable {
        RuleTable::new(vec![
            PrecautionRule::new("asthma", 0.0, 100.0, "Carry inhaler"),
            PrecautionRule::new("asthma", 150.0, 250.0, "Avoid outdoor exertion"),
            PrecautionRule::new("asthma", 200.0, 300.0, "Stay indoors"),
            PrecautionRule::new("heart", 100.0, 200.0, "Take it easy"),
        ])
    }

    #[test]
    fn selects_matching_rule() {
        let t = table();
        let p = select_precaution(&Condition::Asthma, Some(200), Ok(&t));
        assert_eq!(p.text, "Avoid outdoor exertion");
        assert_eq!(p.origin, PrecautionOrigin::Rule { index: 1 });
    }

    #[test]
    fn earliest_rule_wins_over_later_overlap() {
        let t = table();
        // 250 is in both [150, 250] and [200, 300]
        let p = select_precaution(&Condition::Asthma, Some(250), Ok(&t));
        assert_eq!(p.text, "Avoid outdoor exertion");
        // 260 is only in [200, 300]
        let p = select_precaution(&Condition::Asthma, Some(260), Ok(&t));
        assert_eq!(p.text, "Stay indoors");
    }

    #[test]
    fn gap_between_ranges_falls_back_to_default() {
        let t = table();
        let p = select_precaution(&Condition::Asthma, Some(125), Ok(&t));
        assert_eq!(p.text, DEFAULT_PRECAUTION);
        assert_eq!(p.origin, PrecautionOrigin::Default);
    }

    #[test]
    fn missing_aqi_is_default() {
        let t = table();
        let p = select_precaution(&Condition::Asthma, None, Ok(&t));
        assert_eq!(p.text, "General guidance.");
    }

    #[test]
    fn condition_without_rules_is_default() {
        let t = table();
        let p = select_precaution(&Condition::Copd, Some(150), Ok(&t));
        assert_eq!(p.origin, PrecautionOrigin::Default);
    }

    #[test]
    fn unrecognized_condition_is_default() {
        let t = table();
        let p = select_precaution(&Condition::from("asthmatic"), Some(200), Ok(&t));
        assert_eq!(p.origin, PrecautionOrigin::Default);
    }

    #[test]
    fn condition_comparison_is_exact() {
        let t = RuleTable::new(vec![PrecautionRule::new("Asthma", 0.0, 300.0, "Carry inhaler")]);
        let p = select_precaution(&Condition::from("asthma"), Some(200), Ok(&t));
        assert_eq!(p.text, DEFAULT_PRECAUTION);
        assert_eq!(p.origin, PrecautionOrigin::Default);
    }

    #[test]
    fn rule_error_is_embedded() {
        let err = RuleError::Read {
            path: PathBuf::from("rules.json"),
            reason: "No such file or directory".into(),
        };
        let p = select_precaution(&Condition::Asthma, Some(200), Err(&err));
        assert!(p.text.starts_with("(rules error:"));
        assert!(p.text.contains("No such file"));
        assert!(matches!(p.origin, PrecautionOrigin::RuleError { .. }));
    }

    #[test]
    fn agrees_with_linear_scan_for_every_value() {
        let t = table();
        for condition in [Condition::Asthma, Condition::Heart, Condition::Senior] {
            for v in -10..=320 {
                let expected = t
                    .rules
                    .iter()
                    .find(|r| r.condition == condition && r.min_aqi <= v as f64 && v as f64 <= r.max_aqi)
                    .map(|r| r.precaution.as_str())
                    .unwrap_or(DEFAULT_PRECAUTION);
                let got = select_precaution(&condition, Some(v), Ok(&t));
                assert_eq!(got.text, expected, "{condition} at {v}");
            }
        }
    }
}
