//! Prompt composition.
//!
//! The instruction block is addressed to the model, not the user. Its
//! wording can change, but it must keep asking for: a safe / moderate /
//! hazardous verdict per pollutant, the link between pollutants and the
//! user's condition, practical advice, and plain conversational language.

use airadvisor_core::air_quality::{AirQualityOutcome, AirQualityReading};
use airadvisor_core::profile::HealthProfile;
use std::fmt;

/// Marker used in the prompt when no reading could be obtained.
pub const AQI_UNAVAILABLE: &str = "AQI data: unavailable";

const ROLE: &str = "You are an Air Quality Health Assistant.";

const INSTRUCTIONS: &str = "\
Instructions:
1. List each pollutant from the AQI data with its value and state whether the level is safe, moderate, or hazardous.
2. Highlight which pollutants are most relevant to the user's health condition and explain how they affect it.
3. Give practical advice based on the current levels and the user's condition.
4. Respond conversationally in plain, easy-to-understand language.
If the AQI data is unavailable, say so plainly and give general advice for the user's condition.

Provide the output in a structured way like this:
- Pollutant: Value μg/m³ — Status (Safe/Moderate/Hazardous)
- Impact on you: [how it affects the user's condition]
- Advice: [practical guidance based on current levels]";

/// Assemble the full prompt. Equal inputs produce identical output.
pub fn compose(
    profile: &HealthProfile,
    city: &str,
    air_quality: &AirQualityOutcome,
    precaution: &str,
    question: &str,
) -> String {
    Prompt {
        profile,
        city,
        air_quality,
        precaution,
        question,
    }
    .to_string()
}

struct Prompt<'a> {
    profile: &'a HealthProfile,
    city: &'a str,
    air_quality: &'a AirQualityOutcome,
    precaution: &'a str,
    question: &'a str,
}

impl fmt::Display for Prompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{ROLE}\n")?;

        writeln!(f, "User Details:")?;
        writeln!(f, "- Name: {}", self.profile.name)?;
        writeln!(f, "- Age Group: {}", self.profile.age_group)?;
        writeln!(f, "- Health Condition: {}\n", self.profile.condition)?;

        writeln!(f, "Location & Air Quality:")?;
        writeln!(f, "- City: {}", self.city)?;
        match self.air_quality {
            AirQualityOutcome::Live { reading, .. } => write_reading(f, reading)?,
            AirQualityOutcome::FallbackCoordinates { coordinates, reading, reason } => {
                write_reading(f, reading)?;
                writeln!(
                    f,
                    "- Note: readings are for default coordinates ({:.4}, {:.4}), not the named city ({reason})",
                    coordinates.lat, coordinates.lon
                )?;
            }
            AirQualityOutcome::Unavailable(err) => writeln!(f, "- {AQI_UNAVAILABLE} ({err})")?,
        }
        writeln!(f)?;

        writeln!(f, "Precautions to Follow: {}\n", self.precaution)?;
        writeln!(f, "User Question: {}\n", self.question)?;
        writeln!(f, "{INSTRUCTIONS}")
    }
}

fn write_reading(f: &mut fmt::Formatter<'_>, reading: &AirQualityReading) -> fmt::Result {
    writeln!(
        f,
        "- AQI: {} on a 1-5 scale (scaled {})",
        reading.aqi_index,
        reading.scaled_aqi()
    )?;
    if reading.pollutants.is_empty() {
        return writeln!(f, "- Pollutants: none reported");
    }
    writeln!(f, "- Pollutants:")?;
    for (name, value) in &reading.pollutants {
        writeln!(f, "  - {name}: {value} μg/m³")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airadvisor_core::air_quality::Coordinates;
    use airadvisor_core::error::AirQualityError;
    use std::collections::BTreeMap;

    fn profile() -> HealthProfile {
        HealthProfile::new("alice", "asthma", "adult")
    }

    fn live() -> AirQualityOutcome {
        AirQualityOutcome::Live {
            coordinates: Coordinates::new(13.08, 80.27),
            reading: AirQualityReading {
                pollutants: BTreeMap::from([
                    ("pm2_5".to_string(), 57.3),
                    ("co".to_string(), 647.57),
                ]),
                aqi_index: 4,
            },
        }
    }

    #[test]
    fn contains_every_section() {
        let p = compose(&profile(), "Chennai", &live(), "Avoid outdoor exertion", "Can I jog today?");
        assert!(p.starts_with("You are an Air Quality Health Assistant."));
        assert!(p.contains("- Name: alice"));
        assert!(p.contains("- Age Group: adult"));
        assert!(p.contains("- Health Condition: asthma"));
        assert!(p.contains("- City: Chennai"));
        assert!(p.contains("scaled 200"));
        assert!(p.contains("Precautions to Follow: Avoid outdoor exertion"));
        assert!(p.contains("User Question: Can I jog today?"));
    }

    #[test]
    fn pollutants_are_listed_in_sorted_order() {
        let p = compose(&profile(), "Chennai", &live(), "x", "q");
        let co = p.find("  - co: 647.57 μg/m³").unwrap();
        let pm = p.find("  - pm2_5: 57.3").unwrap();
        assert!(co < pm);
    }

    #[test]
    fn instruction_block_keeps_all_four_directives() {
        let p = compose(&profile(), "Chennai", &live(), "x", "q");
        assert!(p.contains("safe, moderate, or hazardous"));
        assert!(p.contains("relevant to the user's health condition"));
        assert!(p.contains("practical advice"));
        assert!(p.contains("plain, easy-to-understand language"));
    }

    #[test]
    fn unavailable_reading_is_marked() {
        let outcome = AirQualityOutcome::Unavailable(AirQualityError::CityNotFound("Nowhereville".into()));
        let p = compose(&profile(), "Nowhereville", &outcome, "General guidance.", "q");
        assert!(p.contains("AQI data: unavailable (City 'Nowhereville' not found)"));
        assert!(!p.contains("Pollutants"));
    }

    #[test]
    fn fallback_reading_is_noted() {
        let AirQualityOutcome::Live { reading, .. } = live() else { unreachable!() };
        let outcome = AirQualityOutcome::FallbackCoordinates {
            coordinates: Coordinates::new(13.0827, 80.2707),
            reading,
            reason: "city 'Atlantis' not found by local geocoder".into(),
        };
        let p = compose(&profile(), "Atlantis", &outcome, "x", "q");
        assert!(p.contains("default coordinates (13.0827, 80.2707)"));
        assert!(p.contains("Atlantis"));
    }

    #[test]
    fn empty_reading_still_closes_with_instructions() {
        let outcome = AirQualityOutcome::Live {
            coordinates: Coordinates::new(13.08, 80.27),
            reading: AirQualityReading {
                pollutants: BTreeMap::new(),
                aqi_index: 2,
            },
        };
        let p = compose(&profile(), "Chennai", &outcome, "x", "q");
        assert!(p.contains("- AQI: 2 on a 1-5 scale (scaled 100)\n- Pollutants: none reported\n\nPrecautions"));
        assert!(p.ends_with("[practical guidance based on current levels]\n"));
    }

    #[test]
    fn question_is_verbatim() {
        let question = "Is it OK to run 5km?\nI have my inhaler — {braces} too.";
        let p = compose(&profile(), "Chennai", &live(), "x", question);
        assert!(p.contains(question));
    }

    #[test]
    fn output_is_deterministic() {
        let a = compose(&profile(), "Chennai", &live(), "x", "q");
        let b = compose(&profile(), "Chennai", &live(), "x", "q");
        assert_eq!(a, b);
    }
}
