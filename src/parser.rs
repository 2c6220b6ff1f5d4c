//! Parsing of the model's `key: value` answer into a [`PlantIdentification`].
//!
//! The model is asked for one field per line but routinely wraps the answer
//! in conversational filler or markdown bullets. Unknown lines are skipped,
//! keys match case-insensitively and a repeated key overwrites the earlier
//! value.

use crate::models::PlantIdentification;
use crate::{Error, Result};

/// Field keys of the response schema, in prompt order.
pub const FIELDS: [&str; 8] = [
    "common_name",
    "scientific_name",
    "poisonous",
    "blooming_period",
    "native_region",
    "symbolism",
    "gift_to",
    "story",
];

const COMMON_NAME: usize = 0;
const SCIENTIFIC_NAME: usize = 1;
const POISONOUS: usize = 2;
const BLOOMING_PERIOD: usize = 3;
const NATIVE_REGION: usize = 4;
const SYMBOLISM: usize = 5;
const GIFT_TO: usize = 6;
const STORY: usize = 7;

const REFUSAL_PHRASES: [&str; 4] = [
    "unable to identify",
    "cannot identify",
    "can't identify",
    "could not identify",
];

/// Parse a raw model answer.
///
/// Returns [`Error::NotIdentifiable`] when the answer has no usable
/// `common_name:` line or contains a refusal phrase.
pub fn parse(raw: &str) -> Result<PlantIdentification> {
    let lowered = raw.to_lowercase();
    if let Some(phrase) = REFUSAL_PHRASES.iter().find(|p| lowered.contains(*p)) {
        return Err(Error::NotIdentifiable(format!(
            "model reported \"{}\"",
            phrase
        )));
    }

    let mut values: [Option<String>; 8] = Default::default();
    for line in raw.lines() {
        if let Some((index, value)) = match_field(line) {
            values[index] = Some(value.to_string());
        }
    }

    let common_name = match values[COMMON_NAME].take() {
        Some(name) if !name.is_empty() => name,
        Some(_) => {
            return Err(Error::NotIdentifiable(
                "common_name line was empty".to_string(),
            ))
        }
        None => {
            return Err(Error::NotIdentifiable(
                "response has no common_name line".to_string(),
            ))
        }
    };

    let mut take = |index: usize| values[index].take().filter(|v| !v.is_empty());

    Ok(PlantIdentification {
        common_name,
        scientific_name: take(SCIENTIFIC_NAME),
        poisonous: take(POISONOUS),
        blooming_period: take(BLOOMING_PERIOD),
        native_region: take(NATIVE_REGION),
        symbolism: take(SYMBOLISM),
        gift_to: take(GIFT_TO),
        story: take(STORY).filter(|story| !story.eq_ignore_ascii_case("none")),
    })
}

/// Match a single line against the field set, returning the field index and
/// its trimmed value.
fn match_field(line: &str) -> Option<(usize, &str)> {
    let line = strip_bullet(line.trim());
    FIELDS.iter().enumerate().find_map(|(index, field)| {
        let head = line.get(..field.len())?;
        if !head.eq_ignore_ascii_case(field) {
            return None;
        }
        let value = line[field.len()..].strip_prefix(':')?;
        Some((index, value.trim()))
    })
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim_start)
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_minimal_answer() {
        let plant = parse("common_name: Rose\nscientific_name: Rosa\npoisonous: NO\n").unwrap();

        assert_eq!(plant.common_name, "Rose");
        assert_eq!(plant.scientific_name.as_deref(), Some("Rosa"));
        assert_eq!(plant.poisonous.as_deref(), Some("NO"));
        assert_eq!(plant.story, None);
    }

    #[test]
    fn test_full_answer_with_filler() {
        let raw = "Sure! Here is what I found:\n\
                   Common_Name: Monstera\n\
                   scientific_name:   Monstera deliciosa  \n\
                   POISONOUS: Yes\n\
                   blooming_period: Summer\n\
                   native_region: Southern Mexico, Panama\n\
                   symbolism: Longevity, honor\n\
                   gift_to: New homeowners\n\
                   story: Its split leaves let tropical storms pass through.\n\
                   Hope this helps!";

        let plant = parse(raw).unwrap();
        assert_eq!(
            plant,
            PlantIdentification {
                common_name: "Monstera".to_string(),
                scientific_name: Some("Monstera deliciosa".to_string()),
                poisonous: Some("Yes".to_string()),
                blooming_period: Some("Summer".to_string()),
                native_region: Some("Southern Mexico, Panama".to_string()),
                symbolism: Some("Longevity, honor".to_string()),
                gift_to: Some("New homeowners".to_string()),
                story: Some("Its split leaves let tropical storms pass through.".to_string()),
            }
        );
    }

    #[test]
    fn test_refusal_is_not_identifiable() {
        let err = parse("I cannot identify this object.").unwrap_err();
        assert!(matches!(err, Error::NotIdentifiable(_)));
    }

    #[test]
    fn test_refusal_wins_over_common_name() {
        let err = parse("common_name: Unknown\nI am unable to identify this plant.").unwrap_err();
        assert!(matches!(err, Error::NotIdentifiable(_)));
    }

    #[test]
    fn test_missing_common_name() {
        let err = parse("scientific_name: Rosa\npoisonous: NO").unwrap_err();
        assert!(matches!(err, Error::NotIdentifiable(_)));
    }

    #[test]
    fn test_empty_common_name() {
        let err = parse("common_name:   \nscientific_name: Rosa").unwrap_err();
        assert!(matches!(err, Error::NotIdentifiable(_)));
    }

    #[test]
    fn test_duplicate_lines_last_wins() {
        let plant = parse("common_name: Rose\ncommon_name: Tulip").unwrap();
        assert_eq!(plant.common_name, "Tulip");
    }

    #[test]
    fn test_story_none_sentinel() {
        for sentinel in ["none", "NONE", "None"] {
            let plant = parse(&format!("common_name: Oak\nstory: {}", sentinel)).unwrap();
            assert_eq!(plant.story, None);
        }
    }

    #[test]
    fn test_empty_optional_value_is_absent() {
        let plant = parse("common_name: Oak\nsymbolism:\ngift_to:  ").unwrap();
        assert_eq!(plant.symbolism, None);
        assert_eq!(plant.gift_to, None);
    }

    #[test]
    fn test_markdown_bullets() {
        let plant = parse("- common_name: Lavender\n*  scientific_name: Lavandula").unwrap();
        assert_eq!(plant.common_name, "Lavender");
        assert_eq!(plant.scientific_name.as_deref(), Some("Lavandula"));
    }

    #[test]
    fn test_legacy_two_field_answer() {
        let plant = parse("common_name: Fern\nscientific_name: Polypodiopsida").unwrap();
        assert_eq!(plant.common_name, "Fern");
        assert_eq!(plant.poisonous, None);
        assert_eq!(plant.story, None);
    }

    #[test]
    fn test_key_without_colon_is_ignored() {
        let err = parse("common_name Rose").unwrap_err();
        assert!(matches!(err, Error::NotIdentifiable(_)));
    }

    #[test]
    fn test_multibyte_lines_do_not_panic() {
        let plant = parse("ćömmon_ñame: x\ncommon_name: Ñandú grass").unwrap();
        assert_eq!(plant.common_name, "Ñandú grass");
    }

    fn value() -> impl Strategy<Value = String> {
        "[A-Za-z]([A-Za-z ,.]{0,30}[A-Za-z.])?"
    }

    prop_compose! {
        fn identification()(
            common_name in value(),
            scientific_name in proptest::option::of(value()),
            poisonous in proptest::option::of(value()),
            blooming_period in proptest::option::of(value()),
            native_region in proptest::option::of(value()),
            symbolism in proptest::option::of(value()),
            gift_to in proptest::option::of(value()),
            story in proptest::option::of(value()),
        ) -> PlantIdentification {
            PlantIdentification {
                common_name,
                scientific_name,
                poisonous,
                blooming_period,
                native_region,
                symbolism,
                gift_to,
                story,
            }
        }
    }

    proptest! {
        #[test]
        fn formatted_records_parse_back(plant in identification()) {
            let text = plant.to_response_text();
            let lowered = text.to_lowercase();
            prop_assume!(!REFUSAL_PHRASES.iter().any(|p| lowered.contains(p)));
            prop_assume!(!plant
                .story
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("none")));

            prop_assert_eq!(parse(&text).unwrap(), plant);
        }

        #[test]
        fn text_without_common_name_is_never_a_success(text in "[a-z_: \n]{0,120}") {
            prop_assume!(!text.to_lowercase().contains("common_name"));
            prop_assert!(matches!(parse(&text), Err(Error::NotIdentifiable(_))));
        }

        #[test]
        fn none_story_is_always_absent(
            name in value(),
            sentinel in "[nN][oO][nN][eE]",
        ) {
            let lowered = name.to_lowercase();
            prop_assume!(!REFUSAL_PHRASES.iter().any(|p| lowered.contains(p)));

            let plant = parse(&format!("common_name: {}\nstory: {}", name, sentinel)).unwrap();
            prop_assert_eq!(plant.common_name, name);
            prop_assert_eq!(plant.story, None);
        }
    }
}
