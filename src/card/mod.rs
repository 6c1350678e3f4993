//! Dashboard card: a paginated view over a configured list of entities.
//!
//! The card owns only its slide index. Values are resolved from a
//! [`StateLookup`] every time a view is built, so the card always shows
//! the latest published state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::REGISTRY;
use crate::error::EngineError;
use crate::host::StateLookup;

/// Icon shown when neither the card nor the entity defines one.
pub const DEFAULT_ICON: &str = "mdi:solar-power";
/// Message rendered for a card without entities.
pub const EMPTY_STATE_MESSAGE: &str = "No entities configured. Add at least one entity to the card.";
/// Value text for a missing or unavailable entity.
pub const UNAVAILABLE_TEXT: &str = "unavailable";

/// One entry of the card's `entities` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardEntityConfig {
    /// Entity id to display.
    pub entity: String,
    /// Display name override.
    #[serde(default)]
    pub name: Option<String>,
    /// Icon override.
    #[serde(default)]
    pub icon: Option<String>,
    /// Show this attribute instead of the state.
    #[serde(default)]
    pub attribute: Option<String>,
    /// Unit override.
    #[serde(default)]
    pub unit: Option<String>,
    /// Static secondary text.
    #[serde(default)]
    pub secondary: Option<String>,
    /// Attribute rendered as secondary text.
    #[serde(default)]
    pub secondary_attribute: Option<String>,
}

impl CardEntityConfig {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            name: None,
            icon: None,
            attribute: None,
            unit: None,
            secondary: None,
            secondary_attribute: None,
        }
    }
}

/// Card configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardConfig {
    pub title: String,
    pub show_controls: bool,
    pub entities: Vec<CardEntityConfig>,
}

impl Default for CardConfig {
    /// Every registry entity in order; the range slide shows the message.
    fn default() -> Self {
        let entities = REGISTRY
            .iter()
            .enumerate()
            .map(|(i, metric)| {
                let mut entry = CardEntityConfig::new(metric.entity_id());
                if i == 0 {
                    entry.secondary_attribute = Some("message".to_string());
                }
                entry
            })
            .collect();
        Self {
            title: "Solar fun facts".to_string(),
            show_controls: true,
            entities,
        }
    }
}

impl CardConfig {
    /// Setup-time validation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] when `entities` is empty
    /// or an entry has a blank entity id.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.entities.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "card entities array is required and must not be empty".to_string(),
            ));
        }
        if let Some(pos) = self.entities.iter().position(|e| e.entity.trim().is_empty()) {
            return Err(EngineError::InvalidConfiguration(format!(
                "card entities[{pos}].entity must not be empty"
            )));
        }
        Ok(())
    }
}

/// Everything needed to draw the current slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub entity_id: String,
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
    pub icon: String,
    pub secondary: Option<String>,
    pub available: bool,
    /// Position of the slide.
    pub index: usize,
    /// Total number of slides, one dot each.
    pub count: usize,
}

/// What the card renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardView {
    /// No entities configured.
    Empty { title: String, message: String },
    /// The slide at the current index.
    Slide {
        title: String,
        show_controls: bool,
        slide: Slide,
    },
}

/// Card instance with its pagination state.
#[derive(Debug, Clone)]
pub struct Card {
    config: CardConfig,
    index: usize,
}

impl Card {
    /// Builds a card. Never fails: an empty list renders [`CardView::Empty`].
    pub fn new(config: CardConfig) -> Self {
        Self { config, index: 0 }
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.config.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.entities.is_empty()
    }

    /// Moves to the next slide, wrapping to the first.
    pub fn next(&mut self) {
        if !self.is_empty() {
            self.index = (self.index + 1) % self.len();
        }
    }

    /// Moves to the previous slide, wrapping to the last.
    pub fn previous(&mut self) {
        if !self.is_empty() {
            self.index = (self.index + self.len() - 1) % self.len();
        }
    }

    /// Jumps to `index`. Out-of-range indices are ignored.
    pub fn jump(&mut self, index: usize) -> bool {
        if index < self.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Resolves the current slide against the latest entity states.
    pub fn view(&self, states: &impl StateLookup) -> CardView {
        let Some(entry) = self.config.entities.get(self.index) else {
            return CardView::Empty {
                title: self.config.title.clone(),
                message: EMPTY_STATE_MESSAGE.to_string(),
            };
        };

        let record = states.entity(&entry.entity);
        let name = entry
            .name
            .clone()
            .or_else(|| record.and_then(|r| r.friendly_name.clone()))
            .unwrap_or_else(|| entry.entity.clone());
        let icon = entry
            .icon
            .clone()
            .or_else(|| record.and_then(|r| r.icon.clone()))
            .unwrap_or_else(|| DEFAULT_ICON.to_string());
        let unit = entry
            .unit
            .clone()
            .or_else(|| record.and_then(|r| r.unit_of_measurement.clone()));

        let (value, available) = match (record, entry.attribute.as_deref()) {
            (Some(r), Some(attr)) if r.state.is_available() => match r.attributes.get(attr) {
                Some(v) => (attribute_text(v), true),
                None => (UNAVAILABLE_TEXT.to_string(), false),
            },
            (Some(r), None) if r.state.is_available() => (r.state.to_string(), true),
            _ => (UNAVAILABLE_TEXT.to_string(), false),
        };

        let secondary = entry.secondary.clone().or_else(|| {
            let attr = entry.secondary_attribute.as_deref()?;
            record?.attributes.get(attr).map(attribute_text)
        });

        CardView::Slide {
            title: self.config.title.clone(),
            show_controls: self.config.show_controls,
            slide: Slide {
                entity_id: entry.entity.clone(),
                name,
                value,
                unit,
                icon,
                secondary,
                available,
                index: self.index,
                count: self.len(),
            },
        }
    }
}

/// Attribute values without JSON quoting for strings.
fn attribute_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::host::{EntityRecord, EntityState};

    fn three_entity_card() -> Card {
        Card::new(CardConfig {
            title: "Test".to_string(),
            show_controls: true,
            entities: vec![
                CardEntityConfig::new("sensor.a"),
                CardEntityConfig::new("sensor.b"),
                CardEntityConfig::new("sensor.c"),
            ],
        })
    }

    fn states() -> BTreeMap<String, EntityRecord> {
        let mut attributes = BTreeMap::new();
        attributes.insert("message".to_string(), json!("Drive 27.8 km"));
        attributes.insert("pv_energy_kwh".to_string(), json!(5.0));
        let range = EntityRecord::new("sensor.a", EntityState::Value(27.78))
            .with_unit("km")
            .with_name("Solar driving range")
            .with_icon("mdi:car-electric")
            .with_attributes(attributes);
        BTreeMap::from([
            ("sensor.a".to_string(), range),
            (
                "sensor.b".to_string(),
                EntityRecord::new("sensor.b", EntityState::Unavailable),
            ),
        ])
    }

    fn slide(view: CardView) -> Slide {
        match view {
            CardView::Slide { slide, .. } => slide,
            CardView::Empty { .. } => panic!("expected a slide"),
        }
    }

    #[test]
    fn previous_from_first_wraps_to_last() {
        let mut card = three_entity_card();
        card.previous();
        assert_eq!(card.index(), 2);
    }

    #[test]
    fn next_from_last_wraps_to_first() {
        let mut card = three_entity_card();
        assert!(card.jump(2));
        card.next();
        assert_eq!(card.index(), 0);
    }

    #[test]
    fn jump_out_of_range_is_ignored() {
        let mut card = three_entity_card();
        assert!(card.jump(1));
        assert!(!card.jump(3));
        assert_eq!(card.index(), 1);
    }

    #[test]
    fn empty_card_renders_empty_state() {
        let mut card = Card::new(CardConfig {
            entities: Vec::new(),
            ..CardConfig::default()
        });
        card.next();
        card.previous();
        assert_eq!(card.index(), 0);
        match card.view(&states()) {
            CardView::Empty { message, .. } => assert_eq!(message, EMPTY_STATE_MESSAGE),
            CardView::Slide { .. } => panic!("expected empty state"),
        }
    }

    #[test]
    fn empty_entities_fail_validation() {
        let config = CardConfig {
            entities: Vec::new(),
            ..CardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(CardConfig::default().validate().is_ok());
    }

    #[test]
    fn slide_falls_back_to_entity_metadata() {
        let card = three_entity_card();
        let s = slide(card.view(&states()));
        assert_eq!(s.name, "Solar driving range");
        assert_eq!(s.value, "27.78");
        assert_eq!(s.unit.as_deref(), Some("km"));
        assert_eq!(s.icon, "mdi:car-electric");
        assert!(s.available);
        assert_eq!((s.index, s.count), (0, 3));
    }

    #[test]
    fn overrides_and_attributes_win() {
        let mut entry = CardEntityConfig::new("sensor.a");
        entry.name = Some("Range".to_string());
        entry.icon = Some("mdi:road".to_string());
        entry.attribute = Some("pv_energy_kwh".to_string());
        entry.unit = Some("kWh".to_string());
        entry.secondary_attribute = Some("message".to_string());
        let card = Card::new(CardConfig {
            entities: vec![entry],
            ..CardConfig::default()
        });
        let s = slide(card.view(&states()));
        assert_eq!(s.name, "Range");
        assert_eq!(s.icon, "mdi:road");
        assert_eq!(s.value, "5.0");
        assert_eq!(s.unit.as_deref(), Some("kWh"));
        assert_eq!(s.secondary.as_deref(), Some("Drive 27.8 km"));
    }

    #[test]
    fn unavailable_and_missing_entities_say_so() {
        let mut card = three_entity_card();
        card.next();
        let s = slide(card.view(&states()));
        assert_eq!(s.value, UNAVAILABLE_TEXT);
        assert!(!s.available);

        card.next();
        let s = slide(card.view(&states()));
        assert_eq!(s.value, UNAVAILABLE_TEXT);
        assert_eq!(s.name, "sensor.c");
        assert_eq!(s.icon, DEFAULT_ICON);
    }

    #[test]
    fn attribute_of_unavailable_entity_is_unavailable() {
        let mut attributes = BTreeMap::new();
        attributes.insert("consumption_kwh_per_100km".to_string(), json!(18.0));
        let states = BTreeMap::from([(
            "sensor.a".to_string(),
            EntityRecord::new("sensor.a", EntityState::Unavailable).with_attributes(attributes),
        )]);
        let card = Card::new(CardConfig {
            title: "Test".to_string(),
            show_controls: true,
            entities: vec![CardEntityConfig {
                attribute: Some("consumption_kwh_per_100km".to_string()),
                ..CardEntityConfig::new("sensor.a")
            }],
        });
        let s = slide(card.view(&states));
        assert_eq!(s.value, UNAVAILABLE_TEXT);
        assert!(!s.available);
    }
}
