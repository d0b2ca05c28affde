#![forbid(unsafe_code)]

//! Static content payload for the geothermal guide.
//!
//! The guide's text lives in `data/guide.json`, embedded at compile time and
//! parsed once at startup. The payload is the single source of the section
//! list: [`Guide::registry`] derives the [`SectionRegistry`] shared by the
//! scroll tracker and the navigation panel, and [`Guide::disclosures`]
//! derives one [`DisclosureCell`] per interactive item.
//!
//! The core never interprets the text; it only iterates it.
//!
//! # Example
//!
//! ```
//! let guide = geoguide_content::Guide::load().unwrap();
//! let registry = guide.registry().unwrap();
//! assert_eq!(registry.first().unwrap().id.as_str(), "introduction");
//! ```

use std::fmt;

use geoguide_core::disclosure::{
    Affordance, DisclosureCell, DisclosureError, DisclosureKey, DisclosureMode, DisclosureSet,
};
use geoguide_core::map::{City, CityMap};
use geoguide_core::section::{RegistryError, SectionRegistry};
use serde::Deserialize;

/// The embedded payload.
pub const GUIDE_JSON: &str = include_str!("../data/guide.json");

/// Errors raised while loading or validating the payload.
#[derive(Debug)]
pub enum ContentError {
    /// The JSON did not match the expected shape.
    Parse(serde_json::Error),
    /// The section list is not a valid registry.
    Registry(RegistryError),
    /// Two interactive items share a key.
    Disclosure(DisclosureError),
    /// A cross-reference names a section that does not exist.
    UnknownSection {
        /// Which field holds the reference.
        field: &'static str,
        /// The missing id.
        id: String,
    },
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "content payload is malformed: {e}"),
            Self::Registry(e) => write!(f, "invalid section list: {e}"),
            Self::Disclosure(e) => write!(f, "invalid content item: {e}"),
            Self::UnknownSection { field, id } => {
                write!(f, "{field} refers to unknown section {id:?}")
            }
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Registry(e) => Some(e),
            Self::Disclosure(e) => Some(e),
            Self::UnknownSection { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<RegistryError> for ContentError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<DisclosureError> for ContentError {
    fn from(e: DisclosureError) -> Self {
        Self::Disclosure(e)
    }
}

/// Landing block above the first section.
#[derive(Debug, Clone, Deserialize)]
pub struct Hero {
    pub title: String,
    pub subtitle: String,
    pub tagline: String,
    pub call_to_action: String,
    /// Section the call to action scrolls to.
    pub target: String,
}

/// How the items of a group respond to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// Click toggles each item.
    Click,
    /// Hovering reveals each item.
    Hover,
    /// Always fully shown.
    Static,
}

impl GroupMode {
    /// Disclosure mode of the group's items, `None` for static groups.
    #[must_use]
    pub fn disclosure_mode(self) -> Option<DisclosureMode> {
        match self {
            Self::Click => Some(DisclosureMode::Click),
            Self::Hover => Some(DisclosureMode::Hover),
            Self::Static => None,
        }
    }
}

/// Expand/collapse labels as written in the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AffordanceLabels {
    pub expand: String,
    #[serde(default)]
    pub collapse: String,
}

/// One opaque content record.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    /// Unique within its group.
    pub id: String,
    pub title: String,
    /// Always-visible summary line.
    #[serde(default)]
    pub description: Option<String>,
    /// Short tag shown next to the title.
    #[serde(default)]
    pub badge: Option<String>,
    /// Paragraph revealed with the detail region.
    #[serde(default)]
    pub note: Option<String>,
    /// Bullet list revealed with the detail region.
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    /// Caption of the illustration.
    #[serde(default)]
    pub image: Option<String>,
    /// Color token.
    #[serde(default)]
    pub color: Option<String>,
}

impl ContentItem {
    /// Whether the item has anything to put in a detail region.
    #[must_use]
    pub fn has_detail(&self) -> bool {
        self.note.is_some()
            || !self.details.is_empty()
            || !self.pros.is_empty()
            || !self.cons.is_empty()
    }
}

/// A run of items sharing one interaction mode.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemGroup {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub mode: GroupMode,
    #[serde(default)]
    pub affordance: Option<AffordanceLabels>,
    pub items: Vec<ContentItem>,
}

impl ItemGroup {
    /// Affordance for this group's cells, falling back to the defaults.
    #[must_use]
    pub fn cell_affordance(&self) -> Affordance {
        match &self.affordance {
            Some(labels) => Affordance {
                expand: labels.expand.clone(),
                collapse: labels.collapse.clone(),
            },
            None => Affordance::default(),
        }
    }
}

/// One numbered section of the guide.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionContent {
    /// Anchor name.
    pub id: String,
    pub number: String,
    /// Table-of-contents label.
    pub label: String,
    pub heading: String,
    #[serde(default)]
    pub lead: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub groups: Vec<ItemGroup>,
    #[serde(default)]
    pub closing: Vec<String>,
}

/// A city as written in the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub country: String,
    /// `[longitude, latitude]`.
    pub coordinates: [f64; 2],
    pub capacity: String,
    pub population: String,
    pub details: String,
    pub year_established: String,
    pub growth: String,
    pub co2_saved: String,
    pub color: String,
}

impl From<&CityRecord> for City {
    fn from(record: &CityRecord) -> Self {
        let [lon, lat] = record.coordinates;
        City {
            name: record.name.clone(),
            country: record.country.clone(),
            lon,
            lat,
            capacity: record.capacity.clone(),
            population: record.population.clone(),
            details: record.details.clone(),
            year_established: record.year_established.clone(),
            growth: record.growth.clone(),
            co2_saved: record.co2_saved.clone(),
            color: record.color.clone(),
        }
    }
}

/// The map block and the section hosting it.
#[derive(Debug, Clone, Deserialize)]
pub struct MapContent {
    /// Id of the section the map renders in.
    pub section: String,
    pub hint: String,
    pub footer: String,
    pub cities: Vec<CityRecord>,
}

/// The whole payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Guide {
    pub hero: Hero,
    pub sections: Vec<SectionContent>,
    pub map: MapContent,
}

/// Key of the cell for `item` in `group` of `section`.
#[must_use]
pub fn disclosure_key(section: &str, group: &str, item: &str) -> DisclosureKey {
    DisclosureKey::new(section, format!("{group}.{item}"))
}

impl Guide {
    /// Parse and validate the embedded payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ContentError`] if the payload is malformed.
    pub fn load() -> Result<Self, ContentError> {
        Self::from_json(GUIDE_JSON)
    }

    /// Parse and validate a payload.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Parse`] for malformed JSON and the other
    /// variants when the section list or cross-references are invalid.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let guide: Guide = serde_json::from_str(json)?;
        guide.validate()?;
        Ok(guide)
    }

    fn validate(&self) -> Result<(), ContentError> {
        let registry = self.registry()?;
        if registry.get(&self.hero.target).is_none() {
            return Err(ContentError::UnknownSection {
                field: "hero.target",
                id: self.hero.target.clone(),
            });
        }
        if registry.get(&self.map.section).is_none() {
            return Err(ContentError::UnknownSection {
                field: "map.section",
                id: self.map.section.clone(),
            });
        }
        self.disclosures()?;
        Ok(())
    }

    /// The section registry, in payload order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] for duplicate or blank ids.
    pub fn registry(&self) -> Result<SectionRegistry, RegistryError> {
        SectionRegistry::new(
            self.sections
                .iter()
                .map(|s| (s.id.as_str(), s.number.clone(), s.label.clone())),
        )
    }

    /// One collapsed cell per item of every click or hover group.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Disclosure`] if two items share a key.
    pub fn disclosures(&self) -> Result<DisclosureSet, ContentError> {
        let mut set = DisclosureSet::new();
        for section in &self.sections {
            for group in &section.groups {
                let Some(mode) = group.mode.disclosure_mode() else {
                    continue;
                };
                let affordance = group.cell_affordance();
                for item in &group.items {
                    let key = disclosure_key(&section.id, &group.id, &item.id);
                    set.insert(
                        DisclosureCell::new(key, mode).with_affordance(affordance.clone()),
                    )?;
                }
            }
        }
        Ok(set)
    }

    /// Look up a section.
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&SectionContent> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Map state over the payload's cities.
    #[must_use]
    pub fn city_map(&self) -> CityMap {
        CityMap::new(self.map.cities.iter().map(City::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "hero": { "title": "T", "subtitle": "S", "tagline": "L", "call_to_action": "Go", "target": "a" },
        "sections": [
            { "id": "a", "number": "1", "label": "A", "heading": "A",
              "groups": [ { "id": "g", "mode": "click", "items": [ { "id": "x", "title": "X" } ] } ] },
            { "id": "m", "number": "—", "label": "Map", "heading": "Map" }
        ],
        "map": { "section": "m", "hint": "h", "footer": "f", "cities": [] }
    }"#;

    #[test]
    fn minimal_payload_parses() {
        let guide = Guide::from_json(MINIMAL).unwrap();
        assert_eq!(guide.registry().unwrap().len(), 2);
        let cells = guide.disclosures().unwrap();
        let cell = cells.get(&disclosure_key("a", "g", "x")).unwrap();
        assert_eq!(cell.mode(), DisclosureMode::Click);
        assert_eq!(cell.affordance_label(), "Click for details");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Guide::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)));
        assert!(err.to_string().starts_with("content payload is malformed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn duplicate_section_ids_rejected() {
        let json = MINIMAL.replace(r#""id": "m""#, r#""id": "a""#);
        let err = Guide::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            ContentError::Registry(RegistryError::DuplicateId(ref id)) if id == "a"
        ));
    }

    #[test]
    fn dangling_hero_target_rejected() {
        let json = MINIMAL.replace(r#""target": "a""#, r#""target": "zzz""#);
        let err = Guide::from_json(&json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "hero.target refers to unknown section \"zzz\""
        );
    }

    #[test]
    fn duplicate_items_in_a_group_rejected() {
        let json = MINIMAL.replace(
            r#"[ { "id": "x", "title": "X" } ]"#,
            r#"[ { "id": "x", "title": "X" }, { "id": "x", "title": "Y" } ]"#,
        );
        let err = Guide::from_json(&json).unwrap_err();
        assert!(matches!(err, ContentError::Disclosure(_)));
    }

    #[test]
    fn static_groups_have_no_cells() {
        let json = MINIMAL.replace(r#""mode": "click""#, r#""mode": "static""#);
        let guide = Guide::from_json(&json).unwrap();
        assert!(guide.disclosures().unwrap().is_empty());
    }

    #[test]
    fn city_record_converts() {
        let record = CityRecord {
            name: "Boise".into(),
            country: "USA".into(),
            coordinates: [-116.2023, 43.615],
            capacity: "25 MW thermal".into(),
            population: "60,000 residents".into(),
            details: String::new(),
            year_established: "1892".into(),
            growth: "+3% annually".into(),
            co2_saved: "35K tons/year".into(),
            color: "indigo".into(),
        };
        let city = City::from(&record);
        assert_eq!(city.lon, -116.2023);
        assert_eq!(city.lat, 43.615);
        assert_eq!(city.year_established, "1892");
    }
}
