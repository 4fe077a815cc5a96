pub mod loader;

use crate::consts::{DEFAULT_SKILL_WEIGHT, MAX_MAX_SCORE, MIN_MAX_SCORE, STANDARD_CATALOG_CSV};
use crate::error::{ScResult, ScoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Cursor;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Skill grouping. `Unknown` collects ids that fall outside every configured range.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    #[strum(to_string = "Nervousness")]
    Nervousness,
    #[strum(to_string = "Voice")]
    Voice,
    #[strum(
        to_string = "Body Language",
        serialize = "body_language",
        serialize = "BodyLanguage"
    )]
    #[serde(rename = "Body Language", alias = "body_language", alias = "bodyLanguage")]
    BodyLanguage,
    #[strum(to_string = "Expressions")]
    Expressions,
    #[strum(to_string = "Language")]
    Language,
    #[strum(
        to_string = "Ultimate Level",
        serialize = "ultimate_level",
        serialize = "UltimateLevel"
    )]
    #[serde(rename = "Ultimate Level", alias = "ultimate_level", alias = "ultimateLevel")]
    UltimateLevel,
    #[strum(to_string = "Unknown")]
    Unknown,
}

impl Category {
    /// The six scored categories in display order.
    pub const FIXED: [Category; 6] = [
        Category::Nervousness,
        Category::Voice,
        Category::BodyLanguage,
        Category::Expressions,
        Category::Language,
        Category::UltimateLevel,
    ];

    pub fn is_known(self) -> bool {
        self != Category::Unknown
    }

    /// Lenient lookup used for legacy blobs keyed by free-form category names.
    pub fn from_label(label: &str) -> Option<Category> {
        label
            .trim()
            .parse::<Category>()
            .ok()
            .filter(|category| category.is_known())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Good,
    Bad,
}

impl Polarity {
    /// Legal score interval for a skill of this polarity.
    pub fn bounds(self, max_score: f64) -> (f64, f64) {
        match self {
            Polarity::Good => (0.0, max_score),
            Polarity::Bad => (-max_score, 0.0),
        }
    }
}

fn default_weight() -> f64 {
    DEFAULT_SKILL_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDefinition {
    pub id: u32,
    pub name: String,
    pub category: Category,
    pub is_good_skill: bool,
    pub max_score: u8,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl SkillDefinition {
    pub fn polarity(&self) -> Polarity {
        if self.is_good_skill {
            Polarity::Good
        } else {
            Polarity::Bad
        }
    }

    /// Weighted ceiling of this skill, always taken from the positive max score.
    pub fn max_points(&self) -> f64 {
        f64::from(self.max_score) * self.weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRange {
    pub category: Category,
    pub first_id: u32,
    pub last_id: u32,
}

impl CategoryRange {
    fn contains(&self, id: u32) -> bool {
        (self.first_id..=self.last_id).contains(&id)
    }
}

/// Id partition of the catalog. Configuration, not baked into the scoring logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRanges(Vec<CategoryRange>);

impl Default for CategoryRanges {
    fn default() -> Self {
        let bounds = [(1, 6), (7, 32), (33, 75), (76, 84), (85, 102), (103, 110)];
        Self(
            Category::FIXED
                .iter()
                .zip(bounds)
                .map(|(&category, (first_id, last_id))| CategoryRange {
                    category,
                    first_id,
                    last_id,
                })
                .collect(),
        )
    }
}

impl CategoryRanges {
    pub fn new(ranges: Vec<CategoryRange>) -> ScResult<Self> {
        let ranges = Self(ranges);
        ranges.validate()?;
        Ok(ranges)
    }

    pub fn category_for(&self, id: u32) -> Category {
        self.0
            .iter()
            .find(|range| range.contains(id))
            .map(|range| range.category)
            .unwrap_or(Category::Unknown)
    }

    pub fn ranges(&self) -> &[CategoryRange] {
        &self.0
    }

    pub fn validate(&self) -> ScResult<()> {
        for (i, range) in self.0.iter().enumerate() {
            if !range.category.is_known() {
                return Err(ScoreError::Config(
                    "the Unknown category cannot own an id range".to_string(),
                ));
            }
            if range.first_id > range.last_id {
                return Err(ScoreError::Config(format!(
                    "range for {} is inverted ({} > {})",
                    range.category, range.first_id, range.last_id
                )));
            }
            for other in &self.0[i + 1..] {
                if range.first_id <= other.last_id && other.first_id <= range.last_id {
                    return Err(ScoreError::Config(format!(
                        "ranges for {} and {} overlap",
                        range.category, other.category
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Immutable registry of skill definitions keyed by id.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    skills: BTreeMap<u32, SkillDefinition>,
    ranges: CategoryRanges,
}

impl SkillCatalog {
    pub fn new(definitions: Vec<SkillDefinition>, ranges: CategoryRanges) -> ScResult<Self> {
        ranges.validate()?;

        let mut skills = BTreeMap::new();
        for definition in definitions {
            validate_definition(&definition, &ranges)?;
            let id = definition.id;
            if skills.insert(id, definition).is_some() {
                return Err(ScoreError::Validation(format!("duplicate skill id {}", id)));
            }
        }

        Ok(Self { skills, ranges })
    }

    /// The 110-skill catalog embedded in the crate, partitioned by `ranges`.
    pub fn standard(ranges: CategoryRanges) -> ScResult<Self> {
        let definitions = loader::load_catalog_csv(Cursor::new(STANDARD_CATALOG_CSV), &ranges)?;
        Self::new(definitions, ranges)
    }

    pub fn get(&self, id: u32) -> Option<&SkillDefinition> {
        self.skills.get(&id)
    }

    pub fn require(&self, id: u32) -> ScResult<&SkillDefinition> {
        self.get(id)
            .ok_or(ScoreError::UnknownSkillId { skill_id: id })
    }

    pub fn ranges(&self) -> &CategoryRanges {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values()
    }

    pub fn skills_in(&self, category: Category) -> impl Iterator<Item = &SkillDefinition> {
        self.skills
            .values()
            .filter(move |definition| definition.category == category)
    }

    /// A category is shown inverted when every catalog skill in it is a bad skill.
    pub fn is_inverted(&self, category: Category) -> bool {
        let mut skills = self.skills_in(category).peekable();
        skills.peek().is_some() && skills.all(|definition| !definition.is_good_skill)
    }

    /// Weighted ceiling of the whole catalog, i.e. every skill scored.
    pub fn max_potential_points(&self) -> f64 {
        self.skills.values().map(SkillDefinition::max_points).sum()
    }
}

fn validate_definition(definition: &SkillDefinition, ranges: &CategoryRanges) -> ScResult<()> {
    if !(MIN_MAX_SCORE..=MAX_MAX_SCORE).contains(&definition.max_score) {
        return Err(ScoreError::Validation(format!(
            "skill {} has max score {} (expected {}..={})",
            definition.id, definition.max_score, MIN_MAX_SCORE, MAX_MAX_SCORE
        )));
    }
    if !definition.weight.is_finite() || !(0.0..=1.0).contains(&definition.weight) {
        return Err(ScoreError::Validation(format!(
            "skill {} has weight {} (expected 0..=1)",
            definition.id, definition.weight
        )));
    }
    let ranged = ranges.category_for(definition.id);
    if ranged != definition.category {
        return Err(ScoreError::Validation(format!(
            "skill {} is declared as {} but its id belongs to {}",
            definition.id, definition.category, ranged
        )));
    }
    Ok(())
}
