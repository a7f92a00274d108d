use crate::state::{BattleState, Side, Terrain, Weather};
use crate::AdvisorError;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Width of the feature row: Elo, two 73-column side blocks, terrain and
/// weather one-hots.
pub const FEATURE_COUNT: usize = 157;

/// A position scorer. Scores are win probabilities for my side in [0, 1]
/// over raw (unscaled) feature rows; implementations scale internally.
pub trait Evaluator {
    fn score(&self, features: &[f32]) -> Result<f64, AdvisorError>;

    /// Leaf states are scored in batches; the default loops `score`.
    fn score_batch(&self, rows: &[Vec<f32>]) -> Result<Vec<f64>, AdvisorError> {
        rows.iter().map(|row| self.score(row)).collect()
    }
}

/// Fitted min/max feature scaling, loaded alongside model weights.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureScaler {
    pub mins: Vec<f32>,
    pub maxs: Vec<f32>,
}

impl FeatureScaler {
    pub fn transform(&self, row: &[f32]) -> Result<Vec<f32>, AdvisorError> {
        if row.len() != self.mins.len() || row.len() != self.maxs.len() {
            return Err(AdvisorError::FeatureShape {
                got: row.len(),
                expected: self.mins.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.mins.iter().zip(self.maxs.iter()))
            .map(|(&x, (&lo, &hi))| {
                let range = hi - lo;
                if range.abs() < f32::EPSILON {
                    0.0
                } else {
                    (x - lo) / range
                }
            })
            .collect())
    }
}

/// Reference oracle: scaled logistic regression over the feature row.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f32>,
    pub bias: f32,
    #[serde(default)]
    pub scaler: Option<FeatureScaler>,
}

impl LogisticModel {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file {}", path.display()))?;
        let model: LogisticModel = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse model file {}", path.display()))?;
        Ok(model)
    }
}

impl Evaluator for LogisticModel {
    fn score(&self, features: &[f32]) -> Result<f64, AdvisorError> {
        let scaled;
        let row = match &self.scaler {
            Some(scaler) => {
                scaled = scaler.transform(features)?;
                &scaled[..]
            }
            None => features,
        };
        if row.len() != self.weights.len() {
            return Err(AdvisorError::FeatureShape {
                got: row.len(),
                expected: self.weights.len(),
            });
        }
        let z: f32 = self
            .weights
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.bias;
        let p = 1.0 / (1.0 + (-z as f64).exp());
        Ok(p.clamp(0.0, 1.0))
    }
}

/// The feature row for one state, in alphabetical column order.
pub fn feature_row(state: &BattleState) -> Vec<f32> {
    feature_map(state).into_values().collect()
}

/// Column names in row order, for diagnostics and tests.
pub fn feature_columns(state: &BattleState) -> Vec<String> {
    feature_map(state).into_keys().collect()
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Capitalizes a lowercase game id into its dummy-encoded column suffix.
fn column_suffix(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

// Column names mirror the fitted model's training frame exactly, down to
// the space in the terrain suffixes.
fn feature_map(state: &BattleState) -> BTreeMap<String, f32> {
    let mut map = BTreeMap::new();
    map.insert("Elo".to_string(), state.elo);
    side_features(&mut map, "P1", state, Side::Mine);
    side_features(&mut map, "P2", state, Side::Foe);
    let active_terrain = match state.terrain.kind {
        Some(Terrain::Electric) => "Electric Terrain",
        Some(Terrain::Grassy) => "Grassy Terrain",
        Some(Terrain::Misty) => "Misty Terrain",
        Some(Terrain::Psychic) => "Psychic Terrain",
        None => "None",
    };
    for terrain in [
        "Electric Terrain",
        "Grassy Terrain",
        "Misty Terrain",
        "None",
        "Psychic Terrain",
    ] {
        map.insert(format!("Terrain_{terrain}"), flag(terrain == active_terrain));
    }
    let active_weather = match state.weather.kind {
        Some(Weather::Hail) => "Hail",
        Some(Weather::Rain) => "Rain",
        Some(Weather::Sandstorm) => "Sandstorm",
        Some(Weather::Sun) => "Sun",
        None => "None",
    };
    for weather in ["Hail", "None", "Rain", "Sandstorm", "Sun"] {
        map.insert(format!("Weather_{weather}"), flag(weather == active_weather));
    }
    map
}

fn side_features(map: &mut BTreeMap<String, f32>, prefix: &str, state: &BattleState, side: Side) {
    use crate::model::Volatile;

    let lead = state.lead(side);
    let field = state.field(side);

    map.insert(format!("{prefix}AtkBoosts"), lead.boosts.atk as f32);
    map.insert(format!("{prefix}DefBoosts"), lead.boosts.def as f32);
    map.insert(format!("{prefix}SpaBoosts"), lead.boosts.spa as f32);
    map.insert(format!("{prefix}SpdBoosts"), lead.boosts.spd as f32);
    map.insert(format!("{prefix}SpeBoosts"), lead.boosts.spe as f32);
    map.insert(
        format!("{prefix}DynamaxAvailable"),
        flag(state.dynamax_available(side)),
    );
    map.insert(
        format!("{prefix}HasDamageEntryHazards"),
        flag(field.hazards.damaging()),
    );
    map.insert(
        format!("{prefix}HasStickyWeb"),
        flag(field.hazards.sticky_web),
    );
    map.insert(
        format!("{prefix}HasToxicSpikes"),
        flag(field.hazards.toxic_spikes),
    );
    map.insert(
        format!("{prefix}LeadConfused"),
        flag(lead.has_volatile(Volatile::Confusion)),
    );
    map.insert(format!("{prefix}LeadDynamaxed"), flag(lead.is_dynamaxed));
    map.insert(
        format!("{prefix}LeadEncore"),
        flag(lead.has_volatile(Volatile::Encore)),
    );
    map.insert(format!("{prefix}LeadHP"), lead.hp);
    map.insert(
        format!("{prefix}LeadLeechSeed"),
        flag(lead.has_volatile(Volatile::LeechSeed)),
    );
    map.insert(
        format!("{prefix}LeadTaunted"),
        flag(lead.has_volatile(Volatile::Taunt)),
    );
    let abbrev = lead.status.map(|s| s.abbreviation());
    for suffix in ["BRN", "FALSE", "FRZ", "PAR", "PSN", "SLP", "TOX"] {
        let hot = match abbrev {
            Some(a) => a == suffix,
            None => suffix == "FALSE",
        };
        map.insert(format!("{prefix}LeadStatus_{suffix}"), flag(hot));
    }
    let type1 = lead.types.first().copied();
    for t in crate::types::Type::ALL {
        map.insert(
            format!("{prefix}LeadType1_{}", column_suffix(t.as_str())),
            flag(type1 == Some(t)),
        );
    }
    let type2 = lead.types.get(1).map(|t| t.as_str()).unwrap_or("none");
    for name in crate::types::Type::ALL
        .iter()
        .map(|t| t.as_str())
        .chain(std::iter::once("none"))
    {
        map.insert(
            format!("{prefix}LeadType2_{}", column_suffix(name)),
            flag(type2 == name),
        );
    }
    map.insert(format!("{prefix}PokemonRemaining"), state.remaining(side) as f32);
    map.insert(format!("{prefix}PokemonRevealed"), state.revealed(side) as f32);

    // Reserves in team order, skipping the lead; unrevealed opposing slots
    // default to a healthy unknown.
    let mut slot = 0usize;
    for (idx, mon) in state.team(side).iter().enumerate() {
        if idx == state.lead_index(side) || slot >= 5 {
            continue;
        }
        slot += 1;
        map.insert(format!("{prefix}R{slot}HP"), mon.hp);
        map.insert(format!("{prefix}R{slot}Revealed"), flag(mon.is_revealed));
    }
    while slot < 5 {
        slot += 1;
        map.insert(format!("{prefix}R{slot}HP"), 100.0);
        map.insert(format!("{prefix}R{slot}Revealed"), 0.0);
    }
    map.insert(
        format!("{prefix}ScreenUp"),
        flag(field.reflect.is_up || field.light_screen.is_up || field.aurora_veil.is_up),
    );
    map.insert(format!("{prefix}TeamStatuses"), state.statused(side) as f32);
}
