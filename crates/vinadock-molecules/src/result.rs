//! The docking summary persisted to the datastore.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const DOCKING_METHOD: &str = "VINA";
pub const SUCCESS_MESSAGE: &str = "VINA docking completed successfully";

/// Field order here is the key order of the stored JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockingResult {
    pub docking_method: String,
    /// Modes actually reported, after clamping to what the engine produced.
    pub num_modes: usize,
    pub scores: ScoreTable,
    /// Complexes the engine produced, which may exceed `num_modes`.
    pub complexes_count: usize,
    pub message: String,
}

impl DockingResult {
    /// Summary reporting one mode per entry of `affinities`.
    pub fn new(affinities: &[f64], complexes_count: usize) -> Self {
        let scores = ScoreTable::from_affinities(affinities);
        Self {
            docking_method: DOCKING_METHOD.to_string(),
            num_modes: scores.len(),
            scores,
            complexes_count,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeScore {
    #[serde(rename = "affinity (kcal/mol)")]
    pub affinity_kcal_per_mol: f64,
}

/// Scores keyed `"mode 1"`, `"mode 2"`, ... in mode order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable(Vec<ModeScore>);

impl ScoreTable {
    pub fn from_affinities(affinities: &[f64]) -> Self {
        Self(
            affinities
                .iter()
                .map(|&affinity_kcal_per_mol| ModeScore { affinity_kcal_per_mol })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Score of a 1-based mode.
    pub fn get(&self, mode: usize) -> Option<&ModeScore> {
        mode.checked_sub(1).and_then(|i| self.0.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, &ModeScore)> {
        self.0.iter().enumerate().map(|(i, s)| (mode_key(i + 1), s))
    }
}

pub fn mode_key(mode: usize) -> String {
    format!("mode {}", mode)
}

impl Serialize for ScoreTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, score) in self.iter() {
            map.serialize_entry(&key, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ScoreTableVisitor)
    }
}

struct ScoreTableVisitor;

impl<'de> Visitor<'de> for ScoreTableVisitor {
    type Value = ScoreTable;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map keyed \"mode 1\" .. \"mode N\"")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ScoreTable, A::Error> {
        let mut entries: Vec<(usize, ModeScore)> = Vec::new();
        while let Some((key, score)) = access.next_entry::<String, ModeScore>()? {
            let mode = key
                .strip_prefix("mode ")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| de::Error::custom(format!("invalid mode key '{}'", key)))?;
            entries.push((mode, score));
        }

        entries.sort_by_key(|(mode, _)| *mode);
        for (expected, (mode, _)) in (1..).zip(&entries) {
            if *mode != expected {
                return Err(de::Error::custom(format!(
                    "mode keys must run 1..{} without gaps, found 'mode {}'",
                    entries.len(),
                    mode
                )));
            }
        }
        Ok(ScoreTable(entries.into_iter().map(|(_, s)| s).collect()))
    }
}
