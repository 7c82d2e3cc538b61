use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// A commune with WGS84 coordinates. Identity is the name, which must be
/// unique within a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The communes covered by the departmental board, with their coordinates.
const DEUX_SEVRES: &[(&str, f64, f64)] = &[
    ("Niort", 46.3239, -0.4615),
    ("Bressuire", 46.8641, -0.4958),
    ("Parthenay", 46.6472, -0.2564),
    ("Thouars", 47.0153, -0.2128),
    ("Mauléon", 46.9028, -0.6625),
    ("Saint-Maixent-l'École", 46.4167, -0.1667),
    ("Airvault", 46.8556, -0.2025),
    ("Chef-Boutonne", 46.2833, -0.3167),
    ("Prahecq", 46.2833, -0.4333),
    ("La Crèche", 46.3833, -0.3500),
    ("Mauzé-sur-le-Mignon", 46.2167, -0.6167),
    ("Coulon", 46.3167, -0.6833),
    ("Chauray", 46.3667, -0.4167),
    ("Bessines", 46.3167, -0.3833),
    ("Saint-Symphorien", 46.4667, -0.3167),
    ("Echiré", 46.3500, -0.4000),
    ("Saint-Gelais", 46.4000, -0.3667),
    ("Fors", 46.2833, -0.4500),
    ("Frontenay-Rohan-Rohan", 46.2667, -0.4167),
    ("Saint-Georges-de-Rex", 46.2500, -0.5500),
];

/// Immutable list of known locations. Built once at startup, never mutated.
#[derive(Debug, Clone)]
pub struct LocationCatalog {
    locations: Vec<Location>,
}

impl LocationCatalog {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// The fixed departmental catalog.
    pub fn deux_sevres() -> Self {
        Self::new(
            DEUX_SEVRES
                .iter()
                .map(|&(name, latitude, longitude)| Location {
                    name: name.to_string(),
                    latitude,
                    longitude,
                })
                .collect(),
        )
    }

    /// Locations in catalog order, which is also the assembly order.
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.iter().any(|l| l.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Forecast models exposed to the user, each mapping to one provider-side
/// model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastModel {
    Arome,
    Arpege,
    IconEu,
    Gfs,
}

impl ForecastModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastModel::Arome => "arome",
            ForecastModel::Arpege => "arpege",
            ForecastModel::IconEu => "icon_eu",
            ForecastModel::Gfs => "gfs",
        }
    }

    /// Identifier the provider expects in the `models` query parameter.
    pub fn model_id(&self) -> &'static str {
        match self {
            ForecastModel::Arome => "arome_france",
            ForecastModel::Arpege => "arpege_europe",
            ForecastModel::IconEu => "icon_eu",
            ForecastModel::Gfs => "gfs_global",
        }
    }

    pub const fn all() -> &'static [ForecastModel] {
        &[
            ForecastModel::Arome,
            ForecastModel::Arpege,
            ForecastModel::IconEu,
            ForecastModel::Gfs,
        ]
    }
}

impl std::fmt::Display for ForecastModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ForecastModel {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "arome" => Ok(ForecastModel::Arome),
            "arpege" => Ok(ForecastModel::Arpege),
            "icon_eu" => Ok(ForecastModel::IconEu),
            "gfs" => Ok(ForecastModel::Gfs),
            _ => Err(anyhow::anyhow!(
                "Unknown model '{value}'. Supported models: arome, arpege, icon_eu, gfs."
            )),
        }
    }
}
