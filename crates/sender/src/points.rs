//! Leitura do arquivo de pontos (TOML).
//!
//! ```toml
//! [[points]]
//! lat = 37.7749
//! lng = -122.4194
//! radius = 5
//! color = "#ff0000"
//!
//! [[points]]
//! zipcode = 501
//! delay = 100
//! visible_time = 2000
//! ```

use mapapi_core::{Color, Point};
use serde::Deserialize;
use std::path::Path;

/// Erros do arquivo de pontos.
#[derive(Debug, thiserror::Error)]
pub enum PointsError {
    #[error("Erro ao ler {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Erro ao parsear pontos: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Ponto {index}: informe lat e lng juntos, ou apenas zipcode")]
    AmbiguousLocation { index: usize },

    #[error("Ponto {index}: localização ausente")]
    MissingLocation { index: usize },

    #[error("Ponto {index}: cor inválida {value:?} (esperado #rrggbb)")]
    InvalidColor { index: usize, value: String },
}

/// Uma entrada `[[points]]` como aparece no arquivo.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PointEntry {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub zipcode: Option<u32>,
    pub radius: u32,
    pub color: Option<String>,
    pub color2: Option<String>,
    pub delay: u32,
    pub visible_time: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PointsFile {
    points: Vec<PointEntry>,
}

fn parse_color(index: usize, value: Option<&str>) -> Result<Option<Color>, PointsError> {
    value
        .map(|v| {
            Color::parse_hex(v).ok_or_else(|| PointsError::InvalidColor {
                index,
                value: v.to_string(),
            })
        })
        .transpose()
}

impl PointEntry {
    fn into_point(self, index: usize) -> Result<Point, PointsError> {
        let mut point = match (self.lat, self.lng, self.zipcode) {
            (Some(lat), Some(lng), None) => Point::coord(lat, lng),
            (None, None, Some(code)) => Point::zipcode(code),
            (None, None, None) => return Err(PointsError::MissingLocation { index }),
            _ => return Err(PointsError::AmbiguousLocation { index }),
        };

        point.radius = self.radius;
        point.color = parse_color(index, self.color.as_deref())?;
        point.color2 = parse_color(index, self.color2.as_deref())?;
        point.delay = self.delay;
        point.visible_time = self.visible_time;
        Ok(point)
    }
}

/// Converte o conteúdo TOML em pontos, na ordem do arquivo.
pub fn parse_points(content: &str) -> Result<Vec<Point>, PointsError> {
    let file: PointsFile = toml::from_str(content)?;
    file.points
        .into_iter()
        .enumerate()
        .map(|(i, entry)| entry.into_point(i))
        .collect()
}

pub fn load_points(path: &Path) -> Result<Vec<Point>, PointsError> {
    let content = std::fs::read_to_string(path).map_err(|source| PointsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_points(&content)
}
