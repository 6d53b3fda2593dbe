//! Protocolo de comunicação JSON com a API do mapa.
//!
//! Formato do corpo enviado:
//!
//! ```text
//! {"mapId":"<id>","key":"<chave>","points":[<p0>,<p1>,...]}
//! ```
//!
//! Cada ponto é um objeto com as chaves, nesta ordem e apenas quando
//! presentes: `lat`,`lng` ou `zipcode`, `r`, `c`, `c2`, `delay`,
//! `visible_time`.
//!
//! - `lat`/`lng` com 6 casas decimais fixas (`37.774900`)
//! - `zipcode` como string de 5 dígitos (`"00501"`)
//! - `c`/`c2` como `"#rrggbb"` minúsculo
//!
//! A resposta é aceita somente se o corpo for exatamente `true`.

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::types::{Location, Point};

/// Corpo de resposta que confirma o recebimento do lote.
pub const ACK_BODY: &[u8] = b"true";

/// Estimativa de bytes por ponto codificado, usada para pré-alocar o buffer.
const POINT_SIZE_HINT: usize = 96;

/// Tamanho fixo do envelope sem os pontos: `{"mapId":"","key":"","points":[]}`.
const ENVELOPE_OVERHEAD: usize = 33;

/// Erros do protocolo.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Coordenada não finita no ponto {index}: lat={lat} lng={lng}")]
    NonFiniteCoordinate { index: usize, lat: f64, lng: f64 },

    #[error("Erro de serialização: {0}")]
    Serialize(String),
}

// ──────────────────────────────────────────────
// Serialização de pontos
// ──────────────────────────────────────────────

/// Número com 6 casas decimais fixas, emitido como token JSON bruto.
fn fixed6(value: f64) -> Result<Box<RawValue>, serde_json::Error> {
    RawValue::from_string(format!("{value:.6}"))
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        match self.location {
            Location::Coord { lat, lng } => {
                map.serialize_entry("lat", &fixed6(lat).map_err(S::Error::custom)?)?;
                map.serialize_entry("lng", &fixed6(lng).map_err(S::Error::custom)?)?;
            }
            Location::Zipcode(code) => {
                map.serialize_entry("zipcode", &format!("{code:05}"))?;
            }
        }

        if self.radius != 0 {
            map.serialize_entry("r", &self.radius)?;
        }
        if let Some(c) = self.color {
            map.serialize_entry("c", &c.to_string())?;
        }
        if let Some(c2) = self.color2 {
            map.serialize_entry("c2", &c2.to_string())?;
        }
        if self.delay != 0 {
            map.serialize_entry("delay", &self.delay)?;
        }
        if self.visible_time != 0 {
            map.serialize_entry("visible_time", &self.visible_time)?;
        }

        map.end()
    }
}

/// Envelope do lote com as credenciais do mapa.
#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "mapId")]
    map_id: &'a str,
    key: &'a str,
    points: &'a [Point],
}

/// JSON não representa NaN/infinito; rejeita antes de serializar.
fn check_finite(index: usize, point: &Point) -> Result<(), ProtocolError> {
    match point.location {
        Location::Coord { lat, lng } if !lat.is_finite() || !lng.is_finite() => {
            Err(ProtocolError::NonFiniteCoordinate { index, lat, lng })
        }
        _ => Ok(()),
    }
}

fn to_json<T: Serialize>(value: &T, capacity: usize) -> Result<String, ProtocolError> {
    let mut buf = Vec::with_capacity(capacity);
    serde_json::to_writer(&mut buf, value).map_err(|e| ProtocolError::Serialize(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| ProtocolError::Serialize(e.to_string()))
}

/// Codifica um [`Point`] como objeto JSON.
pub fn encode_point(point: &Point) -> Result<String, ProtocolError> {
    check_finite(0, point)?;
    to_json(point, POINT_SIZE_HINT)
}

/// Monta o corpo da requisição: envelope com `mapId`, `key` e os pontos
/// na ordem recebida.
///
/// `map_id` e `map_key` passam pelo escape de string do JSON.
pub fn build_request_body(
    points: &[Point],
    map_id: &str,
    map_key: &str,
) -> Result<String, ProtocolError> {
    for (index, point) in points.iter().enumerate() {
        check_finite(index, point)?;
    }

    let envelope = Envelope {
        map_id,
        key: map_key,
        points,
    };
    let capacity =
        ENVELOPE_OVERHEAD + map_id.len() + map_key.len() + points.len() * POINT_SIZE_HINT;
    to_json(&envelope, capacity)
}

/// `true` se o corpo da resposta confirma o lote.
///
/// Comparação exata: `"True"`, `"true\n"` ou corpo vazio não confirmam.
pub fn is_acknowledged(body: &[u8]) -> bool {
    body == ACK_BODY
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
