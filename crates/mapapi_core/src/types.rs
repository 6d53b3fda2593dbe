//! Definição dos tipos de ponto do mapa.
//!
//! Um [`Point`] é uma localização (coordenada ou CEP) com decorações
//! opcionais de raio, cor e tempo. Ausência é representada por zero
//! (`radius`, `delay`, `visible_time`) ou `None` (cores); campos ausentes
//! não aparecem no JSON enviado.

use std::fmt;
use std::str::FromStr;

/// Maior CEP representável (5 dígitos).
pub const MAX_ZIPCODE: u32 = 99_999;

/// Máscara de 24 bits para cores RGB.
const RGB_MASK: u32 = 0x00FF_FFFF;

/// Erros de validação de ponto.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PointError {
    #[error("CEP fora do intervalo: {0} (máximo {MAX_ZIPCODE})")]
    ZipcodeOutOfRange(u32),

    #[error("Latitude inválida: {0} (-90.0–90.0)")]
    InvalidLatitude(f64),

    #[error("Longitude inválida: {0} (-180.0–180.0)")]
    InvalidLongitude(f64),
}

// ──────────────────────────────────────────────
// Cor
// ──────────────────────────────────────────────

/// Cor RGB de 24 bits.
///
/// Bits acima de 24 são descartados na construção, então a forma
/// `#rrggbb` sempre tem exatamente 6 dígitos hexadecimais.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const fn new(value: u32) -> Self {
        Self(value & RGB_MASK)
    }

    /// Monta a cor a partir dos componentes `r`, `g`, `b`.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) + ((g as u32) << 8) + b as u32)
    }

    /// Interpreta `#rrggbb`. Qualquer outro formato retorna `None`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s).ok_or_else(|| format!("Cor inválida: {s:?} (esperado #rrggbb)"))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

// ──────────────────────────────────────────────
// Localização
// ──────────────────────────────────────────────

/// Localização de um ponto: coordenada ou CEP, nunca ambos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location {
    /// Graus decimais
    Coord { lat: f64, lng: f64 },
    /// CEP de 5 dígitos (zero à esquerda no JSON)
    Zipcode(u32),
}

// ──────────────────────────────────────────────
// Ponto
// ──────────────────────────────────────────────

/// Um ponto a ser desenhado no mapa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub location: Location,
    /// Raio (0 = ausente)
    pub radius: u32,
    /// Cor principal
    pub color: Option<Color>,
    /// Cor secundária (transição de estado)
    pub color2: Option<Color>,
    /// Atraso até o ponto aparecer, em ms (0 = ausente)
    pub delay: u32,
    /// Tempo visível após aparecer, em ms (0 = ausente)
    pub visible_time: u32,
}

impl Point {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            radius: 0,
            color: None,
            color2: None,
            delay: 0,
            visible_time: 0,
        }
    }

    pub fn coord(lat: f64, lng: f64) -> Self {
        Self::new(Location::Coord { lat, lng })
    }

    pub fn zipcode(code: u32) -> Self {
        Self::new(Location::Zipcode(code))
    }

    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_color2(mut self, color: Color) -> Self {
        self.color2 = Some(color);
        self
    }

    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay = delay_ms;
        self
    }

    pub fn with_visible_time(mut self, visible_ms: u32) -> Self {
        self.visible_time = visible_ms;
        self
    }

    /// Validação opcional. O encoder não a chama: pontos são codificados
    /// como recebidos.
    pub fn validate(&self) -> Result<(), PointError> {
        match self.location {
            Location::Zipcode(code) if code > MAX_ZIPCODE => {
                Err(PointError::ZipcodeOutOfRange(code))
            }
            Location::Coord { lat, .. } if !(-90.0..=90.0).contains(&lat) => {
                Err(PointError::InvalidLatitude(lat))
            }
            Location::Coord { lng, .. } if !(-180.0..=180.0).contains(&lng) => {
                Err(PointError::InvalidLongitude(lng))
            }
            _ => Ok(()),
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_packs_components() {
        assert_eq!(Color::rgb(0xFF, 0x00, 0x00).value(), 0xFF0000);
        assert_eq!(Color::rgb(0x12, 0x34, 0x56).value(), 0x123456);
    }

    #[test]
    fn color_is_masked_to_24_bits() {
        assert_eq!(Color::new(0xAB12_3456).value(), 0x123456);
        assert_eq!(Color::new(0xFF).to_string(), "#0000ff");
    }

    #[test]
    fn parse_hex_accepts_only_rrggbb() {
        assert_eq!(Color::parse_hex("#00FF00"), Some(Color::new(0x00FF00)));
        assert_eq!(Color::parse_hex("#a1b2c3"), Some(Color::new(0xA1B2C3)));
        assert_eq!(Color::parse_hex("00FF00"), None);
        assert_eq!(Color::parse_hex("#0F0"), None);
        assert_eq!(Color::parse_hex("#+12345"), None);
        assert_eq!(Color::parse_hex("#gg0000"), None);
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn builder_sets_optional_fields() {
        let p = Point::coord(1.0, 2.0)
            .with_radius(5)
            .with_color(Color::new(0xFF0000))
            .with_color2(Color::rgb(0, 255, 0))
            .with_delay(100)
            .with_visible_time(2000);
        assert_eq!(p.radius, 5);
        assert_eq!(p.color, Some(Color::new(0xFF0000)));
        assert_eq!(p.color2, Some(Color::new(0x00FF00)));
        assert_eq!(p.delay, 100);
        assert_eq!(p.visible_time, 2000);
    }

    #[test]
    fn new_point_has_everything_absent() {
        let p = Point::zipcode(501);
        assert_eq!(p.radius, 0);
        assert!(p.color.is_none());
        assert!(p.color2.is_none());
        assert_eq!(p.delay, 0);
        assert_eq!(p.visible_time, 0);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        assert!(Point::zipcode(99_999).validate().is_ok());
        assert_eq!(
            Point::zipcode(100_000).validate(),
            Err(PointError::ZipcodeOutOfRange(100_000))
        );
        assert_eq!(
            Point::coord(91.0, 0.0).validate(),
            Err(PointError::InvalidLatitude(91.0))
        );
        assert!(matches!(
            Point::coord(0.0, f64::NAN).validate(),
            Err(PointError::InvalidLongitude(_))
        ));
        assert!(Point::coord(37.7749, -122.4194).validate().is_ok());
    }
}
