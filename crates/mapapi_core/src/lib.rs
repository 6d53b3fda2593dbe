//! # Map API Core
//!
//! Codificação de pontos em JSON e envio em lote para a API de mapa em
//! tempo real, com confirmação `true`/não-`true`.
//!
//! ## Módulos
//! - [`types`] – Ponto, localização e cor
//! - [`protocol`] – Encoder JSON, envelope do lote e confirmação
//! - [`config`] – Endpoint e credenciais, arquivo TOML
//! - [`client`] – Cliente HTTP (POST, leitura da resposta, veredito)

pub mod types;
pub mod protocol;
pub mod config;
pub mod client;

// Re-exports convenientes
pub use types::{Color, Location, Point};
pub use protocol::{build_request_body, encode_point, is_acknowledged};
pub use config::{AppConfig, MapConfig, SenderConfig};
pub use client::{ClientError, MapClient};
