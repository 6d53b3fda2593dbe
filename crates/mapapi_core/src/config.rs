//! Configuração do cliente do mapa.
//!
//! Endpoint e credenciais ficam em um [`MapConfig`] entregue ao cliente,
//! sem estado global. O arquivo `config.toml` agrupa o mapa e o sender.

use reqwest::Url;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Endpoint padrão da API.
pub const DEFAULT_ENDPOINT: &str = "https://realtimemapapi.redline13.com:4434";

/// Tamanho máximo do id do mapa (bytes).
pub const MAX_MAP_ID_LEN: usize = 8;

/// Tamanho máximo da chave do mapa (bytes).
pub const MAX_MAP_KEY_LEN: usize = 16;

/// Tamanho máximo da URL do endpoint (bytes).
pub const MAX_ENDPOINT_LEN: usize = 1023;

/// Erros de configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Id do mapa muito longo ({0} bytes, máximo {MAX_MAP_ID_LEN})")]
    MapIdTooLong(usize),

    #[error("Chave do mapa muito longa ({0} bytes, máximo {MAX_MAP_KEY_LEN})")]
    MapKeyTooLong(usize),

    #[error("Endpoint muito longo ({0} bytes, máximo {MAX_ENDPOINT_LEN})")]
    EndpointTooLong(usize),

    #[error("Endpoint inválido {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Timeout inválido: {0} (deve ser > 0 e representável)")]
    InvalidTimeout(f64),

    #[error("User-Agent inválido: {0:?}")]
    InvalidUserAgent(String),

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao gerar TOML: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Erro ao parsear {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

fn check_credentials(map_id: &str, map_key: &str) -> Result<(), ConfigError> {
    if map_id.len() > MAX_MAP_ID_LEN {
        return Err(ConfigError::MapIdTooLong(map_id.len()));
    }
    if map_key.len() > MAX_MAP_KEY_LEN {
        return Err(ConfigError::MapKeyTooLong(map_key.len()));
    }
    Ok(())
}

fn check_timeout(secs: f64) -> Result<Duration, ConfigError> {
    if secs <= 0.0 {
        return Err(ConfigError::InvalidTimeout(secs));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(secs))
}

fn check_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    HeaderValue::from_str(user_agent)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidUserAgent(user_agent.to_string()))
}

fn check_endpoint(url: &str) -> Result<(), ConfigError> {
    if url.len() > MAX_ENDPOINT_LEN {
        return Err(ConfigError::EndpointTooLong(url.len()));
    }
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: format!("esquema {other:?} não suportado"),
        }),
    }
}

// ──────────────────────────────────────────────
// Mapa
// ──────────────────────────────────────────────

/// Endpoint e credenciais de um mapa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// URL completa do endpoint
    endpoint: String,
    /// Id do mapa (até 8 bytes)
    map_id: String,
    /// Chave do mapa (até 16 bytes)
    map_key: String,
    /// Prazo da requisição em segundos (ausente = padrão do transporte)
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<f64>,
    /// Valor do header `User-Agent`
    user_agent: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            map_id: String::new(),
            map_key: String::new(),
            timeout_secs: None,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl MapConfig {
    /// Cria a configuração com o endpoint padrão.
    ///
    /// Falha se o id ou a chave excederem o tamanho máximo; nada é truncado.
    pub fn new(map_id: &str, map_key: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.set_credentials(map_id, map_key)?;
        Ok(config)
    }

    pub fn set_credentials(&mut self, map_id: &str, map_key: &str) -> Result<(), ConfigError> {
        check_credentials(map_id, map_key)?;
        self.map_id = map_id.to_string();
        self.map_key = map_key.to_string();
        Ok(())
    }

    /// Troca o endpoint. Aceita apenas URLs http(s) de até 1023 bytes.
    pub fn set_endpoint(&mut self, url: &str) -> Result<(), ConfigError> {
        check_endpoint(url)?;
        self.endpoint = url.to_string();
        Ok(())
    }

    pub fn with_endpoint(mut self, url: &str) -> Result<Self, ConfigError> {
        self.set_endpoint(url)?;
        Ok(self)
    }

    pub fn set_timeout_secs(&mut self, secs: Option<f64>) -> Result<(), ConfigError> {
        if let Some(s) = secs {
            check_timeout(s)?;
        }
        self.timeout_secs = secs;
        Ok(())
    }

    /// Troca o `User-Agent`. Rejeita valores que não são header HTTP válido.
    pub fn set_user_agent(&mut self, user_agent: &str) -> Result<(), ConfigError> {
        check_user_agent(user_agent)?;
        self.user_agent = user_agent.to_string();
        Ok(())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn map_key(&self) -> &str {
        &self.map_key
    }

    pub fn timeout_secs(&self) -> Option<f64> {
        self.timeout_secs
    }

    /// Prazo já convertido em [`Duration`].
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.timeout_secs.map(check_timeout).transpose()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Revalida os campos. Necessário para valores vindos de arquivo,
    /// que não passam pelos setters.
    pub fn check(&self) -> Result<(), ConfigError> {
        check_credentials(&self.map_id, &self.map_key)?;
        check_endpoint(&self.endpoint)?;
        check_user_agent(&self.user_agent)?;
        self.timeout()?;
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Sender
// ──────────────────────────────────────────────

/// Configuração do binário sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Arquivo TOML com a lista de pontos
    pub points_file: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            points_file: "points.toml".into(),
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub map: MapConfig,
    pub sender: SenderConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    ///
    /// Arquivo ausente resulta na configuração padrão; arquivo ilegível ou
    /// com TOML inválido é erro.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("{} não encontrado, usando configuração padrão", path.display());
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str::<AppConfig>(&content).map_err(|source| {
            ConfigError::Parse {
                path: path.display().to_string(),
                source,
            }
        })?;
        info!("Configuração carregada de {}", path.display());
        Ok(config)
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(e) = self.map.check() {
            errors.push(e.to_string());
        }
        if self.map.map_id.is_empty() {
            errors.push("Id do mapa não configurado".into());
        }
        if self.map.map_key.is_empty() {
            errors.push("Chave do mapa não configurada".into());
        }
        if self.sender.points_file.is_empty() {
            errors.push("Arquivo de pontos não configurado".into());
        }

        errors
    }
}
