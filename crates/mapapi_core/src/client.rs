//! Cliente HTTP da API do mapa.
//!
//! Um envio = um lote = uma requisição `POST` síncrona. Não há retry,
//! fila nem sucesso parcial: o lote é confirmado por inteiro ou não.

use std::io::{self, Read};

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use tracing::{debug, trace};

use crate::config::{ConfigError, MapConfig};
use crate::protocol::{ProtocolError, build_request_body, is_acknowledged};
use crate::types::Point;

/// Número máximo de redirecionamentos seguidos.
const MAX_REDIRECTS: usize = 10;

/// Tamanho do buffer de leitura da resposta.
const READ_CHUNK_SIZE: usize = 8192;

/// Erros do cliente.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuração inválida: {0}")]
    Config(#[from] ConfigError),

    #[error("Erro ao criar cliente HTTP: {0}")]
    Setup(reqwest::Error),

    #[error("Erro ao codificar lote: {0}")]
    Encode(#[from] ProtocolError),

    #[error("Falha no transporte HTTP: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Erro ao ler resposta: {0}")]
    Io(#[from] io::Error),

    #[error("Lote não confirmado pelo servidor: {body:?}")]
    NotAcknowledged { body: String },
}

impl ClientError {
    /// `true` quando nenhuma resposta completa foi obtida.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Io(_))
    }
}

/// Lê a resposta inteira, bloco a bloco, acrescentando cada bloco ao final
/// do buffer na ordem de chegada.
pub fn read_body<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut chunks = 0usize;

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                body.extend_from_slice(&chunk[..n]);
                chunks += 1;
                trace!("Bloco {chunks}: {n} bytes (total {})", body.len());
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    debug!("Resposta lida: {} bytes em {chunks} blocos", body.len());
    Ok(body)
}

// ──────────────────────────────────────────────
// Cliente
// ──────────────────────────────────────────────

/// Cliente de um mapa: endpoint, credenciais e conexão HTTP.
#[derive(Debug, Clone)]
pub struct MapClient {
    config: MapConfig,
    http: Client,
}

impl MapClient {
    /// Cria o cliente. A configuração é revalidada aqui.
    pub fn new(config: MapConfig) -> Result<Self, ClientError> {
        config.check()?;

        let mut builder = Client::builder()
            .user_agent(config.user_agent())
            .redirect(Policy::limited(MAX_REDIRECTS));
        if let Some(timeout) = config.timeout()? {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Setup)?;

        debug!("Cliente criado para {}", config.endpoint());
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Troca o endpoint. Exige `&mut self`, então não pode ocorrer durante
    /// um envio em andamento.
    pub fn set_endpoint(&mut self, url: &str) -> Result<(), ConfigError> {
        self.config.set_endpoint(url)
    }

    /// Envia o corpo como está e devolve o corpo da resposta sem
    /// interpretá-lo. O status HTTP não é considerado.
    pub fn send_raw(&self, body: Vec<u8>) -> Result<Vec<u8>, ClientError> {
        let endpoint = self.config.endpoint();
        debug!("POST {} ({} bytes)", endpoint, body.len());

        let resp = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        debug!("Resposta {} de {}", resp.status(), resp.url());
        Ok(read_body(resp)?)
    }

    /// Codifica e envia um lote de pontos.
    ///
    /// Sucesso somente se a resposta for exatamente `true`.
    pub fn send_points(&self, points: &[Point]) -> Result<(), ClientError> {
        let body = build_request_body(points, self.config.map_id(), self.config.map_key())?;
        debug!("Lote de {} pontos codificado ({} bytes)", points.len(), body.len());

        let resp = self.send_raw(body.into_bytes())?;
        if is_acknowledged(&resp) {
            debug!("Lote de {} pontos confirmado", points.len());
            Ok(())
        } else {
            Err(ClientError::NotAcknowledged {
                body: String::from_utf8_lossy(&resp).into_owned(),
            })
        }
    }

    /// Como [`send_points`](Self::send_points), mas retorna código numérico:
    /// 0 = confirmado, 1 = não confirmado ou falha de transporte.
    pub fn send_map_points(&self, points: &[Point]) -> i32 {
        match self.send_points(points) {
            Ok(()) => 0,
            Err(e) => {
                debug!("Envio falhou: {e}");
                1
            }
        }
    }

    /// Envia um corpo já montado. `None` em falha de transporte.
    ///
    /// Bytes que não são UTF-8 válido viram `U+FFFD`; quem precisa dos
    /// bytes exatos usa [`send_raw`](Self::send_raw).
    pub fn send_raw_map_data(&self, body: &str) -> Option<String> {
        match self.send_raw(body.as_bytes().to_vec()) {
            Ok(resp) => Some(String::from_utf8_lossy(&resp).into_owned()),
            Err(e) => {
                debug!("Envio bruto falhou: {e}");
                None
            }
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
