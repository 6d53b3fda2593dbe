//! # Map API Sender
//!
//! Lê um arquivo de pontos e envia um lote para a API de mapa.
//!
//! ## Uso
//! ```bash
//! mapapi_sender                              # config.toml ao lado do executável
//! mapapi_sender --config cfg.toml pts.toml   # config e pontos explícitos
//! ```
//!
//! Sai com código 0 se o lote foi confirmado, 1 caso contrário.

mod points;

use mapapi_core::client::MapClient;
use mapapi_core::config::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Argumentos de linha de comando.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    points_file: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(path) => parsed.config = Some(PathBuf::from(path)),
                None => return Err("--config requer um caminho".into()),
            },
            s if s.starts_with('-') => return Err(format!("Opção desconhecida: {s}")),
            s => {
                if parsed.points_file.is_some() {
                    return Err(format!("Argumento extra: {s}"));
                }
                parsed.points_file = Some(PathBuf::from(s));
            }
        }
    }

    Ok(parsed)
}

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // ── Carregar config ──
    let config_path = args.config.unwrap_or_else(AppConfig::default_path);
    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config inválida: {e}");
        }
        return ExitCode::FAILURE;
    }

    // ── Pontos ──
    let points_path = args
        .points_file
        .unwrap_or_else(|| PathBuf::from(&config.sender.points_file));
    let points = match points::load_points(&points_path) {
        Ok(points) => points,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    for (i, p) in points.iter().enumerate() {
        if let Err(e) = p.validate() {
            warn!("Ponto {i}: {e} (enviado assim mesmo)");
        }
    }

    // ── Envio ──
    let client = match MapClient::new(config.map.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("Falha ao criar cliente: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "→ {} pontos para {} (mapa {})",
        points.len(),
        client.config().endpoint(),
        client.config().map_id()
    );
    match client.send_points(&points) {
        Ok(()) => {
            info!("Lote confirmado");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_transport() => {
            error!("Erro de transporte: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Lote recusado: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn no_args_uses_defaults() {
        let parsed = parse_args(args(&[])).unwrap();
        assert!(parsed.config.is_none());
        assert!(parsed.points_file.is_none());
    }

    #[test]
    fn config_and_points_file() {
        let parsed = parse_args(args(&["--config", "cfg.toml", "pts.toml"])).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("cfg.toml")));
        assert_eq!(parsed.points_file, Some(PathBuf::from("pts.toml")));
    }

    #[test]
    fn rejects_bad_args() {
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["a.toml", "b.toml"])).is_err());
    }
}
