use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{config_error, Error};

pub const DEFAULT_IBGE_API_BASE: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Base under which `/uploads` is reachable by clients.
    pub public_url: String,
    pub uploads_dir: PathBuf,
    pub ibge_api_base: String,
}

impl Config {
    /// Reads the process environment, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| config_error("DATABASE_URL must be set"))?;

        let database_max_connections: u32 = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse()
                .map_err(|_| config_error("DATABASE_MAX_CONNECTIONS must be a positive integer"))?,
            None => 5,
        };

        let bind_addr: SocketAddr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3333".into())
            .parse()
            .map_err(|_| config_error("BIND_ADDR must be a socket address"))?;

        let public_url = lookup("PUBLIC_URL")
            .unwrap_or_else(|| "http://localhost:3333".into())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr,
            public_url,
            uploads_dir: lookup("UPLOADS_DIR").unwrap_or_else(|| "uploads".into()).into(),
            ibge_api_base: lookup("IBGE_API_BASE").unwrap_or_else(|| DEFAULT_IBGE_API_BASE.into()),
        })
    }
}
