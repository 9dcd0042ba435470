use serde::{Deserialize, Serialize};

use crate::error::{invalid_input_error, upstream_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Uf {
    pub sigla: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct City {
    pub nome: String,
}

/// Read-only client for the IBGE localities API.
#[derive(Clone, Debug)]
pub struct IbgeClient {
    http: reqwest::Client,
    api_base: String,
}

impl IbgeClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Two-letter codes of every federative unit, sorted.
    #[tracing::instrument(skip(self))]
    pub async fn list_ufs(&self) -> Result<Vec<String>, Error> {
        let url = format!("{}/estados", self.api_base);
        let ufs: Vec<Uf> = self.get(url).await?;

        let mut codes: Vec<String> = ufs.into_iter().map(|uf| uf.sigla).collect();
        codes.sort();

        Ok(codes)
    }

    /// City names of one federative unit, in the order IBGE returns them.
    #[tracing::instrument(skip(self))]
    pub async fn list_cities(&self, uf: &str) -> Result<Vec<String>, Error> {
        let url = format!("{}/estados/{}/municipios", self.api_base, uf);
        let cities: Vec<City> = self.get(url).await?;

        Ok(cities.into_iter().map(|city| city.nome).collect())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, Error> {
        let res = self.http.get(url).send().await?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(invalid_input_error("geography lookup rejected"));
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        Ok(res.json().await?)
    }
}
