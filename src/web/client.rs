use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::Deserialize;

use crate::entities::{Item, Point};
use crate::error::{invalid_input_error, upstream_error, Error};
use crate::web::form::Submission;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: i32,
    error: String,
}

/// HTTP client for the Ecoleta REST API.
#[derive(Clone, Debug)]
pub struct EcoletaClient {
    http: reqwest::Client,
    api_base: String,
}

impl EcoletaClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<Item>, Error> {
        let res = self
            .http
            .get(format!("{}/items", self.api_base))
            .send()
            .await?;

        Ok(check(res).await?.json().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_point(&self, id: i32) -> Result<Point, Error> {
        let res = self
            .http
            .get(format!("{}/points/{}", self.api_base, id))
            .send()
            .await?;

        Ok(check(res).await?.json().await?)
    }

    #[tracing::instrument(skip_all, fields(name = %submission.name))]
    pub async fn create_point(&self, submission: Submission) -> Result<Point, Error> {
        let mut form = Form::new();

        for (name, value) in submission.text_fields() {
            form = form.text(name, value.to_string());
        }

        if let Some(image) = submission.image {
            form = form.part("image", Part::bytes(image.bytes).file_name(image.file_name));
        }

        let res = self
            .http
            .post(format!("{}/points", self.api_base))
            .multipart(form)
            .send()
            .await?;

        Ok(check(res).await?.json().await?)
    }
}

async fn check(res: Response) -> Result<Response, Error> {
    let status_code = res.status().as_u16();

    if (400..500).contains(&status_code) {
        return Err(match res.json::<ErrorBody>().await {
            Ok(body) => Error {
                code: body.code,
                message: body.error,
            },
            Err(_) => invalid_input_error(format!("request rejected with {}", status_code)),
        });
    } else if !(200..300).contains(&status_code) {
        return Err(upstream_error());
    }

    Ok(res)
}
