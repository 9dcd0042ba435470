use std::path::{Path, PathBuf};

use crate::error::Error;

/// Local directory holding uploaded point images, served under `/uploads`.
#[derive(Clone, Debug)]
pub struct Uploads {
    dir: PathBuf,
}

impl Uploads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the file under a fresh name and returns that name.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, Error> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = staged_name(original_name);
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        tracing::info!("stored upload {}", name);

        Ok(name)
    }

    /// Removes a staged file whose registration did not go through.
    #[tracing::instrument(skip(self))]
    pub async fn discard(&self, name: &str) {
        if let Err(err) = tokio::fs::remove_file(self.dir.join(name)).await {
            tracing::warn!("could not remove staged upload {}: {}", name, err);
        }
    }
}

/// Public address of a stored file.
pub fn upload_url(public_url: &str, name: &str) -> String {
    format!("{}/uploads/{}", public_url, name)
}

fn staged_name(original_name: &str) -> String {
    let prefix: String = rand::random::<[u8; 6]>()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();

    format!("{}-{}", prefix, sanitize(original_name))
}

fn sanitize(original_name: &str) -> String {
    let base = original_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    match cleaned.trim_start_matches('.') {
        "" => "image".into(),
        rest => rest.to_string(),
    }
}
