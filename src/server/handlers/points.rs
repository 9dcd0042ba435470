use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Extension, Json, Multipart, Path, Query};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::{parse_item_ids, Point, PointFilter, PointForm};
use crate::error::{invalid_input_error, Error};
use crate::uploads::Uploads;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListParams {
    city: Option<String>,
    uf: Option<String>,
    items: Option<String>,
}

impl TryFrom<ListParams> for PointFilter {
    type Error = Error;

    fn try_from(params: ListParams) -> Result<Self, Error> {
        let items = match params.items {
            Some(raw) => Some(parse_item_ids(&raw)?).filter(|ids| !ids.is_empty()),
            None => None,
        };

        Ok(PointFilter {
            city: params.city.filter(|c| !c.trim().is_empty()),
            uf: params.uf.filter(|u| !u.trim().is_empty()),
            items,
        })
    }
}

struct ImageFile {
    file_name: String,
    bytes: Bytes,
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Point>>, Error> {
    let points = api.list_points(params.try_into()?).await?;

    Ok(points.into())
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(uploads): Extension<Uploads>,
    multipart: Multipart,
) -> Result<Json<Point>, Error> {
    let (form, image) = read_registration(multipart).await?;
    let mut point = form.validate()?;

    if let Some(image) = image {
        point.image = Some(uploads.store(&image.file_name, &image.bytes).await?);
    }

    let staged = point.image.clone();

    match api.create_point(point).await {
        Ok(point) => Ok(point.into()),
        Err(err) => {
            if let Some(name) = staged {
                uploads.discard(&name).await;
            }
            Err(err)
        }
    }
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Point>, Error> {
    let Path(id) = id.map_err(|err| {
        tracing::debug!("rejected point id: {}", err);
        invalid_input_error("point id must be an integer")
    })?;

    let point = api.find_point(id).await?;

    Ok(point.into())
}

/// Splits a registration body into its text fields and the single `image` file.
async fn read_registration(mut multipart: Multipart) -> Result<(PointForm, Option<ImageFile>), Error> {
    let mut form = PointForm::default();
    let mut image: Option<ImageFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name != "image" {
            let value = field.text().await?;
            form.set(&name, value);
            continue;
        }

        if image.is_some() {
            return Err(invalid_input_error("only one image may be uploaded"));
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        // browsers send an empty part when no file was picked
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }

        image = Some(ImageFile { file_name, bytes });
    }

    Ok((form, image))
}
