use serde::{Deserialize, Serialize};

use crate::error::{invalid_input_error, Error};

/// A category of recyclable material a collection point accepts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub title: String,
    pub image_url: String,
}

/// Splits a comma-joined id list such as `"1,2"`.
///
/// Blank segments are skipped and repeated ids keep their first position.
pub fn parse_item_ids(raw: &str) -> Result<Vec<i32>, Error> {
    let mut ids = vec![];

    for segment in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id: i32 = segment
            .parse()
            .map_err(|_| invalid_input_error(format!("invalid item id: {}", segment)))?;

        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}
