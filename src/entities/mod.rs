mod item;
mod location;
mod point;

pub use item::{parse_item_ids, Item};
pub use location::Coordinates;
pub use point::{NewPoint, Point, PointFilter, PointForm};
