//! Client side of the create-point page: form state, its data sources and
//! the page router.

pub mod client;
pub mod flow;
pub mod form;
pub mod routes;

pub use client::EcoletaClient;
pub use flow::{CreatePointFlow, FixedPosition, Geolocator, RemoteSources, Sources};
pub use form::{Field, FormState, ImageFile, Phase, Submission};
pub use routes::Page;
