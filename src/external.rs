pub mod ibge;

pub use ibge::IbgeClient;
