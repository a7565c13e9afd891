pub mod backend;
pub mod enova_api;

pub use backend::EnovaBackend;
pub use enova_api::EnovaApi;
