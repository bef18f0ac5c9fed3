//! # commons-utils
//!
//! Stateless helpers: path and URL building, token generation, JSON
//! flattening, remote image to data URI conversion, and an explicit
//! name-keyed registry.

pub mod flatten;
pub mod path;
pub mod registry;
pub mod remote;
pub mod token;

pub use flatten::{flatten, remove_properties};
pub use path::{
    append_component_to_path, append_components_to_path, append_query_parameters,
    url_from_components,
};
pub use registry::{Named, Registry};
pub use remote::{convert_url_to_base64, to_data_uri};
pub use token::{generate_random_bytes, generate_unique_token};
