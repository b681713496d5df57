//! Authentication value objects: scopes, tokens, credentials, and profiles.

pub mod credentials;
pub mod parameters;
pub mod profile;
pub mod records;
pub mod scope;
pub mod secret;

pub use credentials::*;
pub use parameters::ParameterBuilder;
pub use profile::*;
pub use records::*;
pub use scope::*;
pub use secret::*;
