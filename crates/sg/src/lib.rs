pub mod convert;
pub mod error;
pub mod feeds;
pub mod parsing;
pub mod site;
pub mod templates;
pub mod types;
pub mod walk;

pub use convert::*;
pub use error::*;
pub use feeds::*;
pub use parsing::*;
pub use site::*;
pub use templates::*;
pub use types::*;
pub use walk::*;
