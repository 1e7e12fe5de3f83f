//! Data types shared by the data source boundary, the renderers and the host.

mod config;
mod options;
mod value;

pub use config::*;
pub use options::*;
pub use value::*;
