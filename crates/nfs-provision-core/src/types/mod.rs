mod command;
mod entity;
mod object;
mod rendered;
mod service;

pub use command::*;
pub use entity::*;
pub use object::*;
pub use rendered::*;
pub use service::*;
