/// Graphics-API abstraction - opaque trait handles over the backend

pub mod device;
pub mod texture;
pub mod buffer;
pub mod shader;
pub mod pipeline;
pub mod command_list;
pub mod binding_group;
pub mod mock;

pub use device::*;
pub use texture::*;
pub use buffer::*;
pub use shader::*;
pub use pipeline::*;
pub use command_list::*;
pub use binding_group::*;
