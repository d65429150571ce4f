pub mod backend;
pub mod buffers;
pub mod context;
pub mod pipeline;

pub use backend::WgpuBackend;
pub use context::GpuContext;
