mod batch;
mod wgpu_backend;

pub use wgpu_backend::Renderer;
