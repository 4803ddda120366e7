mod geometry;
mod projection;
pub(crate) mod raster;
mod renderer;
mod spatial;

pub use projection::Viewport;
pub use raster::Raster;
pub use renderer::MapRenderer;
