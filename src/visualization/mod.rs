pub mod renderer;
pub mod frame_png;
pub mod galsim_vis2d;
