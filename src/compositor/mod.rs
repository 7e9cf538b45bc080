mod blend;
mod geometry;
mod overlay;
mod policy;

pub use blend::{compose, enhance, mirror};
pub use geometry::{background_placement, canvas_size, foreground_placement, Placement};
pub use overlay::{apply_vignette, draw_label, vignette_alpha};
pub use policy::{
    BackgroundFit, Corner, ForegroundFit, Label, OutputSize, PlacementPolicy, VerticalAnchor,
};
