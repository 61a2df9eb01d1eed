mod colors;
mod fluid;
mod grid;
mod hud;
mod render;
mod scene;

pub use colors::{overlay_obstacle, paint_cells, sci_color, PaintOptions};
pub use fluid::{FieldKind, Fluid, NeighborOpenness};
pub use grid::GridSize;
pub use hud::{overlay_text, GLYPH_HEIGHT, GLYPH_SPACING, GLYPH_WIDTH, LINE_SPACING};
pub use render::{choose_present_mode, choose_surface_format, CellRenderer};
pub use scene::{Obstacle, ObstacleShape, Scene, SceneKind};
