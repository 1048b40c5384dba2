/// tankscene core - transform stack, scene composition and projectile simulation
///
/// This library holds everything that does not touch a window, terminal or GL
/// context: the matrix stack that places parts hierarchically, the tank and
/// robot arm models, camera and projection policy, the ballistic simulator and
/// the keyboard action layer. Frontends implement [`RenderTarget`] and drive an
/// [`App`] once per frame.

pub mod app;
pub mod articulation;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod input;
pub mod keymap;
pub mod projectile;
pub mod projection;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use app::App;
pub use articulation::Articulation;
pub use camera::{CameraRig, Preset};
pub use error::{Error, Result};
pub use geometry::{Mesh, Shape, Triangle, Vertex};
pub use input::{Action, Key, Keymap};
pub use projectile::{Projectile, ProjectileSim, SimConfig, Target};
pub use projection::{PixelRect, ProjectionMode};
pub use scene::{Color, DrawLog, DrawPass, RenderTarget, SceneKind, WireframeMode};
pub use transform::{ScopedTransform, Transform, TransformStack};
