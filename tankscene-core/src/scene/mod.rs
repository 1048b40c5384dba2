/// Hierarchical scene composition on top of the transform stack
///
/// Each part opens a transform scope, places itself relative to its parent,
/// and issues up to two draw calls: a solid pass and a slightly inflated
/// line pass so the outline does not z-fight with the faces.
use nalgebra::{Matrix4, Vector3};

use crate::articulation::Articulation;
use crate::geometry::Shape;
use crate::projectile::{Projectile, Target};
use crate::projection::PixelRect;
use crate::transform::TransformStack;

pub mod arm;
pub mod tank;

/// Flat RGB color in [0, 1]
pub type Color = [f32; 3];

/// Inflation applied to each axis of the line pass
pub const WIRE_PAD: f32 = 0.001;

/// Primitive mode of a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPass {
    /// Filled triangles
    Solid,
    /// Mesh edges as lines
    Wireframe,
}

/// Which passes are drawn; cycled from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireframeMode {
    #[default]
    Both,
    SolidOnly,
    WireframeOnly,
}

impl WireframeMode {
    pub fn next(self) -> Self {
        match self {
            WireframeMode::Both => WireframeMode::SolidOnly,
            WireframeMode::SolidOnly => WireframeMode::WireframeOnly,
            WireframeMode::WireframeOnly => WireframeMode::Both,
        }
    }

    pub fn draws(self, pass: DrawPass) -> bool {
        !matches!(
            (self, pass),
            (WireframeMode::SolidOnly, DrawPass::Wireframe) | (WireframeMode::WireframeOnly, DrawPass::Solid)
        )
    }
}

/// Geometry and shader collaborator: receives viewports and draw calls.
///
/// `model_view` is the composed matrix for a unit shape; implementations
/// combine it with the viewport's projection.
pub trait RenderTarget {
    fn begin_viewport(&mut self, rect: &PixelRect, projection: &Matrix4<f32>);

    fn draw(&mut self, shape: Shape, pass: DrawPass, model_view: &Matrix4<f32>, color: Color);
}

/// Size and colors of one rigid part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub shape: Shape,
    pub size: [f32; 3],
    pub fill: Color,
    pub outline: Color,
    /// Per-axis inflation of the line pass
    pub pad: f32,
}

impl Part {
    pub const fn new(shape: Shape, size: [f32; 3], fill: Color, outline: Color) -> Self {
        Self {
            shape,
            size,
            fill,
            outline,
            pad: WIRE_PAD,
        }
    }

    pub const fn unpadded(self) -> Self {
        Self { pad: 0.0, ..self }
    }

    pub const fn with_fill(self, fill: Color) -> Self {
        Self { fill, ..self }
    }

    pub const fn with_outline(self, outline: Color) -> Self {
        Self { outline, ..self }
    }
}

/// Issues draw calls for parts placed by the transform stack
pub struct Composer<'a, T: RenderTarget + ?Sized> {
    target: &'a mut T,
    mode: WireframeMode,
}

impl<'a, T: RenderTarget + ?Sized> Composer<'a, T> {
    pub fn new(target: &'a mut T, mode: WireframeMode) -> Self {
        Self { target, mode }
    }

    /// Draw `part` at the current transform, scaled to its size
    pub fn part(&mut self, stack: &mut TransformStack, part: &Part) {
        let [sx, sy, sz] = part.size;
        if self.mode.draws(DrawPass::Solid) {
            let mut solid = stack.scope();
            solid.scale(sx, sy, sz);
            self.target.draw(part.shape, DrawPass::Solid, solid.current(), part.fill);
        }
        if self.mode.draws(DrawPass::Wireframe) {
            let mut lines = stack.scope();
            lines.scale(sx + part.pad, sy + part.pad, sz + part.pad);
            self.target.draw(part.shape, DrawPass::Wireframe, lines.current(), part.outline);
        }
    }
}

/// Which articulated model sits on the ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneKind {
    #[default]
    Tank,
    Arm,
}

impl SceneKind {
    /// World frame at the launch point, if the model can fire
    pub fn muzzle(self, pose: &Articulation) -> Option<Matrix4<f32>> {
        match self {
            SceneKind::Tank => Some(tank::muzzle(pose)),
            SceneKind::Arm => None,
        }
    }

    fn draw_model<T: RenderTarget + ?Sized>(
        self,
        composer: &mut Composer<'_, T>,
        stack: &mut TransformStack,
        pose: &Articulation,
    ) {
        match self {
            SceneKind::Tank => tank::draw(composer, stack, pose),
            SceneKind::Arm => arm::draw(composer, stack, pose),
        }
    }
}

/// Everything drawn in one viewport
pub struct Frame<'s> {
    pub kind: SceneKind,
    pub pose: &'s Articulation,
    pub targets: &'s [Target],
    pub projectiles: &'s [Projectile],
}

const GROUND_TILES: usize = 11;
const TILE_SIZE: f32 = 0.566_666_7;
const TILE_HEIGHT: f32 = 0.03;

const LIGHT_TILE: Part = Part::new(Shape::Cube, [TILE_SIZE, TILE_HEIGHT, TILE_SIZE], [0.8; 3], [0.6; 3]).unpadded();
const DARK_TILE: Part = LIGHT_TILE.with_fill([0.5; 3]).with_outline([0.3; 3]);

const TARGET_LIVE: Color = [0.8, 0.15, 0.15];
const TARGET_HIT: Color = [0.2, 0.7, 0.25];
const SHELL: Part = Part::new(Shape::Sphere, [0.06; 3], [0.1; 3], [0.05; 3]);

/// Compose the whole scene under the stack's current (view) matrix
pub fn compose<T: RenderTarget + ?Sized>(
    composer: &mut Composer<'_, T>,
    stack: &mut TransformStack,
    frame: &Frame<'_>,
) {
    ground(composer, stack);
    frame.kind.draw_model(composer, stack, frame.pose);

    for target in frame.targets {
        let color = if target.hit { TARGET_HIT } else { TARGET_LIVE };
        let part = Part::new(Shape::Sphere, [target.scale; 3], color, darken(color));
        let mut placed = stack.scope();
        placed.multiply(&Matrix4::new_translation(&target.position.coords));
        composer.part(&mut placed, &part);
    }

    for projectile in frame.projectiles {
        let mut placed = stack.scope();
        placed.multiply(&Matrix4::new_translation(&projectile.position.coords));
        composer.part(&mut placed, &SHELL);
    }
}

/// Checkerboard whose top face lies on y = 0
fn ground<T: RenderTarget + ?Sized>(composer: &mut Composer<'_, T>, stack: &mut TransformStack) {
    let offset = -(GROUND_TILES as f32 * TILE_SIZE) / 2.0 + TILE_SIZE / 2.0;
    for x in 0..GROUND_TILES {
        for z in 0..GROUND_TILES {
            let tile = if (x + z) % 2 == 0 { &LIGHT_TILE } else { &DARK_TILE };
            let mut placed = stack.scope();
            placed.multiply(&Matrix4::new_translation(&Vector3::new(
                x as f32 * TILE_SIZE + offset,
                -TILE_HEIGHT / 2.0,
                z as f32 * TILE_SIZE + offset,
            )));
            composer.part(&mut placed, tile);
        }
    }
}

fn darken(color: Color) -> Color {
    color.map(|c| c * 0.5)
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub viewport: usize,
    pub shape: Shape,
    pub pass: DrawPass,
    pub model_view: Matrix4<f32>,
    pub color: Color,
}

/// Render target that records everything it is given
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    pub viewports: Vec<(PixelRect, Matrix4<f32>)>,
    pub calls: Vec<DrawCall>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.viewports.clear();
        self.calls.clear();
    }

    pub fn count(&self, shape: Shape, pass: DrawPass) -> usize {
        self.calls
            .iter()
            .filter(|c| c.shape == shape && c.pass == pass)
            .count()
    }
}

impl RenderTarget for DrawLog {
    fn begin_viewport(&mut self, rect: &PixelRect, projection: &Matrix4<f32>) {
        self.viewports.push((*rect, *projection));
    }

    fn draw(&mut self, shape: Shape, pass: DrawPass, model_view: &Matrix4<f32>, color: Color) {
        self.calls.push(DrawCall {
            viewport: self.viewports.len().saturating_sub(1),
            shape,
            pass,
            model_view: *model_view,
            color,
        });
    }
}
