/// ASCII rasterizer for terminal rendering
///
/// Rasterizes at twice the vertical resolution of the terminal so that one
/// logical pixel is roughly square; two logical rows share a character cell.
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3};
use std::collections::HashMap;
use std::io::Write;
use tankscene_core::geometry::Edge;
use tankscene_core::projection::project_to_screen;
use tankscene_core::{DrawPass, Mesh, PixelRect, RenderTarget, Shape, Transform};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Lines win depth ties against the faces they outline
const LINE_DEPTH_BIAS: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: [f32; 3],
}

const BLANK: Cell = Cell {
    glyph: ' ',
    color: [0.0; 3],
};

/// Unit shapes tessellated once, with their edge lists
struct ShapeCache {
    meshes: HashMap<Shape, (Mesh, Vec<Edge>)>,
}

impl ShapeCache {
    fn new() -> Self {
        let meshes = Shape::ALL
            .iter()
            .map(|&shape| {
                let mesh = shape.mesh();
                let edges = mesh.edges();
                (shape, (mesh, edges))
            })
            .collect();
        Self { meshes }
    }
}

/// ASCII renderer that converts draw calls to terminal characters
pub struct AsciiRenderer {
    columns: usize,
    rows: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    shapes: ShapeCache,
    projection: Matrix4<f32>,
    viewport: PixelRect,
    #[cfg(test)]
    plot_calls: usize,
}

impl AsciiRenderer {
    pub fn new(columns: usize, rows: usize) -> Self {
        let size = columns * rows * 2;
        Self {
            columns,
            rows,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![BLANK; columns * rows],
            shapes: ShapeCache::new(),
            projection: Matrix4::identity(),
            viewport: PixelRect::full(columns as u32, rows as u32 * 2),
            #[cfg(test)]
            plot_calls: 0,
        }
    }

    /// Logical canvas size to hand to the camera: one column by half a row
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.columns as u32, self.rows as u32 * 2)
    }

    pub fn resize(&mut self, columns: usize, rows: usize) {
        *self = Self::new(columns, rows);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(BLANK);
    }

    fn canvas_height(&self) -> u32 {
        self.rows as u32 * 2
    }

    /// Viewport bounds as inclusive logical pixel ranges with a top-left origin
    fn viewport_bounds(&self) -> (i32, i32, i32, i32) {
        let rect = &self.viewport;
        let top = self.canvas_height() as i32 - (rect.y + rect.height) as i32;
        let min_x = (rect.x as i32).max(0);
        let max_x = ((rect.x + rect.width) as i32 - 1).min(self.columns as i32 - 1);
        let min_y = top.max(0);
        let max_y = (top + rect.height as i32 - 1).min(self.canvas_height() as i32 - 1);
        (min_x, max_x, min_y, max_y)
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, cell: Cell) {
        #[cfg(test)]
        {
            self.plot_calls += 1;
        }
        let (min_x, max_x, min_y, max_y) = self.viewport_bounds();
        if x < min_x || x > max_x || y < min_y || y > max_y {
            return;
        }
        let idx = y as usize * self.columns + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            // Keep the nearer sample of the two logical rows in a cell
            let cell_idx = (y as usize / 2) * self.columns + x as usize;
            let other = if y % 2 == 0 { idx + self.columns } else { idx - self.columns };
            if other >= self.depth_buffer.len() || depth <= self.depth_buffer[other] {
                self.cells[cell_idx] = cell;
            }
        }
    }

    fn render_solid(&mut self, shape: Shape, model_view: &Matrix4<f32>, color: [f32; 3]) {
        let mvp = Transform::mvp_matrix(model_view, &self.projection);
        let canvas_height = self.canvas_height();
        let mut faces = Vec::new();

        if let Some((mesh, _)) = self.shapes.meshes.get(&shape) {
            for triangle in &mesh.triangles {
                let mut screen = [(0.0, 0.0, 0.0); 3];
                let mut visible = true;
                for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
                    match project_to_screen(&mvp, &vertex.position, &self.viewport, canvas_height) {
                        Some(p) => *slot = p,
                        None => visible = false,
                    }
                }
                if !visible {
                    continue;
                }

                // Shade by how squarely the face points at the camera
                let view: Vec<Point3<f32>> = triangle
                    .vertices
                    .iter()
                    .map(|v| model_view.transform_point(&v.position))
                    .collect();
                let normal = (view[1] - view[0]).cross(&(view[2] - view[0]));
                let brightness = normal.try_normalize(1e-12).map(|n| n.z.abs()).unwrap_or(0.0);
                faces.push((screen, brightness));
            }
        }

        for (screen, brightness) in faces {
            let index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
            let glyph = LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)];
            let shade = 0.45 + 0.55 * brightness;
            let cell = Cell {
                glyph,
                color: color.map(|c| c * shade),
            };
            self.rasterize_triangle(&screen, cell);
        }
    }

    fn render_lines(&mut self, shape: Shape, model_view: &Matrix4<f32>, color: [f32; 3]) {
        let mvp = Transform::mvp_matrix(model_view, &self.projection);
        let canvas_height = self.canvas_height();
        let mut segments = Vec::new();

        if let Some((_, edges)) = self.shapes.meshes.get(&shape) {
            for (a, b) in edges {
                let pa = project_to_screen(&mvp, a, &self.viewport, canvas_height);
                let pb = project_to_screen(&mvp, b, &self.viewport, canvas_height);
                if let (Some(pa), Some(pb)) = (pa, pb) {
                    segments.push((pa, pb));
                }
            }
        }

        for (a, b) in segments {
            self.rasterize_line(a, b, color);
        }
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);
        let (vx0, vx1, vy0, vy1) = self.viewport_bounds();

        // Bounding box, clipped to the viewport
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(vx0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(vx1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(vy0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(vy1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, cell);
                    }
                }
            }
        }
    }

    fn rasterize_line(&mut self, a: (f32, f32, f32), b: (f32, f32, f32), color: [f32; 3]) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        // Cells are two logical rows tall
        let glyph = if dy.abs() * 0.5 < dx.abs() * 0.4 {
            '-'
        } else if dx.abs() < dy.abs() * 0.5 * 0.4 {
            '|'
        } else if (dx > 0.0) == (dy > 0.0) {
            '\\'
        } else {
            '/'
        };
        let cell = Cell { glyph, color };

        // Only step over the part of the segment inside the viewport
        let (min_x, max_x, min_y, max_y) = self.viewport_bounds();
        if max_x < min_x || max_y < min_y {
            return;
        }
        let bounds = (min_x as f32, (max_x + 1) as f32, min_y as f32, (max_y + 1) as f32);
        let Some((t0, t1)) = clip_segment((a.0, a.1), (dx, dy), bounds) else {
            return;
        };
        let at = |t: f32| (a.0 + dx * t, a.1 + dy * t, a.2 + (b.2 - a.2) * t);
        let (start, end) = (at(t0), at(t1));
        let (cdx, cdy) = (end.0 - start.0, end.1 - start.1);

        let steps = cdx.abs().max(cdy.abs()).ceil().max(1.0) as i32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (start.0 + cdx * t).floor() as i32;
            let y = (start.1 + cdy * t).floor() as i32;
            let depth = start.2 + (end.2 - start.2) * t - LINE_DEPTH_BIAS;
            self.plot(x, y, depth, cell);
        }
    }

    /// Queue the frame to `writer`, row by row
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in 0..self.rows {
            for x in 0..self.columns {
                let cell = self.cells[row * self.columns + x];
                let [r, g, b] = cell.color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
                writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                writer.queue(Print(cell.glyph))?;
            }
            if row + 1 < self.rows {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    #[cfg(test)]
    fn glyph_count(&self) -> usize {
        self.cells.iter().filter(|c| c.glyph != ' ').count()
    }
}

impl RenderTarget for AsciiRenderer {
    fn begin_viewport(&mut self, rect: &PixelRect, projection: &Matrix4<f32>) {
        self.viewport = *rect;
        self.projection = *projection;
    }

    fn draw(&mut self, shape: Shape, pass: DrawPass, model_view: &Matrix4<f32>, color: [f32; 3]) {
        match pass {
            DrawPass::Solid => self.render_solid(shape, model_view, color),
            DrawPass::Wireframe => self.render_lines(shape, model_view, color),
        }
    }
}

/// Liang-Barsky clip of `origin + t * delta`, t in [0, 1], against the
/// half-open box `(min_x, max_x, min_y, max_y)`. Returns the visible t range.
fn clip_segment(origin: (f32, f32), delta: (f32, f32), bounds: (f32, f32, f32, f32)) -> Option<(f32, f32)> {
    let (min_x, max_x, min_y, max_y) = bounds;
    // Keep clipped endpoints strictly inside the far edges
    let (max_x, max_y) = (max_x - 1e-3, max_y - 1e-3);
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    for (p, q) in [
        (-delta.0, origin.0 - min_x),
        (delta.0, max_x - origin.0),
        (-delta.1, origin.1 - min_y),
        (delta.1, max_y - origin.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
