/// WebGL2 render target: one flat-colour program, one buffer pair per shape
use nalgebra::Matrix4;
use std::collections::HashMap;
use tankscene_core::geometry::Edge;
use tankscene_core::{Color, DrawPass, Mesh, PixelRect, RenderTarget, Shape};
use wasm_bindgen::prelude::*;
use web_sys::{WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation};

const VERT_SRC: &str = r#"#version 300 es
in vec3 a_position;
uniform mat4 u_projection;
uniform mat4 u_model_view;
void main() {
    gl_Position = u_projection * u_model_view * vec4(a_position, 1.0);
}
"#;

const FRAG_SRC: &str = r#"#version 300 es
precision mediump float;
uniform vec3 u_color;
out vec4 o_color;
void main() {
    o_color = vec4(u_color, 1.0);
}
"#;

fn compile_shader(gl: &GL, src: &str, shader_type: u32) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| JsValue::from_str("unable to create shader"))?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        Err(JsValue::from_str(&format!("shader compile failed: {log}")))
    }
}

fn link_program(gl: &GL, vert_src: &str, frag_src: &str) -> Result<WebGlProgram, JsValue> {
    let vert = compile_shader(gl, vert_src, GL::VERTEX_SHADER)?;
    let frag = compile_shader(gl, frag_src, GL::FRAGMENT_SHADER)?;
    let program = gl
        .create_program()
        .ok_or_else(|| JsValue::from_str("unable to create program"))?;
    gl.attach_shader(&program, &vert);
    gl.attach_shader(&program, &frag);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        Err(JsValue::from_str(&format!("program link failed: {log}")))
    }
}

/// Flattened xyz positions, three per triangle
pub fn triangle_vertices(mesh: &Mesh) -> Vec<f32> {
    mesh.triangles
        .iter()
        .flat_map(|t| t.vertices.iter())
        .flat_map(|v| [v.position.x, v.position.y, v.position.z])
        .collect()
}

/// Flattened xyz positions, two per edge
pub fn line_vertices(edges: &[Edge]) -> Vec<f32> {
    edges
        .iter()
        .flat_map(|(a, b)| [a.x, a.y, a.z, b.x, b.y, b.z])
        .collect()
}

struct ShapeBuffers {
    triangles: WebGlBuffer,
    triangle_vertices: i32,
    lines: WebGlBuffer,
    line_vertices: i32,
}

fn upload(gl: &GL, data: &[f32]) -> Result<WebGlBuffer, JsValue> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| JsValue::from_str("unable to create buffer"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    let array = js_sys::Float32Array::from(data);
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, GL::STATIC_DRAW);
    Ok(buffer)
}

pub struct WebGlTarget {
    gl: GL,
    u_color: Option<WebGlUniformLocation>,
    u_projection: Option<WebGlUniformLocation>,
    u_model_view: Option<WebGlUniformLocation>,
    a_position: u32,
    shapes: HashMap<Shape, ShapeBuffers>,
}

impl WebGlTarget {
    pub fn new(gl: GL) -> Result<Self, JsValue> {
        let program = link_program(&gl, VERT_SRC, FRAG_SRC)?;
        gl.use_program(Some(&program));

        let a_position = gl.get_attrib_location(&program, "a_position");
        let a_position = u32::try_from(a_position).map_err(|_| JsValue::from_str("a_position not found"))?;

        let mut shapes = HashMap::new();
        for shape in Shape::ALL {
            let mesh = shape.mesh();
            let triangles = triangle_vertices(&mesh);
            let lines = line_vertices(&mesh.edges());
            shapes.insert(
                shape,
                ShapeBuffers {
                    triangles: upload(&gl, &triangles)?,
                    triangle_vertices: (triangles.len() / 3) as i32,
                    lines: upload(&gl, &lines)?,
                    line_vertices: (lines.len() / 3) as i32,
                },
            );
        }

        gl.enable(GL::DEPTH_TEST);
        gl.enable_vertex_attrib_array(a_position);

        Ok(Self {
            u_color: gl.get_uniform_location(&program, "u_color"),
            u_projection: gl.get_uniform_location(&program, "u_projection"),
            u_model_view: gl.get_uniform_location(&program, "u_model_view"),
            a_position,
            shapes,
            gl,
        })
    }

    /// Clear colour and depth over the whole canvas
    pub fn clear(&self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
        self.gl.clear_color(0.05, 0.05, 0.08, 1.0);
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
    }
}

impl RenderTarget for WebGlTarget {
    fn begin_viewport(&mut self, rect: &PixelRect, projection: &Matrix4<f32>) {
        self.gl
            .viewport(rect.x as i32, rect.y as i32, rect.width as i32, rect.height as i32);
        self.gl
            .uniform_matrix4fv_with_f32_array(self.u_projection.as_ref(), false, projection.as_slice());
    }

    fn draw(&mut self, shape: Shape, pass: DrawPass, model_view: &Matrix4<f32>, color: Color) {
        let Some(buffers) = self.shapes.get(&shape) else {
            return;
        };
        let (buffer, mode, count) = match pass {
            DrawPass::Solid => (&buffers.triangles, GL::TRIANGLES, buffers.triangle_vertices),
            DrawPass::Wireframe => (&buffers.lines, GL::LINES, buffers.line_vertices),
        };

        let gl = &self.gl;
        gl.uniform_matrix4fv_with_f32_array(self.u_model_view.as_ref(), false, model_view.as_slice());
        gl.uniform3f(self.u_color.as_ref(), color[0], color[1], color[2]);
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        gl.vertex_attrib_pointer_with_i32(self.a_position, 3, GL::FLOAT, false, 0, 0);
        gl.draw_arrays(mode, 0, count);
    }
}
