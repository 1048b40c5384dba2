/// Model-view matrix stack and transform builders
use std::ops::{Deref, DerefMut};

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{Error, Result};

/// Transform builder for 3D transformations.
///
/// Angles are in degrees, matching the articulation parameters that feed them.
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    pub fn rotation_x(degrees: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(degrees.to_radians(), 0.0, 0.0))
    }

    pub fn rotation_y(degrees: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, degrees.to_radians(), 0.0))
    }

    pub fn rotation_z(degrees: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, 0.0, degrees.to_radians()))
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(model_view: &Matrix4<f32>, projection: &Matrix4<f32>) -> Matrix4<f32> {
        projection * model_view
    }
}

/// LIFO stack of model-view matrices.
///
/// The stack always holds at least its root matrix, so `current()` is valid
/// at every draw call. Popping the root is a programming error and panics.
#[derive(Debug, Clone)]
pub struct TransformStack {
    matrices: Vec<Matrix4<f32>>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            matrices: vec![Matrix4::identity()],
        }
    }

    /// Number of matrices on the stack, root included
    pub fn depth(&self) -> usize {
        self.matrices.len()
    }

    /// The matrix visible to the next draw call
    pub fn current(&self) -> &Matrix4<f32> {
        // Never empty: pop refuses to remove the root.
        &self.matrices[self.matrices.len() - 1]
    }

    /// Replace the top matrix, e.g. with a camera view matrix at frame start
    pub fn load(&mut self, m: Matrix4<f32>) {
        let top = self.matrices.len() - 1;
        self.matrices[top] = m;
    }

    /// Duplicate the top matrix
    pub fn push(&mut self) {
        let top = *self.current();
        self.matrices.push(top);
    }

    /// Remove the top matrix, restoring the previous one.
    ///
    /// # Panics
    /// Panics when only the root remains; an unmatched pop means the scene
    /// code is corrupting its siblings' transforms.
    pub fn pop(&mut self) -> Matrix4<f32> {
        match self.try_pop() {
            Ok(m) => m,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_pop(&mut self) -> Result<Matrix4<f32>> {
        // The root is never handed out
        if self.matrices.len() <= 1 {
            return Err(Error::StackUnderflow);
        }
        self.matrices.pop().ok_or(Error::StackUnderflow)
    }

    /// Right-multiply the top: `top = top * m`
    pub fn multiply(&mut self, m: &Matrix4<f32>) -> &mut Self {
        let top = self.matrices.len() - 1;
        self.matrices[top] *= m;
        self
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.multiply(&Transform::translation_matrix(x, y, z))
    }

    pub fn rotate_x(&mut self, degrees: f32) -> &mut Self {
        self.multiply(&Transform::rotation_x(degrees))
    }

    pub fn rotate_y(&mut self, degrees: f32) -> &mut Self {
        self.multiply(&Transform::rotation_y(degrees))
    }

    pub fn rotate_z(&mut self, degrees: f32) -> &mut Self {
        self.multiply(&Transform::rotation_z(degrees))
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) -> &mut Self {
        self.multiply(&Transform::scale_matrix(sx, sy, sz))
    }

    /// Map a local-space point through the current matrix
    pub fn transform_point(&self, p: &Point3<f32>) -> Point3<f32> {
        self.current().transform_point(p)
    }

    /// Push and return a guard that pops on drop, including early returns
    pub fn scope(&mut self) -> ScopedTransform<'_> {
        let base = self.matrices.len();
        self.push();
        ScopedTransform { stack: self, base }
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`TransformStack::scope`].
///
/// Derefs to the stack so transforms and nested scopes can be applied through
/// it. Dropping the guard restores the stack to the depth it had before the
/// scope was opened.
pub struct ScopedTransform<'a> {
    stack: &'a mut TransformStack,
    base: usize,
}

impl Deref for ScopedTransform<'_> {
    type Target = TransformStack;

    fn deref(&self) -> &TransformStack {
        self.stack
    }
}

impl DerefMut for ScopedTransform<'_> {
    fn deref_mut(&mut self) -> &mut TransformStack {
        self.stack
    }
}

impl Drop for ScopedTransform<'_> {
    fn drop(&mut self) {
        let depth = self.stack.matrices.len();
        if depth <= self.base && !std::thread::panicking() {
            panic!(
                "transform scope popped below its own entry (depth {depth}, opened at {})",
                self.base
            );
        }
        self.stack.matrices.truncate(self.base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Matrix4<f32>, b: &Matrix4<f32>) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn test_new_stack_has_identity_root() {
        let stack = TransformStack::new();
        assert_eq!(stack.depth(), 1);
        assert!(close(stack.current(), &Matrix4::identity()));
    }

    #[test]
    fn test_balanced_push_pop_restores_top() {
        let mut stack = TransformStack::new();
        stack.translate(1.0, 2.0, 3.0).rotate_y(30.0);
        let before = *stack.current();

        for i in 0..8 {
            stack.push();
            stack.rotate_x(10.0 * i as f32).scale(2.0, 2.0, 2.0);
        }
        for _ in 0..8 {
            stack.pop();
        }

        assert_eq!(stack.depth(), 1);
        assert!(close(stack.current(), &before));
    }

    #[test]
    fn test_push_duplicates_top() {
        let mut stack = TransformStack::new();
        stack.translate(0.5, 0.0, 0.0);
        stack.push();
        assert_eq!(stack.depth(), 2);
        assert!(close(
            stack.current(),
            &Transform::translation_matrix(0.5, 0.0, 0.0)
        ));
    }

    #[test]
    fn test_multiply_is_right_multiplication() {
        let t = Transform::translation_matrix(1.0, 0.0, 0.0);
        let r = Transform::rotation_z(90.0);

        let mut stack = TransformStack::new();
        stack.multiply(&t).multiply(&r);
        assert!(close(stack.current(), &(t * r)));

        // The rotation applies closest to the object: +x rotates to +y, then shifts.
        let p = stack.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_mvp_applies_model_view_first() {
        let model_view = Transform::translation_matrix(1.0, 0.0, 0.0);
        let projection = Transform::scale_matrix(2.0, 2.0, 2.0);
        let mvp = Transform::mvp_matrix(&model_view, &projection);
        let p = mvp.transform_point(&Point3::origin());
        assert!((p - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_composition_order_matters() {
        let mut rotate_then_translate = TransformStack::new();
        rotate_then_translate.rotate_z(90.0).translate(1.0, 0.0, 0.0);

        let mut translate_then_rotate = TransformStack::new();
        translate_then_rotate.translate(1.0, 0.0, 0.0).rotate_z(90.0);

        assert!(!close(
            rotate_then_translate.current(),
            translate_then_rotate.current()
        ));
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn test_pop_root_panics() {
        let mut stack = TransformStack::new();
        stack.pop();
    }

    #[test]
    fn test_try_pop_reports_underflow() {
        let mut stack = TransformStack::new();
        assert_eq!(stack.try_pop(), Err(Error::StackUnderflow));
        assert_eq!(stack.depth(), 1);
        stack.push();
        assert!(stack.try_pop().is_ok());
    }

    #[test]
    fn test_load_replaces_top() {
        let mut stack = TransformStack::new();
        let view = Transform::translation_matrix(0.0, 0.0, -5.0);
        stack.load(view);
        assert_eq!(stack.depth(), 1);
        assert!(close(stack.current(), &view));
    }

    #[test]
    fn test_scope_pops_on_early_return() {
        fn place(stack: &mut TransformStack, bail: bool) -> Option<()> {
            let mut part = stack.scope();
            part.translate(3.0, 0.0, 0.0);
            if bail {
                return None;
            }
            part.scale(2.0, 2.0, 2.0);
            Some(())
        }

        let mut stack = TransformStack::new();
        assert!(place(&mut stack, true).is_none());
        assert_eq!(stack.depth(), 1);
        assert!(place(&mut stack, false).is_some());
        assert_eq!(stack.depth(), 1);
        assert!(close(stack.current(), &Matrix4::identity()));
    }

    #[test]
    fn test_nested_scopes_inherit_parent() {
        let mut stack = TransformStack::new();
        let mut hull = stack.scope();
        hull.translate(1.0, 0.0, 0.0);
        {
            let mut wheel = hull.scope();
            wheel.translate(0.0, 1.0, 0.0);
            let p = wheel.transform_point(&Point3::origin());
            assert!((p - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-5);
        }
        let p = hull.transform_point(&Point3::origin());
        assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
        drop(hull);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_scope_cleans_up_unmatched_inner_push() {
        let mut stack = TransformStack::new();
        {
            let mut part = stack.scope();
            part.push();
            part.push();
        }
        assert_eq!(stack.depth(), 1);
    }
}
