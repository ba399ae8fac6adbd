//! Data structure of a renderable scene object.

use std::cell::RefCell;
use std::rc::Rc;

use crate::builtin::ObjectGpu;
use crate::color::{Color, WHITE};
use crate::resource::{ImageTexture, Mesh};

/// Rendering properties and state for a scene object.
///
/// Holds the Phong shading parameters, the texture reference and the draw
/// ordering hint used by the rendering pipeline.
pub struct ObjectData {
    color: Color,
    specular: Color,
    shininess: f32,
    texture: Rc<RefCell<ImageTexture>>,
    render_order: f32,
    cull: bool,
}

impl ObjectData {
    /// The base color of this object.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the base color of this object.
    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// The specular highlight color of this object.
    #[inline]
    pub fn specular(&self) -> Color {
        self.specular
    }

    /// Sets the specular highlight color of this object.
    #[inline]
    pub fn set_specular(&mut self, specular: Color) {
        self.specular = specular;
    }

    /// The specular shininess exponent.
    #[inline]
    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    /// Sets the specular shininess exponent.
    #[inline]
    pub fn set_shininess(&mut self, shininess: f32) {
        self.shininess = shininess;
    }

    /// This object's texture.
    #[inline]
    pub fn texture(&self) -> &Rc<RefCell<ImageTexture>> {
        &self.texture
    }

    /// Replaces this object's texture.
    #[inline]
    pub fn set_texture(&mut self, texture: Rc<RefCell<ImageTexture>>) {
        self.texture = texture;
    }

    /// The draw ordering hint.
    ///
    /// Objects with a larger hint are drawn earlier, so a large value turns
    /// an object into a backdrop behind everything else.
    #[inline]
    pub fn render_order(&self) -> f32 {
        self.render_order
    }

    /// Sets the draw ordering hint.
    #[inline]
    pub fn set_render_order(&mut self, render_order: f32) {
        self.render_order = render_order;
    }

    /// Checks if backface culling is enabled for this object.
    #[inline]
    pub fn backface_culling_enabled(&self) -> bool {
        self.cull
    }

    /// Enables or disables backface culling.
    ///
    /// Mirrored geometry (negative scale) flips the triangle winding, so
    /// interior-facing objects render with culling disabled.
    #[inline]
    pub fn enable_backface_culling(&mut self, active: bool) {
        self.cull = active;
    }
}

/// A renderable object: a mesh plus its rendering properties.
pub struct Object {
    mesh: Rc<RefCell<Mesh>>,
    data: ObjectData,
    pub(crate) gpu: Option<ObjectGpu>,
}

impl Object {
    /// Creates a new object with default rendering properties.
    ///
    /// Defaults: white base color, dark specular, shininess 32, no texture
    /// pixels (the renderer substitutes white), draw order 0, culling on.
    pub fn new(mesh: Rc<RefCell<Mesh>>) -> Object {
        Object {
            mesh,
            data: ObjectData {
                color: WHITE,
                specular: Color::new(0.1, 0.1, 0.1, 1.0),
                shininess: 32.0,
                texture: Rc::new(RefCell::new(ImageTexture::new())),
                render_order: 0.0,
                cull: true,
            },
            gpu: None,
        }
    }

    /// This object's mesh.
    #[inline]
    pub fn mesh(&self) -> &Rc<RefCell<Mesh>> {
        &self.mesh
    }

    /// This object's rendering properties.
    #[inline]
    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    /// Mutable access to this object's rendering properties.
    #[inline]
    pub fn data_mut(&mut self) -> &mut ObjectData {
        &mut self.data
    }
}
