use crate::light::{CollectedLight, Light, LightCollection};
use crate::procedural;
use crate::resource::{ImageTexture, Mesh};
use crate::scene::Object;
use crate::color::Color;
use glamx::{Pose3, Vec3};
use std::cell::{Ref, RefCell, RefMut};
use std::cmp::Ordering;
use std::rc::Rc;
use std::rc::Weak;

/// The data contained by a `SceneNode`.
pub struct SceneNodeData {
    local_scale: Vec3,
    local_transform: Pose3,
    world_scale: Vec3,
    world_transform: Pose3,
    visible: bool,
    children: Vec<SceneNode>,
    object: Option<Object>,
    light: Option<Light>,
    parent: Option<Weak<RefCell<SceneNodeData>>>,
}

/// A node of the scene graph.
///
/// This may represent a group of other nodes, and/or contain a renderable
/// object or a light.
#[derive(Clone)]
pub struct SceneNode {
    data: Rc<RefCell<SceneNodeData>>,
}

impl SceneNodeData {
    fn set_parent(&mut self, parent: Weak<RefCell<SceneNodeData>>) {
        self.parent = Some(parent);
    }

    /// Whether this node contains a renderable object.
    #[inline]
    pub fn has_object(&self) -> bool {
        self.object.is_some()
    }

    /// Whether this node contains a light.
    #[inline]
    pub fn has_light(&self) -> bool {
        self.light.is_some()
    }

    /// Whether this node has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// A reference to the object possibly contained by this node.
    #[inline]
    pub fn object(&self) -> Option<&Object> {
        self.object.as_ref()
    }

    /// A mutable reference to the object possibly contained by this node.
    #[inline]
    pub fn object_mut(&mut self) -> Option<&mut Object> {
        self.object.as_mut()
    }

    /// A reference to the light possibly contained by this node.
    #[inline]
    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }

    /// This node's world transform, as of the last prepare pass.
    #[inline]
    pub fn world_transform(&self) -> Pose3 {
        self.world_transform
    }

    /// This node's world scale, as of the last prepare pass.
    #[inline]
    pub fn world_scale(&self) -> Vec3 {
        self.world_scale
    }
}

impl SceneNode {
    /// Creates a new scene node without a parent.
    pub fn new(local_scale: Vec3, local_transform: Pose3, object: Option<Object>) -> SceneNode {
        let data = SceneNodeData {
            local_scale,
            local_transform,
            world_transform: local_transform,
            world_scale: local_scale,
            visible: true,
            children: Vec::new(),
            object,
            light: None,
            parent: None,
        };

        SceneNode {
            data: Rc::new(RefCell::new(data)),
        }
    }

    /// Creates a new empty scene node with identity transformations.
    pub fn empty() -> SceneNode {
        SceneNode::new(Vec3::ONE, Pose3::IDENTITY, None)
    }

    /// Creates a new scene node with a sphere mesh.
    ///
    /// The sphere is initially centered at (0, 0, 0).
    ///
    /// # Arguments
    /// * `r` - the sphere radius
    /// * `ntheta_subdiv` - number of subdivisions around the sphere (longitude)
    /// * `nphi_subdiv` - number of subdivisions from top to bottom (latitude)
    pub fn sphere_with_subdiv(r: f32, ntheta_subdiv: u32, nphi_subdiv: u32) -> SceneNode {
        Self::mesh(
            Rc::new(RefCell::new(procedural::sphere(
                r,
                ntheta_subdiv,
                nphi_subdiv,
            ))),
            Vec3::ONE,
        )
    }

    /// Creates a new scene node using a mesh.
    pub fn mesh(mesh: Rc<RefCell<Mesh>>, scale: Vec3) -> SceneNode {
        let object = Object::new(mesh);

        SceneNode::new(scale, Pose3::IDENTITY, Some(object))
    }

    /// Creates a new scene node carrying a light.
    ///
    /// The light's world position is determined by the node's world transform.
    pub fn new_light(light: Light) -> SceneNode {
        let node = SceneNode::empty();
        node.data.borrow_mut().light = Some(light);
        node
    }

    /// Returns an immutable reference to this node's internal data.
    pub fn data(&self) -> Ref<'_, SceneNodeData> {
        self.data.borrow()
    }

    /// Returns a mutable reference to this node's internal data.
    pub fn data_mut(&mut self) -> RefMut<'_, SceneNodeData> {
        self.data.borrow_mut()
    }

    /// Adds an empty group node as a child of this node.
    pub fn add_group(&mut self) -> SceneNode {
        let node = SceneNode::empty();

        self.add_child(node.clone());

        node
    }

    /// Adds an existing node as a child of this node.
    ///
    /// # Panics
    /// Panics if the node already has a parent.
    pub fn add_child(&mut self, node: SceneNode) {
        assert!(
            node.data().is_root(),
            "The added node must not have a parent yet."
        );

        let self_weak_ptr = Rc::downgrade(&self.data);
        node.data.borrow_mut().set_parent(self_weak_ptr);
        self.data_mut().children.push(node)
    }

    /// Adds a sphere as a child of this node.
    ///
    /// See [`SceneNode::sphere_with_subdiv`].
    pub fn add_sphere_with_subdiv(
        &mut self,
        r: f32,
        ntheta_subdiv: u32,
        nphi_subdiv: u32,
    ) -> SceneNode {
        let node = Self::sphere_with_subdiv(r, ntheta_subdiv, nphi_subdiv);
        self.add_child(node.clone());
        node
    }

    /// Adds a light-carrying node as a child of this node.
    pub fn add_light(&mut self, light: Light) -> SceneNode {
        let node = Self::new_light(light);
        self.add_child(node.clone());
        node
    }

    /// Sets whether this node (and its subtree) is rendered.
    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.data_mut().visible = visible;
    }

    /// Whether this node is rendered.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.data().visible
    }

    /// This node's local scale.
    #[inline]
    pub fn local_scale(&self) -> Vec3 {
        self.data().local_scale
    }

    /// Sets the local scaling factors of this node.
    ///
    /// Negative factors mirror the geometry along the corresponding axis.
    #[inline]
    pub fn set_local_scale(&mut self, sx: f32, sy: f32, sz: f32) -> Self {
        self.data_mut().local_scale = Vec3::new(sx, sy, sz);
        self.clone()
    }

    /// This node's local translation component.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.data().local_transform.translation
    }

    /// Sets this node's local translation, replacing the current one.
    #[inline]
    pub fn set_position(&mut self, t: Vec3) -> Self {
        self.data_mut().local_transform.translation = t;
        self.clone()
    }

    /// Sets the base color of this node's object, if any.
    #[inline]
    pub fn set_color(&mut self, color: Color) -> Self {
        if let Some(object) = self.data_mut().object_mut() {
            object.data_mut().set_color(color);
        }
        self.clone()
    }

    /// Sets the specular color of this node's object, if any.
    #[inline]
    pub fn set_specular(&mut self, specular: Color) -> Self {
        if let Some(object) = self.data_mut().object_mut() {
            object.data_mut().set_specular(specular);
        }
        self.clone()
    }

    /// Sets the shininess exponent of this node's object, if any.
    #[inline]
    pub fn set_shininess(&mut self, shininess: f32) -> Self {
        if let Some(object) = self.data_mut().object_mut() {
            object.data_mut().set_shininess(shininess);
        }
        self.clone()
    }

    /// Sets the texture of this node's object, if any.
    #[inline]
    pub fn set_texture(&mut self, texture: Rc<RefCell<ImageTexture>>) -> Self {
        if let Some(object) = self.data_mut().object_mut() {
            object.data_mut().set_texture(texture);
        }
        self.clone()
    }

    /// Sets the draw ordering hint of this node's object, if any.
    ///
    /// Larger hints draw earlier; see [`ObjectData::render_order`](crate::scene::ObjectData::render_order).
    #[inline]
    pub fn set_render_order(&mut self, render_order: f32) -> Self {
        if let Some(object) = self.data_mut().object_mut() {
            object.data_mut().set_render_order(render_order);
        }
        self.clone()
    }

    /// The draw ordering hint of this node's object (0.0 without an object).
    #[inline]
    pub fn render_order(&self) -> f32 {
        self.data()
            .object()
            .map(|o| o.data().render_order())
            .unwrap_or(0.0)
    }

    /// Enables or disables backface culling for this node's object, if any.
    #[inline]
    pub fn enable_backface_culling(&mut self, active: bool) -> Self {
        if let Some(object) = self.data_mut().object_mut() {
            object.data_mut().enable_backface_culling(active);
        }
        self.clone()
    }

    /// Counts the renderable objects in this subtree.
    pub fn num_objects(&self) -> usize {
        let data = self.data();
        let own = if data.has_object() { 1 } else { 0 };
        own + data.children.iter().map(|c| c.num_objects()).sum::<usize>()
    }

    /// Counts the lights in this subtree.
    pub fn num_lights(&self) -> usize {
        let data = self.data();
        let own = if data.has_light() { 1 } else { 0 };
        own + data.children.iter().map(|c| c.num_lights()).sum::<usize>()
    }

    /// Prepares the scene graph rooted by this node for rendering.
    ///
    /// Propagates world transforms and scales down the tree, gathers the
    /// lights, and returns the visible renderable nodes sorted by draw order
    /// (largest hint first, so backdrops come before regular content).
    pub fn prepare(&mut self, lights: &mut LightCollection) -> Vec<SceneNode> {
        let mut draw_list = Vec::new();
        self.do_prepare(Pose3::IDENTITY, Vec3::ONE, lights, &mut draw_list);

        draw_list.sort_by(|a, b| {
            b.render_order()
                .partial_cmp(&a.render_order())
                .unwrap_or(Ordering::Equal)
        });

        draw_list
    }

    fn do_prepare(
        &self,
        parent_transform: Pose3,
        parent_scale: Vec3,
        lights: &mut LightCollection,
        draw_list: &mut Vec<SceneNode>,
    ) {
        let mut data = self.data.borrow_mut();

        if !data.visible {
            return;
        }

        data.world_transform = parent_transform * data.local_transform;
        data.world_scale = parent_scale * data.local_scale;

        match data.light {
            Some(Light::Ambient { color, intensity }) => lights.add_ambient(color, intensity),
            Some(Light::Point { color, intensity }) => lights.add(CollectedLight {
                color: Vec3::new(color.r, color.g, color.b),
                intensity,
                world_position: data.world_transform.translation,
            }),
            None => {}
        }

        let has_object = data.has_object();
        let world_transform = data.world_transform;
        let world_scale = data.world_scale;
        let children = data.children.clone();
        drop(data);

        if has_object {
            draw_list.push(self.clone());
        }

        for child in children {
            child.do_prepare(world_transform, world_scale, lights, draw_list);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;

    #[test]
    fn test_counts_and_structure() {
        let mut scene = SceneNode::empty();
        scene.add_light(Light::ambient(0.8));

        let mut rig = scene.add_group();
        rig.add_light(Light::point(1.0));

        let mut sphere = scene.add_sphere_with_subdiv(80.0, 32, 16);
        sphere.set_local_scale(-1.0, 1.0, 1.0);

        assert_eq!(scene.num_objects(), 1);
        assert_eq!(scene.num_lights(), 2);
        assert_eq!(sphere.local_scale(), Vec3::new(-1.0, 1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "must not have a parent")]
    fn test_double_parenting_panics() {
        let mut a = SceneNode::empty();
        let mut b = SceneNode::empty();
        let child = SceneNode::empty();

        a.add_child(child.clone());
        b.add_child(child);
    }

    #[test]
    fn test_prepare_propagates_transforms_and_collects_lights() {
        let mut scene = SceneNode::empty();
        scene.add_light(Light::ambient(0.8));

        let mut rig = scene.add_group();
        rig.set_position(Vec3::new(0.0, 0.0, 75.0));
        rig.add_light(Light::point(1.0).with_color(WHITE));

        let mut sphere = scene.add_sphere_with_subdiv(80.0, 8, 4);
        sphere.set_local_scale(-1.0, 1.0, 1.0);

        let mut lights = LightCollection::new();
        let draw_list = scene.prepare(&mut lights);

        assert_eq!(draw_list.len(), 1);
        assert_eq!(
            draw_list[0].data().world_scale(),
            Vec3::new(-1.0, 1.0, 1.0)
        );

        assert_eq!(lights.len(), 1);
        let point = lights.primary().unwrap();
        assert!((point.world_position - Vec3::new(0.0, 0.0, 75.0)).length() < 1.0e-6);
        assert!((lights.ambient - Vec3::new(0.8, 0.8, 0.8)).length() < 1.0e-6);
    }

    #[test]
    fn test_invisible_subtrees_are_skipped() {
        let mut scene = SceneNode::empty();
        let mut sphere = scene.add_sphere_with_subdiv(1.0, 8, 4);
        sphere.set_visible(false);

        let mut lights = LightCollection::new();
        let draw_list = scene.prepare(&mut lights);

        assert!(draw_list.is_empty());
    }

    #[test]
    fn test_draw_list_sorted_by_render_order() {
        let mut scene = SceneNode::empty();
        let _front = scene.add_sphere_with_subdiv(1.0, 8, 4);
        let mut backdrop = scene.add_sphere_with_subdiv(80.0, 8, 4);
        backdrop.set_render_order(1000.0);

        let mut lights = LightCollection::new();
        let draw_list = scene.prepare(&mut lights);

        assert_eq!(draw_list.len(), 2);
        assert_eq!(draw_list[0].render_order(), 1000.0);
        assert_eq!(draw_list[1].render_order(), 0.0);
    }
}
