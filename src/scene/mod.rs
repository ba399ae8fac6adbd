//! The scene graph: nodes, renderable objects, attached lights.

pub use self::node::{SceneNode, SceneNodeData};
pub use self::object::{Object, ObjectData};

mod node;
mod object;
