//! Built-in material: a single Phong pipeline shared by every object.

pub use self::phong_material::{ObjectGpu, PhongMaterial};

mod phong_material;
