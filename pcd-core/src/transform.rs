use nalgebra::{Isometry3, Unit, UnitQuaternion, Vector3};

pub type Rigid3 = Isometry3<f32>;

pub fn rotation(axis: Vector3<f32>, angle: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), angle)
}
