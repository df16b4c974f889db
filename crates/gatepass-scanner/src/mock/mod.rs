//! Mock capture devices for development and testing.

mod camera;

pub use camera::{MockCamera, MockCameraHandle};
