//! Physics probes (raycasts) для strut aiming
//!
//! Сама физика принадлежит host'у: здесь только trait PhysicsProbe и два
//! backend'а — rapier context или injected probe (headless/тесты).

pub mod layers;
pub mod probe;

pub use layers::*;
pub use probe::{InjectedProbe, PhysicsProbe, ProbeError, ProbeFilter, ProbeHit, ProbeSphere, SphereProbe};
