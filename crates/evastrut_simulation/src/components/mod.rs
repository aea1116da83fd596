//! ECS Components для EVA strut симуляции
//!
//! Организация по доменам:
//! - vessel: vessel/part принадлежность, активный vessel, сцена host'а
//! - crew: crew roster (навыки, уровень), jetpack bone EVA актора
//! - strut: EvaStrut state machine, TargetRef, LinkedStrut, StrutAnchor
//! - affordance: pickup/cut/drop действия

pub mod affordance;
pub mod crew;
pub mod strut;
pub mod vessel;

pub use affordance::*;
pub use crew::*;
pub use strut::*;
pub use vessel::*;
