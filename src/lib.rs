#![forbid(unsafe_code)]

pub mod bridge;
pub mod editor;
pub mod engine;
pub mod engine_kurbo;
pub mod error;
pub mod session;
pub mod shape;
pub mod toys;

pub use bridge::{EngineShape, send_to_engine};
pub use editor::ShapeEditor;
pub use engine::{BezierEngine, CapStyle, EngineShapeId, JoinStyle};
pub use engine_kurbo::KurboEngine;
pub use error::{BeztoysError, BeztoysResult};
pub use session::{Session, ToyRack, UiConfig};
pub use shape::{BezierHandle, BezierShape};
pub use toys::{Annotations, Toy, ToyCtx, builtin_toys};
