//! Application services
//!
//! Resolution strategies, the injector, and the extension pipeline.
//! Services depend on the tree boundary trait but are themselves concrete
//! structs or small trait seams.

mod extension;
mod injector;
mod resolver;

pub use extension::{ExtensionError, ExtensionPipeline, InjectorExtension};
pub use injector::Injector;
pub use resolver::{ActivityResolver, CachedTreeResolver, SingleActivityResolver};
