pub mod builder;
pub mod model;
pub mod serializer;

pub use builder::{EmitError, Emission, StubBuilder};
pub use model::{Parameter, RemoteClass, RemoteMethod};
pub use serializer::{JsonSerializer, ScriptSerializer, StubFormat, StubSerializer};
