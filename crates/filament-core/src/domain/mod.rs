//! Domain model: the plain data graph the engine instruments.
//!
//! - **value**: `Value`, `Key`
//! - **object**: `ObjectRef`（プロパティ記述子付きのオブジェクト）
//! - **array**: `ArrayRef`（要素ストレージ）
//! - **ids**: `DepId`, `SubscriberId`

pub mod array;
pub mod ids;
pub mod object;
pub mod value;

pub use array::{ArrayRef, WeakArrayRef};
pub use ids::{DepId, Id, IdMarker, SubscriberId};
pub use object::{Descriptor, Getter, ObjectClass, ObjectRef, PropertyKind, Setter, WeakObjectRef};
pub use value::{Key, MAX_ARRAY_INDEX, Value};
