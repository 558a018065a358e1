//! Raya Dynamic Object Model
//!
//! This crate provides the host object model the reactivity membrane is
//! built on:
//! - Values, property keys and symbols
//! - Partial property descriptors and the define/validate rules
//! - Ordinary objects with prototypes, extensibility and ordered own keys
//! - Proxies with handler traps and trap-result invariant checks
//! - Identity-keyed weak maps
//!
//! # Usage
//!
//! ```ignore
//! use raya_object::{ObjectRef, PropertyDescriptor, Value};
//!
//! let obj = ObjectRef::from_entries([("a", 1)]);
//! obj.define_property("b", PropertyDescriptor::frozen(2))?;
//! assert_eq!(obj.get_value("a")?, Value::from(1));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod descriptor;
pub mod error;
pub mod key;
pub mod object;
pub mod ordinary;
pub mod proxy;
pub mod value;
pub mod weak_map;

pub use descriptor::{is_compatible_descriptor, PropertyDescriptor};
pub use error::{ObjectError, ObjectResult};
pub use key::{PropertyKey, Symbol};
pub use object::{NativeFunction, ObjectId, ObjectRef, WeakObjectRef};
pub use ordinary::{ObjectClass, OrdinaryObject};
pub use proxy::ProxyHandler;
pub use value::Value;
pub use weak_map::WeakObjectMap;
