//! Raya Reactivity - Reactive Object-Graph Membrane
//!
//! This crate hands out *views* of objects from the Raya object model:
//! proxies with the same shape as the underlying value that report every
//! read and write to caller-supplied observers.
//!
//! View kinds:
//! - `reactive`: deep, mutable
//! - `readonly`: deep, every mutation refused
//! - `shallow_reactive` / `shallow_readonly`: top level only
//! - `ref_value`: a single observed `value` accessor
//!
//! Wrapping is idempotent per membrane and kind: wrapping a value (or one
//! of its views) again returns the same view.
//!
//! # Usage
//!
//! ```ignore
//! use raya_object::ObjectRef;
//! use raya_reactivity::{Membrane, ReactivityOptions};
//!
//! let membrane = Membrane::new(
//!     ReactivityOptions::new().mutation_observer(|target, key| {
//!         println!("{} changed on {:?}", key, target);
//!     }),
//! );
//! let state = membrane.reactive(ObjectRef::from_entries([("count", 0)]));
//! state.as_object().unwrap().put("count", 1)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod accessor;
mod handler;
pub mod kind;
pub mod membrane;
pub mod options;
pub mod reference;
mod registry;

pub use kind::{Capabilities, Transmit, ViewKind};
pub use membrane::Membrane;
pub use options::{
    is_plain_object, AccessObserver, DistortionHandler, MutationObserver, ObservablePredicate,
    OnViolation, ReactivityOptions,
};
pub use reference::REF_VALUE_KEY;

pub use raya_object::{ObjectError, ObjectResult};
