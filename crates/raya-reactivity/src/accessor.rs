//! Accessor rewriter
//!
//! Getters and setters crossing the membrane are replaced by wrapper
//! functions. Outbound (raw-side to view-side) wrappers unwrap `this` and
//! arguments before calling the original and wrap results on the way out;
//! inbound wrappers do the reverse for accessors defined through a view.
//!
//! Each direction is cached per view kind and recorded both ways, so
//! retrieving the same accessor twice yields the same wrapper, and
//! unwrapping a wrapper yields the function it was made from.

use crate::kind::ViewKind;
use crate::membrane::MembraneInner;
use raya_object::{ObjectError, ObjectRef, Value, WeakObjectMap, WeakObjectRef};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accessor {
    Getter,
    Setter,
}

#[derive(Default)]
struct AccessorCache {
    /// raw-side getter -> view-side getter
    getters: WeakObjectMap<WeakObjectRef>,
    /// raw-side setter -> view-side setter
    setters: WeakObjectMap<WeakObjectRef>,
    /// view-side getter -> raw-side getter
    revert_getters: WeakObjectMap<WeakObjectRef>,
    /// view-side setter -> raw-side setter
    revert_setters: WeakObjectMap<WeakObjectRef>,
}

impl AccessorCache {
    fn forward(&mut self, accessor: Accessor) -> &mut WeakObjectMap<WeakObjectRef> {
        match accessor {
            Accessor::Getter => &mut self.getters,
            Accessor::Setter => &mut self.setters,
        }
    }

    fn revert(&mut self, accessor: Accessor) -> &mut WeakObjectMap<WeakObjectRef> {
        match accessor {
            Accessor::Getter => &mut self.revert_getters,
            Accessor::Setter => &mut self.revert_setters,
        }
    }
}

/// Per-kind accessor wrapper caches
pub(crate) struct AccessorRewriter {
    caches: RefCell<[AccessorCache; 5]>,
}

impl AccessorRewriter {
    pub(crate) fn new() -> Self {
        Self {
            caches: RefCell::new(Default::default()),
        }
    }

    fn view_side(&self, kind: ViewKind, accessor: Accessor, raw_side: &ObjectRef) -> Option<ObjectRef> {
        let mut caches = self.caches.borrow_mut();
        caches[kind as usize].forward(accessor).get_live(raw_side)
    }

    fn raw_side(&self, kind: ViewKind, accessor: Accessor, view_side: &ObjectRef) -> Option<ObjectRef> {
        let mut caches = self.caches.borrow_mut();
        caches[kind as usize].revert(accessor).get_live(view_side)
    }

    fn record(&self, kind: ViewKind, accessor: Accessor, raw_side: &ObjectRef, view_side: &ObjectRef) {
        let mut caches = self.caches.borrow_mut();
        let cache = &mut caches[kind as usize];
        cache.forward(accessor).insert(raw_side, view_side.downgrade());
        cache.revert(accessor).insert(view_side, raw_side.downgrade());
        tracing::trace!(
            %kind,
            ?accessor,
            raw_side = %raw_side.id(),
            view_side = %view_side.id(),
            "recorded accessor wrapper"
        );
    }

    /// View-side counterpart of a raw getter
    pub(crate) fn wrap_getter(
        &self,
        membrane: &Rc<MembraneInner>,
        kind: ViewKind,
        original: &ObjectRef,
    ) -> ObjectRef {
        if let Some(wrapped) = self.view_side(kind, Accessor::Getter, original) {
            return wrapped;
        }

        let transmit = kind.transmit();
        let wrapped = {
            let membrane = Rc::clone(membrane);
            let original = original.clone();
            ObjectRef::function(move |this, _args| {
                let this = membrane.to_raw(this.clone());
                let result = original.call(&this, &[])?;
                Ok(membrane.transmit(transmit, result))
            })
        };
        self.record(kind, Accessor::Getter, original, &wrapped);
        wrapped
    }

    /// View-side counterpart of a raw setter
    ///
    /// Setters retrieved through an immutable view refuse every call.
    pub(crate) fn wrap_setter(
        &self,
        membrane: &Rc<MembraneInner>,
        kind: ViewKind,
        original: &ObjectRef,
    ) -> ObjectRef {
        if let Some(wrapped) = self.view_side(kind, Accessor::Setter, original) {
            return wrapped;
        }

        let wrapped = if kind.is_mutable() {
            let membrane = Rc::clone(membrane);
            let original = original.clone();
            ObjectRef::function(move |this, args| {
                let this = membrane.to_raw(this.clone());
                let value = membrane.to_raw(args.first().cloned().unwrap_or_default());
                original.call(&this, &[value])?;
                Ok(Value::Undefined)
            })
        } else {
            let membrane = Rc::clone(membrane);
            ObjectRef::function(move |_this, _args| {
                membrane.reject(ObjectError::ReadOnlyViolation(format!(
                    "cannot call a setter retrieved through a {} view",
                    kind
                )))?;
                Ok(Value::Undefined)
            })
        };
        self.record(kind, Accessor::Setter, original, &wrapped);
        wrapped
    }

    /// Raw-side counterpart of a getter supplied through a view
    pub(crate) fn unwrap_getter(
        &self,
        membrane: &Rc<MembraneInner>,
        kind: ViewKind,
        getter: &ObjectRef,
    ) -> ObjectRef {
        if let Some(original) = self.raw_side(kind, Accessor::Getter, getter) {
            return original;
        }

        let transmit = kind.transmit();
        let raw_getter = {
            let membrane = Rc::clone(membrane);
            let getter = getter.clone();
            ObjectRef::function(move |this, _args| {
                let this = membrane.transmit(transmit, this.clone());
                let result = getter.call(&this, &[])?;
                Ok(membrane.to_raw(result))
            })
        };
        self.record(kind, Accessor::Getter, &raw_getter, getter);
        raw_getter
    }

    /// Raw-side counterpart of a setter supplied through a view
    pub(crate) fn unwrap_setter(
        &self,
        membrane: &Rc<MembraneInner>,
        kind: ViewKind,
        setter: &ObjectRef,
    ) -> ObjectRef {
        if let Some(original) = self.raw_side(kind, Accessor::Setter, setter) {
            return original;
        }

        let transmit = kind.transmit();
        let raw_setter = {
            let membrane = Rc::clone(membrane);
            let setter = setter.clone();
            ObjectRef::function(move |this, args| {
                let this = membrane.transmit(transmit, this.clone());
                let value = membrane.transmit(transmit, args.first().cloned().unwrap_or_default());
                setter.call(&this, &[value])?;
                Ok(Value::Undefined)
            })
        };
        self.record(kind, Accessor::Setter, &raw_setter, setter);
        raw_setter
    }
}
