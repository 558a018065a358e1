//! Object handles and internal methods
//!
//! `ObjectRef` is a reference-counted handle with identity. Every structural
//! operation goes through one of the internal methods below; for proxies the
//! method dispatches to the handler and then validates the result against
//! the proxy's target (see [`crate::proxy`]).
//!
//! Internal methods report rejection as `Ok(false)`. The strict helpers
//! (`put`, `define_property`, `delete_property`, `set_prototype`,
//! `prevent_extensions_strict`) turn that into a `ProtocolViolation`.
//!
//! No `RefCell` borrow is held while user code (getters, setters, traps,
//! native functions) runs, so re-entrant access from that code is safe.

use crate::descriptor::PropertyDescriptor;
use crate::error::{ObjectError, ObjectResult};
use crate::key::PropertyKey;
use crate::ordinary::{ObjectClass, OrdinaryObject};
use crate::proxy::{ProxyHandler, ProxyObject};
use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique object identifier (never reused within a process)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Native function body: `(this, args) -> result`
pub type NativeFunction = Rc<dyn Fn(&Value, &[Value]) -> ObjectResult<Value>>;

enum ObjectKind {
    Ordinary {
        data: RefCell<OrdinaryObject>,
        call: Option<NativeFunction>,
    },
    Proxy(ProxyObject),
}

struct ObjectCell {
    id: ObjectId,
    kind: ObjectKind,
}

/// Strong reference to an object
#[derive(Clone)]
pub struct ObjectRef(Rc<ObjectCell>);

/// Weak reference to an object
#[derive(Clone)]
pub struct WeakObjectRef {
    id: ObjectId,
    cell: Weak<ObjectCell>,
}

impl WeakObjectRef {
    /// Id of the referenced object
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get a strong reference if the object is still alive
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.cell.upgrade().map(ObjectRef)
    }

    /// Check whether the object is still alive
    pub fn is_live(&self) -> bool {
        self.cell.strong_count() > 0
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakObjectRef({}, live={})", self.id, self.is_live())
    }
}

// ============================================================================
// Construction
// ============================================================================

impl ObjectRef {
    fn from_kind(kind: ObjectKind) -> Self {
        ObjectRef(Rc::new(ObjectCell {
            id: ObjectId::next(),
            kind,
        }))
    }

    fn ordinary(data: OrdinaryObject, call: Option<NativeFunction>) -> Self {
        Self::from_kind(ObjectKind::Ordinary {
            data: RefCell::new(data),
            call,
        })
    }

    /// Create an empty plain object without a prototype
    pub fn new() -> Self {
        Self::with_prototype(None)
    }

    /// Create an empty plain object with the given prototype
    pub fn with_prototype(prototype: Option<ObjectRef>) -> Self {
        Self::with_class(ObjectClass::Object, prototype)
    }

    /// Create an empty object of the given class
    ///
    /// `ObjectClass::Function` objects created this way are not callable;
    /// use [`ObjectRef::function`] for that.
    pub fn with_class(class: ObjectClass, prototype: Option<ObjectRef>) -> Self {
        Self::ordinary(OrdinaryObject::new(class, prototype), None)
    }

    /// Create a plain object with writable, enumerable, configurable data
    /// properties
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<PropertyKey>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_descriptors(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), PropertyDescriptor::data(v))),
        )
    }

    /// Create a plain object from complete or partial descriptors
    ///
    /// Descriptors are stored as given (missing fields take their defaults);
    /// later duplicates replace earlier ones.
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = (PropertyKey, PropertyDescriptor)>,
    {
        let mut data = OrdinaryObject::new(ObjectClass::Object, None);
        for (key, desc) in descriptors {
            data.insert_property(key, desc);
        }
        Self::ordinary(data, None)
    }

    /// Create an array holding `values`
    ///
    /// Indices are ordinary data properties and `length` a writable,
    /// non-enumerable, non-configurable number. Writing past the end does
    /// not update `length`.
    pub fn array<V, I>(values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let mut data = OrdinaryObject::new(ObjectClass::Array, None);
        let mut length = 0u32;
        for value in values {
            data.insert_property(PropertyKey::from(length), PropertyDescriptor::data(value));
            length += 1;
        }
        data.insert_property(
            PropertyKey::from("length"),
            PropertyDescriptor::new()
                .with_value(length)
                .with_writable(true)
                .with_enumerable(false)
                .with_configurable(false),
        );
        Self::ordinary(data, None)
    }

    /// Create a native function object
    pub fn function<F>(body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> ObjectResult<Value> + 'static,
    {
        Self::ordinary(
            OrdinaryObject::new(ObjectClass::Function, None),
            Some(Rc::new(body)),
        )
    }

    /// Create a proxy over `target` dispatching to `handler`
    pub fn proxy(target: ObjectRef, handler: Rc<dyn ProxyHandler>) -> Self {
        Self::from_kind(ObjectKind::Proxy(ProxyObject::new(target, handler)))
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Identity
// ============================================================================

impl ObjectRef {
    /// Unique id of this object
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Create a weak reference
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef {
            id: self.0.id,
            cell: Rc::downgrade(&self.0),
        }
    }

    /// Check if this object is a proxy
    pub fn is_proxy(&self) -> bool {
        matches!(self.0.kind, ObjectKind::Proxy(_))
    }

    /// Proxy target, if this object is a proxy
    pub fn proxy_target(&self) -> Option<&ObjectRef> {
        match &self.0.kind {
            ObjectKind::Proxy(proxy) => Some(proxy.target()),
            ObjectKind::Ordinary { .. } => None,
        }
    }

    /// Check if this object can be called
    ///
    /// A proxy is callable iff its target is.
    pub fn is_callable(&self) -> bool {
        match &self.0.kind {
            ObjectKind::Ordinary { call, .. } => call.is_some(),
            ObjectKind::Proxy(proxy) => proxy.target().is_callable(),
        }
    }

    /// Check if this object is an array (looking through proxies)
    pub fn is_array(&self) -> bool {
        match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => data.borrow().class() == ObjectClass::Array,
            ObjectKind::Proxy(proxy) => proxy.target().is_array(),
        }
    }

    fn ordinary_data(&self) -> Option<&RefCell<OrdinaryObject>> {
        match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => Some(data),
            ObjectKind::Proxy(_) => None,
        }
    }

    fn as_receiver(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl std::hash::Hash for ObjectRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            ObjectKind::Ordinary { data, call } => {
                let class = data
                    .try_borrow()
                    .map(|d| format!("{:?}", d.class()))
                    .unwrap_or_else(|_| "<borrowed>".to_string());
                write!(f, "ObjectRef({}, {}", self.0.id, class)?;
                if call.is_some() {
                    write!(f, ", callable")?;
                }
                write!(f, ")")
            }
            ObjectKind::Proxy(proxy) => {
                write!(f, "ObjectRef({}, Proxy -> {})", self.0.id, proxy.target().id())
            }
        }
    }
}

// ============================================================================
// Internal methods
// ============================================================================

impl ObjectRef {
    /// `[[GetPrototypeOf]]`
    pub fn get_prototype_of(&self) -> ObjectResult<Option<ObjectRef>> {
        match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => Ok(data.borrow().prototype().cloned()),
            ObjectKind::Proxy(proxy) => proxy.get_prototype_of(),
        }
    }

    /// `[[SetPrototypeOf]]`
    ///
    /// Ordinary objects refuse when non-extensible or when the new chain
    /// would loop back to `self`.
    pub fn set_prototype_of(&self, prototype: Option<ObjectRef>) -> ObjectResult<bool> {
        let data = match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => data,
            ObjectKind::Proxy(proxy) => return proxy.set_prototype_of(prototype),
        };

        {
            let current = data.borrow();
            if same_prototype(current.prototype(), prototype.as_ref()) {
                return Ok(true);
            }
            if !current.is_extensible() {
                return Ok(false);
            }
        }

        let mut cursor = prototype.clone();
        while let Some(obj) = cursor {
            if obj.ptr_eq(self) {
                return Ok(false);
            }
            match obj.ordinary_data() {
                Some(next) => cursor = next.borrow().prototype().cloned(),
                // Proxies may compute their prototype; stop looking
                None => break,
            }
        }

        data.borrow_mut().replace_prototype(prototype);
        Ok(true)
    }

    /// `[[IsExtensible]]`
    pub fn is_extensible(&self) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => Ok(data.borrow().is_extensible()),
            ObjectKind::Proxy(proxy) => proxy.is_extensible(),
        }
    }

    /// `[[PreventExtensions]]`
    pub fn prevent_extensions(&self) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => {
                data.borrow_mut().prevent_extensions();
                Ok(true)
            }
            ObjectKind::Proxy(proxy) => proxy.prevent_extensions(),
        }
    }

    /// `[[GetOwnProperty]]`
    pub fn get_own_property(&self, key: &PropertyKey) -> ObjectResult<Option<PropertyDescriptor>> {
        match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => Ok(data.borrow().get_own_property(key).cloned()),
            ObjectKind::Proxy(proxy) => proxy.get_own_property(key),
        }
    }

    /// `[[DefineOwnProperty]]`
    pub fn define_own_property(
        &self,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> ObjectResult<bool> {
        desc.validate()?;
        match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => {
                Ok(data.borrow_mut().define_own_property(key, &desc))
            }
            ObjectKind::Proxy(proxy) => proxy.define_own_property(key, desc),
        }
    }

    /// `[[HasProperty]]` (walks the prototype chain)
    pub fn has_property(&self, key: &PropertyKey) -> ObjectResult<bool> {
        let data = match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => data,
            ObjectKind::Proxy(proxy) => return proxy.has(key),
        };
        let prototype = {
            let data = data.borrow();
            if data.has_own_property(key) {
                return Ok(true);
            }
            data.prototype().cloned()
        };
        match prototype {
            Some(proto) => proto.has_property(key),
            None => Ok(false),
        }
    }

    /// `[[Get]]`
    ///
    /// Getters run with `receiver` as `this`.
    pub fn get(&self, key: &PropertyKey, receiver: &Value) -> ObjectResult<Value> {
        let data = match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => data,
            ObjectKind::Proxy(proxy) => return proxy.get(key, receiver),
        };
        let (own, prototype) = {
            let data = data.borrow();
            (data.get_own_property(key).cloned(), data.prototype().cloned())
        };
        match own {
            None => match prototype {
                Some(proto) => proto.get(key, receiver),
                None => Ok(Value::Undefined),
            },
            Some(desc) if desc.is_accessor() => match desc.getter() {
                Some(getter) => getter.call(receiver, &[]),
                None => Ok(Value::Undefined),
            },
            Some(desc) => Ok(desc.value.unwrap_or_default()),
        }
    }

    /// `[[Set]]`
    ///
    /// Data writes land on `receiver` (through its own internal methods, so
    /// a proxy receiver sees `get_own_property`/`define_own_property`);
    /// setters run with `receiver` as `this`.
    pub fn set(&self, key: &PropertyKey, value: Value, receiver: &Value) -> ObjectResult<bool> {
        let data = match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => data,
            ObjectKind::Proxy(proxy) => return proxy.set(key, value, receiver),
        };
        let (own, prototype) = {
            let data = data.borrow();
            (data.get_own_property(key).cloned(), data.prototype().cloned())
        };
        let own = match own {
            Some(desc) => desc,
            None => match prototype {
                Some(proto) => return proto.set(key, value, receiver),
                None => PropertyDescriptor::data(Value::Undefined),
            },
        };

        if own.is_accessor() {
            return match own.setter() {
                Some(setter) => {
                    setter.call(receiver, &[value])?;
                    Ok(true)
                }
                None => Ok(false),
            };
        }

        if !own.is_writable() {
            return Ok(false);
        }
        let receiver = match receiver {
            Value::Object(obj) => obj,
            _ => return Ok(false),
        };
        match receiver.get_own_property(key)? {
            Some(existing) => {
                if existing.is_accessor() || !existing.is_writable() {
                    return Ok(false);
                }
                receiver.define_own_property(key, PropertyDescriptor::new().with_value(value))
            }
            None => receiver.define_own_property(key, PropertyDescriptor::data(value)),
        }
    }

    /// `[[Delete]]`
    pub fn delete(&self, key: &PropertyKey) -> ObjectResult<bool> {
        match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => Ok(data.borrow_mut().delete(key)),
            ObjectKind::Proxy(proxy) => proxy.delete(key),
        }
    }

    /// `[[OwnPropertyKeys]]`
    pub fn own_property_keys(&self) -> ObjectResult<Vec<PropertyKey>> {
        match &self.0.kind {
            ObjectKind::Ordinary { data, .. } => Ok(data.borrow().own_property_keys()),
            ObjectKind::Proxy(proxy) => proxy.own_keys(),
        }
    }

    /// `[[Call]]`
    pub fn call(&self, this: &Value, args: &[Value]) -> ObjectResult<Value> {
        match &self.0.kind {
            ObjectKind::Ordinary {
                call: Some(body), ..
            } => {
                let body = Rc::clone(body);
                body(this, args)
            }
            ObjectKind::Ordinary { call: None, .. } => Err(ObjectError::NotCallable(format!(
                "object {} is not a function",
                self.0.id
            ))),
            ObjectKind::Proxy(proxy) => {
                if !proxy.target().is_callable() {
                    return Err(ObjectError::NotCallable(format!(
                        "proxy {} is not a function",
                        self.0.id
                    )));
                }
                proxy.call(this, args)
            }
        }
    }
}

fn same_prototype(a: Option<&ObjectRef>, b: Option<&ObjectRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.ptr_eq(b),
        _ => false,
    }
}

// ============================================================================
// Strict and convenience operations
// ============================================================================

impl ObjectRef {
    /// Read `key` with `self` as receiver
    pub fn get_value(&self, key: impl Into<PropertyKey>) -> ObjectResult<Value> {
        self.get(&key.into(), &self.as_receiver())
    }

    /// Write `key` with `self` as receiver; reports rejection as `false`
    pub fn set_value(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> ObjectResult<bool> {
        self.set(&key.into(), value.into(), &self.as_receiver())
    }

    /// Write `key`, failing with `ProtocolViolation` on rejection
    pub fn put(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> ObjectResult<()> {
        let key = key.into();
        if self.set(&key, value.into(), &self.as_receiver())? {
            Ok(())
        } else {
            Err(ObjectError::ProtocolViolation(format!(
                "cannot assign to read only property '{}' of object {}",
                key, self.0.id
            )))
        }
    }

    /// Define a property, failing with `ProtocolViolation` on rejection
    pub fn define_property(
        &self,
        key: impl Into<PropertyKey>,
        desc: PropertyDescriptor,
    ) -> ObjectResult<()> {
        let key = key.into();
        if self.define_own_property(&key, desc)? {
            Ok(())
        } else {
            Err(ObjectError::ProtocolViolation(format!(
                "cannot define property '{}' on object {}",
                key, self.0.id
            )))
        }
    }

    /// Delete a property, failing with `ProtocolViolation` on rejection
    pub fn delete_property(&self, key: impl Into<PropertyKey>) -> ObjectResult<()> {
        let key = key.into();
        if self.delete(&key)? {
            Ok(())
        } else {
            Err(ObjectError::ProtocolViolation(format!(
                "cannot delete property '{}' of object {}",
                key, self.0.id
            )))
        }
    }

    /// Replace the prototype, failing with `ProtocolViolation` on rejection
    pub fn set_prototype(&self, prototype: Option<ObjectRef>) -> ObjectResult<()> {
        if self.set_prototype_of(prototype)? {
            Ok(())
        } else {
            Err(ObjectError::ProtocolViolation(format!(
                "cannot set prototype of object {}",
                self.0.id
            )))
        }
    }

    /// Prevent extensions, failing with `ProtocolViolation` on rejection
    pub fn prevent_extensions_strict(&self) -> ObjectResult<()> {
        if self.prevent_extensions()? {
            Ok(())
        } else {
            Err(ObjectError::ProtocolViolation(format!(
                "cannot prevent extensions of object {}",
                self.0.id
            )))
        }
    }

    /// Check for an own property
    pub fn has_own_property(&self, key: impl Into<PropertyKey>) -> ObjectResult<bool> {
        Ok(self.get_own_property(&key.into())?.is_some())
    }

    /// Check for a property anywhere on the prototype chain
    pub fn has(&self, key: impl Into<PropertyKey>) -> ObjectResult<bool> {
        self.has_property(&key.into())
    }

    /// Own string keys, including non-enumerable ones
    pub fn own_property_names(&self) -> ObjectResult<Vec<PropertyKey>> {
        Ok(self
            .own_property_keys()?
            .into_iter()
            .filter(PropertyKey::is_string)
            .collect())
    }

    /// Own symbol keys
    pub fn own_property_symbols(&self) -> ObjectResult<Vec<PropertyKey>> {
        Ok(self
            .own_property_keys()?
            .into_iter()
            .filter(PropertyKey::is_symbol)
            .collect())
    }

    /// Own enumerable string keys
    pub fn keys(&self) -> ObjectResult<Vec<PropertyKey>> {
        let mut keys = Vec::new();
        for key in self.own_property_names()? {
            if let Some(desc) = self.get_own_property(&key)? {
                if desc.is_enumerable() {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }

    /// Make the object non-extensible and every property non-configurable
    /// and (for data properties) non-writable
    pub fn freeze(&self) -> ObjectResult<()> {
        self.set_integrity_level(true)
    }

    /// Make the object non-extensible and every property non-configurable
    pub fn seal(&self) -> ObjectResult<()> {
        self.set_integrity_level(false)
    }

    fn set_integrity_level(&self, frozen: bool) -> ObjectResult<()> {
        self.prevent_extensions_strict()?;
        for key in self.own_property_keys()? {
            let mut patch = PropertyDescriptor::new().with_configurable(false);
            if frozen {
                match self.get_own_property(&key)? {
                    Some(current) if current.is_data() => patch = patch.with_writable(false),
                    Some(_) => {}
                    None => continue,
                }
            }
            self.define_property(key, patch)?;
        }
        Ok(())
    }

    /// Check whether the object is frozen
    pub fn is_frozen(&self) -> ObjectResult<bool> {
        if self.is_extensible()? {
            return Ok(false);
        }
        for key in self.own_property_keys()? {
            if let Some(desc) = self.get_own_property(&key)? {
                if desc.is_configurable() || (desc.is_data() && desc.is_writable()) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
