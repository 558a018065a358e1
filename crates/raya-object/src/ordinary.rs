//! Ordinary object storage
//!
//! Own properties live in an insertion-ordered map so key enumeration
//! follows the usual order: array indices ascending, then string keys in
//! creation order, then symbols in creation order.

use crate::descriptor::{is_compatible_descriptor, PropertyDescriptor};
use crate::key::PropertyKey;
use crate::object::ObjectRef;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// Object class tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    /// Plain object
    Object,
    /// Array (index keys plus `length`)
    Array,
    /// Callable native function
    Function,
}

/// Own state of an ordinary object
#[derive(Debug)]
pub struct OrdinaryObject {
    properties: IndexMap<PropertyKey, PropertyDescriptor, FxBuildHasher>,
    prototype: Option<ObjectRef>,
    extensible: bool,
    class: ObjectClass,
}

impl OrdinaryObject {
    /// Create an empty, extensible object
    pub fn new(class: ObjectClass, prototype: Option<ObjectRef>) -> Self {
        Self {
            properties: IndexMap::default(),
            prototype,
            extensible: true,
            class,
        }
    }

    /// Class tag
    pub fn class(&self) -> ObjectClass {
        self.class
    }

    /// `[[Prototype]]`
    pub fn prototype(&self) -> Option<&ObjectRef> {
        self.prototype.as_ref()
    }

    /// Replace `[[Prototype]]` without any checks
    pub(crate) fn replace_prototype(&mut self, prototype: Option<ObjectRef>) {
        self.prototype = prototype;
    }

    /// `[[Extensible]]`
    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// Clear `[[Extensible]]`
    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }

    /// Own property descriptor for `key`
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.properties.get(key)
    }

    /// Does this object have an own property `key`?
    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    /// Define or update a property
    ///
    /// Returns `false` when the update is incompatible with the current
    /// property or the object is not extensible.
    pub fn define_own_property(&mut self, key: &PropertyKey, desc: &PropertyDescriptor) -> bool {
        let current = self.properties.get(key);
        if !is_compatible_descriptor(self.extensible, desc, current) {
            return false;
        }
        let next = match current {
            Some(current) => current.merge(desc),
            None => desc.clone().complete(),
        };
        // Updating an existing key keeps its position
        self.properties.insert(key.clone(), next);
        true
    }

    /// Insert a property without validation (object construction only)
    pub(crate) fn insert_property(&mut self, key: PropertyKey, desc: PropertyDescriptor) {
        self.properties.insert(key, desc.complete());
    }

    /// Delete a property. Returns `false` if it is non-configurable.
    pub fn delete(&mut self, key: &PropertyKey) -> bool {
        match self.properties.get(key) {
            Some(desc) if !desc.is_configurable() => false,
            Some(_) => {
                self.properties.shift_remove(key);
                true
            }
            None => true,
        }
    }

    /// Own keys: array indices ascending, then strings, then symbols
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<(u32, PropertyKey)> = Vec::new();
        let mut strings = Vec::new();
        let mut symbols = Vec::new();

        for key in self.properties.keys() {
            if key.is_symbol() {
                symbols.push(key.clone());
            } else if let Some(index) = key.array_index() {
                indices.push((index, key.clone()));
            } else {
                strings.push(key.clone());
            }
        }

        indices.sort_by_key(|(index, _)| *index);
        let mut keys: Vec<PropertyKey> = indices.into_iter().map(|(_, key)| key).collect();
        keys.extend(strings);
        keys.extend(symbols);
        keys
    }

    /// Number of own properties
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}
