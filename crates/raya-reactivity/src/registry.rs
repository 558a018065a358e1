//! Identity registries
//!
//! `view_by_raw` is split per proxied view kind, `raw_by_view` is shared.
//! Both sides are held weakly: a view keeps its raw value alive through its
//! handler, nothing here keeps anything alive.

use crate::kind::ViewKind;
use raya_object::{ObjectRef, WeakObjectMap, WeakObjectRef};

struct ViewRecord {
    raw: WeakObjectRef,
    kind: ViewKind,
}

/// Raw/view association for one membrane
#[derive(Default)]
pub(crate) struct IdentityRegistry {
    view_by_raw: [WeakObjectMap<WeakObjectRef>; 4],
    raw_by_view: WeakObjectMap<ViewRecord>,
    refs: WeakObjectMap<()>,
}

impl IdentityRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cached view of `raw` for `kind`
    pub(crate) fn view_for(&self, kind: ViewKind, raw: &ObjectRef) -> Option<ObjectRef> {
        let slot = kind.slot()?;
        self.view_by_raw[slot].get_live(raw)
    }

    /// Underlying object and kind of `view`
    pub(crate) fn raw_for(&self, view: &ObjectRef) -> Option<(ObjectRef, ViewKind)> {
        let record = self.raw_by_view.get(view)?;
        record.raw.upgrade().map(|raw| (raw, record.kind))
    }

    /// Record a freshly created view in both directions
    pub(crate) fn register(&mut self, kind: ViewKind, raw: &ObjectRef, view: &ObjectRef) {
        if let Some(slot) = kind.slot() {
            self.view_by_raw[slot].insert(raw, view.downgrade());
        }
        self.raw_by_view.insert(
            view,
            ViewRecord {
                raw: raw.downgrade(),
                kind,
            },
        );
    }

    pub(crate) fn register_ref(&mut self, reference: &ObjectRef) {
        self.refs.insert(reference, ());
    }

    pub(crate) fn is_ref(&self, obj: &ObjectRef) -> bool {
        self.refs.contains_key(obj)
    }
}
