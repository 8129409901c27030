//! Explicit serialization marker checks.

use tracing::trace;

use super::hierarchy::ancestors_of;
use crate::types::{Lineage, TypeDescriptor, TypeOrigin};

/// Decides whether a type opted in to serialization through its marker.
///
/// The marker is inherited: a type is marked if it or any ancestor class or
/// interface carries it. Being able to serialize itself is not the same as
/// being trusted, so the marker is ignored on types that implement the custom
/// serialization protocol (directly or through an ancestor) or name their own
/// default serializer. Markers on types loaded from attachments are ignored
/// as well, since the attachment author chose them.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationInspector;

impl AnnotationInspector {
    /// Create an inspector.
    pub fn new() -> Self {
        Self
    }

    /// Whether `ty` is admitted by its (possibly inherited) marker.
    pub fn is_explicitly_allowed(&self, ty: &TypeDescriptor) -> bool {
        if ty.origin() == TypeOrigin::Attachment {
            trace!(type_name = ty.name(), "marker ignored on attachment type");
            return false;
        }
        if ty.markers().default_serializer.is_some() {
            trace!(type_name = ty.name(), "marker ignored on type naming its own serializer");
            return false;
        }
        let lineage = lineage_of(ty);
        !lineage.custom_serialization && lineage.marked
    }
}

/// Inherited marker facts for `ty`, cached on the descriptor.
pub(crate) fn lineage_of(ty: &TypeDescriptor) -> Lineage {
    *ty.lineage_cell().get_or_init(|| {
        let own = ty.markers();
        let mut lineage = Lineage {
            marked: own.serializable,
            custom_serialization: own.custom_serialization,
        };
        for ancestor in ancestors_of(ty) {
            let markers = ancestor.descriptor.markers();
            lineage.marked |= markers.serializable;
            lineage.custom_serialization |= markers.custom_serialization;
            if lineage.marked && lineage.custom_serialization {
                break;
            }
        }
        lineage
    })
}
