//! The conversion pass between surface and native representations.
//!
//! Both directions are pure, synchronous, and driven entirely by the
//! declared mapping: no shape is ever inferred from the value beyond its own
//! discriminant. An unknown label or constructor index is a loud error,
//! never a silently wrong index.

use crate::error::BridgeError;
use crate::runtime::native::NativeValue;
use crate::runtime::surface::SurfaceValue;
use crate::schema::{CaseRef, Mapping, Presence, RecordMapping, VariantMapping};

// ============================================================================
// Surface -> native
// ============================================================================

pub fn to_native(value: &SurfaceValue, mapping: &Mapping) -> Result<NativeValue, BridgeError> {
    match mapping {
        Mapping::Bool => match value {
            SurfaceValue::Bool(b) => Ok(NativeValue::Bool(*b)),
            other => Err(BridgeError::shape("bool", other.kind())),
        },
        Mapping::Int => match value {
            SurfaceValue::Int(n) => Ok(NativeValue::Int(*n)),
            other => Err(BridgeError::shape("int", other.kind())),
        },
        Mapping::Float => match value {
            SurfaceValue::Float(x) => Ok(NativeValue::Float(*x)),
            other => Err(BridgeError::shape("float", other.kind())),
        },
        Mapping::Str => match value {
            SurfaceValue::Str(s) => Ok(NativeValue::Str(s.clone())),
            other => Err(BridgeError::shape("string", other.kind())),
        },
        Mapping::Unit => match value {
            SurfaceValue::Undefined => Ok(NativeValue::Unit),
            other => Err(BridgeError::shape("undefined", other.kind())),
        },
        Mapping::Opaque => Ok(match value {
            // A value that originated natively unwraps back to itself.
            SurfaceValue::Foreign(native) => (**native).clone(),
            other => NativeValue::Foreign(Box::new(other.clone())),
        }),
        Mapping::Option(inner) => match value {
            SurfaceValue::Undefined => Ok(NativeValue::Undefined),
            other => to_native(other, inner),
        },
        Mapping::Array(elem) => match value {
            SurfaceValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(to_native(item, elem)?);
                }
                Ok(NativeValue::Array(out))
            }
            other => Err(BridgeError::shape("array", other.kind())),
        },
        Mapping::List(elem) => match value {
            SurfaceValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(to_native(item, elem)?);
                }
                Ok(NativeValue::list_from(out))
            }
            other => Err(BridgeError::shape("array", other.kind())),
        },
        Mapping::Record(rec) => record_to_native(value, rec),
        Mapping::Variant(var) => variant_to_native(value, var),
    }
}

/// Convert one named member (record field or named parameter), applying the
/// declared absence rule. A key that is missing and a key holding `undefined`
/// are the same condition on the surface side.
pub(crate) fn member_to_native(
    found: Option<&SurfaceValue>,
    name: &str,
    mapping: &Mapping,
    presence: &Presence,
) -> Result<NativeValue, BridgeError> {
    let present = match found {
        Some(SurfaceValue::Undefined) | None => None,
        Some(value) => Some(value),
    };

    match (present, presence) {
        (Some(value), _) => to_native(value, mapping),
        (None, Presence::Optional) => Ok(NativeValue::Undefined),
        (None, Presence::Defaulted(default)) => Ok(default.clone()),
        (None, Presence::Required) => {
            if absorbs_absence(mapping) {
                to_native(&SurfaceValue::Undefined, mapping)
            } else {
                Err(BridgeError::MissingField {
                    field: name.to_string(),
                })
            }
        }
    }
}

/// Mappings for which `undefined` is itself a convertible value.
fn absorbs_absence(mapping: &Mapping) -> bool {
    matches!(mapping, Mapping::Option(_) | Mapping::Unit | Mapping::Opaque)
}

fn record_to_native(value: &SurfaceValue, rec: &RecordMapping) -> Result<NativeValue, BridgeError> {
    if !matches!(value, SurfaceValue::Object(_)) {
        return Err(BridgeError::shape("object", value.kind()));
    }
    // One slot per declared field, in declaration order. Surface fields not
    // named by the declaration are ignored.
    let mut slots = Vec::with_capacity(rec.width());
    for field in &rec.fields {
        let found = value.field(&field.name);
        slots.push(member_to_native(
            found,
            &field.name,
            &field.mapping,
            &field.presence,
        )?);
    }
    Ok(NativeValue::Tuple(slots))
}

fn variant_to_native(value: &SurfaceValue, var: &VariantMapping) -> Result<NativeValue, BridgeError> {
    match value {
        SurfaceValue::Label(label) => match var.case_ref(label) {
            Some(CaseRef::Nullary(rank)) => Ok(NativeValue::Int(rank as i64)),
            Some(CaseRef::Block(_, _)) => Err(BridgeError::shape(
                format!("payload for constructor '{}'", label),
                "bare label",
            )),
            None => Err(BridgeError::UnknownLabel {
                label: label.clone(),
            }),
        },
        SurfaceValue::Tagged { label, value } => match var.case_ref(label) {
            Some(CaseRef::Block(tag, payload_mapping)) => {
                let payload = to_native(value, payload_mapping)?;
                Ok(NativeValue::block(tag, vec![payload]))
            }
            Some(CaseRef::Nullary(_)) => Err(BridgeError::shape(
                format!("bare label '{}'", label),
                "tagged value",
            )),
            None => Err(BridgeError::UnknownLabel {
                label: label.clone(),
            }),
        },
        other => Err(BridgeError::shape(
            "variant label or tagged value",
            other.kind(),
        )),
    }
}

// ============================================================================
// Native -> surface
// ============================================================================

pub fn from_native(value: &NativeValue, mapping: &Mapping) -> Result<SurfaceValue, BridgeError> {
    match mapping {
        Mapping::Bool => match value {
            NativeValue::Bool(b) => Ok(SurfaceValue::Bool(*b)),
            other => Err(BridgeError::shape("bool", other.kind())),
        },
        Mapping::Int => match value {
            NativeValue::Int(n) => Ok(SurfaceValue::Int(*n)),
            other => Err(BridgeError::shape("int", other.kind())),
        },
        Mapping::Float => match value {
            NativeValue::Float(x) => Ok(SurfaceValue::Float(*x)),
            other => Err(BridgeError::shape("float", other.kind())),
        },
        Mapping::Str => match value {
            NativeValue::Str(s) => Ok(SurfaceValue::Str(s.clone())),
            other => Err(BridgeError::shape("string", other.kind())),
        },
        Mapping::Unit => match value {
            NativeValue::Unit => Ok(SurfaceValue::Undefined),
            other => Err(BridgeError::shape("unit", other.kind())),
        },
        Mapping::Opaque => Ok(match value {
            // A value that originated on the surface unwraps back to itself.
            NativeValue::Foreign(surface) => (**surface).clone(),
            other => SurfaceValue::Foreign(Box::new(other.clone())),
        }),
        Mapping::Option(inner) => match value {
            NativeValue::Undefined => Ok(SurfaceValue::Undefined),
            other => from_native(other, inner),
        },
        Mapping::Array(elem) => match value {
            NativeValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(from_native(item, elem)?);
                }
                Ok(SurfaceValue::Array(out))
            }
            other => Err(BridgeError::shape("array", other.kind())),
        },
        Mapping::List(elem) => match value.list_items() {
            Some(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in &items {
                    out.push(from_native(item, elem)?);
                }
                Ok(SurfaceValue::Array(out))
            }
            None => Err(BridgeError::shape("cons list", value.kind())),
        },
        Mapping::Record(rec) => record_from_native(value, rec),
        Mapping::Variant(var) => variant_from_native(value, var),
    }
}

fn record_from_native(value: &NativeValue, rec: &RecordMapping) -> Result<SurfaceValue, BridgeError> {
    let slots = match value.as_tuple() {
        Some(slots) => slots,
        None => return Err(BridgeError::shape("tuple", value.kind())),
    };
    if slots.len() != rec.width() {
        return Err(BridgeError::shape(
            format!("tuple of width {}", rec.width()),
            format!("tuple of width {}", slots.len()),
        ));
    }
    let mut pairs = Vec::with_capacity(rec.width());
    for (field, slot) in rec.fields.iter().zip(slots) {
        // The canonical surface form omits absent optional fields.
        if matches!(slot, NativeValue::Undefined)
            && matches!(field.presence, Presence::Optional)
        {
            continue;
        }
        pairs.push((field.name.clone(), from_native(slot, &field.mapping)?));
    }
    Ok(SurfaceValue::Object(pairs))
}

fn variant_from_native(
    value: &NativeValue,
    var: &VariantMapping,
) -> Result<SurfaceValue, BridgeError> {
    match value {
        NativeValue::Int(n) => {
            let rank = if *n >= 0 && *n <= u32::MAX as i64 {
                *n as u32
            } else {
                return Err(BridgeError::UnknownNullaryIndex { index: *n });
            };
            match var.nullary_label(rank) {
                Some(label) => Ok(SurfaceValue::label(label)),
                None => Err(BridgeError::UnknownNullaryIndex { index: *n }),
            }
        }
        NativeValue::Block { tag, payload } => match var.block_case(*tag) {
            Some((label, payload_mapping)) => {
                if payload.len() != 1 {
                    return Err(BridgeError::shape(
                        "block payload of width 1",
                        format!("width {}", payload.len()),
                    ));
                }
                let inner = from_native(&payload[0], payload_mapping)?;
                Ok(SurfaceValue::tagged(label, inner))
            }
            None => Err(BridgeError::UnknownBlockTag { tag: *tag }),
        },
        other => Err(BridgeError::shape(
            "constructor index or block",
            other.kind(),
        )),
    }
}
