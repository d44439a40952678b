//! The declaration record and its kind-dependent payload.
//!
//! A [`DeclRecord`] has a fixed shape: a kind tag, an attribute bitset, a
//! name, two generic link fields (`next` and `link`), the head of its
//! attribute annotation list, and a [`Payload`] whose variant is fixed by
//! the kind at creation time. Reading a payload under the wrong kind is
//! impossible: the variant either matches or the accessor yields zero.

use crate::attrs::DeclAttrs;
use crate::id::{DeclId, NameOffset};
use crate::kind::DeclKind;

/// Kind-specific data attached to a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Payload {
    /// The kind carries no payload.
    #[default]
    None,
    /// Bit width (intrinsic, pointer, enum, set, field).
    Width(u64),
    /// Element count (array). Zero marks an incomplete array.
    Count(u64),
    /// Signed integer value (constant, value).
    Value(i64),
    /// Address (variable, uniform, function).
    Address(u64),
}

impl Payload {
    /// The zero payload appropriate for `kind`.
    pub fn empty_for(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Intrinsic
            | DeclKind::Pointer
            | DeclKind::Enum
            | DeclKind::Set
            | DeclKind::Field => Self::Width(0),
            DeclKind::Array => Self::Count(0),
            DeclKind::Constant | DeclKind::Value => Self::Value(0),
            DeclKind::Variable | DeclKind::Uniform | DeclKind::Function => Self::Address(0),
            _ => Self::None,
        }
    }

    /// The payload as raw 64-bit storage.
    pub fn raw(self) -> u64 {
        match self {
            Self::None => 0,
            Self::Width(v) | Self::Count(v) | Self::Address(v) => v,
            Self::Value(v) => v as u64,
        }
    }

    /// Rebuild a payload for `kind` from raw storage.
    ///
    /// Returns `None` when `kind` carries no payload but `raw` is non-zero,
    /// since such bytes could not be reproduced on re-encoding.
    pub fn from_raw(kind: DeclKind, raw: u64) -> Option<Self> {
        match Self::empty_for(kind) {
            Self::None if raw != 0 => None,
            Self::None => Some(Self::None),
            Self::Width(_) => Some(Self::Width(raw)),
            Self::Count(_) => Some(Self::Count(raw)),
            Self::Value(_) => Some(Self::Value(raw as i64)),
            Self::Address(_) => Some(Self::Address(raw)),
        }
    }
}

/// One entry of the declaration arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeclRecord {
    /// Kind tag. Immutable after creation.
    pub kind: DeclKind,
    /// Attribute flags.
    pub attrs: DeclAttrs,
    /// Name offset into the owning database's string pool.
    pub name: NameOffset,
    /// Next sibling at the same nesting level. Set once.
    pub next: DeclId,
    /// Child-list head (containers) or referenced type (others). Set once.
    pub link: DeclId,
    /// Head of the attribute annotation list. Set once.
    pub attr: DeclId,
    /// Kind-specific payload.
    pub payload: Payload,
}

impl DeclRecord {
    /// The all-zero record. Index 0 of every arena holds one.
    pub const ZERO: Self = Self {
        kind: DeclKind::Void,
        attrs: DeclAttrs::empty(),
        name: NameOffset::EMPTY,
        next: DeclId::NULL,
        link: DeclId::NULL,
        attr: DeclId::NULL,
        payload: Payload::None,
    };

    /// A fresh record of `kind` with all links and payload zeroed.
    pub fn new(kind: DeclKind, attrs: DeclAttrs) -> Self {
        Self {
            kind,
            attrs,
            payload: Payload::empty_for(kind),
            ..Self::ZERO
        }
    }

    /// Whether this record is indistinguishable from the sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Stored bit width, or 0 if the payload is not a width.
    pub fn width(&self) -> u64 {
        match self.payload {
            Payload::Width(w) => w,
            _ => 0,
        }
    }

    /// Stored element count, or 0 if the payload is not a count.
    pub fn count(&self) -> u64 {
        match self.payload {
            Payload::Count(n) => n,
            _ => 0,
        }
    }

    /// Stored integer value, or 0 if the payload is not a value.
    pub fn value(&self) -> i64 {
        match self.payload {
            Payload::Value(v) => v,
            _ => 0,
        }
    }

    /// Stored address, or 0 if the payload is not an address.
    pub fn address(&self) -> u64 {
        match self.payload {
            Payload::Address(a) => a,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_record_has_matching_payload() {
        assert_eq!(
            DeclRecord::new(DeclKind::Array, DeclAttrs::empty()).payload,
            Payload::Count(0)
        );
        assert_eq!(
            DeclRecord::new(DeclKind::Struct, DeclAttrs::TOP).payload,
            Payload::None
        );
    }

    #[test]
    fn zero_record_is_default() {
        assert!(DeclRecord::default().is_zero());
        assert!(!DeclRecord::new(DeclKind::Typedef, DeclAttrs::empty()).is_zero());
    }

    #[test]
    fn mismatched_payload_reads_zero() {
        let mut r = DeclRecord::new(DeclKind::Constant, DeclAttrs::empty());
        r.payload = Payload::Value(-5);
        assert_eq!(r.value(), -5);
        assert_eq!(r.width(), 0);
        assert_eq!(r.count(), 0);
        assert_eq!(r.address(), 0);
    }

    #[test]
    fn payloadless_kind_rejects_nonzero_raw() {
        assert_eq!(Payload::from_raw(DeclKind::Struct, 0), Some(Payload::None));
        assert_eq!(Payload::from_raw(DeclKind::Struct, 1), None);
    }

    proptest! {
        #[test]
        fn raw_round_trip(tag in 0u8..17, raw in any::<u64>()) {
            let kind = DeclKind::from_u8(tag).unwrap();
            if let Some(p) = Payload::from_raw(kind, raw) {
                prop_assert_eq!(p.raw(), raw);
            } else {
                prop_assert_eq!(Payload::empty_for(kind), Payload::None);
            }
        }
    }
}
