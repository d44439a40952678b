//! Bit-level size and alignment of type records.
//!
//! Widths are in bits. Scalars (intrinsics, pointers, enums, sets) are
//! stored in the smallest power-of-two unit of at least one byte, and
//! align to that unit, capped at 128 bits. Structs lay out their fields in
//! order, packing adjacent bitfields that fit in the current storage unit;
//! unions take their largest member. Aggregates round their size up to
//! their alignment.
//!
//! Resolution depth is bounded so that a corrupt typedef cycle yields 0
//! instead of recursing without end. A struct or union that contains
//! itself, directly or through other aggregates, contributes 0 bits at the
//! point of re-entry.

use indexmap::IndexMap;
use refl_core::{DeclAttrs, DeclId, DeclKind};
use smallvec::SmallVec;

use crate::handle::DeclRef;

/// Maximum typedef/field/array nesting followed before giving up.
pub const MAX_DEPTH: u32 = 64;

const BYTE: u64 = 8;
const MAX_SCALAR_ALIGN: u64 = 128;

/// Declared width of `r` in bits, or 0 if `r` is not a type.
pub(crate) fn width(r: DeclRef<'_>) -> u64 {
    Resolver::default().width_at(r, 0)
}

/// Alignment of `r` in bits, or 0 if `r` is not a type.
pub(crate) fn align(r: DeclRef<'_>) -> u64 {
    Resolver::default().align_at(r, 0)
}

fn scalar_storage(bits: u64) -> u64 {
    if bits == 0 {
        0
    } else {
        bits.max(BYTE).checked_next_power_of_two().unwrap_or(bits)
    }
}

fn scalar_align(bits: u64) -> u64 {
    scalar_storage(bits).clamp(BYTE, MAX_SCALAR_ALIGN)
}

fn align_up(offset: u64, to: u64) -> u64 {
    if to == 0 {
        offset
    } else {
        offset.div_ceil(to).saturating_mul(to)
    }
}

fn is_bitfield(r: DeclRef<'_>) -> bool {
    r.kind() == DeclKind::Field && r.attrs().contains(DeclAttrs::BITFIELD)
}

/// State of one width or alignment resolution.
///
/// Each struct or union is resolved at most once per pass. An aggregate
/// reached again while its own members are still being resolved counts as
/// 0 bits, so cyclic graphs terminate and shared members are not re-walked.
#[derive(Default)]
struct Resolver {
    sizing: SmallVec<[DeclId; 8]>,
    aligning: SmallVec<[DeclId; 8]>,
    widths: IndexMap<DeclId, u64>,
    aligns: IndexMap<DeclId, u64>,
}

impl Resolver {
    fn width_at(&mut self, r: DeclRef<'_>, depth: u32) -> u64 {
        if r.is_null() || depth > MAX_DEPTH {
            return 0;
        }
        match r.kind() {
            DeclKind::Intrinsic | DeclKind::Pointer | DeclKind::Enum | DeclKind::Set => {
                r.record().width()
            }
            DeclKind::Typedef => self.width_at(r.link(), depth + 1),
            DeclKind::Field if is_bitfield(r) => r.record().width(),
            DeclKind::Field => self.width_at(r.link(), depth + 1),
            DeclKind::Array => r
                .record()
                .count()
                .saturating_mul(self.storage_at(r.link(), depth + 1)),
            DeclKind::Struct | DeclKind::Union => self.aggregate_width(r, depth),
            _ => 0,
        }
    }

    /// Bits occupied when `r` is placed inside an aggregate or array.
    fn storage_at(&mut self, r: DeclRef<'_>, depth: u32) -> u64 {
        if r.is_null() || depth > MAX_DEPTH {
            return 0;
        }
        match r.kind() {
            DeclKind::Intrinsic | DeclKind::Pointer | DeclKind::Enum | DeclKind::Set => {
                scalar_storage(r.record().width())
            }
            DeclKind::Typedef | DeclKind::Field => self.storage_at(r.link(), depth + 1),
            DeclKind::Array | DeclKind::Struct | DeclKind::Union => self.width_at(r, depth),
            _ => 0,
        }
    }

    fn align_at(&mut self, r: DeclRef<'_>, depth: u32) -> u64 {
        if r.is_null() || depth > MAX_DEPTH {
            return 0;
        }
        match r.kind() {
            DeclKind::Intrinsic | DeclKind::Pointer | DeclKind::Enum | DeclKind::Set => {
                scalar_align(r.record().width())
            }
            DeclKind::Typedef | DeclKind::Field | DeclKind::Array => {
                self.align_at(r.link(), depth + 1)
            }
            DeclKind::Struct | DeclKind::Union => self.aggregate_align(r, depth),
            _ => 0,
        }
    }

    fn aggregate_width(&mut self, r: DeclRef<'_>, depth: u32) -> u64 {
        let id = r.id();
        if let Some(&w) = self.widths.get(&id) {
            return w;
        }
        if self.sizing.contains(&id) {
            return 0;
        }
        self.sizing.push(id);
        let w = if r.kind() == DeclKind::Struct {
            self.struct_layout(r, depth)
        } else {
            self.union_layout(r, depth)
        };
        self.sizing.pop();
        self.widths.insert(id, w);
        w
    }

    fn aggregate_align(&mut self, r: DeclRef<'_>, depth: u32) -> u64 {
        let id = r.id();
        if let Some(&a) = self.aligns.get(&id) {
            return a;
        }
        if self.aligning.contains(&id) {
            return 0;
        }
        self.aligning.push(id);
        let mut a = BYTE;
        for member in r.children().filter(|m| m.kind() == DeclKind::Field) {
            a = a.max(self.align_at(member, depth + 1));
        }
        self.aligning.pop();
        self.aligns.insert(id, a);
        a
    }

    fn struct_layout(&mut self, r: DeclRef<'_>, depth: u32) -> u64 {
        let mut offset = 0u64;
        let mut max_align = BYTE;
        for member in r.children().filter(|m| m.kind() == DeclKind::Field) {
            let member_align = self.align_at(member, depth + 1).max(BYTE);
            max_align = max_align.max(member_align);
            if is_bitfield(member) {
                let bits = member.record().width();
                let unit = self.storage_at(member.link(), depth + 1).max(BYTE);
                if bits == 0 {
                    offset = align_up(offset, unit);
                } else {
                    if offset % unit + bits > unit {
                        offset = align_up(offset, unit);
                    }
                    offset = offset.saturating_add(bits);
                }
            } else {
                offset = align_up(offset, member_align);
                offset = offset.saturating_add(self.storage_at(member, depth + 1));
            }
        }
        if offset == 0 {
            return 0;
        }
        align_up(offset, max_align)
    }

    fn union_layout(&mut self, r: DeclRef<'_>, depth: u32) -> u64 {
        let mut size = 0u64;
        let mut max_align = BYTE;
        for member in r.children().filter(|m| m.kind() == DeclKind::Field) {
            max_align = max_align.max(self.align_at(member, depth + 1));
            let bits = if is_bitfield(member) {
                member.record().width()
            } else {
                self.storage_at(member, depth + 1)
            };
            size = size.max(bits);
        }
        if size == 0 {
            return 0;
        }
        align_up(size, max_align)
    }
}
