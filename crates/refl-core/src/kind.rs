//! The closed declaration kind tag set.

use std::fmt;

/// Discriminant of a declaration record.
///
/// The numeric values are the on-disk tag bytes and must never be
/// renumbered. The set is closed: producers cannot add kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DeclKind {
    /// The kind of the zero record; also used for "no type".
    #[default]
    Void = 0,
    /// A type alias; `link` names the aliased type.
    Typedef = 1,
    /// A built-in scalar with a fixed bit width.
    Intrinsic = 2,
    /// A bitset enumeration; `link` heads its constant list.
    Set = 3,
    /// An enumeration; `link` heads its constant list.
    Enum = 4,
    /// A structure; `link` heads its member list.
    Struct = 5,
    /// A union; `link` heads its member list.
    Union = 6,
    /// A structure or union member; `link` names its type.
    Field = 7,
    /// An array; `link` names the element type.
    Array = 8,
    /// A named integer constant; `link` names its type.
    Constant = 9,
    /// A global variable; `link` names its type.
    Variable = 10,
    /// A uniform (externally bound) variable; `link` names its type.
    Uniform = 11,
    /// A function; `link` heads its parameter list.
    Function = 12,
    /// A function parameter or return slot; `link` names its type.
    Param = 13,
    /// An attribute annotation; `link` names an optional value.
    Attribute = 14,
    /// The argument of an attribute annotation.
    Value = 15,
    /// A pointer type; `link` names the pointee.
    Pointer = 16,
}

impl DeclKind {
    /// Every kind, in tag order.
    pub const ALL: [DeclKind; 17] = [
        Self::Void,
        Self::Typedef,
        Self::Intrinsic,
        Self::Set,
        Self::Enum,
        Self::Struct,
        Self::Union,
        Self::Field,
        Self::Array,
        Self::Constant,
        Self::Variable,
        Self::Uniform,
        Self::Function,
        Self::Param,
        Self::Attribute,
        Self::Value,
        Self::Pointer,
    ];

    /// Decode a tag byte. Returns `None` for unknown tags.
    pub fn from_u8(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// The tag byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Typedef => "typedef",
            Self::Intrinsic => "intrinsic",
            Self::Set => "set",
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Field => "field",
            Self::Array => "array",
            Self::Constant => "constant",
            Self::Variable => "variable",
            Self::Uniform => "uniform",
            Self::Function => "function",
            Self::Param => "param",
            Self::Attribute => "attribute",
            Self::Value => "value",
            Self::Pointer => "pointer",
        }
    }

    /// Whether records of this kind denote a type rather than a
    /// value-bearing declaration.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Self::Typedef
                | Self::Intrinsic
                | Self::Set
                | Self::Enum
                | Self::Struct
                | Self::Union
                | Self::Field
                | Self::Array
        )
    }

    /// Whether `link` heads a child list for this kind.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Self::Enum | Self::Set | Self::Struct | Self::Union | Self::Function
        )
    }

    /// Whether a record of this kind may appear in a container's child list.
    pub fn is_member(self) -> bool {
        self.is_type() || matches!(self, Self::Constant | Self::Param)
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
