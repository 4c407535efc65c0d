//! Type pool and compile-time constant values for the Lume compiler.
//!
//! Types are interned into a [`TypePool`] and referenced by [`TypeId`].
//! The pool is pre-seeded with the scalar types so the common cases
//! ([`TypeId::BOOL`], [`TypeId::I32`], ...) are available as constants
//! without a pool lookup.
//!
//! [`ConstValue`] is the result representation for const-evaluated
//! expressions. Floats are stored as raw bits so that `Eq` and `Hash`
//! hold, which the IR needs for constant values used as switch case
//! selectors and map keys.

use std::fmt;

use rustc_hash::FxHashMap;

// ── TypeId ──────────────────────────────────────────────────────────

/// Index of a type in the [`TypePool`].
///
/// IDs are allocated sequentially; the scalar types occupy fixed,
/// pre-seeded slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// The `void` type (function with no return value).
    pub const VOID: TypeId = TypeId(0);
    /// The `bool` type.
    pub const BOOL: TypeId = TypeId(1);
    /// The `i32` type.
    pub const I32: TypeId = TypeId(2);
    /// The `u32` type.
    pub const U32: TypeId = TypeId(3);
    /// The `f32` type.
    pub const F32: TypeId = TypeId(4);

    /// Create a new type ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Types ───────────────────────────────────────────────────────────

/// Address space of a pointer / variable declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    Function,
    Private,
    Workgroup,
    Uniform,
    Storage,
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressSpace::Function => write!(f, "function"),
            AddressSpace::Private => write!(f, "private"),
            AddressSpace::Workgroup => write!(f, "workgroup"),
            AddressSpace::Uniform => write!(f, "uniform"),
            AddressSpace::Storage => write!(f, "storage"),
        }
    }
}

/// Memory access mode of a pointer / variable declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
            Access::ReadWrite => write!(f, "read_write"),
        }
    }
}

/// A type in the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    I32,
    U32,
    F32,
    /// Pointer to a value in an address space (the result type of a
    /// `var` declaration or an address-of expression).
    Ptr {
        store: TypeId,
        space: AddressSpace,
        access: Access,
    },
}

// ── TypePool ────────────────────────────────────────────────────────

/// Interning pool for types.
///
/// Structurally identical types share one [`TypeId`]. The scalar types
/// are seeded at construction so their IDs are stable constants.
pub struct TypePool {
    types: Vec<Type>,
    lookup: FxHashMap<Type, TypeId>,
}

impl TypePool {
    /// Create a pool seeded with the scalar types.
    pub fn new() -> Self {
        let mut pool = Self {
            types: Vec::new(),
            lookup: FxHashMap::default(),
        };
        // Seed order must match the TypeId constants.
        pool.intern(Type::Void);
        pool.intern(Type::Bool);
        pool.intern(Type::I32);
        pool.intern(Type::U32);
        pool.intern(Type::F32);
        pool
    }

    /// Intern a type, returning the ID of the canonical instance.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(id) = self.lookup.get(&ty) {
            return *id;
        }
        let id = TypeId::new(
            u32::try_from(self.types.len()).unwrap_or_else(|_| panic!("type count exceeds u32")),
        );
        self.types.push(ty);
        self.lookup.insert(ty, id);
        id
    }

    /// Intern a pointer type.
    pub fn ptr(&mut self, store: TypeId, space: AddressSpace, access: Access) -> TypeId {
        self.intern(Type::Ptr {
            store,
            space,
            access,
        })
    }

    /// Look up a type by ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this pool.
    pub fn get(&self, id: TypeId) -> Type {
        self.types[id.index()]
    }

    /// Number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the pool holds no types (never, post-seeding).
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Human-readable rendering of a type, used by the disassembler.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Void => "void".to_string(),
            Type::Bool => "bool".to_string(),
            Type::I32 => "i32".to_string(),
            Type::U32 => "u32".to_string(),
            Type::F32 => "f32".to_string(),
            Type::Ptr {
                store,
                space,
                access,
            } => format!("ptr<{space}, {}, {access}>", self.display(store)),
        }
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

// ── Constant values ─────────────────────────────────────────────────

/// A compile-time constant value.
///
/// Floats are stored as raw bits so the type is `Eq + Hash`; use
/// [`ConstValue::F32`] to construct from an `f32` and
/// [`ConstValue::as_f32`] to read one back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Bool(bool),
    I32(i32),
    U32(u32),
    F32Bits(u32),
}

impl ConstValue {
    /// Construct a float constant from an `f32`.
    #[expect(non_snake_case, reason = "constructor named after the type it builds")]
    pub fn F32(v: f32) -> Self {
        ConstValue::F32Bits(v.to_bits())
    }

    /// Read a float constant back as `f32`, if this is one.
    pub fn as_f32(self) -> Option<f32> {
        match self {
            ConstValue::F32Bits(bits) => Some(f32::from_bits(bits)),
            _ => None,
        }
    }

    /// The type of this constant.
    pub fn type_id(self) -> TypeId {
        match self {
            ConstValue::Bool(_) => TypeId::BOOL,
            ConstValue::I32(_) => TypeId::I32,
            ConstValue::U32(_) => TypeId::U32,
            ConstValue::F32Bits(_) => TypeId::F32,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(v) => write!(f, "{v}"),
            ConstValue::I32(v) => write!(f, "{v}i"),
            ConstValue::U32(v) => write!(f, "{v}u"),
            ConstValue::F32Bits(bits) => write!(f, "{:?}f", f32::from_bits(*bits)),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn seeded_scalars_have_stable_ids() {
        let pool = TypePool::new();
        assert_eq!(pool.get(TypeId::VOID), Type::Void);
        assert_eq!(pool.get(TypeId::BOOL), Type::Bool);
        assert_eq!(pool.get(TypeId::I32), Type::I32);
        assert_eq!(pool.get(TypeId::U32), Type::U32);
        assert_eq!(pool.get(TypeId::F32), Type::F32);
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn intern_deduplicates() {
        let mut pool = TypePool::new();
        let a = pool.ptr(TypeId::I32, AddressSpace::Function, Access::ReadWrite);
        let b = pool.ptr(TypeId::I32, AddressSpace::Function, Access::ReadWrite);
        assert_eq!(a, b);
        assert_eq!(pool.len(), 6);
    }

    #[test]
    fn distinct_pointers_get_distinct_ids() {
        let mut pool = TypePool::new();
        let a = pool.ptr(TypeId::I32, AddressSpace::Function, Access::ReadWrite);
        let b = pool.ptr(TypeId::F32, AddressSpace::Function, Access::ReadWrite);
        let c = pool.ptr(TypeId::I32, AddressSpace::Private, Access::ReadWrite);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ptr_display() {
        let mut pool = TypePool::new();
        let p = pool.ptr(TypeId::BOOL, AddressSpace::Function, Access::ReadWrite);
        assert_eq!(pool.display(p), "ptr<function, bool, read_write>");
    }

    #[test]
    fn const_value_types() {
        assert_eq!(ConstValue::Bool(true).type_id(), TypeId::BOOL);
        assert_eq!(ConstValue::I32(-3).type_id(), TypeId::I32);
        assert_eq!(ConstValue::U32(7).type_id(), TypeId::U32);
        assert_eq!(ConstValue::F32(1.5).type_id(), TypeId::F32);
    }

    #[test]
    fn f32_bits_round_trip() {
        let c = ConstValue::F32(2.25);
        assert_eq!(c.as_f32(), Some(2.25));
        assert_eq!(c, ConstValue::F32(2.25));
    }

    #[test]
    fn const_value_display() {
        assert_eq!(ConstValue::Bool(false).to_string(), "false");
        assert_eq!(ConstValue::I32(42).to_string(), "42i");
        assert_eq!(ConstValue::U32(9).to_string(), "9u");
    }
}
