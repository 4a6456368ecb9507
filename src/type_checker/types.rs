//! Interned type descriptors.
//!
//! Every type the checker sees is stored once in a `TypeCache` and referred
//! to by a `TypeId`. Structurally equal shapes always intern to the same id,
//! so comparing ids is comparing types.

use std::collections::HashMap;

/// Handle to an interned type. Only meaningful with the cache that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Weak,
    Shared,
    Unique,
}

impl PointerKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            PointerKind::Weak => "&",
            PointerKind::Shared => "^",
            PointerKind::Unique => "~",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Field { name: name.into(), ty }
    }
}

/// The structural key of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Void,
    /// Placeholder for expressions whose type could not be determined.
    Unknown,
    Bool,
    /// `bits: None` is the type of an integer literal whose size is not fixed yet.
    Integer { signed: bool, bits: Option<u16> },
    /// `bits: None` is the type of a float literal whose size is not fixed yet.
    Float { bits: Option<u16> },
    Pointer { kind: PointerKind, pointee: TypeId },
    Array { element: TypeId, dimensions: u8 },
    Tuple(Vec<TypeId>),
    Struct(Vec<Field>),
    Procedure { arguments: Vec<TypeId>, returns: TypeId },
    String,
    /// The type of an expression that denotes a type, such as `Int` or `[]Float`.
    TypeOf(TypeId),
}

/// Owns every type descriptor of a compilation.
#[derive(Debug, Default)]
pub struct TypeCache {
    shapes: Vec<TypeShape>,
    lookup: HashMap<TypeShape, TypeId>,
}

impl TypeCache {
    pub fn new() -> Self {
        TypeCache::default()
    }

    /// Returns the id for `shape`, allocating it the first time it is seen.
    pub fn intern(&mut self, shape: TypeShape) -> TypeId {
        if let Some(id) = self.lookup.get(&shape) {
            return *id;
        }

        let id = TypeId(self.shapes.len() as u32);
        tracing::trace!(?id, ?shape, "interned type");
        self.shapes.push(shape.clone());
        self.lookup.insert(shape, id);
        id
    }

    pub fn shape(&self, ty: TypeId) -> &TypeShape {
        &self.shapes[ty.index()]
    }

    /// Number of distinct types interned so far.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn void(&mut self) -> TypeId {
        self.intern(TypeShape::Void)
    }

    pub fn unknown(&mut self) -> TypeId {
        self.intern(TypeShape::Unknown)
    }

    pub fn boolean(&mut self) -> TypeId {
        self.intern(TypeShape::Bool)
    }

    pub fn string(&mut self) -> TypeId {
        self.intern(TypeShape::String)
    }

    pub fn integer(&mut self, signed: bool, bits: Option<u16>) -> TypeId {
        self.intern(TypeShape::Integer { signed, bits })
    }

    pub fn float(&mut self, bits: Option<u16>) -> TypeId {
        self.intern(TypeShape::Float { bits })
    }

    pub fn pointer(&mut self, kind: PointerKind, pointee: TypeId) -> TypeId {
        self.intern(TypeShape::Pointer { kind, pointee })
    }

    pub fn array(&mut self, element: TypeId, dimensions: u8) -> TypeId {
        self.intern(TypeShape::Array { element, dimensions })
    }

    pub fn tuple(&mut self, elements: Vec<TypeId>) -> TypeId {
        self.intern(TypeShape::Tuple(elements))
    }

    pub fn structure(&mut self, fields: Vec<Field>) -> TypeId {
        self.intern(TypeShape::Struct(fields))
    }

    pub fn procedure(&mut self, arguments: Vec<TypeId>, returns: TypeId) -> TypeId {
        self.intern(TypeShape::Procedure { arguments, returns })
    }

    pub fn type_of(&mut self, ty: TypeId) -> TypeId {
        self.intern(TypeShape::TypeOf(ty))
    }

    pub fn is_integer(&self, ty: TypeId) -> bool {
        matches!(self.shape(ty), TypeShape::Integer { .. })
    }

    pub fn is_float(&self, ty: TypeId) -> bool {
        matches!(self.shape(ty), TypeShape::Float { .. })
    }

    pub fn is_numeric(&self, ty: TypeId) -> bool {
        self.is_integer(ty) || self.is_float(ty)
    }

    pub fn is_bool(&self, ty: TypeId) -> bool {
        matches!(self.shape(ty), TypeShape::Bool)
    }

    /// The denoted type, if `ty` is the type of a type expression.
    pub fn type_of_inner(&self, ty: TypeId) -> Option<TypeId> {
        match self.shape(ty) {
            TypeShape::TypeOf(inner) => Some(*inner),
            _ => None,
        }
    }

    /// Whether a value of type `from` may be used where `to` is expected.
    ///
    /// Besides identity, only literal types convert: an unsized integer to
    /// any sized integer and an unsized float to any sized float.
    pub fn is_implicitly_convertible(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }

        match (self.shape(from), self.shape(to)) {
            (TypeShape::Integer { bits: None, .. }, TypeShape::Integer { bits: Some(_), .. }) => true,
            (TypeShape::Float { bits: None }, TypeShape::Float { bits: Some(_) }) => true,
            _ => false,
        }
    }

    /// The type both operands convert to, preferring `b`.
    pub fn common_type(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if self.is_implicitly_convertible(a, b) {
            Some(b)
        } else if self.is_implicitly_convertible(b, a) {
            Some(a)
        } else {
            None
        }
    }

    /// Fixes the size of literal types: integers become 64-bit signed, floats
    /// 64-bit. Tuple elements are sized too.
    pub fn default_size(&mut self, ty: TypeId) -> TypeId {
        match self.shape(ty).clone() {
            TypeShape::Integer { bits: None, .. } => self.integer(true, Some(64)),
            TypeShape::Float { bits: None } => self.float(Some(64)),
            TypeShape::Tuple(elements) => {
                let elements = elements.into_iter().map(|element| self.default_size(element)).collect();
                self.tuple(elements)
            }
            _ => ty,
        }
    }

    /// Fields reachable with `.` on a value of type `ty`.
    ///
    /// Strings and arrays expose a synthesized `data` pointer and `length`.
    pub fn fields(&mut self, ty: TypeId) -> Option<Vec<Field>> {
        let data = match self.shape(ty) {
            TypeShape::Struct(fields) => return Some(fields.clone()),
            TypeShape::String => self.integer(false, Some(8)),
            TypeShape::Array { element, .. } => *element,
            _ => return None,
        };

        let data = self.pointer(PointerKind::Weak, data);
        let length = self.integer(false, Some(64));

        Some(vec![Field::new("data", data), Field::new("length", length)])
    }

    pub fn field(&mut self, ty: TypeId, name: &str) -> Option<TypeId> {
        self.fields(ty)?
            .into_iter()
            .find(|field| field.name == name)
            .map(|field| field.ty)
    }

    /// Human-readable rendering of a type for diagnostics.
    pub fn describe(&self, ty: TypeId) -> String {
        let list = |types: &[TypeId]| {
            types
                .iter()
                .map(|ty| self.describe(*ty))
                .collect::<Vec<_>>()
                .join(", ")
        };

        match self.shape(ty) {
            TypeShape::Void => String::from("Void"),
            TypeShape::Unknown => String::from("<unknown>"),
            TypeShape::Bool => String::from("Bool"),
            TypeShape::Integer { bits: None, .. } => String::from("integer literal"),
            TypeShape::Integer { signed: true, bits: Some(bits) } => format!("Int{}", bits),
            TypeShape::Integer { signed: false, bits: Some(bits) } => format!("UInt{}", bits),
            TypeShape::Float { bits: None } => String::from("float literal"),
            TypeShape::Float { bits: Some(bits) } => format!("Float{}", bits),
            TypeShape::Pointer { kind, pointee } => format!("{}{}", kind.symbol(), self.describe(*pointee)),
            TypeShape::Array { element, dimensions } => format!(
                "[{}]{}",
                ",".repeat((*dimensions as usize).saturating_sub(1)),
                self.describe(*element)
            ),
            TypeShape::Tuple(elements) => format!("({})", list(elements)),
            TypeShape::Struct(fields) => format!(
                "struct {{ {} }}",
                fields
                    .iter()
                    .map(|field| format!("{}: {}", field.name, self.describe(field.ty)))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            TypeShape::Procedure { arguments, returns } => {
                format!("proc({}) => {}", list(arguments), self.describe(*returns))
            }
            TypeShape::String => String::from("String"),
            TypeShape::TypeOf(inner) => format!("type {}", self.describe(*inner)),
        }
    }
}
