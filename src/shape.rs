//! Runtime type descriptors for record types.
//!
//! Rust has no ambient reflection, so volcar builds its own: every type that
//! can appear on an access path implements [`Shaped`], yielding an interned
//! `&'static` [`Shape`]. A shape is a scalar (a leaf the classifier
//! recognizes), a pointer layer (`Option` is nilable, `Box` is not), a record
//! with named fields and zero-argument accessors, or opaque. Record shapes
//! are produced by the [`record!`](crate::record!) macro; everything the
//! shape stores is an erased function pointer, so a compiled path never
//! performs name lookup at extraction time.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use num_complex::{Complex32, Complex64};

use crate::value::{Kind, Value};

/// Erased field getter: downcasts the receiver and borrows the field.
pub type FieldGetFn = fn(&dyn Any) -> Option<&dyn Any>;

/// Erased pointer deref: strips one `Option`/`Box` layer, `None` on nil.
pub type DerefFn = fn(&dyn Any) -> Option<&dyn Any>;

/// Erased accessor invoker: calls the accessor, `None` on failure.
pub type CallFn = fn(&dyn Any) -> Option<Box<dyn Any>>;

/// Erased text conversion for the `Display` fallback.
pub type DisplayFn = fn(&dyn Any) -> Option<String>;

/// Lazy shape reference, so shapes may refer to each other freely.
pub type ShapeFn = fn() -> &'static Shape;

/// A type that carries a runtime type descriptor.
///
/// Implementations ship with the crate for all scalar leaves, for the
/// pointer wrappers `Option<T>` and `Box<T>`, and for common opaque
/// containers. Record types get theirs from [`record!`](crate::record!);
/// other field types can be admitted as opaque via
/// [`opaque!`](crate::opaque!).
pub trait Shaped: Any {
    /// The interned descriptor for this type.
    fn shape() -> &'static Shape
    where
        Self: Sized;
}

/// An interned runtime type descriptor.
pub struct Shape {
    name: &'static str,
    id: TypeId,
    data: ShapeData,
}

pub(crate) enum ShapeData {
    Scalar(Scalar),
    Pointer(PointerShape),
    Struct(StructShape),
    Opaque,
}

pub(crate) struct PointerShape {
    /// Whether this layer can be nil (`Option` yes, `Box` no).
    pub(crate) nilable: bool,
    pub(crate) target: ShapeFn,
    pub(crate) deref: DerefFn,
}

pub(crate) struct StructShape {
    pub(crate) fields: Vec<FieldShape>,
    pub(crate) accessors: Vec<AccessorShape>,
    pub(crate) display: Option<DisplayFn>,
}

/// A named member slot of a record shape.
pub struct FieldShape {
    pub(crate) name: &'static str,
    pub(crate) shape: ShapeFn,
    pub(crate) get: FieldGetFn,
}

impl FieldShape {
    /// Build a field descriptor. Macro plumbing.
    #[must_use]
    pub fn new(name: &'static str, shape: ShapeFn, get: FieldGetFn) -> Self {
        Self { name, shape, get }
    }
}

/// A zero-argument accessor of a record shape.
pub struct AccessorShape {
    pub(crate) name: &'static str,
    /// Whether the accessor is declared with a `Result` return.
    pub(crate) fallible: bool,
    pub(crate) returns: ShapeFn,
    pub(crate) call: CallFn,
}

impl AccessorShape {
    /// Build an accessor descriptor. Macro plumbing.
    #[must_use]
    pub fn new(name: &'static str, fallible: bool, returns: ShapeFn, call: CallFn) -> Self {
        Self {
            name,
            fallible,
            returns,
            call,
        }
    }
}

impl Shape {
    /// The descriptor's type name, as reported by `std::any::type_name`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The `TypeId` of the described type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub(crate) fn data(&self) -> &ShapeData {
        &self.data
    }

    /// Build a record shape. Macro plumbing.
    #[must_use]
    pub fn structure<T: Any>(
        fields: Vec<FieldShape>,
        accessors: Vec<AccessorShape>,
        display: Option<DisplayFn>,
    ) -> Self {
        Self {
            name: std::any::type_name::<T>(),
            id: TypeId::of::<T>(),
            data: ShapeData::Struct(StructShape {
                fields,
                accessors,
                display,
            }),
        }
    }

    /// Build an opaque shape. Macro plumbing.
    #[must_use]
    pub fn opaque<T: Any>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            id: TypeId::of::<T>(),
            data: ShapeData::Opaque,
        }
    }

    fn scalar<T: Any>(tag: Scalar) -> Self {
        Self {
            name: std::any::type_name::<T>(),
            id: TypeId::of::<T>(),
            data: ShapeData::Scalar(tag),
        }
    }

    fn pointer<T: Any>(nilable: bool, target: ShapeFn, deref: DerefFn) -> Self {
        Self {
            name: std::any::type_name::<T>(),
            id: TypeId::of::<T>(),
            data: ShapeData::Pointer(PointerShape {
                nilable,
                target,
                deref,
            }),
        }
    }

    pub(crate) fn scalar_tag(&self) -> Option<Scalar> {
        match self.data {
            ShapeData::Scalar(tag) => Some(tag),
            _ => None,
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self.data {
            ShapeData::Scalar(_) => "scalar",
            ShapeData::Pointer(_) => "pointer",
            ShapeData::Struct(_) => "struct",
            ShapeData::Opaque => "opaque",
        };
        f.debug_struct("Shape")
            .field("name", &self.name)
            .field("data", &variant)
            .finish()
    }
}

/// Classify a shape into its semantic value kind.
///
/// Pure and total. Scalars map to their kind; pointer, record, and opaque
/// shapes classify to [`Kind::Unavailable`] (the path compiler applies the
/// text-conversion fallback for records separately).
#[must_use]
pub fn classify(shape: &Shape) -> Kind {
    match shape.data {
        ShapeData::Scalar(tag) => tag.kind(),
        _ => Kind::Unavailable,
    }
}

/// The recognized scalar leaf representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scalar {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Complex32,
    Complex64,
    Str,
    StaticStr,
    Timestamp,
    Duration,
}

impl Scalar {
    pub(crate) fn kind(self) -> Kind {
        match self {
            Self::Bool => Kind::Bool,
            // Duration is an integer at the representation level but a
            // distinct kind; match it before the integer tags.
            Self::Duration => Kind::Duration,
            Self::Timestamp => Kind::Timestamp,
            Self::I8
            | Self::I16
            | Self::I32
            | Self::I64
            | Self::Isize
            | Self::U8
            | Self::U16
            | Self::U32
            | Self::U64
            | Self::Usize => Kind::Int,
            Self::F32 | Self::F64 => Kind::Float,
            Self::Complex32 | Self::Complex64 => Kind::Complex,
            Self::Str | Self::StaticStr => Kind::Text,
        }
    }

    pub(crate) fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::Usize
        )
    }

    /// Downcast a terminal value and widen it into a [`Value`].
    pub(crate) fn read(self, v: &dyn Any) -> Option<Value> {
        match self {
            Self::Bool => v.downcast_ref::<bool>().map(|b| Value::Bool(*b)),
            Self::I8 => v.downcast_ref::<i8>().map(|x| Value::Int(i64::from(*x))),
            Self::I16 => v.downcast_ref::<i16>().map(|x| Value::Int(i64::from(*x))),
            Self::I32 => v.downcast_ref::<i32>().map(|x| Value::Int(i64::from(*x))),
            Self::I64 => v.downcast_ref::<i64>().map(|x| Value::Int(*x)),
            Self::Isize => v
                .downcast_ref::<isize>()
                .and_then(|x| i64::try_from(*x).ok())
                .map(Value::Int),
            Self::U8 => v.downcast_ref::<u8>().map(|x| Value::Uint(u64::from(*x))),
            Self::U16 => v.downcast_ref::<u16>().map(|x| Value::Uint(u64::from(*x))),
            Self::U32 => v.downcast_ref::<u32>().map(|x| Value::Uint(u64::from(*x))),
            Self::U64 => v.downcast_ref::<u64>().map(|x| Value::Uint(*x)),
            Self::Usize => v
                .downcast_ref::<usize>()
                .and_then(|x| u64::try_from(*x).ok())
                .map(Value::Uint),
            Self::F32 => v.downcast_ref::<f32>().map(|x| Value::Float(f64::from(*x))),
            Self::F64 => v.downcast_ref::<f64>().map(|x| Value::Float(*x)),
            Self::Complex32 => v
                .downcast_ref::<Complex32>()
                .map(|c| Value::Complex(Complex64::new(f64::from(c.re), f64::from(c.im)))),
            Self::Complex64 => v.downcast_ref::<Complex64>().map(|c| Value::Complex(*c)),
            Self::Str => v.downcast_ref::<String>().map(|s| Value::Text(s.clone())),
            Self::StaticStr => v
                .downcast_ref::<&'static str>()
                .map(|s| Value::Text((*s).to_string())),
            Self::Timestamp => v
                .downcast_ref::<DateTime<Utc>>()
                .map(|t| Value::Timestamp(*t)),
            Self::Duration => v.downcast_ref::<Duration>().map(|d| Value::Duration(*d)),
        }
    }
}

static SHAPES: LazyLock<Mutex<HashMap<TypeId, &'static Shape>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn registry() -> MutexGuard<'static, HashMap<TypeId, &'static Shape>> {
    SHAPES.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Intern a shape for `T`, building it at most once per process.
///
/// The builder runs outside the registry lock, so shape builders may freely
/// request other types' shapes. A racing duplicate build loses the insert
/// and its allocation is abandoned; descriptors are small and live forever
/// either way.
pub fn intern<T: Any>(build: impl FnOnce() -> Shape) -> &'static Shape {
    let id = TypeId::of::<T>();
    if let Some(&shape) = registry().get(&id) {
        return shape;
    }
    let built: &'static Shape = Box::leak(Box::new(build()));
    *registry().entry(id).or_insert(built)
}

/// Text conversion thunk for `Display` record types. Macro plumbing.
pub fn display_text<T: Any + fmt::Display>(v: &dyn Any) -> Option<String> {
    v.downcast_ref::<T>().map(|t| t.to_string())
}

fn deref_option<T: Any>(v: &dyn Any) -> Option<&dyn Any> {
    v.downcast_ref::<Option<T>>()?
        .as_ref()
        .map(|inner| inner as &dyn Any)
}

fn deref_box<T: Any>(v: &dyn Any) -> Option<&dyn Any> {
    v.downcast_ref::<Box<T>>()
        .map(|inner| inner.as_ref() as &dyn Any)
}

impl<T: Shaped> Shaped for Option<T> {
    fn shape() -> &'static Shape {
        intern::<Self>(|| Shape::pointer::<Self>(true, T::shape, deref_option::<T>))
    }
}

impl<T: Shaped> Shaped for Box<T> {
    fn shape() -> &'static Shape {
        intern::<Self>(|| Shape::pointer::<Self>(false, T::shape, deref_box::<T>))
    }
}

macro_rules! scalar_impls {
    ($($ty:ty => $tag:ident),* $(,)?) => {$(
        impl Shaped for $ty {
            fn shape() -> &'static Shape {
                intern::<Self>(|| Shape::scalar::<Self>(Scalar::$tag))
            }
        }
    )*};
}

scalar_impls! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Complex32 => Complex32,
    Complex64 => Complex64,
    String => Str,
    &'static str => StaticStr,
    DateTime<Utc> => Timestamp,
    Duration => Duration,
}

impl<T: Any> Shaped for Vec<T> {
    fn shape() -> &'static Shape {
        intern::<Self>(Shape::opaque::<Self>)
    }
}

impl<T: Any, const N: usize> Shaped for [T; N] {
    fn shape() -> &'static Shape {
        intern::<Self>(Shape::opaque::<Self>)
    }
}

impl<K: Any, V: Any> Shaped for HashMap<K, V> {
    fn shape() -> &'static Shape {
        intern::<Self>(Shape::opaque::<Self>)
    }
}

/// Admit arbitrary types as opaque field types.
///
/// Opaque fields may be declared in a [`record!`](crate::record!) but cannot
/// terminate a column or be descended into; they exist so records can carry
/// payload the tabular view ignores.
///
/// ```
/// struct Blob(Vec<u8>);
/// volcar::opaque!(Blob);
/// ```
#[macro_export]
macro_rules! opaque {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::shape::Shaped for $ty {
            fn shape() -> &'static $crate::shape::Shape {
                $crate::shape::intern::<Self>($crate::shape::Shape::opaque::<Self>)
            }
        }
    )*};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_classification() {
        assert_eq!(classify(bool::shape()), Kind::Bool);
        assert_eq!(classify(i32::shape()), Kind::Int);
        assert_eq!(classify(u64::shape()), Kind::Int);
        assert_eq!(classify(f32::shape()), Kind::Float);
        assert_eq!(classify(Complex64::shape()), Kind::Complex);
        assert_eq!(classify(String::shape()), Kind::Text);
        assert_eq!(classify(<&'static str>::shape()), Kind::Text);
        assert_eq!(classify(<DateTime<Utc>>::shape()), Kind::Timestamp);
    }

    #[test]
    fn test_duration_is_not_an_integer() {
        // Structurally a u64+u32 pair, semantically its own kind.
        assert_eq!(classify(Duration::shape()), Kind::Duration);
        assert!(!Duration::shape()
            .scalar_tag()
            .map(Scalar::is_unsigned)
            .unwrap_or(true));
    }

    #[test]
    fn test_pointer_and_opaque_classify_unavailable() {
        assert_eq!(classify(<Option<i64>>::shape()), Kind::Unavailable);
        assert_eq!(classify(<Box<f64>>::shape()), Kind::Unavailable);
        assert_eq!(classify(<Vec<u8>>::shape()), Kind::Unavailable);
    }

    #[test]
    fn test_shapes_are_interned() {
        let a = i64::shape() as *const Shape;
        let b = i64::shape() as *const Shape;
        assert_eq!(a, b);
        assert_eq!(i64::shape().type_id(), TypeId::of::<i64>());
    }

    #[test]
    fn test_option_deref() {
        let some: Option<i64> = Some(7);
        let none: Option<i64> = None;
        let shape = <Option<i64>>::shape();
        let ShapeData::Pointer(pointer) = shape.data() else {
            panic!("expected pointer shape");
        };
        assert!(pointer.nilable);
        let inner = (pointer.deref)(&some).unwrap();
        assert_eq!(inner.downcast_ref::<i64>(), Some(&7));
        assert!((pointer.deref)(&none).is_none());
    }

    #[test]
    fn test_box_deref_never_nil() {
        let boxed: Box<f64> = Box::new(1.5);
        let shape = <Box<f64>>::shape();
        let ShapeData::Pointer(pointer) = shape.data() else {
            panic!("expected pointer shape");
        };
        assert!(!pointer.nilable);
        let inner = (pointer.deref)(&boxed).unwrap();
        assert_eq!(inner.downcast_ref::<f64>(), Some(&1.5));
    }

    #[test]
    fn test_nested_pointer_layers() {
        let shape = <Option<Box<i32>>>::shape();
        let ShapeData::Pointer(outer) = shape.data() else {
            panic!("expected pointer shape");
        };
        let ShapeData::Pointer(inner) = (outer.target)().data() else {
            panic!("expected inner pointer shape");
        };
        assert!(outer.nilable);
        assert!(!inner.nilable);
        assert_eq!(classify((inner.target)()), Kind::Int);
    }

    #[test]
    fn test_scalar_reads_widen() {
        let x: u32 = 9;
        assert_eq!(Scalar::U32.read(&x), Some(Value::Uint(9)));
        let y: i8 = -5;
        assert_eq!(Scalar::I8.read(&y), Some(Value::Int(-5)));
        let z: f32 = 0.5;
        assert_eq!(Scalar::F32.read(&z), Some(Value::Float(0.5)));
        let big: u64 = u64::MAX;
        assert_eq!(Scalar::U64.read(&big), Some(Value::Uint(u64::MAX)));
    }

    #[test]
    fn test_scalar_read_rejects_mismatched_type() {
        let x: u32 = 9;
        assert_eq!(Scalar::I64.read(&x), None);
    }

    #[test]
    fn test_display_text() {
        let n: i64 = 42;
        assert_eq!(display_text::<i64>(&n), Some("42".to_string()));
        assert_eq!(display_text::<bool>(&n), None);
    }
}
