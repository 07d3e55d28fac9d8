//! The [`record!`](crate::record!) declaration macro.
//!
//! `record!` expands a plain struct definition together with its
//! [`Shaped`](crate::shape::Shaped) impl, emitting the erased field getters
//! and accessor thunks at build time. Accessor declarations only reference
//! inherent methods; the bodies are written in an ordinary `impl` block.
//! An accessor declared with a literal `Result<T, E>` return is may-fail —
//! a failed call yields an absent cell, never an error. Any other return
//! type is infallible. Signatures other than `fn name(&self) -> T` are
//! rejected at expansion time.

/// Declare a record type with a tabular shape.
///
/// ```
/// volcar::record! {
///     /// A measured observation.
///     #[derive(Debug, Clone)]
///     pub struct Obs {
///         pub age: i64,
///         pub height: f64,
///     }
///     accessors {
///         fn group(&self) -> i64;
///         fn fancy(&self) -> Result<i64, String>;
///     }
/// }
///
/// impl Obs {
///     fn group(&self) -> i64 {
///         10 * (self.age / 10) + 5
///     }
///
///     fn fancy(&self) -> Result<i64, String> {
///         if self.height < 1.65 {
///             return Err(format!("too small (was {:.2})", self.height));
///         }
///         Ok((100.0 * (self.height - 1.65).sqrt()) as i64)
///     }
/// }
/// ```
///
/// After the struct body, two optional sections may appear in order:
/// `display;` marks the type's `Display` impl as usable for the text
/// fallback when the type itself terminates a column, and
/// `accessors { ... }` lists the zero-argument accessors visible to column
/// specifications.
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty ),* $(,)?
        }
        $($rest:tt)*
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field : $fty, )*
        }

        impl $crate::shape::Shaped for $name {
            fn shape() -> &'static $crate::shape::Shape {
                $crate::shape::intern::<Self>(|| {
                    let fields = ::std::vec![ $(
                        {
                            fn get(
                                v: &dyn ::std::any::Any,
                            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                                v.downcast_ref::<$name>()
                                    .map(|record| &record.$field as &dyn ::std::any::Any)
                            }
                            $crate::shape::FieldShape::new(
                                ::std::stringify!($field),
                                <$fty as $crate::shape::Shaped>::shape,
                                get,
                            )
                        }
                    ),* ];
                    #[allow(unused_mut)]
                    let mut accessors: ::std::vec::Vec<$crate::shape::AccessorShape> =
                        ::std::vec::Vec::new();
                    #[allow(unused_mut)]
                    let mut display: ::std::option::Option<$crate::shape::DisplayFn> =
                        ::std::option::Option::None;
                    $crate::record!(@extras $name, accessors, display, $($rest)*);
                    $crate::shape::Shape::structure::<$name>(fields, accessors, display)
                })
            }
        }
    };

    (@extras $name:ident, $acc:ident, $disp:ident,) => {};
    (@extras $name:ident, $acc:ident, $disp:ident, display; $($rest:tt)*) => {
        $disp = ::std::option::Option::Some(
            $crate::shape::display_text::<$name> as $crate::shape::DisplayFn,
        );
        $crate::record!(@extras $name, $acc, $disp, $($rest)*);
    };
    (@extras $name:ident, $acc:ident, $disp:ident, accessors { $($items:tt)* } $($rest:tt)*) => {
        $crate::record!(@accessor $name, $acc, $($items)*);
        $crate::record!(@extras $name, $acc, $disp, $($rest)*);
    };

    (@accessor $name:ident, $acc:ident,) => {};
    (@accessor $name:ident, $acc:ident,
        fn $method:ident(&self) -> Result<$ok:ty, $err:ty>; $($rest:tt)*
    ) => {
        {
            fn call(
                v: &dyn ::std::any::Any,
            ) -> ::std::option::Option<::std::boxed::Box<dyn ::std::any::Any>> {
                let record = v.downcast_ref::<$name>()?;
                match record.$method() {
                    Ok(value) => ::std::option::Option::Some(::std::boxed::Box::new(value)),
                    Err(_) => ::std::option::Option::None,
                }
            }
            $acc.push($crate::shape::AccessorShape::new(
                ::std::stringify!($method),
                true,
                <$ok as $crate::shape::Shaped>::shape,
                call,
            ));
        }
        $crate::record!(@accessor $name, $acc, $($rest)*);
    };
    (@accessor $name:ident, $acc:ident,
        fn $method:ident(&self) -> $ret:ty; $($rest:tt)*
    ) => {
        {
            fn call(
                v: &dyn ::std::any::Any,
            ) -> ::std::option::Option<::std::boxed::Box<dyn ::std::any::Any>> {
                let record = v.downcast_ref::<$name>()?;
                ::std::option::Option::Some(::std::boxed::Box::new(record.$method()))
            }
            $acc.push($crate::shape::AccessorShape::new(
                ::std::stringify!($method),
                false,
                <$ret as $crate::shape::Shaped>::shape,
                call,
            ));
        }
        $crate::record!(@accessor $name, $acc, $($rest)*);
    };
}
