//! Compiled access paths: dotted specifications turned into step lists.
//!
//! Compilation resolves every segment against the record's shape exactly
//! once, strips and counts pointer layers, and fixes the terminal semantic
//! kind. Extraction then just follows the recipe; there is no name lookup
//! and no type checking left at row time.

use std::any::Any;

use crate::error::{Error, Result};
use crate::shape::{classify, CallFn, DerefFn, DisplayFn, FieldGetFn, Scalar, Shape, ShapeData};
use crate::value::{Kind, Value};

/// One hop of a compiled path.
#[derive(Debug)]
pub(crate) enum Step {
    Field(FieldStep),
    Call(CallStep),
    /// Synthetic terminal text conversion for `Display` records.
    Text(DisplayFn),
}

#[derive(Debug)]
pub(crate) struct FieldStep {
    pub(crate) name: &'static str,
    pub(crate) get: FieldGetFn,
    /// One deref per declared pointer layer, outermost first.
    pub(crate) derefs: Vec<DerefFn>,
}

#[derive(Debug)]
pub(crate) struct CallStep {
    pub(crate) name: &'static str,
    pub(crate) call: CallFn,
}

/// A validated, reusable access plan for one column.
#[derive(Debug)]
pub(crate) struct AccessPath {
    steps: Vec<Step>,
    kind: Kind,
    unsigned: bool,
    may_fail: bool,
    scalar: Option<Scalar>,
    name: String,
}

impl AccessPath {
    pub(crate) fn kind(&self) -> Kind {
        self.kind
    }

    pub(crate) fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    pub(crate) fn may_fail(&self) -> bool {
        self.may_fail
    }

    /// The dot-joined segment names; the default column name.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Walk the compiled steps over one record.
    ///
    /// First failure wins: a nil pointer or failed accessor anywhere on the
    /// path yields `None` for the whole cell and later steps never run.
    pub(crate) fn extract(&self, record: &dyn Any) -> Option<Value> {
        walk(record, &self.steps, self.scalar)
    }
}

fn walk(current: &dyn Any, steps: &[Step], scalar: Option<Scalar>) -> Option<Value> {
    let Some((step, rest)) = steps.split_first() else {
        return scalar.and_then(|tag| tag.read(current));
    };
    match step {
        Step::Field(field) => {
            let mut value = (field.get)(current)?;
            for deref in &field.derefs {
                value = deref(value)?;
            }
            walk(value, rest, scalar)
        }
        Step::Call(call) => {
            // The accessor's return is owned by this frame; deeper steps
            // borrow from it.
            let owned = (call.call)(current)?;
            walk(owned.as_ref(), rest, scalar)
        }
        Step::Text(display) => display(current).map(Value::Text),
    }
}

/// Compile a dotted column specification against a record shape.
///
/// For each segment, field resolution is attempted first, then accessor
/// resolution. A field's declared pointer layers are stripped and recorded
/// here; whether the layers can be nil (`Option`) or not (`Box`) decides
/// whether the step can fail. After the last segment the terminal type is
/// classified; an unclassifiable record type with a registered text
/// conversion gets a synthetic text step appended instead of failing.
pub(crate) fn compile(start: &'static Shape, spec: &str) -> Result<AccessPath> {
    if spec.is_empty() {
        return Err(Error::EmptySpec);
    }

    let segments: Vec<&str> = spec.split('.').collect();
    let mut steps = Vec::with_capacity(segments.len());
    let mut may_fail = false;
    let mut current = start;

    for segment in &segments {
        if segment.is_empty() {
            return Err(Error::empty_segment(spec));
        }
        let ShapeData::Struct(record) = current.data() else {
            return Err(Error::intermediate_not_record(*segment, current.name()));
        };

        if let Some(field) = record.fields.iter().find(|f| f.name == *segment) {
            let mut derefs = Vec::new();
            let mut target = (field.shape)();
            while let ShapeData::Pointer(pointer) = target.data() {
                derefs.push(pointer.deref);
                may_fail |= pointer.nilable;
                target = (pointer.target)();
            }
            steps.push(Step::Field(FieldStep {
                name: field.name,
                get: field.get,
                derefs,
            }));
            current = target;
        } else if let Some(accessor) = record.accessors.iter().find(|a| a.name == *segment) {
            may_fail |= accessor.fallible;
            steps.push(Step::Call(CallStep {
                name: accessor.name,
                call: accessor.call,
            }));
            current = (accessor.returns)();
        } else {
            return Err(Error::unknown_segment(*segment, current.name()));
        }
    }

    let mut kind = classify(current);
    let mut scalar = current.scalar_tag();
    if kind == Kind::Unavailable {
        let display = match current.data() {
            ShapeData::Struct(record) => record.display,
            _ => None,
        };
        match display {
            Some(display) => {
                steps.push(Step::Text(display));
                kind = Kind::Text;
                scalar = None;
            }
            None => {
                let last = segments.last().copied().unwrap_or(spec);
                return Err(Error::unsupported_terminal(last, current.name()));
            }
        }
    }
    let unsigned = kind == Kind::Int && scalar.is_some_and(Scalar::is_unsigned);

    Ok(AccessPath {
        steps,
        kind,
        unsigned,
        may_fail,
        scalar,
        name: segments.join("."),
    })
}
