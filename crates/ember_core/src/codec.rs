//! Value codec
//!
//! Classifies dynamic interpreter values into protocol atoms. The interpreter
//! side lifts its values into [`DynamicValue`] first; from there the mapping
//! is a plain match:
//!
//! | dynamic value        | protocol output                     |
//! |----------------------|-------------------------------------|
//! | `Int`                | `Atom::Int`                         |
//! | `Bool`               | `Atom::Int` (0 or 1)                |
//! | `Float`              | `Atom::Float` (narrowed to `f32`)   |
//! | `Text`               | `Atom::Symbol` (bytes as-is)        |
//! | `Collection`         | `ProtocolValue::List` of scalars    |
//! | `Opaque`             | nothing                             |
//!
//! Lists are flat: an element that is itself a collection is skipped.

use crate::atom::{Atom, AtomList, ProtocolValue, INLINE_ATOMS};

/// Largest integer a double represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Interpreter value, already lifted out of the interpreter heap.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Collection(Vec<DynamicValue>),
    /// Anything the protocol has no atom for; carries the type name for logs.
    Opaque(&'static str),
}

impl DynamicValue {
    /// Classify a double: integral values within the exact range count as integers.
    pub fn from_number(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
            DynamicValue::Int(value as i64)
        } else {
            DynamicValue::Float(value)
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, DynamicValue::Collection(_))
    }
}

/// Encode a lifted value. `None` means the value has no protocol form.
pub fn encode(value: &DynamicValue) -> Option<ProtocolValue> {
    match value {
        DynamicValue::Collection(items) => Some(ProtocolValue::List(encode_list(items))),
        other => encode_scalar(other).map(ProtocolValue::Scalar),
    }
}

/// Encode a single value as one atom. Collections and opaque values yield nothing.
pub fn encode_scalar(value: &DynamicValue) -> Option<Atom> {
    match value {
        DynamicValue::Int(value) => Some(Atom::Int(*value)),
        DynamicValue::Bool(value) => Some(Atom::Int(i64::from(*value))),
        DynamicValue::Float(value) => Some(Atom::Float(*value as f32)),
        DynamicValue::Text(text) => Some(Atom::Symbol(text.clone())),
        DynamicValue::Collection(_) | DynamicValue::Opaque(_) => None,
    }
}

fn encode_list(items: &[DynamicValue]) -> AtomList {
    let mut atoms = AtomList::new();
    if items.len() > INLINE_ATOMS {
        tracing::debug!(len = items.len(), "list exceeds inline atom capacity, using heap buffer");
        atoms.reserve_exact(items.len());
    }
    atoms.extend(items.iter().filter_map(encode_scalar));
    atoms
}

/// Render atoms as source text, for messages built without a text form.
pub fn decode(atoms: &[Atom]) -> String {
    let mut source = String::new();
    for (i, atom) in atoms.iter().enumerate() {
        if i > 0 {
            source.push(' ');
        }
        match atom {
            Atom::Symbol(text) => source.push_str(text),
            other => source.push_str(&other.to_string()),
        }
    }
    source
}
