//! Protocol atoms
//!
//! The host boundary speaks in fixed-width typed atoms. A reply is either a
//! single atom or a flat list of atoms; lists never nest.

use smallvec::SmallVec;
use std::fmt;

/// Number of atoms a list holds before spilling to the heap.
pub const INLINE_ATOMS: usize = 128;

/// Flat atom sequence with inline storage for short lists.
pub type AtomList = SmallVec<[Atom; INLINE_ATOMS]>;

/// A single typed protocol atom.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Int(i64),
    Float(f32),
    Symbol(String),
}

impl Atom {
    pub fn symbol(text: impl Into<String>) -> Self {
        Atom::Symbol(text.into())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Atom::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Atom::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Atom::Symbol(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Int(value) => write!(f, "{value}"),
            Atom::Float(value) => write!(f, "{value}"),
            Atom::Symbol(text) => f.write_str(text),
        }
    }
}

/// Value carried by a reply message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolValue {
    Scalar(Atom),
    List(AtomList),
}

impl ProtocolValue {
    /// Number of atoms the value occupies on the wire.
    pub fn atom_count(&self) -> usize {
        match self {
            ProtocolValue::Scalar(_) => 1,
            ProtocolValue::List(atoms) => atoms.len(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Atom> {
        match self {
            ProtocolValue::Scalar(atom) => Some(atom),
            ProtocolValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Atom]> {
        match self {
            ProtocolValue::Scalar(_) => None,
            ProtocolValue::List(atoms) => Some(atoms),
        }
    }
}

impl fmt::Display for ProtocolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolValue::Scalar(atom) => write!(f, "{atom}"),
            ProtocolValue::List(atoms) => {
                f.write_str("list")?;
                for atom in atoms {
                    write!(f, " {atom}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn atoms_render_like_message_text() {
        assert_eq!(Atom::Int(-3).to_string(), "-3");
        assert_eq!(Atom::Float(0.5).to_string(), "0.5");
        assert_eq!(Atom::symbol("x = 5").to_string(), "x = 5");
    }

    #[test]
    fn list_display_and_count() {
        let list: AtomList = smallvec![Atom::Int(1), Atom::symbol("a")];
        let value = ProtocolValue::List(list);
        assert_eq!(value.atom_count(), 2);
        assert_eq!(value.to_string(), "list 1 a");
        assert!(value.as_scalar().is_none());
    }
}
