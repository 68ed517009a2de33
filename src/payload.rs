//! Raisable payload types and clause predicates.

use core::fmt;

// ============================================================
// Payload
// ============================================================

/// Record payload with a single integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub i: i32,
}

/// Discriminator of a [`Payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PayloadKind {
    /// Primitive integer.
    Int,
    /// [`Record`].
    Record,
}

impl PayloadKind {
    /// Type name as it appears in clauses and reports.
    pub fn name(self) -> &'static str {
        match self {
            PayloadKind::Int => "i32",
            PayloadKind::Record => "Record",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value carried by an in-flight failure.
///
/// Closed over the raisable types: matching a clause is a switch on
/// [`Payload::kind`], never a conversion between kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    Int(i32),
    Record(Record),
}

impl Payload {
    /// Discriminator of this payload.
    #[inline]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Int(_) => PayloadKind::Int,
            Payload::Record(_) => PayloadKind::Record,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Payload::Int(v) => Some(*v),
            Payload::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<Record> {
        match self {
            Payload::Record(r) => Some(*r),
            Payload::Int(_) => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Int(v) => write!(f, "i32 {}", v),
            Payload::Record(r) => write!(f, "Record {{ i: {} }}", r.i),
        }
    }
}

impl From<i32> for Payload {
    fn from(v: i32) -> Self {
        Payload::Int(v)
    }
}

impl From<Record> for Payload {
    fn from(r: Record) -> Self {
        Payload::Record(r)
    }
}

// ============================================================
// Raisable - maps a Rust type onto a discriminator
// ============================================================

/// A type that can be raised and named by a typed clause.
///
/// `catch Record(r) { }` accepts exactly the payloads whose kind is
/// `Record::KIND`; an `i32` clause never sees a record and vice versa.
pub trait Raisable: Copy + Into<Payload> {
    /// Discriminator this type raises as.
    const KIND: PayloadKind;

    /// Extract the value if `payload` has this type's kind.
    fn from_payload(payload: &Payload) -> Option<Self>;
}

impl Raisable for i32 {
    const KIND: PayloadKind = PayloadKind::Int;

    #[inline]
    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_int()
    }
}

impl Raisable for Record {
    const KIND: PayloadKind = PayloadKind::Record;

    #[inline]
    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_record()
    }
}

// ============================================================
// Accepts - clause predicate
// ============================================================

/// What a handler clause accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Accepts {
    /// Exactly one kind.
    Kind(PayloadKind),
    /// Anything (catch-all).
    Any,
}

impl Accepts {
    /// Predicate for a typed clause over `K`.
    pub fn of<K: Raisable>() -> Self {
        Accepts::Kind(K::KIND)
    }

    #[inline]
    pub fn matches(self, kind: PayloadKind) -> bool {
        match self {
            Accepts::Kind(k) => k == kind,
            Accepts::Any => true,
        }
    }

    pub fn is_catch_all(self) -> bool {
        matches!(self, Accepts::Any)
    }
}

impl fmt::Display for Accepts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accepts::Kind(k) => k.fmt(f),
            Accepts::Any => f.write_str("..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_do_not_convert() {
        let int = Payload::from(0);
        let record = Payload::from(Record { i: 0 });

        assert_eq!(int.kind(), PayloadKind::Int);
        assert_eq!(record.kind(), PayloadKind::Record);
        assert_eq!(<Record as Raisable>::from_payload(&int), None);
        assert_eq!(<i32 as Raisable>::from_payload(&record), None);
        assert_eq!(<i32 as Raisable>::from_payload(&int), Some(0));
    }

    #[test]
    fn test_accepts_matches() {
        assert!(Accepts::of::<i32>().matches(PayloadKind::Int));
        assert!(!Accepts::of::<i32>().matches(PayloadKind::Record));
        assert!(!Accepts::of::<Record>().matches(PayloadKind::Int));
        assert!(Accepts::Any.matches(PayloadKind::Record));
        assert!(Accepts::Any.is_catch_all());
    }

    #[test]
    fn test_display() {
        assert_eq!(Payload::Int(7).to_string(), "i32 7");
        assert_eq!(Payload::Record(Record { i: 3 }).to_string(), "Record { i: 3 }");
        assert_eq!(Accepts::Any.to_string(), "...");
        assert_eq!(Accepts::of::<Record>().to_string(), "Record");
    }
}
