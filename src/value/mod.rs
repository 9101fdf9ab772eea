//! Dynamic value graph that dumps are rendered from.
//!
//! Frames hand their locals to the formatter as [`Value`]s. Composite values are
//! shared (`Rc<RefCell<_>>`) so that graphs can alias and even contain themselves;
//! the address of the shared allocation is the value's [`Identity`].
//!
//! Types that are not naturally a map, record or scalar can opt in to dumping by
//! implementing [`Inspect`] and being wrapped with [`Value::object`].

mod http;
mod json;
mod repr;

pub use http::{HttpRequest, HttpResponse};
pub use repr::{placeholder, safe_repr, try_repr, ReprError};

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared, interior-mutable composite.
pub type Shared<T> = Rc<RefCell<T>>;

/// Address of a shared allocation, used by the cycle guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(usize);

impl Identity {
    pub fn of_rc<T: ?Sized>(rc: &Rc<T>) -> Self {
        Identity(Rc::as_ptr(rc) as *const () as usize)
    }

    pub fn of_ref<T>(value: &T) -> Self {
        Identity(value as *const T as usize)
    }
}

/// Opt-in introspection for types that are not built from [`Value`] variants.
///
/// The formatter probes capabilities in order: `known_attributes`, `entries`,
/// `attributes`. A type answering `None` to all three is rendered as a leaf using
/// [`Inspect::repr`].
pub trait Inspect {
    /// Short type name used in headers and placeholders.
    fn type_name(&self) -> String;

    /// Single-line textual form. Errors are rendered as a placeholder.
    fn repr(&self) -> Result<String, ReprError>;

    /// Fixed attribute set for special-cased external record types.
    ///
    /// Known records use `repr` as their header line instead of `<TypeName>`.
    fn known_attributes(&self) -> Option<Vec<(String, Value)>> {
        None
    }

    /// Key/value pairs for mapping-like types.
    fn entries(&self) -> Option<Vec<(Key, Value)>> {
        None
    }

    /// Named attributes for record-like types.
    fn attributes(&self) -> Option<Vec<(String, Value)>> {
        None
    }
}

/// Hashable mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Key>),
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value.into())
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqKind {
    List,
    Tuple,
    Set,
    Deque,
}

impl SeqKind {
    pub fn type_name(self) -> &'static str {
        match self {
            SeqKind::List => "list",
            SeqKind::Tuple => "tuple",
            SeqKind::Set => "set",
            SeqKind::Deque => "deque",
        }
    }
}

/// Ordered collection. Always rendered as a single leaf line.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub kind: SeqKind,
    pub items: Vec<Value>,
}

/// Mapping with unique keys, iterated in insertion order.
#[derive(Clone)]
pub struct Mapping {
    type_name: String,
    entries: Vec<(Key, Value)>,
    index: HashMap<Key, usize>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::with_type_name("map")
    }

    pub fn with_type_name(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("type_name", &self.type_name)
            .field("len", &self.entries.len())
            .finish()
    }
}

/// Attribute-bearing record, e.g. a plain struct.
#[derive(Clone)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Builder form of [`Record::set`].
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.len())
            .finish()
    }
}

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Seq(Shared<Sequence>),
    Map(Shared<Mapping>),
    Record(Shared<Record>),
    Object(Rc<dyn Inspect>),
}

impl Value {
    pub fn seq(kind: SeqKind, items: Vec<Value>) -> Self {
        Value::Seq(Rc::new(RefCell::new(Sequence { kind, items })))
    }

    pub fn list(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::seq(SeqKind::List, items.into_iter().map(Into::into).collect())
    }

    pub fn tuple(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::seq(SeqKind::Tuple, items.into_iter().map(Into::into).collect())
    }

    pub fn set(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::seq(SeqKind::Set, items.into_iter().map(Into::into).collect())
    }

    pub fn deque(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::seq(SeqKind::Deque, items.into_iter().map(Into::into).collect())
    }

    pub fn map(mapping: Mapping) -> Self {
        Value::Map(Rc::new(RefCell::new(mapping)))
    }

    pub fn record(record: Record) -> Self {
        Value::Record(Rc::new(RefCell::new(record)))
    }

    pub fn object(object: impl Inspect + 'static) -> Self {
        Value::Object(Rc::new(object))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Identity of the shared allocation, `None` for plain scalars.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Value::Seq(rc) => Some(Identity::of_rc(rc)),
            Value::Map(rc) => Some(Identity::of_rc(rc)),
            Value::Record(rc) => Some(Identity::of_rc(rc)),
            Value::Object(rc) => Some(Identity::of_rc(rc)),
            _ => None,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::Bytes(_) => "bytes".to_string(),
            Value::Seq(seq) => match seq.try_borrow() {
                Ok(seq) => seq.kind.type_name().to_string(),
                Err(_) => "sequence".to_string(),
            },
            Value::Map(map) => match map.try_borrow() {
                Ok(map) => map.type_name.clone(),
                Err(_) => "map".to_string(),
            },
            Value::Record(record) => match record.try_borrow() {
                Ok(record) => record.type_name.clone(),
                Err(_) => "record".to_string(),
            },
            Value::Object(object) => object.type_name(),
        }
    }

    /// Insert into a `Map` value. Used to build self-referential graphs.
    ///
    /// Returns `false` if the value is not a map or is currently borrowed.
    pub fn map_insert(&self, key: impl Into<Key>, value: impl Into<Value>) -> bool {
        let Value::Map(map) = self else {
            return false;
        };
        match map.try_borrow_mut() {
            Ok(mut map) => {
                map.insert(key, value);
                true
            }
            Err(_) => false,
        }
    }

    /// Append to a `Seq` value. Returns `false` if it is not a sequence.
    pub fn seq_push(&self, value: impl Into<Value>) -> bool {
        let Value::Seq(seq) = self else {
            return false;
        };
        match seq.try_borrow_mut() {
            Ok(mut seq) => {
                seq.items.push(value.into());
                true
            }
            Err(_) => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            // Composites may be cyclic, so only name them.
            other => write!(f, "{}@{:?}", other.type_name(), other.identity()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::map(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::record(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
