/*!
The decoded item model.

An [`Item`] is immutable once built. Items are shared through [`ItemRef`]
handles, which count their owners atomically; an item is freed synchronously
when its last handle is released, releasing every child it owns in turn.

The count is the only shared mutable state. Handles may be sent between
threads, but callers sharing a graph across threads must synchronise any
ordering they rely on themselves.
*/

use super::header::Width;
use super::string::{TextString, Utf8Condition};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    UnsignedInt,
    NegativeInt,
    ByteString,
    TextString,
    Array,
    Map,
    Tag,
    FloatCtrl,
}

/// A major type 7 payload, keeping the width it was encoded with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloatCtrl {
    Simple(u8),
    Half(half::f16),
    Single(f32),
    Double(f64),
}

pub const SIMPLE_FALSE: u8 = 20;
pub const SIMPLE_TRUE: u8 = 21;
pub const SIMPLE_NULL: u8 = 22;
pub const SIMPLE_UNDEFINED: u8 = 23;

impl FloatCtrl {
    pub fn width(&self) -> Width {
        match self {
            Self::Simple(_) => Width::W8,
            Self::Half(_) => Width::W16,
            Self::Single(_) => Width::W32,
            Self::Double(_) => Width::W64,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Simple(_) => None,
            Self::Half(f) => Some(f.to_f64()),
            Self::Single(f) => Some(*f as f64),
            Self::Double(f) => Some(*f),
        }
    }
}

pub(crate) enum Data {
    UnsignedInt { magnitude: u64, width: Width },
    NegativeInt { magnitude: u64, width: Width },
    Bytes { bytes: Vec<u8>, indefinite: bool },
    Text { text: TextString, indefinite: bool },
    Array { elements: Vec<ItemRef>, indefinite: bool },
    Map { pairs: Vec<Pair>, indefinite: bool },
    Tag { value: u64, item: ItemRef },
    FloatCtrl(FloatCtrl),
}

/// One key/value entry of a map.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: ItemRef,
    pub value: ItemRef,
}

/// A borrowed view of an item's content.
///
/// How the item was encoded (integer width, definite or indefinite length)
/// is not visible here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    UnsignedInteger(u64),
    /// The stored magnitude `n`; the value is `-1 - n`.
    NegativeInteger(u64),
    Bytes(&'a [u8]),
    Text(&'a TextString),
    Array(&'a [ItemRef]),
    Map(&'a [Pair]),
    Tag(u64, &'a ItemRef),
    False,
    True,
    Null,
    Undefined,
    Simple(u8),
    Float(f64),
}

pub struct Item {
    data: Data,
}


#[cfg(test)]
impl Drop for Item {
    fn drop(&mut self) {
        live::dec();
    }
}

fn smallest_width(v: u64) -> Width {
    if v <= u8::MAX as u64 {
        Width::W8
    } else if v <= u16::MAX as u64 {
        Width::W16
    } else if v <= u32::MAX as u64 {
        Width::W32
    } else {
        Width::W64
    }
}

impl Item {
    pub(crate) fn from_data(data: Data) -> Self {
        #[cfg(test)]
        live::inc();
        Self { data }
    }

    pub(crate) fn unsigned_with_width(magnitude: u64, width: Width) -> Self {
        Self::from_data(Data::UnsignedInt { magnitude, width })
    }

    pub(crate) fn negative_with_width(magnitude: u64, width: Width) -> Self {
        Self::from_data(Data::NegativeInt { magnitude, width })
    }

    pub(crate) fn bytes_with_encoding(bytes: Vec<u8>, indefinite: bool) -> Self {
        Self::from_data(Data::Bytes { bytes, indefinite })
    }

    pub(crate) fn text_with_encoding(text: TextString, indefinite: bool) -> Self {
        Self::from_data(Data::Text { text, indefinite })
    }

    pub fn unsigned(v: u64) -> Self {
        Self::unsigned_with_width(v, smallest_width(v))
    }

    /// A negative integer with value `-1 - magnitude`.
    pub fn negative(magnitude: u64) -> Self {
        Self::negative_with_width(magnitude, smallest_width(magnitude))
    }

    pub fn integer(v: i64) -> Self {
        if v < 0 {
            Self::negative((-1 - v) as u64)
        } else {
            Self::unsigned(v as u64)
        }
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::bytes_with_encoding(bytes.into(), false)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::text_with_encoding(TextString::new(s.into()), false)
    }

    pub fn float(f: f64) -> Self {
        Self::from_data(Data::FloatCtrl(FloatCtrl::Double(f)))
    }

    pub fn float_ctrl(f: FloatCtrl) -> Self {
        Self::from_data(Data::FloatCtrl(f))
    }

    pub fn bool(b: bool) -> Self {
        Self::simple(if b { SIMPLE_TRUE } else { SIMPLE_FALSE })
    }

    pub fn null() -> Self {
        Self::simple(SIMPLE_NULL)
    }

    pub fn undefined() -> Self {
        Self::simple(SIMPLE_UNDEFINED)
    }

    pub fn simple(v: u8) -> Self {
        Self::float_ctrl(FloatCtrl::Simple(v))
    }

    pub fn tag(value: u64, item: ItemRef) -> Self {
        Self::from_data(Data::Tag { value, item })
    }

    pub(crate) fn array(elements: Vec<ItemRef>, indefinite: bool) -> Self {
        Self::from_data(Data::Array {
            elements,
            indefinite,
        })
    }

    pub(crate) fn map(pairs: Vec<Pair>, indefinite: bool) -> Self {
        Self::from_data(Data::Map { pairs, indefinite })
    }

    pub fn into_ref(self) -> ItemRef {
        ItemRef(Arc::new(self))
    }

    pub fn kind(&self) -> Type {
        match &self.data {
            Data::UnsignedInt { .. } => Type::UnsignedInt,
            Data::NegativeInt { .. } => Type::NegativeInt,
            Data::Bytes { .. } => Type::ByteString,
            Data::Text { .. } => Type::TextString,
            Data::Array { .. } => Type::Array,
            Data::Map { .. } => Type::Map,
            Data::Tag { .. } => Type::Tag,
            Data::FloatCtrl(_) => Type::FloatCtrl,
        }
    }

    pub fn value(&self) -> Value<'_> {
        match &self.data {
            Data::UnsignedInt { magnitude, .. } => Value::UnsignedInteger(*magnitude),
            Data::NegativeInt { magnitude, .. } => Value::NegativeInteger(*magnitude),
            Data::Bytes { bytes, .. } => Value::Bytes(bytes),
            Data::Text { text, .. } => Value::Text(text),
            Data::Array { elements, .. } => Value::Array(elements),
            Data::Map { pairs, .. } => Value::Map(pairs),
            Data::Tag { value, item } => Value::Tag(*value, item),
            Data::FloatCtrl(FloatCtrl::Simple(v)) => match *v {
                SIMPLE_FALSE => Value::False,
                SIMPLE_TRUE => Value::True,
                SIMPLE_NULL => Value::Null,
                SIMPLE_UNDEFINED => Value::Undefined,
                v => Value::Simple(v),
            },
            Data::FloatCtrl(f) => Value::Float(f.as_f64().unwrap_or(f64::NAN)),
        }
    }

    pub fn is_uint(&self) -> bool {
        self.kind() == Type::UnsignedInt
    }

    pub fn is_negint(&self) -> bool {
        self.kind() == Type::NegativeInt
    }

    pub fn is_int(&self) -> bool {
        self.is_uint() || self.is_negint()
    }

    pub fn is_bytestring(&self) -> bool {
        self.kind() == Type::ByteString
    }

    pub fn is_string(&self) -> bool {
        self.kind() == Type::TextString
    }

    pub fn is_array(&self) -> bool {
        self.kind() == Type::Array
    }

    pub fn is_map(&self) -> bool {
        self.kind() == Type::Map
    }

    pub fn is_tag(&self) -> bool {
        self.kind() == Type::Tag
    }

    pub fn is_float_ctrl(&self) -> bool {
        self.kind() == Type::FloatCtrl
    }

    /// True if the item was encoded with an indefinite length.
    ///
    /// This is informational only: every other accessor behaves identically
    /// for definite and indefinite encodings.
    pub fn is_indefinite(&self) -> bool {
        match &self.data {
            Data::Bytes { indefinite, .. }
            | Data::Text { indefinite, .. }
            | Data::Array { indefinite, .. }
            | Data::Map { indefinite, .. } => *indefinite,
            _ => false,
        }
    }

    pub fn int_width(&self) -> Option<Width> {
        match &self.data {
            Data::UnsignedInt { width, .. } | Data::NegativeInt { width, .. } => Some(*width),
            _ => None,
        }
    }

    /// The stored magnitude of an integer, before any sign transform.
    pub fn magnitude(&self) -> Option<u64> {
        match &self.data {
            Data::UnsignedInt { magnitude, .. } | Data::NegativeInt { magnitude, .. } => {
                Some(*magnitude)
            }
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match &self.data {
            Data::UnsignedInt { magnitude, .. } => Some(*magnitude),
            _ => None,
        }
    }

    /// The signed value of any integer item; covers the full `-2^64..2^64` range.
    pub fn as_i128(&self) -> Option<i128> {
        match &self.data {
            Data::UnsignedInt { magnitude, .. } => Some(*magnitude as i128),
            Data::NegativeInt { magnitude, .. } => Some(-1 - *magnitude as i128),
            _ => None,
        }
    }

    /// The signed value, if it fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Byte length of a byte or text string.
    pub fn string_len(&self) -> Option<usize> {
        self.as_bytes().map(<[u8]>::len)
    }

    pub fn codepoint_count(&self) -> Option<usize> {
        self.as_text().map(TextString::codepoints)
    }

    /// The raw payload of a byte or text string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            Data::Bytes { bytes, .. } => Some(bytes),
            Data::Text { text, .. } => Some(text.as_bytes()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextString> {
        match &self.data {
            Data::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// The payload of a well-formed text string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_text().and_then(TextString::as_str)
    }

    pub fn utf8_condition(&self) -> Option<Utf8Condition> {
        self.as_text().and_then(TextString::condition)
    }

    pub fn elements(&self) -> Option<&[ItemRef]> {
        match &self.data {
            Data::Array { elements, .. } => Some(elements),
            _ => None,
        }
    }

    pub fn array_len(&self) -> Option<usize> {
        self.elements().map(<[ItemRef]>::len)
    }

    pub fn get(&self, index: usize) -> Option<&ItemRef> {
        self.elements().and_then(|e| e.get(index))
    }

    pub fn pairs(&self) -> Option<&[Pair]> {
        match &self.data {
            Data::Map { pairs, .. } => Some(pairs),
            _ => None,
        }
    }

    pub fn map_len(&self) -> Option<usize> {
        self.pairs().map(<[Pair]>::len)
    }

    /// The value of the first entry whose key equals `key`.
    pub fn map_get(&self, key: &Item) -> Option<&ItemRef> {
        self.pairs()?
            .iter()
            .find(|p| *p.key == *key)
            .map(|p| &p.value)
    }

    pub fn map_get_str(&self, key: &str) -> Option<&ItemRef> {
        self.pairs()?
            .iter()
            .find(|p| p.key.as_str() == Some(key))
            .map(|p| &p.value)
    }

    pub fn tag_value(&self) -> Option<u64> {
        match &self.data {
            Data::Tag { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn tagged_item(&self) -> Option<&ItemRef> {
        match &self.data {
            Data::Tag { item, .. } => Some(item),
            _ => None,
        }
    }

    pub fn float_ctrl_value(&self) -> Option<FloatCtrl> {
        match &self.data {
            Data::FloatCtrl(f) => Some(*f),
            _ => None,
        }
    }

    /// Encoded width of a float or simple value; simple values report `W8`.
    pub fn float_width(&self) -> Option<Width> {
        self.float_ctrl_value().map(|f| f.width())
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.float_ctrl_value().and_then(|f| f.as_f64())
    }

    pub fn simple_value(&self) -> Option<u8> {
        match self.float_ctrl_value()? {
            FloatCtrl::Simple(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.simple_value()? {
            SIMPLE_FALSE => Some(false),
            SIMPLE_TRUE => Some(true),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.simple_value() == Some(SIMPLE_NULL)
    }

    pub fn is_undefined(&self) -> bool {
        self.simple_value() == Some(SIMPLE_UNDEFINED)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl core::fmt::Debug for Item {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let marker = if self.is_indefinite() { "_ " } else { "" };
        match self.value() {
            Value::UnsignedInteger(n) => write!(f, "{n}"),
            Value::NegativeInteger(n) => write!(f, "{}", -1 - n as i128),
            Value::Bytes(b) => {
                f.write_str("h'")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("'")
            }
            Value::Text(t) => write!(f, "{t:?}"),
            Value::Array(elements) => {
                write!(f, "[{marker}")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{e:?}")?;
                }
                f.write_str("]")
            }
            Value::Map(pairs) => {
                write!(f, "{{{marker}")?;
                for (i, p) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {:?}", p.key, p.value)?;
                }
                f.write_str("}")
            }
            Value::Tag(tag, item) => write!(f, "{tag}({item:?})"),
            Value::False => f.write_str("false"),
            Value::True => f.write_str("true"),
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Simple(v) => write!(f, "simple({v})"),
            Value::Float(v) if v.is_nan() => f.write_str("NaN"),
            Value::Float(v) if v.is_infinite() => {
                f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// A shared, owning handle to an [`Item`].
///
/// Cloning (or [`acquire`](ItemRef::acquire)) adds an owner; dropping (or
/// [`release`](ItemRef::release)) removes one.
#[derive(Clone)]
pub struct ItemRef(Arc<Item>);

impl ItemRef {
    pub fn new(item: Item) -> Self {
        item.into_ref()
    }

    /// Returns a new owning handle to the same item.
    pub fn acquire(&self) -> Self {
        self.clone()
    }

    /// Gives up this handle, returning true if it was the last one and the
    /// item (and any children it solely owned) has been freed.
    pub fn release(self) -> bool {
        Arc::into_inner(self.0).is_some()
    }

    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Item> for ItemRef {
    fn from(item: Item) -> Self {
        item.into_ref()
    }
}

impl core::ops::Deref for ItemRef {
    type Target = Item;

    fn deref(&self) -> &Item {
        &self.0
    }
}

impl AsRef<Item> for ItemRef {
    fn as_ref(&self) -> &Item {
        &self.0
    }
}

impl PartialEq for ItemRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl core::fmt::Debug for ItemRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}
