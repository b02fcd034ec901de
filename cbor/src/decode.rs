use super::builder::{ArrayBuilder, MapBuilder};
use super::cursor::Cursor;
use super::header::{Argument, BREAK, Header, Major};
use super::item::{FloatCtrl, Item, ItemRef};
use super::string::{Built, StringBuilder, TextString};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Not enough data for encoded value: needed {needed} bytes, {available} available")]
    PrematureEnd { needed: usize, available: usize },

    #[error("Invalid additional information value {0}")]
    MalformedHeader(u8),

    #[error("Break marker outside an indefinite-length item")]
    UnexpectedBreak,

    #[error("Indefinite length is not allowed for {0}")]
    IndefiniteNotAllowed(Major),

    #[error("Chunked {expected} contains a {found} chunk")]
    ChunkTypeMismatch { expected: Major, found: Major },

    #[error("Declared length {declared} cannot be satisfied, only {available} available")]
    StructuralMismatch { declared: u64, available: u64 },

    #[error("Text string is not valid UTF-8: {0}")]
    MalformedText(core::str::Utf8Error),

    #[error("Maximum nesting depth {0} exceeded")]
    DepthExceeded(usize),

    #[error("Invalid simple value {0}")]
    InvalidSimple(u8),
}

/// The outcome classification of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    PrematureEnd,
    MalformedHeader,
    ChunkTypeMismatch,
    StructuralMismatch,
    MalformedText,
    DepthExceeded,
}

impl Error {
    pub fn status(&self) -> Status {
        match self {
            Self::PrematureEnd { .. } => Status::PrematureEnd,
            Self::MalformedHeader(_)
            | Self::UnexpectedBreak
            | Self::IndefiniteNotAllowed(_)
            | Self::InvalidSimple(_) => Status::MalformedHeader,
            Self::ChunkTypeMismatch { .. } => Status::ChunkTypeMismatch,
            Self::StructuralMismatch { .. } => Status::StructuralMismatch,
            Self::MalformedText(_) => Status::MalformedText,
            Self::DepthExceeded(_) => Status::DepthExceeded,
        }
    }
}

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Behaviour switches for a single call to [`load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct Flags {
    /// Deepest permitted nesting of arrays, maps and tags. The top-level
    /// item sits at depth 0.
    pub max_depth: usize,

    /// Reject text strings that are not well-formed UTF-8. When clear, the
    /// text is kept and the condition recorded on the item.
    pub strict_text: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_text: true,
        }
    }
}

impl Flags {
    pub fn lenient() -> Self {
        Self {
            strict_text: false,
            ..Default::default()
        }
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }
}

/// The result record of [`load`].
#[derive(Debug)]
pub struct LoadResult {
    /// The decoded item; `None` on failure.
    pub item: Option<ItemRef>,
    /// Bytes consumed on success, or the offset at which decoding stopped.
    pub read: usize,
    pub error: Option<Error>,
}

impl LoadResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn status(&self) -> Status {
        self.error.as_ref().map_or(Status::Success, Error::status)
    }

    pub fn into_result(self) -> Result<(ItemRef, usize), LoadError> {
        match (self.item, self.error) {
            (Some(item), None) => Ok((item, self.read)),
            (_, error) => Err(LoadError {
                error: error.unwrap_or(Error::PrematureEnd {
                    needed: 1,
                    available: 0,
                }),
                offset: self.read,
            }),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error} at offset {offset}")]
pub struct LoadError {
    pub error: Error,
    pub offset: usize,
}

struct Decoder<'a, 'f> {
    cursor: Cursor<'a>,
    flags: &'f Flags,
}

impl<'a> Decoder<'a, '_> {
    fn enter(&self, depth: usize) -> Result<usize, Error> {
        if depth >= self.flags.max_depth {
            Err(Error::DepthExceeded(self.flags.max_depth))
        } else {
            Ok(depth + 1)
        }
    }

    /// Checks that `declared` elements of at least `min_len` bytes each could
    /// fit in the remaining input.
    fn count(&self, declared: u64, min_len: u64) -> Result<usize, Error> {
        let available = self.cursor.remaining() as u64;
        match declared.checked_mul(min_len) {
            Some(n) if n <= available => {}
            _ => return Err(Error::StructuralMismatch { declared, available }),
        }
        usize::try_from(declared).map_err(|_| Error::StructuralMismatch {
            declared,
            available,
        })
    }

    fn payload(&mut self, declared: u64) -> Result<&'a [u8], Error> {
        let len = self.count(declared, 1)?;
        self.cursor.read(len)
    }

    fn item(&mut self, depth: usize) -> Result<ItemRef, Error> {
        let header = Header::read(&mut self.cursor)?;
        if header.is_break() {
            return Err(Error::UnexpectedBreak);
        }
        match header.major {
            Major::UnsignedInt => {
                let (magnitude, width) = header.definite()?;
                Ok(Item::unsigned_with_width(magnitude, width).into_ref())
            }
            Major::NegativeInt => {
                let (magnitude, width) = header.definite()?;
                Ok(Item::negative_with_width(magnitude, width).into_ref())
            }
            Major::ByteString | Major::TextString => self.string(header),
            Major::Array => self.array(header, depth),
            Major::Map => self.map(header, depth),
            Major::Tag => {
                let (value, _) = header.definite()?;
                let depth = self.enter(depth)?;
                let item = self.item(depth)?;
                Ok(Item::tag(value, item).into_ref())
            }
            Major::FloatCtrl => self.float_ctrl(header),
        }
    }

    /// The next item of an indefinite-length container, or `None` at the break.
    fn item_or_break(&mut self, depth: usize) -> Result<Option<ItemRef>, Error> {
        if self.cursor.peek_u8()? == BREAK {
            self.cursor.advance(1)?;
            Ok(None)
        } else {
            self.item(depth).map(Some)
        }
    }

    fn string(&mut self, header: Header) -> Result<ItemRef, Error> {
        let text = header.major == Major::TextString;
        let item = match header.argument {
            Argument::Definite { value, .. } => {
                let payload = self.payload(value)?.to_vec();
                if text {
                    Item::text_with_encoding(
                        TextString::from_utf8(payload, self.flags.strict_text)?,
                        false,
                    )
                } else {
                    Item::bytes_with_encoding(payload, false)
                }
            }
            Argument::Indefinite => {
                let mut builder = if text {
                    StringBuilder::text(self.flags.strict_text)
                } else {
                    StringBuilder::bytes()
                };
                loop {
                    let chunk = Header::read(&mut self.cursor)?;
                    if chunk.is_break() {
                        break;
                    }
                    if chunk.major != header.major {
                        return Err(Error::ChunkTypeMismatch {
                            expected: header.major,
                            found: chunk.major,
                        });
                    }
                    let (len, _) = chunk.definite()?;
                    builder.push(self.payload(len)?)?;
                }
                trace!("Concatenated {} chunks of {}", builder.chunks(), header.major);
                match builder.build() {
                    Built::Bytes(b) => Item::bytes_with_encoding(b, true),
                    Built::Text(t) => Item::text_with_encoding(t, true),
                }
            }
        };
        Ok(item.into_ref())
    }

    fn array(&mut self, header: Header, depth: usize) -> Result<ItemRef, Error> {
        let depth = self.enter(depth)?;
        match header.argument {
            Argument::Definite { value, .. } => {
                let mut builder = ArrayBuilder::definite(self.count(value, 1)?);
                while !builder.is_full() {
                    builder.push(self.item(depth)?)?;
                }
                builder.seal()
            }
            Argument::Indefinite => {
                let mut builder = ArrayBuilder::indefinite();
                while let Some(item) = self.item_or_break(depth)? {
                    builder.push(item)?;
                }
                trace!("Indefinite array of {} elements", builder.len());
                builder.seal()
            }
        }
    }

    fn map(&mut self, header: Header, depth: usize) -> Result<ItemRef, Error> {
        let depth = self.enter(depth)?;
        match header.argument {
            Argument::Definite { value, .. } => {
                let mut builder = MapBuilder::definite(self.count(value, 2)?);
                while !builder.is_full() {
                    builder.push(self.item(depth)?)?;
                }
                builder.seal()
            }
            Argument::Indefinite => {
                let mut builder = MapBuilder::indefinite();
                while let Some(item) = self.item_or_break(depth)? {
                    builder.push(item)?;
                }
                trace!("Indefinite map of {} pairs", builder.len());
                builder.seal()
            }
        }
    }

    fn float_ctrl(&mut self, header: Header) -> Result<ItemRef, Error> {
        let (value, _) = header.definite()?;
        let f = match header.info {
            0..=23 => FloatCtrl::Simple(header.info),
            24 if value < 32 => return Err(Error::InvalidSimple(value as u8)),
            24 => FloatCtrl::Simple(value as u8),
            25 => FloatCtrl::Half(half::f16::from_bits(value as u16)),
            26 => FloatCtrl::Single(f32::from_bits(value as u32)),
            27 => FloatCtrl::Double(f64::from_bits(value)),
            info => return Err(Error::MalformedHeader(info)),
        };
        Ok(Item::float_ctrl(f).into_ref())
    }
}

/// Decodes a single CBOR item from the start of `data`.
///
/// Bytes following the item are left unread. On failure no part of the
/// partially decoded item survives.
pub fn try_load(data: &[u8], flags: &Flags) -> Result<(ItemRef, usize), LoadError> {
    let mut decoder = Decoder {
        cursor: Cursor::new(data),
        flags,
    };
    match decoder.item(0) {
        Ok(item) => {
            let read = decoder.cursor.position();
            trace!("Loaded {:?} item from {read} of {} bytes", item.kind(), data.len());
            Ok((item, read))
        }
        Err(error) => {
            let offset = decoder.cursor.position();
            debug!("Failed to load CBOR item: {error} at offset {offset}");
            Err(LoadError { error, offset })
        }
    }
}

/// Decodes a single CBOR item, reporting the outcome as a [`LoadResult`].
pub fn load(data: &[u8], flags: &Flags) -> LoadResult {
    match try_load(data, flags) {
        Ok((item, read)) => LoadResult {
            item: Some(item),
            read,
            error: None,
        },
        Err(LoadError { error, offset }) => LoadResult {
            item: None,
            read: offset,
            error: Some(error),
        },
    }
}
