use super::cursor::Cursor;
use super::decode::Error;

/// The CBOR major type, held in the top three bits of a header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Major {
    UnsignedInt,
    NegativeInt,
    ByteString,
    TextString,
    Array,
    Map,
    Tag,
    FloatCtrl,
}

impl From<u8> for Major {
    fn from(initial: u8) -> Self {
        match initial >> 5 {
            0 => Self::UnsignedInt,
            1 => Self::NegativeInt,
            2 => Self::ByteString,
            3 => Self::TextString,
            4 => Self::Array,
            5 => Self::Map,
            6 => Self::Tag,
            _ => Self::FloatCtrl,
        }
    }
}

impl core::fmt::Display for Major {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::UnsignedInt => "unsigned integer",
            Self::NegativeInt => "negative integer",
            Self::ByteString => "byte string",
            Self::TextString => "text string",
            Self::Array => "array",
            Self::Map => "map",
            Self::Tag => "tag",
            Self::FloatCtrl => "float or simple value",
        })
    }
}

/// The width an argument was encoded with.
///
/// Arguments carried inline in the header byte (0..=23) report `W8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// Maps additional information 24..=27 to its width; anything else is `None`.
    pub fn from_info(info: u8) -> Option<Self> {
        match info {
            24 => Some(Self::W8),
            25 => Some(Self::W16),
            26 => Some(Self::W32),
            27 => Some(Self::W64),
            _ => None,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::W8 => 1,
            Self::W16 => 2,
            Self::W32 => 4,
            Self::W64 => 8,
        }
    }

    pub fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Definite { value: u64, width: Width },
    Indefinite,
}

/// A decoded initial byte plus any extension bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub major: Major,
    pub info: u8,
    pub argument: Argument,
    /// Header bytes consumed, including the initial byte.
    pub len: usize,
}

pub const BREAK: u8 = 0xFF;

impl Header {
    pub fn read(cursor: &mut Cursor) -> Result<Self, Error> {
        let start = cursor.position();
        let initial = cursor.peek_u8()?;
        let major = Major::from(initial);
        let info = initial & 0x1F;

        let argument = match info {
            0..=23 => {
                cursor.advance(1)?;
                Argument::Definite {
                    value: info as u64,
                    width: Width::W8,
                }
            }
            24..=27 => {
                let width = Width::from_info(info).ok_or(Error::MalformedHeader(info))?;
                // Check the extension bytes are present before consuming anything
                let ext = cursor.peek(1 + width.bytes())?;
                let value = ext[1..]
                    .iter()
                    .fold(0u64, |acc, b| (acc << 8) | (*b as u64));
                cursor.advance(ext.len())?;
                Argument::Definite { value, width }
            }
            31 => {
                cursor.advance(1)?;
                Argument::Indefinite
            }
            _ => return Err(Error::MalformedHeader(info)),
        };

        Ok(Self {
            major,
            info,
            argument,
            len: cursor.position() - start,
        })
    }

    pub fn is_break(&self) -> bool {
        self.major == Major::FloatCtrl && self.argument == Argument::Indefinite
    }

    /// The definite argument, or `IndefiniteNotAllowed` for this major type.
    pub fn definite(&self) -> Result<(u64, Width), Error> {
        match self.argument {
            Argument::Definite { value, width } => Ok((value, width)),
            Argument::Indefinite => Err(Error::IndefiniteNotAllowed(self.major)),
        }
    }
}
