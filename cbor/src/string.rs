/*!
String payloads.

Text strings carry their code-point count alongside the byte length. The count
is taken once, when the payload is validated, and never recomputed.
*/

use super::decode::Error;
use alloc::string::String;
use alloc::vec::Vec;

/// Records where a text payload stopped being well-formed UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Condition {
    pub valid_up_to: usize,
}

#[derive(Clone)]
enum TextData {
    Valid(String),
    Malformed(Vec<u8>, Utf8Condition),
}

/// The payload of a text string item.
#[derive(Clone)]
pub struct TextString {
    data: TextData,
    codepoints: usize,
}

/// Counts `char`s the way a lossy conversion would: each maximal invalid
/// sequence stands in for one replacement character.
fn lossy_codepoints(bytes: &[u8]) -> usize {
    bytes
        .utf8_chunks()
        .map(|c| c.valid().chars().count() + usize::from(!c.invalid().is_empty()))
        .sum()
}

impl TextString {
    pub fn new(s: String) -> Self {
        Self {
            codepoints: s.chars().count(),
            data: TextData::Valid(s),
        }
    }

    /// Validates `bytes` as UTF-8.
    ///
    /// When `strict` is set malformed input is an error, otherwise it is kept
    /// and the condition recorded on the returned value.
    pub fn from_utf8(bytes: Vec<u8>, strict: bool) -> Result<Self, Error> {
        match String::from_utf8(bytes) {
            Ok(s) => Ok(Self::new(s)),
            Err(e) if strict => Err(Error::MalformedText(e.utf8_error())),
            Err(e) => {
                let condition = Utf8Condition {
                    valid_up_to: e.utf8_error().valid_up_to(),
                };
                let bytes = e.into_bytes();
                Ok(Self {
                    codepoints: lossy_codepoints(&bytes),
                    data: TextData::Malformed(bytes, condition),
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn codepoints(&self) -> usize {
        self.codepoints
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            TextData::Valid(s) => s.as_bytes(),
            TextData::Malformed(b, _) => b,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            TextData::Valid(s) => Some(s),
            TextData::Malformed(..) => None,
        }
    }

    pub fn condition(&self) -> Option<Utf8Condition> {
        match &self.data {
            TextData::Valid(_) => None,
            TextData::Malformed(_, c) => Some(*c),
        }
    }
}

impl PartialEq for TextString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl core::fmt::Debug for TextString {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.data {
            TextData::Valid(s) => write!(f, "{s:?}"),
            TextData::Malformed(b, _) => write!(f, "{:?}", String::from_utf8_lossy(b)),
        }
    }
}

enum Accumulator {
    Bytes(Vec<u8>),
    Text(String),
    Malformed(Vec<u8>, Utf8Condition),
}

/// Concatenates the chunks of an indefinite-length string.
///
/// Each text chunk is validated on its own, as a code point may not be split
/// across chunks, and the per-chunk code-point counts are summed.
pub(crate) struct StringBuilder {
    acc: Accumulator,
    codepoints: usize,
    strict: bool,
    chunks: usize,
}

pub(crate) enum Built {
    Bytes(Vec<u8>),
    Text(TextString),
}

impl StringBuilder {
    pub fn bytes() -> Self {
        Self {
            acc: Accumulator::Bytes(Vec::new()),
            codepoints: 0,
            strict: true,
            chunks: 0,
        }
    }

    pub fn text(strict: bool) -> Self {
        Self {
            acc: Accumulator::Text(String::new()),
            codepoints: 0,
            strict,
            chunks: 0,
        }
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<(), Error> {
        self.chunks += 1;
        match &mut self.acc {
            Accumulator::Bytes(b) => b.extend_from_slice(chunk),
            Accumulator::Text(s) => match core::str::from_utf8(chunk) {
                Ok(c) => {
                    self.codepoints += c.chars().count();
                    s.push_str(c);
                }
                Err(e) if self.strict => return Err(Error::MalformedText(e)),
                Err(e) => {
                    let condition = Utf8Condition {
                        valid_up_to: s.len() + e.valid_up_to(),
                    };
                    let mut b = core::mem::take(s).into_bytes();
                    b.extend_from_slice(chunk);
                    self.codepoints += lossy_codepoints(chunk);
                    self.acc = Accumulator::Malformed(b, condition);
                }
            },
            Accumulator::Malformed(b, _) => {
                b.extend_from_slice(chunk);
                self.codepoints += lossy_codepoints(chunk);
            }
        }
        Ok(())
    }

    pub fn build(self) -> Built {
        match self.acc {
            Accumulator::Bytes(b) => Built::Bytes(b),
            Accumulator::Text(s) => Built::Text(TextString {
                data: TextData::Valid(s),
                codepoints: self.codepoints,
            }),
            Accumulator::Malformed(b, condition) => Built::Text(TextString {
                data: TextData::Malformed(b, condition),
                codepoints: self.codepoints,
            }),
        }
    }
}
