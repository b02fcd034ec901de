/*!
Builders for arrays and maps.

A builder is the mutable construction phase of a container. Children are
appended until the declared count is reached (or, for an indefinite-length
container, until the caller decides it is finished), then the builder is
sealed into an immutable, shareable [`ItemRef`].

Dropping an unsealed builder releases every child already attached.
*/

use super::decode::Error;
use super::item::{Item, ItemRef, Pair};
use alloc::vec::Vec;

// Never trust a declared count for preallocation beyond this
const PREALLOC_LIMIT: usize = 1024;

#[derive(Debug)]
pub struct ArrayBuilder {
    declared: Option<usize>,
    elements: Vec<ItemRef>,
}

impl ArrayBuilder {
    pub fn definite(count: usize) -> Self {
        Self {
            declared: Some(count),
            elements: Vec::with_capacity(count.min(PREALLOC_LIMIT)),
        }
    }

    pub fn indefinite() -> Self {
        Self {
            declared: None,
            elements: Vec::new(),
        }
    }

    pub fn is_definite(&self) -> bool {
        self.declared.is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True once a definite builder holds its declared count.
    pub fn is_full(&self) -> bool {
        self.declared.is_some_and(|d| self.elements.len() >= d)
    }

    pub fn push(&mut self, item: impl Into<ItemRef>) -> Result<(), Error> {
        if let Some(declared) = self.declared
            && self.elements.len() >= declared
        {
            return Err(Error::StructuralMismatch {
                declared: declared as u64,
                available: self.elements.len() as u64 + 1,
            });
        }
        self.elements.push(item.into());
        Ok(())
    }

    pub fn seal(self) -> Result<ItemRef, Error> {
        match self.declared {
            Some(declared) if declared != self.elements.len() => Err(Error::StructuralMismatch {
                declared: declared as u64,
                available: self.elements.len() as u64,
            }),
            declared => Ok(Item::array(self.elements, declared.is_none()).into_ref()),
        }
    }
}

#[derive(Debug)]
pub struct MapBuilder {
    declared: Option<usize>,
    pairs: Vec<Pair>,
    key: Option<ItemRef>,
}

impl MapBuilder {
    /// A map of `count` key/value pairs.
    pub fn definite(count: usize) -> Self {
        Self {
            declared: Some(count),
            pairs: Vec::with_capacity(count.min(PREALLOC_LIMIT)),
            key: None,
        }
    }

    pub fn indefinite() -> Self {
        Self {
            declared: None,
            pairs: Vec::new(),
            key: None,
        }
    }

    pub fn is_definite(&self) -> bool {
        self.declared.is_some()
    }

    /// Complete pairs held so far.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.key.is_none()
    }

    pub fn is_full(&self) -> bool {
        self.declared.is_some_and(|d| self.pairs.len() >= d)
    }

    /// True if a key has been pushed without its value.
    pub fn awaiting_value(&self) -> bool {
        self.key.is_some()
    }

    /// Appends the next key or value, alternating.
    pub fn push(&mut self, item: impl Into<ItemRef>) -> Result<(), Error> {
        match self.key.take() {
            Some(key) => {
                self.pairs.push(Pair {
                    key,
                    value: item.into(),
                });
                Ok(())
            }
            None => {
                if let Some(declared) = self.declared
                    && self.pairs.len() >= declared
                {
                    return Err(Error::StructuralMismatch {
                        declared: declared as u64,
                        available: self.pairs.len() as u64 + 1,
                    });
                }
                self.key = Some(item.into());
                Ok(())
            }
        }
    }

    pub fn insert(
        &mut self,
        key: impl Into<ItemRef>,
        value: impl Into<ItemRef>,
    ) -> Result<(), Error> {
        if self.awaiting_value() {
            return Err(Error::StructuralMismatch {
                declared: self.pairs.len() as u64 + 1,
                available: self.pairs.len() as u64,
            });
        }
        self.push(key)?;
        self.push(value)
    }

    pub fn seal(self) -> Result<ItemRef, Error> {
        let complete = self.pairs.len() as u64;
        if self.key.is_some() {
            return Err(Error::StructuralMismatch {
                declared: self.declared.map_or(complete + 1, |d| d as u64),
                available: complete,
            });
        }
        match self.declared {
            Some(declared) if declared != self.pairs.len() => Err(Error::StructuralMismatch {
                declared: declared as u64,
                available: complete,
            }),
            declared => Ok(Item::map(self.pairs, declared.is_none()).into_ref()),
        }
    }
}
