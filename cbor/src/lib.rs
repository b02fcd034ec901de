/*!
A CBOR (RFC 8949) decoder that loads a buffer into a graph of
reference-counted [`Item`]s.

```
use cbor_load::{Flags, load};

let result = load(&[0x7F, 0x61, b'a', 0x61, b'b', 0xFF], &Flags::default());
let item = result.item.unwrap();
assert_eq!(item.as_str(), Some("ab"));
assert_eq!(item.codepoint_count(), Some(2));
assert_eq!(result.read, 6);
```
*/
#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod builder;
pub mod cursor;
pub mod decode;
pub mod header;
pub mod item;
pub mod string;

pub use decode::{Error, Flags, LoadError, LoadResult, Status, load, try_load};
pub use item::{FloatCtrl, Item, ItemRef, Pair, Type, Value};

#[cfg(test)]
mod decode_tests;
