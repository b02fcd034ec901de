use super::decode::*;
use super::header::{Major, Width};
use super::item::{ItemRef, Type, Value, live};
use hex_literal::hex;
use std::vec::Vec;

fn loaded(data: &[u8]) -> ItemRef {
    let r = load(data, &Flags::default());
    assert!(r.is_ok(), "{:?}", r.error);
    assert_eq!(r.read, data.len());
    r.item.unwrap()
}

fn failed(data: &[u8], flags: &Flags) -> Error {
    let base = live::count();
    let r = load(data, flags);
    assert!(r.item.is_none());
    // Nothing partially built may survive a failure
    assert_eq!(live::count(), base);
    r.error.unwrap()
}

fn int(data: &[u8]) -> i128 {
    loaded(data).as_i128().unwrap()
}

fn float(data: &[u8]) -> f64 {
    loaded(data).as_f64().unwrap()
}

fn text(data: &[u8]) -> std::string::String {
    loaded(data).as_str().unwrap().into()
}

#[test]
fn rfc_tests() {
    // RFC 8949, Appendix A:
    // https://www.rfc-editor.org/rfc/rfc8949.html#section-appendix.a

    assert_eq!(0, int(&hex!("00")));
    assert_eq!(1, int(&hex!("01")));
    assert_eq!(10, int(&hex!("0a")));
    assert_eq!(23, int(&hex!("17")));
    assert_eq!(24, int(&hex!("1818")));
    assert_eq!(25, int(&hex!("1819")));
    assert_eq!(100, int(&hex!("1864")));
    assert_eq!(1000, int(&hex!("1903e8")));
    assert_eq!(1000000, int(&hex!("1a000f4240")));
    assert_eq!(1000000000000, int(&hex!("1b000000e8d4a51000")));
    assert_eq!(18446744073709551615, int(&hex!("1bffffffffffffffff")));
    assert_eq!(-18446744073709551616, int(&hex!("3bffffffffffffffff")));
    assert_eq!(-1, int(&hex!("20")));
    assert_eq!(-10, int(&hex!("29")));
    assert_eq!(-100, int(&hex!("3863")));
    assert_eq!(-1000, int(&hex!("3903e7")));

    // Bignums are tags over byte strings
    let big = loaded(&hex!("c249010000000000000000"));
    assert_eq!(big.tag_value(), Some(2));
    assert_eq!(
        big.tagged_item().and_then(|i| i.as_bytes()),
        Some(&hex!("010000000000000000")[..])
    );

    assert_eq!(0.0, float(&hex!("f90000")));
    assert_eq!(-0.0, float(&hex!("f98000")));
    assert!(float(&hex!("f98000")).is_sign_negative());
    assert_eq!(1.0, float(&hex!("f93c00")));
    assert_eq!(1.1, float(&hex!("fb3ff199999999999a")));
    assert_eq!(1.5, float(&hex!("f93e00")));
    assert_eq!(65504.0, float(&hex!("f97bff")));
    assert_eq!(100000.0, float(&hex!("fa47c35000")));
    assert_eq!(3.4028234663852886e+38, float(&hex!("fa7f7fffff")));
    assert_eq!(1.0e+300, float(&hex!("fb7e37e43c8800759c")));
    assert_eq!(5.960464477539063e-8, float(&hex!("f90001")));
    assert_eq!(0.00006103515625, float(&hex!("f90400")));
    assert_eq!(-4.0, float(&hex!("f9c400")));
    assert_eq!(-4.1, float(&hex!("fbc010666666666666")));
    assert_eq!(f64::INFINITY, float(&hex!("f97c00")));
    assert!(float(&hex!("f97e00")).is_nan());
    assert_eq!(f64::NEG_INFINITY, float(&hex!("f9fc00")));
    assert_eq!(f64::INFINITY, float(&hex!("fa7f800000")));
    assert!(float(&hex!("fa7fc00000")).is_nan());
    assert_eq!(f64::NEG_INFINITY, float(&hex!("faff800000")));
    assert_eq!(f64::INFINITY, float(&hex!("fb7ff0000000000000")));
    assert!(float(&hex!("fb7ff8000000000000")).is_nan());
    assert_eq!(f64::NEG_INFINITY, float(&hex!("fbfff0000000000000")));

    assert_eq!(Some(false), loaded(&hex!("f4")).as_bool());
    assert_eq!(Some(true), loaded(&hex!("f5")).as_bool());
    assert!(loaded(&hex!("f6")).is_null());
    assert!(loaded(&hex!("f7")).is_undefined());
    assert_eq!(Value::Simple(16), loaded(&hex!("f0")).value());
    assert_eq!(Value::Simple(255), loaded(&hex!("f8ff")).value());

    let t = loaded(&hex!("c074323031332d30332d32315432303a30343a30305a"));
    assert_eq!(t.tag_value(), Some(0));
    assert_eq!(
        t.tagged_item().and_then(|i| i.as_str()),
        Some("2013-03-21T20:04:00Z")
    );
    let t = loaded(&hex!("c11a514b67b0"));
    assert_eq!(t.tag_value(), Some(1));
    assert_eq!(t.tagged_item().and_then(|i| i.as_u64()), Some(1363896240));
    let t = loaded(&hex!("c1fb41d452d9ec200000"));
    assert_eq!(t.tagged_item().and_then(|i| i.as_f64()), Some(1363896240.5));
    let t = loaded(&hex!("d74401020304"));
    assert_eq!(t.tag_value(), Some(23));
    assert_eq!(
        t.tagged_item().and_then(|i| i.as_bytes()),
        Some(&hex!("01020304")[..])
    );
    let t = loaded(&hex!("d818456449455446"));
    assert_eq!(t.tag_value(), Some(24));
    let t = loaded(&hex!("d82076687474703a2f2f7777772e6578616d706c652e636f6d"));
    assert_eq!(t.tag_value(), Some(32));
    assert_eq!(
        t.tagged_item().and_then(|i| i.as_str()),
        Some("http://www.example.com")
    );

    assert_eq!(Some(&[][..]), loaded(&hex!("40")).as_bytes());
    assert_eq!(
        Some(&hex!("01020304")[..]),
        loaded(&hex!("4401020304")).as_bytes()
    );
    assert_eq!("", text(&hex!("60")));
    assert_eq!("a", text(&hex!("6161")));
    assert_eq!("IETF", text(&hex!("6449455446")));
    assert_eq!("\"\\", text(&hex!("62225c")));
    assert_eq!("\u{00fc}", text(&hex!("62c3bc")));
    assert_eq!("\u{6c34}", text(&hex!("63e6b0b4")));
    assert_eq!(
        "\u{10151}", /* surrogate pair: \u{d800}\u{dd51} */
        text(&hex!("64f0908591"))
    );

    assert_eq!(Some(0), loaded(&hex!("80")).array_len());
    let a = loaded(&hex!("83010203"));
    let v: Vec<_> = a
        .elements()
        .unwrap()
        .iter()
        .map(|e| e.as_u64().unwrap())
        .collect();
    assert_eq!(v, [1, 2, 3]);

    let a = loaded(&hex!("8301820203820405"));
    assert_eq!(a.array_len(), Some(3));
    assert_eq!(a.get(1).and_then(|e| e.get(1)).and_then(|e| e.as_u64()), Some(3));
    assert_eq!(a.get(2).and_then(|e| e.get(0)).and_then(|e| e.as_u64()), Some(4));

    let a = loaded(&hex!(
        "98190102030405060708090a0b0c0d0e0f101112131415161718181819"
    ));
    assert_eq!(a.array_len(), Some(25));
    assert_eq!(a.get(24).and_then(|e| e.as_u64()), Some(25));

    assert_eq!(Some(0), loaded(&hex!("a0")).map_len());
    let m = loaded(&hex!("a201020304"));
    assert_eq!(m.map_len(), Some(2));
    assert_eq!(
        m.map_get(&crate::Item::unsigned(3)).and_then(|v| v.as_u64()),
        Some(4)
    );

    let m = loaded(&hex!("a26161016162820203"));
    assert_eq!(m.map_get_str("a").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(m.map_get_str("b").and_then(|v| v.array_len()), Some(2));

    let a = loaded(&hex!("826161a161626163"));
    assert_eq!(a.get(0).and_then(|e| e.as_str()), Some("a"));
    assert_eq!(
        a.get(1)
            .and_then(|e| e.map_get_str("b"))
            .and_then(|v| v.as_str()),
        Some("c")
    );

    let m = loaded(&hex!("a56161614161626142616361436164614461656145"));
    let v: Vec<_> = m
        .pairs()
        .unwrap()
        .iter()
        .flat_map(|p| [p.key.as_str().unwrap(), p.value.as_str().unwrap()])
        .collect();
    assert_eq!(v, ["a", "A", "b", "B", "c", "C", "d", "D", "e", "E"]);

    let b = loaded(&hex!("5f42010243030405ff"));
    assert_eq!(b.as_bytes(), Some(&hex!("0102030405")[..]));
    assert!(b.is_indefinite());

    let t = loaded(&hex!("7f657374726561646d696e67ff"));
    assert_eq!(t.as_str(), Some("streaming"));
    assert_eq!(t.codepoint_count(), Some(9));

    let a = loaded(&hex!("9fff"));
    assert_eq!(a.array_len(), Some(0));
    assert!(a.is_indefinite());

    // The RFC's mixed definite/indefinite nestings all describe [1, [2, 3], [4, 5]]
    let expected = loaded(&hex!("8301820203820405"));
    for data in [
        &hex!("9f018202039f0405ffff")[..],
        &hex!("9f01820203820405ff"),
        &hex!("83018202039f0405ff"),
        &hex!("83019f0203ff820405"),
    ] {
        assert_eq!(loaded(data), expected);
    }

    let a = loaded(&hex!(
        "9f0102030405060708090a0b0c0d0e0f101112131415161718181819ff"
    ));
    assert_eq!(a.array_len(), Some(25));

    let m = loaded(&hex!("bf61610161629f0203ffff"));
    assert_eq!(m.map_len(), Some(2));
    assert!(m.map_get_str("b").unwrap().is_indefinite());

    let a = loaded(&hex!("826161bf61626163ff"));
    assert_eq!(
        a.get(1)
            .and_then(|e| e.map_get_str("b"))
            .and_then(|v| v.as_str()),
        Some("c")
    );

    let m = loaded(&hex!("bf6346756ef563416d7421ff"));
    assert_eq!(m.map_get_str("Fun").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(m.map_get_str("Amt").and_then(|v| v.as_i64()), Some(-2));
}

#[test]
fn empty_string() {
    let r = load(&[0x60], &Flags::default());
    let s = r.item.unwrap();
    assert_eq!(s.kind(), Type::TextString);
    assert!(s.is_string());
    assert_eq!(s.string_len(), Some(0));
    assert_eq!(s.codepoint_count(), Some(0));
    assert_eq!(r.read, 1);
    assert!(s.release());
}

#[test]
fn short_string() {
    let data = hex!("6c48656c6c6f20776f726c6421");
    let r = load(&data, &Flags::default());
    let s = r.item.unwrap();
    assert!(s.is_string());
    assert_eq!(s.string_len(), Some(12));
    assert_eq!(s.codepoint_count(), Some(12));
    assert_eq!(s.as_bytes(), Some(&b"Hello world!"[..]));
    assert_eq!(r.read, 13);
    assert!(s.release());
}

#[test]
fn short_multibyte_string() {
    let data = hex!("6fc48c6175657320c39f76c49b746521");
    let r = load(&data, &Flags::default());
    let s = r.item.unwrap();
    assert!(s.is_string());
    assert_eq!(s.string_len(), Some(15));
    assert_eq!(s.codepoint_count(), Some(12));
    assert_eq!(s.as_bytes(), Some("Čaues ßvěte!".as_bytes()));
    assert_eq!(r.read, 16);
    assert!(s.release());
}

#[test]
fn int8_string() {
    let lorem = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Donec mi tellus, iaculis nec vestibulum quis, fermentum non felis. Maecenas ut justo posuere.";
    assert_eq!(lorem.len(), 150);
    let mut data = std::vec![0x78, 0x96];
    data.extend_from_slice(lorem.as_bytes());

    let r = load(&data, &Flags::default());
    let s = r.item.unwrap();
    assert!(s.is_string());
    assert_eq!(s.string_len(), Some(150));
    assert_eq!(s.codepoint_count(), Some(150));
    assert_eq!(s.as_str(), Some(lorem));
    assert_eq!(r.read, 152);
    assert!(s.release());
}

#[test]
fn short_byte_strings() {
    for len in 0..=23u8 {
        let payload: Vec<u8> = (0..len).map(|i| i.wrapping_mul(37)).collect();
        let mut data = std::vec![0x40 | len];
        data.extend_from_slice(&payload);

        let r = load(&data, &Flags::default());
        let b = r.item.unwrap();
        assert!(b.is_bytestring());
        assert_eq!(b.string_len(), Some(len as usize));
        assert_eq!(b.as_bytes(), Some(&payload[..]));
        assert_eq!(r.read, len as usize + 1);
    }
}

#[test]
fn indefinite_text_matches_definite() {
    let data = hex!("7f61616162ff");
    let r = load(&data, &Flags::default());
    let s = r.item.unwrap();
    assert_eq!(s.string_len(), Some(2));
    assert_eq!(s.codepoint_count(), Some(2));
    assert_eq!(s.as_str(), Some("ab"));
    assert_eq!(r.read, 6);
    assert!(s.is_indefinite());

    assert_eq!(s, loaded(&hex!("626162")));

    // Multi-byte chunks sum their code points
    let s = loaded(&hex!("7f62c48c6161ff"));
    assert_eq!(s.as_str(), Some("Ča"));
    assert_eq!(s.string_len(), Some(3));
    assert_eq!(s.codepoint_count(), Some(2));

    // Empty chunks, and no chunks at all
    assert_eq!(loaded(&hex!("5f4040ff")).as_bytes(), Some(&[][..]));
    assert_eq!(loaded(&hex!("7fff")).as_str(), Some(""));
}

#[test]
fn integer_widths() {
    let i = loaded(&hex!("17"));
    assert_eq!(i.int_width(), Some(Width::W8));
    let i = loaded(&hex!("190001"));
    assert_eq!(i.int_width(), Some(Width::W16));
    assert_eq!(i.as_u64(), Some(1));
    let i = loaded(&hex!("3a00000000"));
    assert_eq!(i.int_width(), Some(Width::W32));
    assert_eq!(i.as_i64(), Some(-1));
    assert_eq!(i.magnitude(), Some(0));

    let i = loaded(&hex!("3b7fffffffffffffff"));
    assert_eq!(i.as_i64(), Some(i64::MIN));
    let i = loaded(&hex!("3b8000000000000000"));
    assert_eq!(i.as_i64(), None);
    assert_eq!(i.as_i128(), Some(i64::MIN as i128 - 1));
    assert_eq!(i.as_u64(), None);
}

#[test]
fn float_widths() {
    let f = loaded(&hex!("f93c00"));
    assert_eq!(f.float_width(), Some(Width::W16));
    let f = loaded(&hex!("fa47c35000"));
    assert_eq!(f.float_width(), Some(Width::W32));
    let f = loaded(&hex!("fb3ff199999999999a"));
    assert_eq!(f.float_width(), Some(Width::W64));
    assert_eq!(loaded(&hex!("f5")).as_f64(), None);
}

#[test]
fn trailing_data_is_not_consumed() {
    let r = load(&hex!("0102"), &Flags::default());
    assert!(r.is_ok());
    assert_eq!(r.read, 1);
    assert_eq!(r.item.unwrap().as_u64(), Some(1));
}

#[test]
fn truncated_input() {
    let flags = Flags::default();

    // Header declares 12 bytes, none supplied
    let e = failed(&hex!("6c"), &flags);
    assert_eq!(e.status(), Status::StructuralMismatch);

    assert!(matches!(
        failed(&[], &flags),
        Error::PrematureEnd {
            needed: 1,
            available: 0
        }
    ));
    assert_eq!(failed(&hex!("19ff"), &flags).status(), Status::PrematureEnd);
    assert_eq!(failed(&hex!("fb3ff1"), &flags).status(), Status::PrematureEnd);

    // Five elements declared, two present
    let e = failed(&hex!("850102"), &flags);
    assert!(matches!(
        e,
        Error::StructuralMismatch {
            declared: 5,
            available: 2
        }
    ));

    // Plausible count, but the last element is cut short
    let e = failed(&hex!("836161616263"), &flags);
    assert_eq!(e.status(), Status::StructuralMismatch);
    let e = failed(&hex!("8301021a0001"), &flags);
    assert_eq!(e.status(), Status::PrematureEnd);

    // Unterminated indefinite containers and strings
    for data in [
        &hex!("9f0102")[..],
        &hex!("bf6161")[..],
        &hex!("bf616101")[..],
        &hex!("7f6161")[..],
        &hex!("5f4101")[..],
        &hex!("8261619f")[..],
    ] {
        assert_eq!(failed(data, &flags).status(), Status::PrematureEnd);
    }

    // Every prefix of a valid nested item fails without leaking
    let data = hex!("a26161830102bf6162f5ff616382c24201027f61616162ff");
    assert_eq!(load(&data, &flags).read, data.len());
    for end in 0..data.len() {
        failed(&data[..end], &flags);
    }
}

#[test]
fn failure_reports_offset() {
    let r = load(&hex!("8301021a0001"), &Flags::default());
    assert_eq!(r.read, 3);
    let e = r.into_result().unwrap_err();
    assert_eq!(e.offset, 3);

    let e = try_load(&hex!("82011c"), &Flags::default()).unwrap_err();
    assert_eq!(e.error, Error::MalformedHeader(28));
    assert_eq!(e.offset, 2);
}

#[test]
fn malformed_headers() {
    let flags = Flags::default();
    for b in [0x1c, 0x1d, 0x1e, 0x3c, 0x5d, 0x7e, 0x9c, 0xbd, 0xde, 0xfc] {
        assert_eq!(failed(&[b], &flags), Error::MalformedHeader(b & 0x1f));
    }

    // Indefinite length where only definite lengths are legal
    assert_eq!(
        failed(&hex!("1f"), &flags),
        Error::IndefiniteNotAllowed(Major::UnsignedInt)
    );
    assert_eq!(
        failed(&hex!("3f"), &flags),
        Error::IndefiniteNotAllowed(Major::NegativeInt)
    );
    assert_eq!(
        failed(&hex!("df01"), &flags),
        Error::IndefiniteNotAllowed(Major::Tag)
    );
    assert_eq!(
        failed(&hex!("5f5f4101ffff"), &flags),
        Error::IndefiniteNotAllowed(Major::ByteString)
    );

    // Stray and misplaced breaks
    assert_eq!(failed(&hex!("ff"), &flags), Error::UnexpectedBreak);
    assert_eq!(failed(&hex!("8201ff"), &flags), Error::UnexpectedBreak);
    assert_eq!(failed(&hex!("c6ff"), &flags), Error::UnexpectedBreak);
    assert_eq!(
        failed(&hex!("bf6161ff"), &flags).status(),
        Status::StructuralMismatch
    );

    // Two-byte simple values below 32
    assert_eq!(failed(&hex!("f814"), &flags), Error::InvalidSimple(20));
    assert_eq!(
        failed(&hex!("f81f"), &flags).status(),
        Status::MalformedHeader
    );
    assert_eq!(loaded(&hex!("f820")).simple_value(), Some(32));
}

#[test]
fn chunk_type_mismatch() {
    let flags = Flags::default();
    assert_eq!(
        failed(&hex!("7f4161ff"), &flags),
        Error::ChunkTypeMismatch {
            expected: Major::TextString,
            found: Major::ByteString
        }
    );
    assert_eq!(
        failed(&hex!("5f410161ff"), &flags).status(),
        Status::ChunkTypeMismatch
    );
    assert_eq!(
        failed(&hex!("5f01ff"), &flags),
        Error::ChunkTypeMismatch {
            expected: Major::ByteString,
            found: Major::UnsignedInt
        }
    );
}

#[test]
fn malformed_text() {
    let data = hex!("6461ff6263");

    let e = failed(&data, &Flags::default());
    assert_eq!(e.status(), Status::MalformedText);

    let r = load(&data, &Flags::lenient());
    assert!(r.is_ok());
    let s = r.item.unwrap();
    assert_eq!(s.string_len(), Some(4));
    assert_eq!(s.codepoint_count(), Some(4));
    assert_eq!(s.as_str(), None);
    assert_eq!(s.utf8_condition().map(|c| c.valid_up_to), Some(1));
    assert_eq!(s.as_bytes(), Some(&data[1..]));

    // Each chunk of an indefinite string must stand alone
    let e = failed(&hex!("7f61c4618cff"), &Flags::default());
    assert_eq!(e.status(), Status::MalformedText);
    let s = loaded_with(&hex!("7f61c4618cff"), &Flags::lenient());
    assert_eq!(s.as_bytes(), Some(&hex!("c48c")[..]));
    assert_eq!(s.codepoint_count(), Some(2));
    assert_eq!(s.utf8_condition().map(|c| c.valid_up_to), Some(0));
}

fn loaded_with(data: &[u8], flags: &Flags) -> ItemRef {
    let r = load(data, flags);
    assert!(r.is_ok(), "{:?}", r.error);
    r.item.unwrap()
}

#[test]
fn depth_limit() {
    let flags = Flags::default().with_max_depth(2);
    assert_eq!(loaded_with(&hex!("818101"), &flags).array_len(), Some(1));
    assert_eq!(failed(&hex!("81818101"), &flags), Error::DepthExceeded(2));
    assert_eq!(failed(&hex!("81a1810101"), &flags), Error::DepthExceeded(2));
    assert_eq!(failed(&hex!("c1c1c101"), &flags), Error::DepthExceeded(2));
    assert!(loaded_with(&hex!("01"), &Flags::default().with_max_depth(0)).is_uint());
    assert_eq!(
        failed(&hex!("80"), &Flags::default().with_max_depth(0)),
        Error::DepthExceeded(0)
    );

    // Adversarial nesting fails deterministically instead of exhausting the stack
    let data = std::vec![0x81u8; 100_000];
    assert_eq!(
        failed(&data, &Flags::default()),
        Error::DepthExceeded(DEFAULT_MAX_DEPTH)
    );
}

#[test]
fn huge_declared_lengths() {
    let flags = Flags::default();
    for data in [
        &hex!("5bffffffffffffffff")[..],
        &hex!("7bffffffffffffffff00")[..],
        &hex!("9bffffffffffffffff00")[..],
        &hex!("bb7fffffffffffffff0000")[..],
        &hex!("ba0000000201")[..],
    ] {
        assert_eq!(failed(data, &flags).status(), Status::StructuralMismatch);
    }
}

#[test]
fn debug_is_diagnostic_notation() {
    let i = loaded(&hex!("a26161820120616266c48c61756573"));
    assert_eq!(std::format!("{i:?}"), "{\"a\": [1, -1], \"b\": \"Čaues\"}");
    let i = loaded(&hex!("9fc2420102f6f93e00ff"));
    assert_eq!(std::format!("{i:?}"), "[_ 2(h'0102'), null, 1.5]");
}
