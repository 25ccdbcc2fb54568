//! Property-based tests for the buffer and batch codec.
//!
//! These tests use proptest to verify invariants hold for all inputs:
//! - Every integer width reads back bit-identical in both byte orders
//! - Fixed arrays and length-prefixed strings read back unchanged
//! - Growth never disturbs unread bytes
//! - A failed batch read leaves the read cursor where it was
//! - A prepend that does not fit changes nothing

use proptest::prelude::*;
use wireschema::*;

#[derive(Debug, Clone)]
enum WireValue {
    U8(u8),
    I16(i16),
    U32(u32),
    I64(i64),
    Bool(bool),
    Text(Vec<u8>),
    Fixed(Vec<u8>),
}

// Strategy for a single wire value of any supported shape
fn value_strategy() -> impl Strategy<Value = WireValue> {
    prop_oneof![
        any::<u8>().prop_map(WireValue::U8),
        any::<i16>().prop_map(WireValue::I16),
        any::<u32>().prop_map(WireValue::U32),
        any::<i64>().prop_map(WireValue::I64),
        any::<bool>().prop_map(WireValue::Bool),
        proptest::collection::vec(any::<u8>(), 0..64).prop_map(WireValue::Text),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(WireValue::Fixed),
    ]
}

fn order_strategy() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![Just(ByteOrder::Big), Just(ByteOrder::Little), Just(ByteOrder::Native)]
}

fn encode(enc: &mut Encoder<'_>, value: &WireValue) {
    match value {
        WireValue::U8(v) => enc.put_u8(*v),
        WireValue::I16(v) => enc.put_i16(*v),
        WireValue::U32(v) => enc.put_u32(*v),
        WireValue::I64(v) => enc.put_i64(*v),
        WireValue::Bool(v) => enc.put_bool(*v),
        WireValue::Text(v) => enc.put_varbytes(v).unwrap(),
        WireValue::Fixed(v) => enc.put_bytes(v),
    }
}

fn decode_matches(dec: &mut Decoder<'_>, value: &WireValue) -> bool {
    match value {
        WireValue::U8(v) => dec.get_u8().unwrap() == *v,
        WireValue::I16(v) => dec.get_i16().unwrap() == *v,
        WireValue::U32(v) => dec.get_u32().unwrap() == *v,
        WireValue::I64(v) => dec.get_i64().unwrap() == *v,
        WireValue::Bool(v) => dec.get_bool().unwrap() == *v,
        WireValue::Text(v) => dec.get_varbytes().unwrap() == *v,
        WireValue::Fixed(v) => {
            let mut out = vec![0u8; v.len()];
            dec.get_bytes(&mut out).unwrap();
            out == *v
        }
    }
}

#[test]
fn prop_values_round_trip_in_any_order() {
    proptest!(|(values in proptest::collection::vec(value_strategy(), 0..32), order in order_strategy())| {
        // Small initial size so most cases grow at least once
        let mut buf = DataBuffer::with_capacity(4, DEFAULT_PREPEND_SIZE);
        let mut enc = Encoder::with_order(&mut buf, order);
        for value in &values {
            encode(&mut enc, value);
        }

        let mut dec = Decoder::with_order(&mut buf, order);
        for value in &values {
            prop_assert!(decode_matches(&mut dec, value), "mismatch on {:?}", value);
        }
        prop_assert!(dec.is_at_end());
    });
}

#[test]
fn prop_integer_widths_round_trip() {
    proptest!(|(a in any::<u16>(), b in any::<i32>(), c in any::<u64>(), d in any::<i8>(), order in order_strategy())| {
        let mut buf = DataBuffer::new();
        buf.write_int(a, order);
        buf.write_int(b, order);
        buf.write_int(c, order);
        buf.write_int(d, order);
        prop_assert_eq!(buf.size(), 2 + 4 + 8 + 1);

        prop_assert_eq!(buf.peek_int::<u16>(order).unwrap(), a);
        prop_assert_eq!(buf.read_int::<u16>(order).unwrap(), a);
        prop_assert_eq!(buf.read_int::<i32>(order).unwrap(), b);
        prop_assert_eq!(buf.read_int::<u64>(order).unwrap(), c);
        prop_assert_eq!(buf.read_int::<i8>(order).unwrap(), d);
        prop_assert!(buf.is_empty());
    });
}

#[test]
fn prop_growth_preserves_unread_bytes() {
    proptest!(|(
        first in proptest::collection::vec(any::<u8>(), 1..128),
        consumed in 0usize..128,
        second in proptest::collection::vec(any::<u8>(), 0..512),
        initial in 1usize..64,
    )| {
        let mut buf = DataBuffer::with_capacity(initial, DEFAULT_PREPEND_SIZE);
        buf.write(&first);
        let consumed = consumed.min(first.len());
        buf.consume(consumed);

        let before = buf.to_vec();
        buf.write(&second);

        prop_assert_eq!(buf.size(), before.len() + second.len());
        prop_assert_eq!(&buf.data()[..before.len()], &before[..]);
        prop_assert_eq!(&buf.data()[before.len()..], &second[..]);
    });
}

#[test]
fn prop_failed_batch_read_restores_cursor() {
    proptest!(|(head in any::<u32>(), text in "[a-z]{0,16}", cut in 1usize..8, order in order_strategy())| {
        let mut buf = DataBuffer::new();
        write_fields!(&mut buf, order; head, text.as_str(), 0u64).unwrap();
        // Drop part of the trailing u64 so only the last slot is short
        buf.uncommit(cut);
        let before = buf.to_vec();
        let needed = batch_read_size(
            &buf,
            order,
            [
                FieldCodec::Integer { width: 4 },
                FieldCodec::LengthPrefixedText,
                FieldCodec::Integer { width: 8 },
            ],
        );
        prop_assert_eq!(needed, 0);

        let mut got_head = 0u32;
        let mut got_text = String::new();
        let mut tail = 0u64;
        let result = read_fields!(&mut buf, order; &mut got_head, &mut got_text, &mut tail);

        let is_short_read = matches!(result, Err(BufferError::InsufficientReadableBytes { .. }));
        prop_assert!(is_short_read);
        prop_assert_eq!(buf.size(), before.len());
        prop_assert_eq!(buf.data(), &before[..]);
    });
}

#[test]
fn prop_oversized_prepend_is_rejected_untouched() {
    proptest!(|(
        prepend in 0usize..32,
        body in proptest::collection::vec(any::<u8>(), 0..64),
        extra in 1usize..16,
    )| {
        let mut buf = DataBuffer::with_capacity(64, prepend);
        buf.write(&body);
        let header = vec![0xEEu8; buf.prependable_bytes() + extra];

        let result = buf.write_front(&header);
        prop_assert_eq!(
            result,
            Err(BufferError::InsufficientPrependSpace {
                needed: header.len(),
                available: prepend,
            })
        );
        prop_assert_eq!(buf.data(), &body[..]);

        let fits = vec![0xAAu8; prepend];
        prop_assert!(buf.write_front(&fits).is_ok());
        prop_assert_eq!(buf.size(), prepend + body.len());
        prop_assert_eq!(buf.prependable_bytes(), 0);
    });
}

#[test]
fn prop_batch_write_front_is_atomic() {
    proptest!(|(prepend in 0usize..16, a in any::<u32>(), b in any::<u16>())| {
        let mut buf = DataBuffer::with_capacity(16, prepend);
        buf.write(b"xyz");

        let fields = [WriteField::U32(a), WriteField::U16(b)];
        let result = batch_write_front(&mut buf, ByteOrder::Big, &fields);
        if prepend >= 6 {
            prop_assert!(result.is_ok());
            prop_assert_eq!(buf.read_int::<u32>(ByteOrder::Big).unwrap(), a);
            prop_assert_eq!(buf.read_int::<u16>(ByteOrder::Big).unwrap(), b);
        } else {
            let is_prepend_err = matches!(result, Err(BufferError::InsufficientPrependSpace { .. }));
            prop_assert!(is_prepend_err);
        }
        prop_assert_eq!(buf.data(), b"xyz");
    });
}
