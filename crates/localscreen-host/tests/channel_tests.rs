use std::io::Cursor;

use localscreen_host::{read_frame, write_frame, FrameError, FramedChannel};
use proptest::prelude::*;

const MAX: usize = 1 << 20;

#[test]
fn empty_stream_is_clean_shutdown() {
    let mut input = Cursor::new(Vec::<u8>::new());
    assert!(read_frame(&mut input, MAX).unwrap().is_none());
}

#[test]
fn zero_length_frame_round_trips() {
    let mut wire = Vec::new();
    write_frame(&mut wire, b"").unwrap();
    assert_eq!(wire, vec![0, 0, 0, 0]);
    let mut input = Cursor::new(wire);
    assert_eq!(read_frame(&mut input, MAX).unwrap(), Some(Vec::new()));
    assert!(read_frame(&mut input, MAX).unwrap().is_none());
}

#[test]
fn prefix_is_little_endian() {
    let mut wire = Vec::new();
    write_frame(&mut wire, &[7u8; 258]).unwrap();
    assert_eq!(&wire[..4], &[2, 1, 0, 0]);
    assert_eq!(wire.len(), 262);
}

#[test]
fn partial_header_is_fatal() {
    for cut in 1..4 {
        let mut input = Cursor::new(vec![5u8, 0, 0, 0][..cut].to_vec());
        match read_frame(&mut input, MAX) {
            Err(FrameError::TruncatedHeader { got }) => assert_eq!(got, cut),
            other => panic!("expected truncated header, got {other:?}"),
        }
    }
}

#[test]
fn short_payload_is_fatal() {
    let mut input = Cursor::new(vec![10u8, 0, 0, 0, b'a', b'b', b'c']);
    match read_frame(&mut input, MAX) {
        Err(FrameError::TruncatedPayload { expected, got }) => assert_eq!((expected, got), (10, 3)),
        other => panic!("expected truncated payload, got {other:?}"),
    }
}

#[test]
fn oversized_prefix_is_rejected_before_reading() {
    let mut input = Cursor::new(vec![0u8, 0, 0, 1]);
    match read_frame(&mut input, MAX) {
        Err(FrameError::TooLarge { len, max }) => assert_eq!((len, max), (1 << 24, MAX)),
        other => panic!("expected too large, got {other:?}"),
    }
}

#[test]
fn framing_errors_map_to_core_framing() {
    let err: localscreen_core::Error = FrameError::TruncatedHeader { got: 2 }.into();
    assert!(matches!(err, localscreen_core::Error::Framing(_)));
}

#[test]
fn channel_reads_back_to_back_frames() {
    let mut wire = Vec::new();
    write_frame(&mut wire, b"one").unwrap();
    write_frame(&mut wire, b"two").unwrap();
    let mut channel = FramedChannel::new(Cursor::new(wire), Vec::new());
    assert_eq!(channel.read_message().unwrap().as_deref(), Some(&b"one"[..]));
    assert_eq!(channel.read_message().unwrap().as_deref(), Some(&b"two"[..]));
    assert!(channel.read_message().unwrap().is_none());

    channel.write_message(b"{}").unwrap();
    assert_eq!(channel.writer().as_slice(), &[2, 0, 0, 0, b'{', b'}']);
}

proptest! {
    #[test]
    fn frames_round_trip(payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..512), 0..8)) {
        let mut wire = Vec::new();
        for p in &payloads {
            write_frame(&mut wire, p).unwrap();
        }
        let mut input = Cursor::new(wire);
        for p in &payloads {
            let got = read_frame(&mut input, MAX).unwrap();
            prop_assert_eq!(got.as_ref(), Some(p));
        }
        prop_assert!(read_frame(&mut input, MAX).unwrap().is_none());
    }
}
