use super::{
    HandshakeC2s, HandshakeNextState, MAX_PACKET_SIZE, PacketEncoder, PacketFrame, ProtoError,
    StatusRequestC2s, StatusResponseS2c, encode_packet, encode_raw_packet,
    varint::{push_varint_byte, read_varint, read_varint_partial, varint_len, write_varint},
};

const STATUS_JSON: &str = "{\"description\":\"A Minecraft Server\",\"players\":{\"max\":20,\"online\":3},\"version\":{\"name\":\"1.20.1\",\"protocol\":763}}";

#[test]
fn varint_roundtrip() {
    let values = [
        0,
        1,
        2,
        127,
        128,
        255,
        25_565,
        2_097_151,
        2_097_152,
        2_147_483_647,
        u32::MAX,
    ];
    for value in values {
        let mut buf = Vec::new();
        write_varint(&mut buf, value);
        assert_eq!(buf.len(), varint_len(value));
        let mut slice = buf.as_slice();
        let decoded = read_varint(&mut slice).unwrap();
        assert_eq!(decoded, value);
        assert!(slice.is_empty());
    }
}

#[test]
fn varint_roundtrip_around_boundaries() {
    for shift in 0..31 {
        let base: u32 = 1 << shift;
        for value in [base - 1, base, base + 1] {
            let mut buf = Vec::new();
            write_varint(&mut buf, value);
            assert_eq!(read_varint(&mut buf.as_slice()).unwrap(), value);
        }
    }
}

#[test]
fn varint_encoding_is_minimal() {
    let cases: [(u32, &[u8]); 6] = [
        (0, &[0x00]),
        (127, &[0x7f]),
        (128, &[0x80, 0x01]),
        (300, &[0xac, 0x02]),
        (25_565, &[0xdd, 0xc7, 0x01]),
        (u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f]),
    ];
    for (value, expected) in cases {
        let mut buf = Vec::new();
        write_varint(&mut buf, value);
        assert_eq!(buf, expected, "encoding of {value}");
    }
}

#[test]
fn varint_rejects_sixth_byte() {
    let bytes = [0x80u8, 0x80, 0x80, 0x80, 0x80, 0x01];
    assert_eq!(
        read_varint_partial(&bytes),
        Err(ProtoError::VarIntTooLarge)
    );
}

#[test]
fn varint_bytes_fold_little_end_first() {
    let mut value = 0;
    assert!(!push_varint_byte(&mut value, 0, 0xdd));
    assert!(!push_varint_byte(&mut value, 1, 0xc7));
    assert!(push_varint_byte(&mut value, 2, 0x01));
    assert_eq!(value, 25565);
}

#[test]
fn varint_len_matches_encoder_at_every_width() {
    let widths = [
        0,
        0x7f,
        0x80,
        0x3fff,
        0x4000,
        0x1f_ffff,
        0x20_0000,
        0xfff_ffff,
        0x1000_0000,
        u32::MAX,
    ];
    for value in widths {
        let mut buf = Vec::new();
        write_varint(&mut buf, value);
        assert_eq!(varint_len(value), buf.len(), "length of {value:#x}");
    }
}

#[test]
fn varint_partial_waits_for_terminator() {
    assert_eq!(read_varint_partial(&[0x80, 0x80]), Ok(None));
    assert_eq!(read_varint_partial(&[]), Ok(None));
    assert_eq!(read_varint(&mut &[0x80u8][..]), Err(ProtoError::UnexpectedEof));
}

#[test]
fn handshake_wire_bytes() {
    let packet = HandshakeC2s {
        protocol_version: 0,
        server_address: "localhost",
        server_port: 25565,
        next_state: HandshakeNextState::Status,
    };

    let mut out = Vec::new();
    encode_packet(&mut out, &packet).unwrap();

    let mut expected = vec![0x0f, 0x00, 0x00, 0x09];
    expected.extend_from_slice(b"localhost");
    expected.extend_from_slice(&[0x63, 0xdd, 0x01]);
    assert_eq!(out, expected);
}

#[test]
fn handshake_roundtrip() {
    let packet = HandshakeC2s {
        protocol_version: 763,
        server_address: "mc.example.org",
        server_port: 683,
        next_state: HandshakeNextState::Status,
    };

    let mut enc = PacketEncoder::new();
    enc.write_packet(&packet).unwrap();
    let bytes = enc.take();

    let (frame, consumed) = PacketFrame::parse(&bytes).unwrap().unwrap();
    assert_eq!(consumed, bytes.len());
    assert_eq!(frame.id, HandshakeC2s::ID);
    let decoded: HandshakeC2s<'_> = frame.decode().unwrap();
    assert_eq!(decoded, packet);
}

#[test]
fn handshake_rejects_unknown_next_state() {
    let mut body = Vec::new();
    write_varint(&mut body, 0);
    write_varint(&mut body, 1);
    body.push(b'a');
    body.extend_from_slice(&25565u16.to_be_bytes());
    write_varint(&mut body, 3);

    let frame = PacketFrame { id: 0, body };
    assert_eq!(
        frame.decode::<HandshakeC2s<'_>>(),
        Err(ProtoError::InvalidHandshakeState(3))
    );
}

#[test]
fn status_request_is_two_bytes() {
    let mut out = Vec::new();
    encode_packet(&mut out, &StatusRequestC2s).unwrap();
    assert_eq!(out, [0x01, 0x00]);
}

#[test]
fn status_response_roundtrip() {
    let packet = StatusResponseS2c { json: STATUS_JSON };

    let mut out = Vec::new();
    encode_packet(&mut out, &packet).unwrap();

    let (frame, _) = PacketFrame::parse(&out).unwrap().unwrap();
    let decoded: StatusResponseS2c<'_> = frame.decode().unwrap();
    assert_eq!(decoded.json, STATUS_JSON);
}

#[test]
fn frame_strip_recovers_arbitrary_payload() {
    let payloads: [&[u8]; 4] = [b"", b"\x00", b"hello", &[0xffu8; 300]];
    for payload in payloads {
        let mut out = Vec::new();
        encode_raw_packet(&mut out, 0x00, payload).unwrap();
        let (frame, consumed) = PacketFrame::parse(&out).unwrap().unwrap();
        assert_eq!(consumed, out.len());
        assert_eq!(frame.id, 0x00);
        assert_eq!(frame.body, payload);
    }
}

#[test]
fn frame_parse_is_incremental() {
    let mut out = Vec::new();
    encode_packet(&mut out, &StatusResponseS2c { json: STATUS_JSON }).unwrap();

    for cut in 0..out.len() {
        assert_eq!(PacketFrame::parse(&out[..cut]).unwrap(), None);
    }
    assert!(PacketFrame::parse(&out).unwrap().is_some());
}

#[test]
fn frame_decode_rejects_wrong_id() {
    let frame = PacketFrame {
        id: 0x01,
        body: Vec::new(),
    };
    assert_eq!(
        frame.decode::<StatusResponseS2c<'_>>(),
        Err(ProtoError::InvalidPacketId {
            expected: 0x00,
            actual: 0x01
        })
    );
}

#[test]
fn frame_decode_rejects_trailing_bytes() {
    let frame = PacketFrame {
        id: 0x00,
        body: vec![0x00],
    };
    assert_eq!(
        frame.decode::<StatusRequestC2s>(),
        Err(ProtoError::TrailingBytes(1))
    );
}

#[test]
fn oversized_packets_are_rejected() {
    let body = vec![0u8; MAX_PACKET_SIZE];
    let mut out = Vec::new();
    assert_eq!(
        encode_raw_packet(&mut out, 0x00, &body),
        Err(ProtoError::PacketTooLarge {
            len: MAX_PACKET_SIZE + 1
        })
    );

    let mut header = Vec::new();
    write_varint(&mut header, (MAX_PACKET_SIZE + 1) as u32);
    assert!(matches!(
        PacketFrame::parse(&header),
        Err(ProtoError::PacketTooLarge { .. })
    ));
}
