//! End-to-end conversions through the pipeline

use macroconv_core::format::{self, DecodeOptions};
use macroconv_core::transform;
use macroconv_core::{
    Action, ConversionRequest, ConvertError, FormatError, Macro, MacroFormat, Player, Transform,
    convert, load,
};

fn request<'a>(
    bytes: &'a [u8],
    file_name: &'a str,
    source: Option<MacroFormat>,
    target: MacroFormat,
) -> ConversionRequest<'a> {
    ConversionRequest {
        bytes,
        file_name,
        source,
        target,
        options: DecodeOptions::default(),
        transforms: Vec::new(),
    }
}

#[test]
fn test_plain_text_to_replaybot_bytes() {
    let out = convert(&request(
        b"30\n10.5 1 0\n20.25 0 0\n",
        "macro.txt",
        Some(MacroFormat::PlainText),
        MacroFormat::ReplayBot,
    ))
    .unwrap();

    let mut expected = b"RPLY\x02\x00".to_vec();
    expected.extend_from_slice(&30.0f32.to_le_bytes());
    expected.extend_from_slice(&10.5f32.to_le_bytes());
    expected.push(0b01);
    expected.extend_from_slice(&20.25f32.to_le_bytes());
    expected.push(0b00);

    assert_eq!(out.payload.as_bytes(), expected.as_slice());
    assert_eq!(out.extension, Some("replay"));
}

#[test]
fn test_zbot_fps_from_delta() {
    let mut bytes = 0.05f32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&1.0f32.to_le_bytes());

    let loaded = load(&bytes, "slow.zbot", None, &DecodeOptions::default()).unwrap();
    assert_eq!(loaded.format, MacroFormat::Zbot);
    assert!((loaded.decoded.fps - 20.0).abs() / 20.0 < 1e-4);
    assert!(loaded.decoded.actions.is_empty());
}

#[test]
fn test_ddhor_merge_keeps_every_action_sorted() {
    let p1 = [5.0f32, 1.0, 9.0, 3.0];
    let p2 = [2.0f32, 3.0, 8.0];

    let mut bytes = b"DDHR".to_vec();
    bytes.extend_from_slice(&60i16.to_le_bytes());
    bytes.extend_from_slice(&(p1.len() as i32).to_le_bytes());
    bytes.extend_from_slice(&(p2.len() as i32).to_le_bytes());
    for x in p1.iter().chain(p2.iter()) {
        bytes.extend_from_slice(&x.to_le_bytes());
        bytes.push(0);
    }

    let m = format::decode(MacroFormat::Ddhor, &bytes, &DecodeOptions::default()).unwrap();
    assert_eq!(m.actions.len(), p1.len() + p2.len());
    assert_eq!(m.count_for(Player::One), p1.len());
    assert_eq!(m.count_for(Player::Two), p2.len());
    assert!(m.actions.windows(2).all(|w| w[0].position <= w[1].position));

    // Tie at 3.0: player 1 came first in the file, so it stays first
    let ties: Vec<bool> = m
        .actions
        .iter()
        .filter(|a| a.position == 3.0)
        .map(|a| a.is_player2)
        .collect();
    assert_eq!(ties, vec![false, true]);
}

#[test]
fn test_ddhor_encode_then_decode_merges_players() {
    let mut m = Macro::new(60.0, false);
    let inputs = [
        (7.5, true, true),
        (2.0, true, false),
        (9.0, false, false),
        (1.0, false, true),
        (4.0, true, true),
        (0.5, true, false),
        (4.0, false, false),
    ];
    m.actions = inputs
        .iter()
        .map(|&(x, hold, p2)| Action::new(x, hold, p2))
        .collect();

    let payload = format::encode(MacroFormat::Ddhor, &m).unwrap();
    let decoded =
        format::decode(MacroFormat::Ddhor, payload.as_bytes(), &DecodeOptions::default()).unwrap();

    assert_eq!(decoded.actions.len(), m.actions.len());
    assert_eq!(decoded.count_for(Player::One), m.count_for(Player::One));
    assert_eq!(decoded.count_for(Player::Two), m.count_for(Player::Two));
    assert!(decoded.actions.windows(2).all(|w| w[0].position <= w[1].position));

    let mut expected = m.clone();
    transform::sort_by_position(&mut expected);
    let key = |a: &Action| (a.position, a.hold, a.is_player2);
    let mut got: Vec<_> = decoded.actions.iter().map(key).collect();
    let mut want: Vec<_> = expected.actions.iter().map(key).collect();
    // Equal positions across players may come back in either run order
    got.sort_by(|a, b| a.partial_cmp(b).unwrap());
    want.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(got, want);
}

#[test]
fn test_ddhor_decode_sorts_around_nan() {
    let mut bytes = b"DDHR".to_vec();
    let count = 60;
    bytes.extend_from_slice(&60i16.to_le_bytes());
    bytes.extend_from_slice(&(count as i32).to_le_bytes());
    bytes.extend_from_slice(&0i32.to_le_bytes());
    for i in 0..count {
        let x = if i % 3 == 0 { f32::NAN } else { (count - i) as f32 };
        bytes.extend_from_slice(&x.to_le_bytes());
        bytes.push(0);
    }

    let m = format::decode(MacroFormat::Ddhor, &bytes, &DecodeOptions::default()).unwrap();
    assert_eq!(m.actions.len(), count);
    let ordinary: Vec<f64> = m
        .actions
        .iter()
        .map(|a| a.position)
        .take_while(|x| !x.is_nan())
        .collect();
    assert_eq!(ordinary.len(), count - count / 3);
    assert!(ordinary.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_transforms_run_in_order() {
    let text = b"60\n5 1 0\n6 1 0\n7 0 0\n8 1 1\n9 0 1\n";
    let mut req = request(text, "in.txt", Some(MacroFormat::PlainText), MacroFormat::PlainText);
    req.transforms = vec![
        Transform::RemoveRedundant,
        Transform::KeepPlayer(Player::One),
        Transform::Offset(-5.0),
        Transform::FlipHold,
    ];

    let out = convert(&req).unwrap();
    assert_eq!(out.report.redundant_removed, 1);
    assert_eq!(out.report.filtered_out, 2);
    assert_eq!(out.actions, 2);
    assert_eq!(out.payload.as_bytes(), b"60\n0 0 0\n2 1 0");
}

#[test]
fn test_remove_redundant_is_idempotent() {
    let mut m = Macro::new(60.0, true);
    for (position, hold, p2) in [
        (1.0, true, false),
        (2.0, true, false),
        (2.0, true, true),
        (3.0, false, false),
        (4.0, false, false),
        (5.0, true, true),
        (6.0, false, true),
    ] {
        m.actions.push(Action::new(position, hold, p2));
    }

    let removed = transform::remove_redundant(&mut m);
    let once = m.clone();
    assert_eq!(removed, 3);
    assert_eq!(transform::remove_redundant(&mut m), 0);
    assert_eq!(m, once);
}

#[test]
fn test_unit_mismatch_fails_without_output() {
    let mut bytes = b"RPLY\x02\x01".to_vec();
    bytes.extend_from_slice(&240.0f32.to_le_bytes());
    bytes.extend_from_slice(&10u32.to_le_bytes());
    bytes.push(1);

    let err = convert(&request(&bytes, "frames.replay", None, MacroFormat::Zbot)).unwrap_err();
    let ConvertError::Encode { format, source } = err else {
        panic!("expected an encode error");
    };
    assert_eq!(format, MacroFormat::Zbot);
    assert!(matches!(source, FormatError::Unrepresentable(_)));
}

#[test]
fn test_error_kinds_surface_through_pipeline() {
    let cases: [(&[u8], &str, MacroFormat); 3] = [
        (b"RPLY\x09\0\0\0\0", "a.replay", MacroFormat::ReplayBot),
        (b"fps: 60\nclassic\n", "a.xbot", MacroFormat::Xbot),
        (
            br#"{"A":{"delta_override":0.1,"instructions":[]},"B":{"delta_override":0.1,"instructions":[]}}"#,
            "a.dat",
            MacroFormat::Ybot,
        ),
    ];
    for (bytes, name, source) in cases {
        let err = convert(&request(bytes, name, Some(source), MacroFormat::PlainText)).unwrap_err();
        assert!(
            matches!(err, ConvertError::Decode { format, .. } if format == source),
            "{source}: {err}"
        );
    }

    let err = convert(&request(
        b"RPLY\x01\0\0\x70\x42\0\0",
        "cut.replay",
        None,
        MacroFormat::PlainText,
    ))
    .unwrap_err();
    assert!(matches!(
        err.format_error(),
        Some(FormatError::TruncatedInput(_))
    ));
}

#[test]
fn test_ybot_level_choice() {
    let json = br#"{"A":{"delta_override":0.1,"instructions":[{"x":1.0,"press":true}]},"B":{"delta_override":0.05,"instructions":[]}}"#;
    let mut req = request(json, "a.dat", Some(MacroFormat::Ybot), MacroFormat::ZbotFrame);
    req.options.ybot_level = Some("A".to_string());
    // x-position macro cannot become zBot Frame
    assert!(convert(&req).is_err());

    req.target = MacroFormat::Zbot;
    let out = convert(&req).unwrap();
    assert_eq!(out.actions, 1);
    assert_eq!(
        format::ybot::level_names(json).unwrap(),
        vec!["A".to_string(), "B".to_string()]
    );
}
