//! Self-referential model graphs: sequences, mappings and single nested
//! models of the same type, several levels deep.

use indexmap::IndexMap;
use modelkit::{
    decode_model_with_report, encode_model, model_from_bytes, model_to_bytes, read_model_auto,
    try_decode_model, write_model_auto, DecodeError, Decoder, Encoder, FailureKind, Format,
    KeyPath, Model, PathSegment, Value,
};
use tempfile::tempdir;

#[derive(Debug, Clone, PartialEq, Default)]
struct Player {
    name: String,
    number: i64,
    rating: f64,
    teamates: Vec<Player>,
    fillins: Option<Vec<Player>>,
    captain: Option<Box<Player>>,
    bench: IndexMap<String, Player>,
}

impl Model for Player {
    fn decode(d: &Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(Player {
            name: d.required("name")?,
            number: d.required("number")?,
            rating: d.implicit("rating")?,
            teamates: d.decode_sequence_of_models("teamates").implicit()?,
            fillins: d.decode_sequence_of_models("fillins").optional(),
            captain: d.decode_model("captain").optional().map(Box::new),
            bench: d.decode_mapping_of_models("bench").implicit()?,
        })
    }

    fn encode(&self, e: &mut Encoder) {
        e.encode_field("name", &self.name);
        e.encode_field("number", &self.number);
        e.encode_field("rating", &self.rating);
        e.encode_sequence_of_models("teamates", &self.teamates);
        e.encode_sequence_of_models("fillins", &self.fillins);
        if let Some(captain) = &self.captain {
            e.encode_model("captain", &**captain);
        }
        e.encode_mapping_of_models("bench", &self.bench);
    }
}

fn player(name: &str, number: i64) -> Player {
    Player {
        name: name.into(),
        number,
        rating: number as f64 / 4.0,
        ..Player::default()
    }
}

/// Ten teamates; the fourth has five fillins, one of which has a captain
/// with a bench of its own.
fn league() -> Player {
    let mut root = player("root", 0);
    root.teamates = (1..=10).map(|n| player(&format!("mate{n}"), n)).collect();
    let mut fillins: Vec<Player> = (1..=5).map(|n| player(&format!("fill{n}"), 100 + n)).collect();
    let mut captain = player("captain", 1000);
    captain.bench.insert("left".into(), player("lefty", 2001));
    captain.bench.insert("right".into(), player("righty", 2002));
    fillins[2].captain = Some(Box::new(captain));
    root.teamates[3].fillins = Some(fillins);
    root
}

#[test]
fn league_shape_in_store() {
    let store = encode_model(&league());
    let mates = store.get("teamates").and_then(Value::as_sequence).unwrap();
    assert_eq!(mates.len(), 10);
    let fourth = mates[3].as_entries().unwrap();
    let fills = fourth.get("fillins").and_then(Value::as_sequence).unwrap();
    assert_eq!(fills.len(), 5);
    assert!(!store.contains_key("fillins"));
    assert!(!store.contains_key("captain"));
    assert!(matches!(store.get("bench"), Some(Value::Mapping(m)) if m.is_empty()));
}

#[test]
fn league_roundtrips_through_every_format() {
    let league = league();
    assert_eq!(try_decode_model::<Player>(&encode_model(&league)).unwrap(), league);
    for format in Format::ALL {
        for pretty in [false, true] {
            let bytes = model_to_bytes(&league, format, pretty).unwrap();
            let back: Player = model_from_bytes(&bytes, format).unwrap();
            assert_eq!(back, league, "{format} pretty={pretty}");
            let fillins = back.teamates[3].fillins.as_ref().unwrap();
            assert_eq!(fillins.len(), 5);
            let captain = fillins[2].captain.as_ref().unwrap();
            assert_eq!(captain.bench["right"].name, "righty");
        }
    }
}

#[test]
fn league_roundtrips_through_files() {
    let dir = tempdir().unwrap();
    let league = league();
    for name in ["league.json", "league.plist", "league.bin"] {
        let path = dir.path().join("saves").join(name);
        write_model_auto(&league, &path).unwrap();
        let back: Player = read_model_auto(&path).unwrap();
        assert_eq!(back, league, "{name}");
    }
}

#[test]
fn failing_element_fails_the_whole_sequence() {
    let mut store = encode_model(&league());
    store.update("teamates", |mates| match mates {
        Value::Sequence(mut items) => {
            if let Value::Store(mate) = &mut items[2] {
                mate.remove("name");
            }
            Value::Sequence(items)
        }
        other => other,
    });

    let err = try_decode_model::<Player>(&store).unwrap_err();
    assert_eq!(err.kind(), FailureKind::SequenceElement);
    assert_eq!(err.path(), &KeyPath::from_iter(["teamates"]));
    assert!(matches!(
        &err,
        DecodeError::SequenceElement { element: PathSegment::Index(2), .. }
    ));
    let leaf = err.leaf();
    assert_eq!(leaf.kind(), FailureKind::AbsentWhenRequired);
    assert_eq!(leaf.path().to_string(), "teamates[2].name");
    assert!(err.is_required_field_failure());
}

#[test]
fn deep_failure_reports_full_path() {
    let mut league = league();
    let mut left = player("lefty", 3001);
    left.teamates.push(player("ghost", 9));
    league.teamates[3].bench.insert("left".into(), left);

    fn poison(value: &mut Value, path: &[&str]) {
        let Some((head, rest)) = path.split_first() else {
            *value = Value::from("nine");
            return;
        };
        match value {
            Value::Store(store) => {
                store.update(head, |mut inner| {
                    poison(&mut inner, rest);
                    inner
                });
            }
            Value::Mapping(map) => {
                if let Some(inner) = map.get_mut(*head) {
                    poison(inner, rest);
                }
            }
            Value::Sequence(items) => {
                let index: usize = head.parse().unwrap();
                poison(&mut items[index], rest);
            }
            _ => unreachable!(),
        }
    }
    let mut root = Value::Store(encode_model(&league));
    poison(
        &mut root,
        &["teamates", "3", "bench", "left", "teamates", "0", "number"],
    );
    let Value::Store(store) = root else { unreachable!() };

    let err = try_decode_model::<Player>(&store).unwrap_err();
    assert_eq!(err.kind(), FailureKind::SequenceElement);
    let leaf = err.leaf();
    assert_eq!(leaf.kind(), FailureKind::TypeMismatch);
    assert_eq!(
        leaf.path().to_string(),
        "teamates[3].bench.left.teamates[0].number"
    );
}

#[test]
fn failure_under_an_optional_branch_is_recovered() {
    let mut store = encode_model(&league());
    store.update("teamates", |mates| match mates {
        Value::Sequence(mut items) => {
            if let Value::Store(mate) = &mut items[3] {
                mate.update("fillins", |fills| match fills {
                    Value::Sequence(mut fills) => {
                        if let Value::Store(fill) = &mut fills[2] {
                            fill.update("captain", |captain| match captain {
                                Value::Store(mut captain) => {
                                    captain.remove("name");
                                    Value::Store(captain)
                                }
                                other => other,
                            });
                        }
                        Value::Sequence(fills)
                    }
                    other => other,
                });
            }
            Value::Sequence(items)
        }
        other => other,
    });

    let (decoded, report) = decode_model_with_report::<Player>(&store);
    let decoded = decoded.unwrap();
    let fillins = decoded.teamates[3].fillins.as_ref().unwrap();
    assert_eq!(fillins[2].captain, None);
    assert_eq!(report.recovered.len(), 1);
    assert_eq!(report.recovered[0].kind(), FailureKind::NestedModel);
    assert_eq!(
        report.recovered[0].leaf().path().to_string(),
        "teamates[3].fillins[2].captain.name"
    );
}

#[test]
fn optional_sequence_with_bad_element_is_dropped() {
    let mut store = encode_model(&league());
    store.update("teamates", |mates| match mates {
        Value::Sequence(mut items) => {
            if let Value::Store(mate) = &mut items[3] {
                mate.update("fillins", |fills| match fills {
                    Value::Sequence(mut fills) => {
                        fills[4] = Value::Int(5);
                        Value::Sequence(fills)
                    }
                    other => other,
                });
            }
            Value::Sequence(items)
        }
        other => other,
    });

    let (decoded, report) = decode_model_with_report::<Player>(&store);
    let decoded = decoded.unwrap();
    assert_eq!(decoded.teamates[3].fillins, None);
    assert_eq!(report.recovered.len(), 1);
    assert_eq!(report.recovered[0].path().to_string(), "teamates[3].fillins");
    assert_eq!(report.recovered[0].leaf().path().to_string(), "teamates[3].fillins[4]");
}

#[test]
fn non_store_nested_model_is_a_type_mismatch() {
    let mut store = encode_model(&player("solo", 1));
    store.set("captain", 5i64);
    store.set("bench", Value::Sequence(vec![]));
    let (decoded, report) = decode_model_with_report::<Player>(&store);
    assert!(decoded.is_none());
    let failure = report.failure.unwrap();
    assert_eq!(failure.kind(), FailureKind::TypeMismatch);
    assert_eq!(failure.path().to_string(), "bench");
    assert_eq!(report.recovered[0].kind(), FailureKind::TypeMismatch);
    assert_eq!(report.recovered[0].path().to_string(), "captain");
}

#[test]
fn bench_keeps_stored_key_order() {
    let mut root = player("root", 0);
    for name in ["zeta", "alpha", "mid"] {
        root.bench.insert(name.into(), player(name, 1));
    }
    for format in Format::ALL {
        let bytes = model_to_bytes(&root, format, false).unwrap();
        let back: Player = model_from_bytes(&bytes, format).unwrap();
        assert_eq!(back.bench.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"], "{format}");
    }
}

#[test]
fn bench_failure_fails_the_whole_mapping() {
    let mut root = player("root", 0);
    root.bench.insert("left".into(), player("lefty", 1));
    root.bench.insert("right".into(), player("righty", 2));
    let mut store = encode_model(&root);
    store.update("bench", |bench| match bench {
        Value::Mapping(mut entries) => {
            if let Some(Value::Store(right)) = entries.get_mut("right") {
                right.set("name", 5i64);
            }
            Value::Mapping(entries)
        }
        other => other,
    });

    let err = try_decode_model::<Player>(&store).unwrap_err();
    assert_eq!(err.kind(), FailureKind::SequenceElement);
    assert_eq!(err.path().to_string(), "bench");
    assert!(matches!(
        &err,
        DecodeError::SequenceElement { element: PathSegment::Key(key), .. } if key == "right"
    ));
    assert_eq!(err.leaf().kind(), FailureKind::TypeMismatch);
    assert_eq!(err.leaf().path().to_string(), "bench.right.name");

    // "left" decoded fine, but nothing of the mapping survives.
    let (decoded, report) = decode_model_with_report::<Player>(&store);
    assert!(decoded.is_none());
    assert!(report.failure.is_some());
}

/// Each link adds a store and a sequence level.
fn chain(links: i64) -> Player {
    let mut tail = player("tail", links);
    for n in (0..links).rev() {
        let mut link = player(&format!("link{n}"), n);
        link.teamates.push(tail);
        tail = link;
    }
    tail
}

#[test]
fn deep_chain_roundtrips_through_every_format() {
    let chain = chain(100);
    for format in Format::ALL {
        let bytes = model_to_bytes(&chain, format, false).unwrap();
        let back: Player = model_from_bytes(&bytes, format).unwrap();
        assert_eq!(back, chain, "{format}");
    }
}

#[test]
fn chain_past_nesting_limit_is_refused_by_every_format() {
    let chain = chain(300);
    for format in Format::ALL {
        assert!(model_to_bytes(&chain, format, false).is_err(), "{format}");
    }
}
