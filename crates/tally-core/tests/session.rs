//! End-to-end editing sessions over whole event documents.

use chrono::NaiveDate;
use serde_json::{Value, json};
use tally_codec::parse_duration;
use tally_core::{
    CellEvent, CellInput, CellView, EditError, EditorAction, EditorSession, EditorSettings,
    JsonFileStore, KeyChord, Persistence, PersistenceError, SaveOutcome, SessionError,
    ValidationError,
};
use tally_model::{
    AttemptOutcome, ColumnKey, CompetitorId, DurationUnit, EntryMode, EventDocument,
};

fn key(name: &str) -> ColumnKey {
    ColumnKey::new(name).unwrap()
}

fn id(name: &str) -> CompetitorId {
    CompetitorId::new(name).unwrap()
}

fn open(value: Value) -> EditorSession {
    let document = EventDocument::from_value(value).expect("valid document");
    EditorSession::open(document, &EditorSettings::default()).expect("open session")
}

/// Collects every saved document; optionally fails instead.
#[derive(Default)]
struct MemoryStore {
    saved: Vec<Value>,
    fail: bool,
}

impl Persistence for MemoryStore {
    fn save(&mut self, document: &Value) -> Result<(), PersistenceError> {
        if self.fail {
            return Err(PersistenceError::Refused {
                reason: "disk full".to_string(),
            });
        }
        self.saved.push(document.clone());
        Ok(())
    }
}

fn race() -> Value {
    json!({
        "type": "race",
        "name": "5k",
        "distance": "5000",
        "date": "2024-05-01",
        "results": {
            "joe_biden": {"finish_time": 1_260_000, "_lane": 4},
            "mitch_mcconnell": {"DNF": true},
            "bernie_sanders": {}
        }
    })
}

#[test]
fn race_edit_add_delete_save() {
    let mut session = open(race());
    assert!(!session.is_dirty());

    session
        .edit_competitor(
            &id("bernie_sanders"),
            &key("finish_time"),
            CellInput::text("1:02:03.500"),
        )
        .expect("valid time");
    let row = session.add_competitor(id("nancy_pelosi"));
    session
        .edit(row, &key("DNS"), CellInput::Check(true))
        .expect("check DNS");
    session
        .delete_competitor(&id("mitch_mcconnell"))
        .expect("delete row");
    assert!(session.is_dirty());

    let mut store = MemoryStore::default();
    assert!(session.save(&mut store).is_saved());
    assert!(!session.is_dirty());

    let expected_ticks = parse_duration("1:02:03.500", DurationUnit::Milliseconds)
        .unwrap()
        .unwrap();
    assert_eq!(expected_ticks, 3_723_500);
    assert_eq!(
        store.saved[0],
        json!({
            "type": "race",
            "name": "5k",
            "distance": "5000",
            "date": "2024-05-01",
            "results": {
                "joe_biden": {"finish_time": 1_260_000, "_lane": 4},
                "bernie_sanders": {"finish_time": expected_ticks},
                "nancy_pelosi": {"DNS": true}
            }
        })
    );
}

#[test]
fn unchecking_a_flag_removes_it() {
    let mut session = open(race());
    session
        .edit_competitor(&id("mitch_mcconnell"), &key("DNF"), CellInput::Activate)
        .unwrap();
    let results = session.to_document().unwrap().into_value();
    assert_eq!(results["results"]["mitch_mcconnell"], json!({}));
}

#[test]
fn rejected_edits_leave_the_document_alone() {
    let mut session = open(race());
    let before = session.to_document().unwrap().into_value();

    let err = session
        .edit_competitor(&id("joe_biden"), &key("finish_time"), CellInput::text("1:2x"))
        .unwrap_err();
    assert!(matches!(err, EditError::Validation(ValidationError::Duration(_))));
    assert!(!session.is_dirty());
    assert_eq!(session.to_document().unwrap().into_value(), before);
}

#[test]
fn duplicate_competitors_block_saving() {
    let mut session = open(race());
    let row = session.add_competitor(id("joe_biden"));
    let mut store = MemoryStore::default();

    match session.save(&mut store) {
        SaveOutcome::Rejected(EditError::Validation(ValidationError::DuplicateCompetitors {
            competitors,
        })) => assert_eq!(competitors, vec![id("joe_biden")]),
        other => panic!("expected a rejected save, got {other:?}"),
    }
    assert!(store.saved.is_empty());
    assert!(session.is_dirty());

    session
        .edit(row, &key("competitor"), CellInput::text("al_gore"))
        .unwrap();
    assert!(session.table().duplicated_competitors().is_empty());
    assert!(session.save(&mut store).is_saved());
    assert!(store.saved[0]["results"].get("al_gore").is_some());
}

#[test]
fn failed_storage_keeps_the_session_dirty() {
    let mut session = open(race());
    session.set_name("Spring 5k");
    let mut store = MemoryStore {
        fail: true,
        ..MemoryStore::default()
    };
    assert!(matches!(
        session.save(&mut store),
        SaveOutcome::Failed(PersistenceError::Refused { .. })
    ));
    assert!(session.is_dirty());

    store.fail = false;
    assert!(session.save(&mut store).is_saved());
    assert_eq!(store.saved[0]["name"], json!("Spring 5k"));
}

#[test]
fn metadata_setters_update_the_document() {
    let mut session = open(race());
    session.set_distance("10000");
    session.set_date(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    let document = session.to_document().unwrap();
    assert_eq!(document.distance(), Some("10000"));
    assert_eq!(
        document.date().unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 2)
    );
}

#[test]
fn high_jump_heights_are_added_for_everyone() {
    let mut session = open(json!({
        "type": "high_jump",
        "results": {
            "joe_biden": {"heights": {"1000": [false, true]}},
            "bernie_sanders": {}
        }
    }));

    let column = session.add_height("1100").unwrap();
    assert_eq!(column.as_str(), "heights.1100");
    session
        .edit_competitor(&id("joe_biden"), &column, CellInput::ClickAttempt(0))
        .unwrap();

    let results = session.to_document().unwrap().into_value();
    assert_eq!(
        results["results"],
        json!({
            "joe_biden": {"heights": {"1000": [false, true], "1100": [true]}},
            "bernie_sanders": {"heights": {"1100": []}}
        })
    );

    assert!(matches!(
        session.add_height("1100"),
        Err(SessionError::Schema(_))
    ));
}

#[test]
fn heights_only_exist_for_high_jump() {
    let mut session = open(race());
    assert!(matches!(
        session.add_height("1000"),
        Err(SessionError::NotHighJump { .. })
    ));
}

#[test]
fn attempt_warnings_reach_the_caller() {
    let mut session = open(json!({
        "type": "high_jump",
        "results": {"joe_biden": {"heights": {"1000": []}}}
    }));
    let event = session
        .edit_competitor(&id("joe_biden"), &key("heights.1000"), CellInput::text("fx"))
        .unwrap();
    match event {
        CellEvent::Changed { warnings } => assert_eq!(warnings.len(), 1),
        other => panic!("expected a change, got {other:?}"),
    }
    let results = session.to_document().unwrap().into_value();
    assert_eq!(
        results["results"]["joe_biden"]["heights"]["1000"],
        json!([false, false])
    );
}

#[test]
fn relaxed_gaps_keep_later_attempts_on_save() {
    let document = EventDocument::from_value(json!({
        "type": "high_jump",
        "results": {"joe_biden": {"heights": {"1000": []}}}
    }))
    .unwrap();
    let mut settings = EditorSettings::default();
    settings.editing.attempts_mode = EntryMode::Relaxed;
    let mut session = EditorSession::open(document, &settings).unwrap();

    session
        .edit_competitor(
            &id("joe_biden"),
            &key("heights.1000"),
            CellInput::SetAttempt {
                index: 1,
                slot: Some(AttemptOutcome::Success),
            },
        )
        .unwrap();
    assert!(session.is_dirty());

    let mut store = MemoryStore::default();
    assert!(matches!(session.save(&mut store), SaveOutcome::Saved));
    assert_eq!(
        store.saved[0]["results"]["joe_biden"]["heights"]["1000"],
        json!([true])
    );
}

#[test]
fn swapping_competitors_exchanges_their_results() {
    let mut session = open(race());
    assert!(
        session
            .swap_competitors(&id("joe_biden"), &id("mitch_mcconnell"))
            .unwrap()
    );
    assert!(session.is_dirty());

    let results = session.to_document().unwrap().into_value();
    assert_eq!(
        results["results"]["mitch_mcconnell"],
        json!({"finish_time": 1_260_000, "_lane": 4})
    );
    assert_eq!(results["results"]["joe_biden"], json!({"DNF": true}));

    assert_eq!(
        session.swap_competitors(&id("joe_biden"), &id("nobody")),
        Err(EditError::UnknownCompetitor(id("nobody")))
    );
}

#[test]
fn ids_differing_in_whitespace_stay_separate() {
    let mut session = open(json!({
        "type": "race",
        "results": {"a": {"finish_time": 1000}, " a": {"finish_time": 2000}}
    }));
    assert!(session.table().duplicated_competitors().is_empty());
    session
        .edit_competitor(&id(" a"), &key("DNF"), CellInput::Check(true))
        .unwrap();

    let mut store = MemoryStore::default();
    assert!(session.save(&mut store).is_saved());
    assert_eq!(
        store.saved[0]["results"],
        json!({
            "a": {"finish_time": 1000},
            " a": {"finish_time": 2000, "DNF": true}
        })
    );
}

#[test]
fn keys_move_focus_between_rows() {
    let mut session = open(race());
    let rows: Vec<_> = session.table().live_rows().map(|row| row.id()).collect();
    assert!(session.focus(rows[0], 1));

    assert_eq!(
        session.handle_key(&KeyChord::plain("Enter")),
        Some(EditorAction::NextRow)
    );
    assert_eq!(session.table().focused().map(|f| f.row), Some(rows[1]));

    assert_eq!(
        session.handle_key(&KeyChord::shift("Enter")),
        Some(EditorAction::PreviousRow)
    );
    assert_eq!(
        session.handle_key(&KeyChord::shift("Enter")),
        Some(EditorAction::PreviousRow)
    );
    assert_eq!(session.table().focused().map(|f| f.row), Some(rows[2]));

    assert_eq!(
        session.handle_key(&KeyChord::ctrl("S")),
        Some(EditorAction::Save)
    );
    assert_eq!(session.handle_key(&KeyChord::plain("F5")), None);
}

#[test]
fn undecodable_values_survive_a_save() {
    let mut session = open(json!({
        "type": "race",
        "results": {"joe_biden": {"finish_time": "fast", "DNF": true}}
    }));
    let opaque = session.table().opaque_cells();
    assert_eq!(opaque.len(), 1);
    assert_eq!(opaque[0].raw, json!("fast"));

    let row = opaque[0].row;
    let err = session
        .edit(row, &key("finish_time"), CellInput::text("1:00"))
        .unwrap_err();
    assert_eq!(err, EditError::Validation(ValidationError::ReadOnly));
    assert!(matches!(
        session.table().cell(row, &key("finish_time")).map(|cell| cell.view()),
        Some(CellView::ReadOnly { .. })
    ));

    let results = session.to_document().unwrap().into_value();
    assert_eq!(
        results["results"]["joe_biden"],
        json!({"finish_time": "fast", "DNF": true})
    );
}

#[test]
fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.json");
    std::fs::write(&path, race().to_string()).unwrap();

    let mut store = JsonFileStore::new(&path);
    let mut session =
        EditorSession::open(store.load().unwrap(), &EditorSettings::default()).unwrap();
    session
        .edit_competitor(&id("bernie_sanders"), &key("finish_time"), CellInput::text("21:30"))
        .unwrap();
    assert!(session.save(&mut store).is_saved());

    let reloaded = store.load().unwrap().into_value();
    assert_eq!(
        reloaded["results"]["bernie_sanders"]["finish_time"],
        json!(1_290_000)
    );
    assert_eq!(reloaded["results"]["joe_biden"]["_lane"], json!(4));
}
