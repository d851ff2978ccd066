use chrono::NaiveDate;
use taskboard_core::db::{open_db, open_db_in_memory};
use taskboard_core::{
    Board, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, Status, StoreError, Task,
    TaskStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_board() -> Board {
    let mut board = Board::empty();
    board.push(Status::ToDo, Task::new("Draft report", date(2024, 1, 10)));
    board.push(Status::ToDo, Task::new("Email \"team\" ✉", date(2024, 1, 2)));
    board.push(Status::InProgress, Task::new("Fix login", date(2024, 2, 29)));
    board.push(Status::Done, Task::new("Ship v1", date(2023, 12, 31)));
    board
}

#[test]
fn save_then_load_roundtrips_order_and_content() {
    let mut store = TaskStore::new(SqliteKeyValueStore::new(open_db_in_memory().unwrap()));
    let board = sample_board();

    store.save(&board).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded, board);
    let texts = loaded
        .list(Status::ToDo)
        .iter()
        .map(|task| task.text.as_str())
        .collect::<Vec<_>>();
    assert_eq!(texts, vec!["Draft report", "Email \"team\" ✉"]);
}

#[test]
fn board_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let board = sample_board();

    {
        let mut store = TaskStore::new(SqliteKeyValueStore::new(open_db(&path).unwrap()));
        store.save(&board).unwrap();
    }

    let store = TaskStore::new(SqliteKeyValueStore::new(open_db(&path).unwrap()));
    assert_eq!(store.load().unwrap(), board);
}

#[test]
fn absent_document_loads_empty_skeleton() {
    let store = TaskStore::new(MemoryKeyValueStore::new());
    assert!(store.try_load().unwrap().is_none());

    let board = store.load().unwrap();
    assert_eq!(board, Board::empty());
    for status in Status::ALL {
        assert!(board.list(status).is_empty());
    }
}

#[test]
fn corrupt_document_loads_empty_skeleton() {
    for raw in [
        "{not json",
        "[1,2,3]",
        r#"{"toDo":[{"text":"x","date":"soon"}]}"#,
        r#"{"backlog":[]}"#,
    ] {
        let mut kv = MemoryKeyValueStore::new();
        kv.set("tasks", raw).unwrap();
        let store = TaskStore::new(kv);

        assert!(matches!(
            store.try_load(),
            Err(StoreError::MalformedPersistedState(_))
        ));
        assert_eq!(store.load().unwrap(), Board::empty(), "input: {raw}");
    }
}

#[test]
fn legacy_document_without_ids_loads_and_normalizes_dates() {
    let mut kv = MemoryKeyValueStore::new();
    kv.set(
        "tasks",
        r#"{"toDo":[{"text":"A","date":"01/01/2024"}],"inProgress":[],"inReview":[],"done":[{"text":"B","date":"2024-03-05"}]}"#,
    )
    .unwrap();
    let mut store = TaskStore::new(kv);

    let board = store.load().unwrap();
    assert_eq!(board.list(Status::ToDo)[0].date, date(2024, 1, 1));
    assert_eq!(board.list(Status::Done)[0].text, "B");

    store.save(&board).unwrap();
    let raw = store.backend().get("tasks").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["toDo"][0]["date"], "2024-01-01");
    assert!(value["toDo"][0]["id"].is_string());
    assert_eq!(store.load().unwrap(), board);
}

#[test]
fn persisted_document_is_whole_board_json() {
    let mut store = TaskStore::new(MemoryKeyValueStore::new());
    let board = sample_board();
    store.save(&board).unwrap();

    let raw = store.backend().get("tasks").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for key in ["toDo", "inProgress", "inReview", "done"] {
        assert!(value[key].is_array(), "missing list {key}");
    }
    assert_eq!(value["toDo"].as_array().unwrap().len(), 2);
    assert_eq!(value["inProgress"][0]["text"], "Fix login");
    assert_eq!(value["inProgress"][0]["date"], "2024-02-29");
}

#[test]
fn clear_removes_document() {
    let mut store = TaskStore::new(MemoryKeyValueStore::new());
    store.save(&sample_board()).unwrap();
    store.clear().unwrap();
    assert!(store.try_load().unwrap().is_none());
}
