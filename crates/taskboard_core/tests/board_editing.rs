use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use taskboard_core::db::{DbError, DbResult};
use taskboard_core::{
    Board, BoardError, BoardService, KeyValueStore, MemoryKeyValueStore, Status, StoreError,
    Task, TaskStore, Urgency, VisualTask,
};

struct FixedClock(DateTime<Local>);

impl FixedClock {
    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Self {
        Self(Local.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap())
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }
}

/// Memory store whose writes can be switched off to simulate quota errors.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryKeyValueStore,
    reject_writes: bool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> DbResult<()> {
        if self.reject_writes {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: 0,
                latest_supported: 0,
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> DbResult<()> {
        self.inner.remove(key)
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service_with(board: &Board) -> BoardService<MemoryKeyValueStore, FixedClock> {
    let mut store = TaskStore::new(MemoryKeyValueStore::new());
    store.save(board).unwrap();
    BoardService::open(store, FixedClock::at(2024, 1, 5, 9, 0)).unwrap()
}

fn persisted(service: &BoardService<MemoryKeyValueStore, FixedClock>) -> Board {
    service.store().load().unwrap()
}

fn board_with_todo_pair() -> Board {
    let mut board = Board::empty();
    board.push(Status::ToDo, Task::new("Z", date(2024, 1, 20)));
    board.push(Status::ToDo, Task::new("A", date(2024, 1, 1)));
    board
}

#[test]
fn edit_text_replaces_text_keeps_date_and_persists() {
    let mut service = service_with(&board_with_todo_pair());

    service.edit_text(Status::ToDo, 1, "B").unwrap();

    let task = service.board().task(Status::ToDo, 1).unwrap();
    assert_eq!(task.text, "B");
    assert_eq!(task.date, date(2024, 1, 1));
    assert_eq!(service.board().task(Status::ToDo, 0).unwrap().text, "Z");
    assert_eq!(&persisted(&service), service.board());
}

#[test]
fn edit_date_persists_and_reports_new_urgency() {
    let mut service = service_with(&board_with_todo_pair());

    let urgency = service.edit_date(Status::ToDo, 0, date(2024, 1, 6)).unwrap();
    assert_eq!(urgency, Urgency::Warning);
    assert_eq!(persisted(&service).list(Status::ToDo)[0].date, date(2024, 1, 6));

    let urgency = service.edit_date(Status::ToDo, 0, date(2024, 1, 4)).unwrap();
    assert_eq!(urgency, Urgency::Overdue);

    let urgency = service.edit_date(Status::ToDo, 0, date(2024, 2, 1)).unwrap();
    assert_eq!(urgency, Urgency::Normal);
}

#[test]
fn stale_index_edit_is_rejected_without_touching_neighbours() {
    let board = board_with_todo_pair();
    let mut service = service_with(&board);

    let err = service.edit_text(Status::ToDo, 2, "lost").unwrap_err();
    assert!(matches!(
        err,
        BoardError::IndexOutOfRange {
            status: Status::ToDo,
            index: 2,
            len: 2
        }
    ));
    let err = service
        .edit_date(Status::Done, 0, date(2024, 1, 1))
        .unwrap_err();
    assert!(matches!(err, BoardError::IndexOutOfRange { len: 0, .. }));

    assert_eq!(service.board(), &board);
    assert_eq!(persisted(&service), board);
}

#[test]
fn column_names_outside_closed_set_are_invalid_status() {
    let err = "archive"
        .parse::<Status>()
        .map_err(BoardError::from)
        .unwrap_err();
    assert!(matches!(err, BoardError::InvalidStatus(ref name) if name == "archive"));

    let status = "list-inReview".parse::<Status>().unwrap();
    assert_eq!(status, Status::InReview);
}

#[test]
fn identity_edits_follow_task_after_reorder() {
    let board = board_with_todo_pair();
    let a_id = board.list(Status::ToDo)[1].id;
    let mut service = service_with(&board);

    let reversed = service
        .board()
        .list(Status::ToDo)
        .iter()
        .rev()
        .map(VisualTask::from)
        .collect();
    service.reconcile(Status::ToDo, reversed).unwrap();

    service.edit_text_by_id(a_id, "A edited").unwrap();
    service.edit_date_by_id(a_id, date(2024, 3, 1)).unwrap();

    let first = service.board().task(Status::ToDo, 0).unwrap();
    assert_eq!(first.id, a_id);
    assert_eq!(first.text, "A edited");
    assert_eq!(first.date, date(2024, 3, 1));
    assert_eq!(service.board().task(Status::ToDo, 1).unwrap().text, "Z");
}

#[test]
fn identity_edit_of_unknown_task_is_not_found() {
    let mut service = service_with(&Board::empty());
    let ghost = Task::new("ghost", date(2024, 1, 1)).id;
    assert!(matches!(
        service.edit_text_by_id(ghost, "boo"),
        Err(BoardError::TaskNotFound(id)) if id == ghost
    ));
}

#[test]
fn create_appends_to_todo_and_requires_text() {
    let mut service = service_with(&board_with_todo_pair());

    let id = service.create_task("New card", date(2024, 1, 9)).unwrap();
    assert_eq!(service.board().locate(id), Some((Status::ToDo, 2)));
    assert_eq!(persisted(&service).list(Status::ToDo)[2].text, "New card");

    assert!(matches!(
        service.create_task("   ", date(2024, 1, 9)),
        Err(BoardError::EmptyText)
    ));
    assert_eq!(service.board().len(), 3);
}

#[test]
fn delete_by_id_and_by_position() {
    let mut board = board_with_todo_pair();
    board.push(Status::InReview, Task::new("review", date(2024, 1, 7)));
    let review_id = board.list(Status::InReview)[0].id;
    let mut service = service_with(&board);

    let removed = service.delete_task(review_id).unwrap();
    assert_eq!(removed.text, "review");
    assert!(matches!(
        service.delete_task(review_id),
        Err(BoardError::TaskNotFound(_))
    ));

    let removed = service.delete_at(Status::ToDo, 0).unwrap();
    assert_eq!(removed.text, "Z");
    assert!(matches!(
        service.delete_at(Status::ToDo, 5),
        Err(BoardError::IndexOutOfRange { .. })
    ));

    let saved = persisted(&service);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved.list(Status::ToDo)[0].text, "A");
}

#[test]
fn remove_all_empties_every_list_and_persists() {
    let mut board = Board::empty();
    board.push(Status::ToDo, Task::new("one", date(2024, 1, 1)));
    board.push(Status::InProgress, Task::new("two", date(2024, 1, 2)));
    board.push(Status::Done, Task::new("three", date(2024, 1, 3)));
    let mut service = service_with(&board);

    service.remove_all().unwrap();

    assert!(service.board().is_empty());
    let saved = persisted(&service);
    for status in Status::ALL {
        assert!(saved.list(status).is_empty(), "{status} should be empty");
    }
    assert_eq!(saved, Board::empty());
}

#[test]
fn failed_save_leaves_in_memory_board_unchanged() {
    let seeded = board_with_todo_pair();
    let mut flaky = FlakyStore::default();
    flaky
        .inner
        .set("tasks", &serde_json::to_string(&seeded).unwrap())
        .unwrap();
    flaky.reject_writes = true;

    let mut service =
        BoardService::open(TaskStore::new(flaky), FixedClock::at(2024, 1, 5, 9, 0)).unwrap();
    assert_eq!(service.board(), &seeded);

    let err = service.edit_text(Status::ToDo, 0, "never saved").unwrap_err();
    assert!(matches!(err, BoardError::Store(StoreError::Db(_))));
    assert!(service.create_task("nope", date(2024, 1, 1)).is_err());
    assert!(service.remove_all().is_err());

    assert_eq!(service.board(), &seeded);
    assert_eq!(service.store().load().unwrap(), seeded);
}

#[test]
fn audit_classifies_every_task_with_session_clock() {
    let mut board = Board::empty();
    board.push(Status::ToDo, Task::new("late", date(2024, 1, 4)));
    board.push(Status::InProgress, Task::new("soon", date(2024, 1, 6)));
    board.push(Status::Done, Task::new("later", date(2024, 2, 1)));
    let late_id = board.list(Status::ToDo)[0].id;
    let service = service_with(&board);

    let report = service.audit();
    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.overdue_count(), 1);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.urgency_of(late_id), Some(Urgency::Overdue));
    assert_eq!(service.urgency_of(late_id), Some(Urgency::Overdue));
}
