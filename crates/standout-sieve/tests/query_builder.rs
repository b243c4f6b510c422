//! Query builder replay against the different collection kinds.

use serde_json::json;
use standout_sieve::{
    AsValue, Attributes, FilterArgs, Mode, QueryBuilder, QueryableListDicts, QueryableListObjs,
    Value,
};
use tracing_subscriber::EnvFilter;

/// Routes filter tracing to the test output. Set `RUST_LOG=standout_sieve=trace`
/// to see it.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, PartialEq)]
struct Ticket {
    title: String,
    state: String,
    points: u8,
}

impl Attributes for Ticket {
    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "title" => Some(self.title.as_value()),
            "state" => Some(self.state.as_value()),
            "points" => Some(self.points.as_value()),
            _ => None,
        }
    }
}

fn tickets() -> Vec<Ticket> {
    [
        ("Login broken", "open", 3),
        ("Add dark mode", "open", 8),
        ("Crash on save", "closed", 5),
        ("Typo in footer", "open", 1),
    ]
    .into_iter()
    .map(|(title, state, points)| Ticket {
        title: title.into(),
        state: state.into(),
        points,
    })
    .collect()
}

#[test]
fn replays_against_object_lists() {
    init_tracing();
    let tickets = tickets();
    let query = QueryBuilder::new()
        .and([("state", "open")])
        .unwrap()
        .or(FilterArgs::new()
            .arg("points__gte", 5)
            .arg("title__icontains", "LOGIN"))
        .unwrap();

    let found = query.execute(&QueryableListObjs::new(&tickets)).unwrap();
    let titles: Vec<&str> = found.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Login broken", "Add dark mode"]);
}

#[test]
fn same_query_runs_on_different_collections() {
    let tickets = tickets();
    let rows = vec![
        json!({"state": "open", "points": 2}),
        json!({"state": "closed", "points": 9}),
    ];

    let mut query = QueryBuilder::new();
    query.add_filter(Mode::And, [("state", "open")]).unwrap();

    assert_eq!(query.execute(&QueryableListObjs::new(&tickets)).unwrap().len(), 3);
    assert_eq!(query.execute(&QueryableListDicts::new(&rows)).unwrap().len(), 1);
}

#[test]
fn plain_slices_are_read_as_mixed() {
    let rows = vec![json!({"state": "open"}), json!({"state": "closed"}), json!(null)];
    let query = QueryBuilder::new().and([("state__ne", "closed")]).unwrap();
    let found = query.execute_mixed(&rows).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[1], json!(null));
}

#[test]
fn stops_after_empty_step() {
    init_tracing();
    let tickets = tickets();
    let query = QueryBuilder::new()
        .and([("state", "archived")])
        .unwrap()
        .and([("title__gt", 3)])
        .unwrap();
    let found = query.execute(&QueryableListObjs::new(&tickets)).unwrap();
    assert!(found.is_empty());
}

#[test]
fn errors_from_steps_propagate() {
    let tickets = tickets();
    let query = QueryBuilder::new().and([("title__gt", 3)]).unwrap();
    assert!(query.execute(&QueryableListObjs::new(&tickets)).is_err());
}

#[test]
fn mode_names_are_case_insensitive() {
    let mut query = QueryBuilder::new();
    query.add_filter_str("aNd", [("state", "open")]).unwrap();
    query.add_filter_str("OR", [("points", 1)]).unwrap();
    assert!(query.add_filter_str("not", [("points", 1)]).is_err());
    let modes: Vec<Mode> = query.steps().iter().map(|s| s.mode).collect();
    assert_eq!(modes, vec![Mode::And, Mode::Or]);

    let tickets = tickets();
    let found = query.execute(&QueryableListObjs::new(&tickets)).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Typo in footer");
}
