use annokit::replay::{self, ReplayScript};
use annokit::{Config, EventBus, Point};
use std::sync::Arc;
use tempfile::TempDir;

fn triangle_events() -> &'static str {
    r#"
        { "type": "click", "x": 10, "y": 10 },
        { "type": "click", "x": 40, "y": 10 },
        { "type": "click", "x": 40, "y": 40 }
    "#
}

#[tokio::test]
async fn test_replay_closed_polygon() {
    let script = ReplayScript::from_json(&format!(
        r#"{{ "image": {{ "width": 64, "height": 64 }}, "events": [{},
            {{ "type": "move", "x": 11, "y": 11 }},
            {{ "type": "click", "x": 11, "y": 11 }}
        ] }}"#,
        triangle_events()
    ))
    .unwrap();

    let annotations = replay::run(&script, &Config::default(), Arc::new(EventBus::new()))
        .await
        .unwrap();

    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].shape.points(),
        &[
            Point::new(10.0, 10.0),
            Point::new(40.0, 10.0),
            Point::new(40.0, 40.0)
        ]
    );
}

#[tokio::test]
async fn test_replay_commits_unfinished_path_at_end() {
    let script = ReplayScript::from_json(&format!(
        r#"{{ "image": {{ "width": 64, "height": 64 }}, "events": [{}] }}"#,
        triangle_events()
    ))
    .unwrap();

    let annotations = replay::run(&script, &Config::default(), Arc::new(EventBus::new()))
        .await
        .unwrap();
    assert_eq!(annotations.len(), 1);
}

#[tokio::test]
async fn test_replay_escape_discards() {
    let script = ReplayScript::from_json(&format!(
        r#"{{ "image": {{ "width": 64, "height": 64 }}, "events": [{},
            {{ "type": "escape" }}
        ] }}"#,
        triangle_events()
    ))
    .unwrap();

    let annotations = replay::run(&script, &Config::default(), Arc::new(EventBus::new()))
        .await
        .unwrap();
    assert!(annotations.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_replay_magnetic_lasso_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(
        &path,
        r#"{
            "image": { "width": 64, "height": 64 },
            "style": "magnetic_lasso",
            "events": [
                { "type": "click", "x": 0, "y": 0 },
                { "type": "move", "x": 20, "y": 0 },
                { "type": "wait", "ms": 300 },
                { "type": "click", "x": 20, "y": 0 },
                { "type": "move", "x": 20, "y": 20 },
                { "type": "wait", "ms": 300 },
                { "type": "click", "x": 20, "y": 20 },
                { "type": "submit" }
            ]
        }"#,
    )
    .unwrap();

    let script = ReplayScript::from_file(&path).unwrap();
    let annotations = replay::run(&script, &Config::default(), Arc::new(EventBus::new()))
        .await
        .unwrap();

    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].shape.points().len(), 41);
}

#[test]
fn test_missing_script_file() {
    let dir = TempDir::new().unwrap();
    assert!(ReplayScript::from_file(&dir.path().join("absent.json")).is_err());
}
