use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use pokeduel::battle::{resolve_exchange, MatchState};
use pokeduel::creature::Creature;
use pokeduel::persist::SaveStore;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

fn scratch_dir(label: &str) -> PathBuf {
    let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "pokeduel-{label}-{}-{n}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn sample_match() -> MatchState {
    let player = vec![
        Creature::new("pikachu", 35, vec!["thunder-shock".into(), "quick-attack".into()])
            .with_sprite("https://example.test/25.png"),
        Creature::new("squirtle", 44, vec!["bubble".into()]),
    ];
    let cpu = vec![Creature::new("geodude", 40, Vec::new())];
    MatchState::new(player, cpu).unwrap()
}

#[tokio::test]
async fn saved_match_loads_back() {
    let store = SaveStore::new(scratch_dir("roundtrip"));
    let mut state = sample_match();
    let mut rng = StdRng::seed_from_u64(3);
    resolve_exchange(&mut state, "thunder-shock", &mut rng).unwrap();

    store.save(&state).await.unwrap();
    assert!(store.exists().await);
    assert_eq!(store.load().await, Some(state));
}

#[tokio::test]
async fn save_overwrites_previous_record() {
    let store = SaveStore::new(scratch_dir("overwrite"));
    let first = sample_match();
    store.save(&first).await.unwrap();

    let mut second = first.clone();
    let mut rng = StdRng::seed_from_u64(11);
    resolve_exchange(&mut second, "bubble", &mut rng).unwrap();
    store.save(&second).await.unwrap();

    assert_eq!(store.load().await, Some(second));
    assert!(!store.record_path().with_extension("json.tmp").exists());
}

#[tokio::test]
async fn missing_record_loads_as_none() {
    let store = SaveStore::new(scratch_dir("missing"));
    assert!(!store.exists().await);
    assert_eq!(store.load().await, None);
}

#[tokio::test]
async fn clear_removes_record_and_tolerates_absence() {
    let store = SaveStore::new(scratch_dir("clear"));
    store.save(&sample_match()).await.unwrap();
    store.clear().await.unwrap();
    assert_eq!(store.load().await, None);
    store.clear().await.unwrap();
}

#[tokio::test]
async fn corrupt_record_loads_as_none() {
    let store = SaveStore::new(scratch_dir("corrupt"));
    std::fs::create_dir_all(store.dir()).unwrap();
    std::fs::write(store.record_path(), "{\"version\": 1, \"state\": ").unwrap();
    assert_eq!(store.load().await, None);
}

#[tokio::test]
async fn record_from_other_version_loads_as_none() {
    let store = SaveStore::new(scratch_dir("version"));
    store.save(&sample_match()).await.unwrap();
    let json = std::fs::read_to_string(store.record_path()).unwrap();
    assert!(json.contains("\"version\": 1"));
    std::fs::write(
        store.record_path(),
        json.replace("\"version\": 1", "\"version\": 99"),
    )
    .unwrap();
    assert_eq!(store.load().await, None);
}

#[tokio::test]
async fn inconsistent_record_loads_as_none() {
    let store = SaveStore::new(scratch_dir("inconsistent"));
    store.save(&sample_match()).await.unwrap();
    let json = std::fs::read_to_string(store.record_path()).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["state"]["cpu"]["active_index"] = serde_json::json!(7);
    std::fs::write(store.record_path(), value.to_string()).unwrap();
    assert_eq!(store.load().await, None);
}

#[tokio::test]
async fn unreplaced_faint_loads_as_none() {
    let store = SaveStore::new(scratch_dir("unreplaced"));
    store.save(&sample_match()).await.unwrap();
    let json = std::fs::read_to_string(store.record_path()).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["state"]["player"]["members"][0]["hit_points"] = serde_json::json!(0);
    std::fs::write(store.record_path(), value.to_string()).unwrap();
    assert_eq!(store.load().await, None);
}

#[tokio::test]
async fn wounded_bench_loads_as_none() {
    let store = SaveStore::new(scratch_dir("bench"));
    store.save(&sample_match()).await.unwrap();
    let json = std::fs::read_to_string(store.record_path()).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["state"]["player"]["members"][1]["hit_points"] = serde_json::json!(10);
    std::fs::write(store.record_path(), value.to_string()).unwrap();
    assert_eq!(store.load().await, None);
}

#[tokio::test]
async fn clear_drops_pending_temp_record() {
    let store = SaveStore::new(scratch_dir("pending"));
    store.save(&sample_match()).await.unwrap();
    let tmp = store.record_path().with_extension("json.tmp");
    std::fs::copy(store.record_path(), &tmp).unwrap();

    store.clear().await.unwrap();
    assert!(!tmp.exists());
    assert!(!store.exists().await);
}
