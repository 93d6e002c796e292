//! filament demo host
//!
//! データグラフを observe し、watcher（再評価する Subscriber）を登録してから
//! 書き込みを順に流す。どの watcher が再実行されたかを表示する。
//!
//! Usage: `filament-cli [scenario.json] [config.json]`
//! Without a scenario file a built-in one is used.

use std::cell::Cell;
use std::error::Error;
use std::rc::{Rc, Weak};

use filament_core::{
    Key, ReactiveConfig, Subscriber, SubscriberId, Value, begin_evaluation, configure, del,
    end_evaluation, observe, set, untracked,
};
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct Scenario {
    data: serde_json::Value,
    watch: Vec<WatchedPath>,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct WatchedPath {
    name: String,
    path: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Set {
        #[serde(default)]
        target: Vec<String>,
        key: String,
        value: serde_json::Value,
    },
    Delete {
        #[serde(default)]
        target: Vec<String>,
        key: String,
    },
    Push {
        target: Vec<String>,
        value: serde_json::Value,
    },
}

fn builtin_scenario() -> Result<Scenario, serde_json::Error> {
    serde_json::from_value(serde_json::json!({
        "data": { "user": { "name": "ada", "tags": ["math"] }, "count": 1 },
        "watch": [
            { "name": "name", "path": ["user", "name"] },
            { "name": "tags", "path": ["user", "tags"] },
            { "name": "count", "path": ["count"] }
        ],
        "steps": [
            { "op": "set", "target": ["user"], "key": "name", "value": "grace" },
            { "op": "set", "key": "count", "value": 1 },
            { "op": "push", "target": ["user", "tags"], "value": "compilers" },
            { "op": "set", "target": ["user"], "key": "email", "value": "grace@example.com" },
            { "op": "set", "key": "count", "value": 2 },
            { "op": "delete", "target": ["user"], "key": "name" }
        ]
    }))
}

/// Re-evaluates its path every time it is notified.
struct Watcher {
    id: SubscriberId,
    name: String,
    path: Vec<String>,
    root: Value,
    runs: Cell<u32>,
    this: Weak<Watcher>,
}

impl Watcher {
    fn new(watched: WatchedPath, root: Value) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            id: SubscriberId::next(),
            name: watched.name,
            path: watched.path,
            root,
            runs: Cell::new(0),
            this: this.clone(),
        })
    }

    fn run(&self) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        let token = begin_evaluation(Some(this));
        let value = resolve(&self.root, &self.path);
        end_evaluation(token);

        self.runs.set(self.runs.get() + 1);
        println!(
            "  [{}] run #{}: {} = {}",
            self.name,
            self.runs.get(),
            self.path.join("."),
            untracked(|| render(&value))
        );
    }
}

impl Subscriber for Watcher {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn notify(&self) {
        self.run();
    }
}

/// Walk `path` from `root`, reading through the interceptors.
fn resolve(root: &Value, path: &[String]) -> Value {
    path.iter().fold(root.clone(), |current, segment| match &current {
        Value::Object(obj) => obj.get(segment),
        Value::Array(arr) => match Key::from(segment.as_str()).as_index() {
            Some(index) => arr.get(index),
            None => Value::Undefined,
        },
        _ => Value::Undefined,
    })
}

fn render(value: &Value) -> String {
    match value {
        Value::Array(arr) => {
            let items: Vec<String> = arr.to_vec().iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(obj) => {
            let fields: Vec<String> = obj
                .keys()
                .iter()
                .map(|k| format!("{k}: {}", render(&obj.get(k))))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::String(s) => format!("{s:?}"),
        other => other.to_display_string().into_owned(),
    }
}

fn apply(root: &Value, step: &Step) {
    match step {
        Step::Set { target, key, value } => {
            set(&resolve(root, target), key.as_str(), Value::from(value.clone()));
        }
        Step::Delete { target, key } => del(&resolve(root, target), key.as_str()),
        Step::Push { target, value } => match resolve(root, target) {
            Value::Array(arr) => {
                arr.push([Value::from(value.clone())]);
            }
            other => tracing::warn!(kind = other.type_name(), "push target is not an array"),
        },
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let scenario = match args.next() {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => builtin_scenario()?,
    };
    if let Some(path) = args.next() {
        configure(ReactiveConfig::from_json(&std::fs::read_to_string(path)?)?);
    }
    let Scenario { data, watch, steps } = scenario;

    // (A) ルートデータとして observe
    let root = Value::from(data);
    if observe(&root, true).is_none() {
        tracing::warn!("root data was not observed; watchers will never re-run");
    }

    // (B) watcher を登録（初回評価で依存を収集）
    println!("initial run:");
    let watchers: Vec<Rc<Watcher>> = watch
        .into_iter()
        .map(|watched| Watcher::new(watched, root.clone()))
        .collect();
    for watcher in &watchers {
        watcher.run();
    }

    // (C) 書き込みを流す
    for (n, step) in steps.iter().enumerate() {
        println!("step {}: {step:?}", n + 1);
        tracing::info!(step = n + 1, "applying");
        apply(&root, step);
    }

    println!("summary:");
    for watcher in &watchers {
        println!("  [{}] {} runs", watcher.name, watcher.runs.get());
    }
    Ok(())
}
