//! Stack, value and file fixtures

use std::fs;
use std::path::{Path, PathBuf};

use framedump::{Frame, Mapping, Value};

/// `{"user_id": 123456790, "profile": {"name": "John Doe", "weight_kg": 86.18}, "video_ids": [123, 456, 789]}`
pub fn example_value() -> Value {
    let mut profile = Mapping::new();
    profile.insert("name", "John Doe");
    profile.insert("weight_kg", 86.18);

    let mut example = Mapping::new();
    example.insert("user_id", 123456790);
    example.insert("profile", profile);
    example.insert("video_ids", Value::list([123, 456, 789]));
    Value::map(example)
}

/// Frames from `my_package`, a submodule, and a foreign package, in that order.
pub fn mixed_stack() -> Vec<Frame> {
    vec![
        Frame::new("base", "my_package/base.py", 10)
            .with_module("my_package.base")
            .with_local("attempt", 1),
        Frame::new("nested", "my_package/sub/mod.py", 20)
            .with_module("my_package.sub.mod")
            .with_local("example", example_value()),
        Frame::new("call", "other_pkg/x.py", 30)
            .with_module("other_pkg.x")
            .with_local("token", "abc"),
    ]
}

/// A mapping that contains itself under `"self"`.
pub fn self_referential_map() -> Value {
    let value = Value::map(Mapping::new());
    value.map_insert("self", value.clone());
    value
}

pub const SNAPSHOT_JSON: &str = r#"{
    "frames": [
        {"function": "handler", "file": "shop/views.py", "line": 42, "module": "shop.views",
         "locals": {"order_id": 981, "cart": {"items": 3, "total": 59.9}}},
        {"function": "send", "file": "requests/api.py", "line": 7, "module": "requests.api",
         "locals": {"url": "https://example.com"}}
    ],
    "exception": {
        "type": "PaymentError",
        "message": "card declined",
        "cause": {"type": "HTTPError", "message": "402 Payment Required"}
    }
}"#;

pub fn write_snapshot(dir: &Path) -> PathBuf {
    let path = dir.join("snapshot.json");
    fs::write(&path, SNAPSHOT_JSON).expect("Failed to write snapshot");
    path
}

/// Config file isolated from the user's own configuration.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, contents).expect("Failed to write config");
    path
}
