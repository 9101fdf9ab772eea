//! Integration tests for rendering and dumping whole stacks

use super::common::fixtures::{example_value, mixed_stack, self_referential_map};
use framedump::{
    format_value, serialize, DumpConfig, DumpTarget, Dumper, ExceptionInfo, Frame, HttpRequest,
    HttpResponse, Value,
};
use std::fs;
use tempfile::TempDir;

/// The full nested example renders headers for mappings and a single leaf for the list
#[test]
fn test_end_to_end_example() {
    let stack = vec![Frame::new("main", "app.py", 12).with_local("example", example_value())];
    let document = serialize(&stack, None, None);

    insta::assert_snapshot!(document.trim_end(), @r###"
    Locals from file "app.py", line 12, in main:
      example = <map>
        example['user_id'] = 123456790
        example['profile'] = <map>
          example['profile']['name'] = 'John Doe'
          example['profile']['weight_kg'] = 86.18
        example['video_ids'] = [123, 456, 789]
    "###);
}

#[test]
fn test_package_scoping_keeps_order() {
    let document = serialize(&mixed_stack(), Some("my_package"), None);

    let base = document.find("in base:").expect("base frame present");
    let nested = document.find("in nested:").expect("nested frame present");
    assert!(base < nested, "frames keep their input order");
    assert!(!document.contains("in call:"), "foreign frame is excluded");
    assert!(!document.contains("token"));
}

#[test]
fn test_leaf_and_scalar_lines() {
    assert_eq!(format_value("x", &Value::from(42)), vec!["x = 42"]);
    assert_eq!(
        format_value("example['video_ids']", &Value::list([123, 456, 789])),
        vec!["example['video_ids'] = [123, 456, 789]"]
    );
}

#[test]
fn test_self_reference_terminates_once() {
    let lines = format_value("d", &self_referential_map());
    assert_eq!(lines, vec!["d = <map>", "  d['self'] = <circular reference>"]);
}

#[test]
fn test_http_response_expands_known_fields() {
    let response = HttpResponse::new("https://api.example.com/users/7", 404)
        .header("Content-Type", "application/json")
        .content(&b"{\"detail\": \"not found\"}"[..])
        .request(HttpRequest::new("GET", "https://api.example.com/users/7"));
    let stack = vec![Frame::new("fetch_user", "client.py", 55)
        .with_local("response", Value::object(response))];

    let document = serialize(&stack, None, None);
    assert!(document.contains("  response = <HttpResponse [404]>\n"));
    assert!(document.contains("    response.url = 'https://api.example.com/users/7'\n"));
    assert!(document.contains("    response.request = <HttpRequest [GET]>\n"));
    assert!(document.contains("      response.request.method = 'GET'\n"));
    assert!(document.contains("    response.status_code = 404\n"));
}

#[test]
fn test_error_chain_from_rust_errors() {
    #[derive(Debug, thiserror::Error)]
    #[error("could not load profile")]
    struct ProfileError(#[source] std::num::ParseIntError);

    let err = ProfileError("abc".parse::<i64>().unwrap_err());
    let exception = ExceptionInfo::from_error(&err);
    let document = serialize(&[], None, Some(&exception));

    insta::assert_snapshot!(document.trim_end(), @r###"
    Exception:
      ProfileError: could not load profile
      Caused by:
        ParseIntError: invalid digit found in string
    "###);
}

#[test]
fn test_appending_dumps_to_one_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("dumps").join("app.txt");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let dumper = Dumper::new(
        DumpConfig::default()
            .with_package_name("my_package")
            .with_dump_path(&path),
    );

    for attempt in 0..3 {
        let exception = ExceptionInfo::new("Timeout", format!("attempt {attempt}"));
        let report = dumper.dump(&mixed_stack(), Some(&exception)).unwrap();
        assert_eq!(report.frames_written, 2);
        assert_eq!(report.location.as_deref(), Some(path.as_path()));
    }

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.matches("Exception:").count(), 3);
    assert!(contents.contains("Timeout: attempt 0"));
    assert!(contents.contains("Timeout: attempt 2"));
}

#[test]
fn test_memory_target_matches_render() {
    let dumper = Dumper::new(DumpConfig::default().with_package_name("my_package"));
    let stack = mixed_stack();
    let report = dumper.dump_to(&DumpTarget::Memory, &stack, None).unwrap();
    assert_eq!(report.document, Some(dumper.render(&stack, None)));
}

#[test]
fn test_scope_dumps_failing_block() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let dumper = Dumper::new(
        DumpConfig::default()
            .with_package_name("my_package")
            .with_temp_dir(dir.path()),
    );

    let result: Result<(), std::io::Error> = dumper.run(&mixed_stack, || {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "orders.csv"))
    });
    assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::NotFound);

    let dumps: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(dumps.len(), 1, "exactly one temp dump");
    let name = dumps[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("my_package_stack_and_locals"));

    let contents = fs::read_to_string(&dumps[0]).unwrap();
    assert!(contents.contains("  Error: orders.csv\n"));
    assert!(contents.contains("example['video_ids'] = [123, 456, 789]"));
}
