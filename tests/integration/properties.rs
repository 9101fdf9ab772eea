//! Property tests for formatter and scoping invariants

use framedump::stack::{in_package, scope_frames};
use framedump::value::ReprError;
use framedump::{format_value, serialize, Frame, Inspect, Mapping, Value};
use proptest::prelude::*;

/// Shape of an acyclic value graph.
#[derive(Debug, Clone)]
enum Node {
    Leaf(i64),
    Map(Vec<Node>),
    /// An `Inspect` object that builds its child afresh on every call.
    Wrapped(Box<Node>),
}

impl Node {
    fn build(&self) -> Value {
        match self {
            Node::Leaf(n) => Value::from(*n),
            Node::Map(children) => {
                let mut map = Mapping::new();
                for (i, child) in children.iter().enumerate() {
                    map.insert(format!("k{i}"), child.build());
                }
                Value::map(map)
            }
            Node::Wrapped(inner) => Value::object(Wrapped((**inner).clone())),
        }
    }

    /// One line per node: a header for every composite, one line per leaf.
    fn expected_lines(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Map(children) => 1 + children.iter().map(Node::expected_lines).sum::<usize>(),
            Node::Wrapped(inner) => 1 + inner.expected_lines(),
        }
    }
}

struct Wrapped(Node);

impl Inspect for Wrapped {
    fn type_name(&self) -> String {
        "Wrapped".to_string()
    }

    fn repr(&self) -> Result<String, ReprError> {
        Ok("<Wrapped>".to_string())
    }

    fn attributes(&self) -> Option<Vec<(String, Value)>> {
        Some(vec![("inner".to_string(), self.0.build())])
    }
}

fn node_strategy() -> impl Strategy<Value = Node> {
    any::<i64>().prop_map(Node::Leaf).prop_recursive(6, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Node::Map),
            inner.prop_map(|node| Node::Wrapped(Box::new(node))),
        ]
    })
}

fn module_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("my_package".to_string())),
        Just(Some("my_package.base".to_string())),
        Just(Some("my_package.sub.mod".to_string())),
        Just(Some("my_package_extra".to_string())),
        Just(Some("other_pkg.x".to_string())),
    ]
}

proptest! {
    /// A mapping of scalars renders as one header plus one line per entry
    #[test]
    fn flat_mapping_line_count(entries in prop::collection::vec(("[a-z]{1,8}", any::<i64>()), 0..20)) {
        let mut map = Mapping::new();
        for (key, value) in &entries {
            map.insert(key.as_str(), *value);
        }
        let expected = map.len() + 1;
        let lines = format_value("m", &Value::map(map));
        prop_assert_eq!(lines.len(), expected);
        prop_assert_eq!(&lines[0], "m = <map>");
        for line in &lines[1..] {
            prop_assert!(line.starts_with("  m['"), "child line {:?}", line);
        }
    }

    /// Acyclic graphs render one header plus every child's lines, with no cycle markers
    #[test]
    fn acyclic_graphs_render_in_full(node in node_strategy()) {
        let lines = format_value("root", &node.build());
        prop_assert_eq!(lines.len(), node.expected_lines());
        prop_assert!(
            lines.iter().all(|line| !line.contains("<circular reference>")),
            "unexpected marker in {:#?}", lines
        );
    }

    /// Scalar sequences are always a single leaf line
    #[test]
    fn sequences_are_single_lines(items in prop::collection::vec(any::<i64>(), 0..50)) {
        let lines = format_value("xs", &Value::list(items));
        prop_assert_eq!(lines.len(), 1);
        prop_assert!(lines[0].starts_with("xs = ["));
    }

    /// Scoping keeps exactly the in-package frames, in input order
    #[test]
    fn scoping_preserves_order(modules in prop::collection::vec(module_strategy(), 0..16)) {
        let stack: Vec<Frame> = modules
            .iter()
            .enumerate()
            .map(|(i, module)| {
                let frame = Frame::new(format!("f{i}"), "f.py", i as u32);
                match module {
                    Some(module) => frame.with_module(module.as_str()),
                    None => frame,
                }
            })
            .collect();

        let kept = scope_frames(&stack, Some("my_package"));

        let mut inherited: Option<&str> = None;
        let mut expected = Vec::new();
        for (i, module) in modules.iter().enumerate() {
            if let Some(module) = module {
                inherited = Some(module.as_str());
            }
            if inherited.is_some_and(|m| in_package(m, "my_package")) {
                expected.push(format!("f{i}"));
            }
        }
        let kept_names: Vec<String> = kept
            .iter()
            .map(|f| f.function.clone().unwrap_or_default())
            .collect();
        prop_assert_eq!(kept_names, expected);
    }

    /// Rendering the same stack twice gives the same document
    #[test]
    fn serialization_is_deterministic(
        locals in prop::collection::vec(("[a-z_]{1,6}", "[ -~]{0,30}"), 0..10)
    ) {
        let mut frame = Frame::new("f", "f.py", 1).with_module("my_package");
        for (name, text) in &locals {
            frame = frame.with_local(name.as_str(), text.as_str());
        }
        let stack = vec![frame];
        prop_assert_eq!(
            serialize(&stack, Some("my_package"), None),
            serialize(&stack, Some("my_package"), None)
        );
    }
}
