use parser::{Registry, parse_proto_str};

/// Registry over a single in-memory file named `test.proto`.
pub fn registry(src: &str) -> Registry {
    let file = parse_proto_str("test.proto", src).expect("fixture should parse");
    Registry::from_files(vec![file])
}
