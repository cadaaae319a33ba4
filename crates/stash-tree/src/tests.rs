use std::io;

use super::*;
use facet_testhelpers::test;

const ONE_INPUT: &str = r#"
input {
	tcp {
		port => 8080
	}
}
"#;

const TWO_INPUT: &str = r#"
input {
	tcp {
		port => 8080
	}
	stdin {

	}
}
"#;

const TWO_INPUT_WITH_BRANCH: &str = r#"
input {
	tcp {
		port => 8080
		t => [ "X" ]
	}
	if true {
		stdin {

		}
	}
}
"#;

const INPUT_OUTPUT: &str = r#"
input {
	tcp {
		port => 8080
	}
}

output {
	file {
		path => /tmp/out.txt
	}
}
"#;

const IF_ELSE: &str = r#"
filter {
	if expr {
		tcp {
			port => 8080
		}
	} else {
		elasticsearch {

		}
	}
}

"#;

const COMPLEX: &str = r#"
input {
	file {
		path => /var/log/app/*.log
		start_position => beginning
	}
	beats {
		port => 5044
	}
}

filter {
	if [type] == "nginx" {
		grok {
			match => { "message" => "%{COMBINEDAPACHELOG}" }
		}
	} else {
		mutate {
			add_tag => [ "other" ]
		}
	}
}

output {
	elasticsearch {
		hosts => [ "localhost:9200" ]
	}
}
"#;

fn parse_error(source: &str) -> ParseError {
    match decode_str(source) {
        Err(DecodeError::Parse(error)) => error,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

fn plugin<'a>(node: Node<'a>) -> &'a Plugin {
    node.as_plugin()
        .unwrap_or_else(|| panic!("expected a plugin, got {node:?}"))
}

fn branch<'a>(node: Node<'a>) -> &'a Branch {
    node.as_branch()
        .unwrap_or_else(|| panic!("expected a branch, got {node:?}"))
}

/// Every child must point back at the node that lists it.
fn assert_links(node: Node<'_>) {
    for child in node.children() {
        assert_eq!(child.parent().map(Node::id), Some(node.id()));
        assert_links(child);
    }
}

#[test]
fn test_parse_one_input_only() {
    let config = decode_str(ONE_INPUT).unwrap();
    assert!(config.filter().is_none());
    assert!(config.output().is_none());

    let input = config.input().expect("input section");
    assert_eq!(input.op_type(), OperationType::Section);
    assert_eq!(input.as_section().map(|s| s.name), Some(SectionName::Input));
    assert!(input.parent().is_none());
    assert_eq!(input.child_count(), 1);

    let tcp = input.child(0).unwrap();
    assert_eq!(tcp.op_type(), OperationType::Plugin);
    assert_eq!(plugin(tcp).name, "tcp");
    assert_eq!(plugin(tcp).get("port"), Some("8080"));
    assert_eq!(tcp.parent().map(Node::id), Some(input.id()));
}

#[test]
fn test_parse_two_inputs() {
    let config = decode_str(TWO_INPUT).unwrap();
    let input = config.input().unwrap();
    let names: Vec<_> = input.children().map(|c| plugin(c).name.as_str()).collect();
    assert_eq!(names, ["tcp", "stdin"]);

    let stdin = plugin(input.child(1).unwrap());
    assert!(stdin.settings.is_empty());
}

#[test]
fn test_parse_two_inputs_with_branch() {
    let config = decode_str(TWO_INPUT_WITH_BRANCH).unwrap();
    let input = config.input().unwrap();
    assert_eq!(input.child_count(), 2);

    let tcp = plugin(input.child(0).unwrap());
    assert_eq!(tcp.get("port"), Some("8080"));
    assert_eq!(tcp.get("t"), Some(r#"[ "X" ]"#));

    let if_node = input.child(1).unwrap();
    assert_eq!(if_node.op_type(), OperationType::Branch);
    assert_eq!(branch(if_node).kind, BranchKind::If);
    assert_eq!(branch(if_node).expression, "true");
    assert_eq!(plugin(if_node.child(0).unwrap()).name, "stdin");
    assert_links(input);
}

#[test]
fn test_input_output() {
    let config = decode_str(INPUT_OUTPUT).unwrap();
    assert!(config.filter().is_none());

    let tcp = plugin(config.input().unwrap().child(0).unwrap());
    assert_eq!(tcp.get("port"), Some("8080"));

    let output = config.output().unwrap();
    assert_eq!(output.child_count(), 1);
    let file = plugin(output.child(0).unwrap());
    assert_eq!(file.name, "file");
    assert_eq!(file.get("path"), Some("/tmp/out.txt"));
}

#[test]
fn test_if_else() {
    let config = decode_str(IF_ELSE).unwrap();
    assert!(config.input().is_none());
    assert!(config.output().is_none());

    let filter = config.filter().unwrap();
    assert_eq!(filter.child_count(), 2);

    let if_node = filter.child(0).unwrap();
    assert_eq!(branch(if_node).kind, BranchKind::If);
    assert_eq!(branch(if_node).expression, "expr");
    let tcp = plugin(if_node.child(0).unwrap());
    assert_eq!(tcp.name, "tcp");
    assert_eq!(tcp.get("port"), Some("8080"));

    let else_node = filter.child(1).unwrap();
    assert_eq!(branch(else_node).kind, BranchKind::Else);
    assert_eq!(branch(else_node).expression, "");
    assert_eq!(plugin(else_node.child(0).unwrap()).name, "elasticsearch");
    assert_links(filter);
}

#[test]
fn test_expression_tokens_are_concatenated() {
    let config = decode_str("filter {\n  if a == b {\n    drop {\n    }\n  }\n}\n").unwrap();
    let if_node = config.filter().unwrap().child(0).unwrap();
    assert_eq!(branch(if_node).expression, "a==b");
}

#[test]
fn test_sibling_order_is_preserved() {
    let mut source = String::from("output {\n");
    for i in 0..12 {
        source.push_str(&format!("  out{i} {{\n    id => {i}\n  }}\n"));
    }
    source.push_str("}\n");

    let config = decode_str(&source).unwrap();
    let output = config.output().unwrap();
    assert_eq!(output.child_count(), 12);
    for (i, child) in output.children().enumerate() {
        let plugin = plugin(child);
        assert_eq!(plugin.name, format!("out{i}"));
        assert_eq!(plugin.get("id"), Some(i.to_string().as_str()));
    }
}

#[test]
fn test_repeated_key_last_wins() {
    let source = "input {\n  tcp {\n    port => 1\n    port => 2\n  }\n}\n";
    let config = decode_str(source).unwrap();
    let tcp = plugin(config.input().unwrap().child(0).unwrap());
    assert_eq!(tcp.settings.len(), 1);
    assert_eq!(tcp.get("port"), Some("2"));
}

#[test]
fn test_value_keeps_inner_spaces() {
    let source = "filter {\n  mutate {\n    message =>   hello   world  \r\n  }\n}\n";
    let config = decode_str(source).unwrap();
    let mutate = plugin(config.filter().unwrap().child(0).unwrap());
    assert_eq!(mutate.get("message"), Some("hello   world"));
}

#[test]
fn test_nested_branches() {
    let source = r#"
filter {
	if [a] {
		if [b] {
			drop {
			}
		}
		mutate {
		}
	}
}
"#;
    let config = decode_str(source).unwrap();
    let filter = config.filter().unwrap();
    assert_eq!(filter.child_count(), 1);

    let outer = filter.child(0).unwrap();
    assert_eq!(branch(outer).expression, "[a]");
    assert_eq!(outer.child_count(), 2);

    let inner = outer.child(0).unwrap();
    assert_eq!(branch(inner).expression, "[b]");
    assert_eq!(plugin(inner.child(0).unwrap()).name, "drop");
    assert_eq!(plugin(outer.child(1).unwrap()).name, "mutate");
    assert_links(filter);
}

#[test]
fn test_sections_in_any_order() {
    let source = "output {\n}\ninput {\n}\n";
    let config = decode_str(source).unwrap();
    assert!(config.input().is_some());
    assert!(config.output().is_some());
    assert!(config.filter().is_none());

    let names: Vec<_> = config
        .sections()
        .filter_map(|s| s.as_section().map(|s| s.name))
        .collect();
    assert_eq!(names, [SectionName::Input, SectionName::Output]);
}

#[test]
fn test_empty_document() {
    let config = decode_str("  \n\n").unwrap();
    assert!(config.is_empty());
    assert_eq!(config.sections().count(), 0);
}

#[test]
fn test_plugin_named_like_synthetic_event() {
    let config = decode_str("input {\n  driver {\n    key => val\n  }\n}\n").unwrap();
    let driver = plugin(config.input().unwrap().child(0).unwrap());
    assert_eq!(driver.name, "driver");
    assert_eq!(driver.get("key"), Some("val"));
}

#[test]
fn test_unclosed_block() {
    let error = parse_error("input {\n  tcp {\n    port => 8080\n  }\n");
    assert_eq!(
        error.kind,
        ParseErrorKind::UnclosedEntity {
            state: State::Entity
        }
    );
    // Points at the section keyword.
    assert_eq!(error.span, Span::new(0, 5));
}

#[test]
fn test_unclosed_plugin_and_condition() {
    let error = parse_error("input {\n  tcp {\n");
    assert_eq!(
        error.kind,
        ParseErrorKind::UnclosedEntity {
            state: State::Driver
        }
    );

    let error = parse_error("filter {\n  if [x] == 1\n");
    assert_eq!(
        error.kind,
        ParseErrorKind::UnclosedEntity {
            state: State::CondStart
        }
    );
    assert_eq!(error.span, Span::new(11, 13));
}

#[test]
fn test_unexpected_token_after_key() {
    let error = parse_error("input {\n  tcp {\n    port 8080\n  }\n}\n");
    match error.kind {
        ParseErrorKind::UnexpectedToken { token, expected } => {
            assert_eq!(token, "8080");
            assert_eq!(expected, "`=>`");
        }
        other => panic!("expected UnexpectedToken, got {other:?}"),
    }
    assert_eq!(error.span, Span::new(25, 29));
}

#[test]
fn test_unknown_section() {
    let error = parse_error("inputs {\n}\n");
    assert!(matches!(
        error.kind,
        ParseErrorKind::UnexpectedToken { ref token, .. } if token == "inputs"
    ));
}

#[test]
fn test_keyword_inside_section() {
    let error = parse_error("input {\n  output {\n  }\n}\n");
    assert!(matches!(
        error.kind,
        ParseErrorKind::UnexpectedToken { ref token, .. } if token == "output"
    ));
}

#[test]
fn test_duplicate_section() {
    let error = parse_error("input {\n}\ninput {\n}\n");
    assert!(matches!(
        error.kind,
        ParseErrorKind::UnexpectedToken { ref token, .. } if token == "input"
    ));
    assert_eq!(error.span, Span::new(10, 15));
}

#[test]
fn test_empty_branch() {
    let error = parse_error("input {\n  if E { }\n}\n");
    assert_eq!(error.kind, ParseErrorKind::EmptyBranch);

    let error = parse_error("input {\n  if E {\n  }\n}\n");
    assert_eq!(error.kind, ParseErrorKind::EmptyBranch);
    // From `if` to the closing brace.
    assert_eq!(error.span, Span::new(10, 20));
}

#[test]
fn test_empty_else_branch() {
    let source = "filter {\n  if x {\n    drop {\n    }\n  } else {\n  }\n}\n";
    let error = parse_error(source);
    assert_eq!(error.kind, ParseErrorKind::EmptyBranch);
}

#[test]
fn test_stream_error() {
    struct Broken;

    impl io::Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    match decode(Broken) {
        Err(DecodeError::Io(error)) => assert_eq!(error.to_string(), "disk on fire"),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn test_invalid_utf8_is_a_stream_error() {
    let bytes: &[u8] = b"input {\n  tcp {\n    port => \xff\n  }\n}\n";
    match decode(bytes) {
        Err(DecodeError::Io(error)) => assert_eq!(error.kind(), io::ErrorKind::InvalidData),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn test_chunk_size_does_not_matter() {
    let source = COMPLEX.replace("beginning", "début → 🦀");
    let reference = decode_str(&source).unwrap();
    for chunk_size in [1, 2, 3, 5, 64] {
        let options = DecodeOptions::new().chunk_size(chunk_size);
        let config = Decoder::with_options(source.as_bytes(), options)
            .decode()
            .unwrap();
        assert_eq!(config, reference, "chunk size {chunk_size}");
    }
    let file = plugin(reference.input().unwrap().child(0).unwrap());
    assert_eq!(file.get("start_position"), Some("début → 🦀"));
}

#[test]
fn test_dump() {
    let config = decode_str(COMPLEX).unwrap();
    insta::assert_snapshot!(config.dump(), @r###"
    section input
      plugin file
        path = "/var/log/app/*.log"
        start_position = "beginning"
      plugin beats
        port = "5044"
    section filter
      branch if "[type]==\"nginx\""
        plugin grok
          match = "{ \"message\" => \"%{COMBINEDAPACHELOG}\" }"
      branch else ""
        plugin mutate
          add_tag = "[ \"other\" ]"
    section output
      plugin elasticsearch
        hosts = "[ \"localhost:9200\" ]"
    "###);
}
