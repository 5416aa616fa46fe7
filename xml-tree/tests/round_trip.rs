use pretty_assertions::assert_eq;
use xml_tree::{parse, parse_file, write, write_compact, write_file, XmlNode};

const RESPONSE: &str = r#"<?xml version="1.0"?>
<response status="success" code="19">
  <result total-count="2" count="2">
    <entry name="trust" admin="admin" time="2024/01/01 00:00:00">
      <network>
        <layer3>
          <member>ethernet1/1</member>
        </layer3>
      </network>
    </entry>
    <entry name="untrust">
      <network><layer3/></network>
    </entry>
  </result>
</response>
"#;

#[test]
fn parse_write_parse_round_trip_preserves_tree_shape() {
    let first = parse(RESPONSE.as_bytes()).expect("initial parse should succeed");

    let written = write(&first).expect("write should succeed");
    let second = parse(&written).expect("re-parse should succeed");
    assert_eq!(first, second);

    let compact = write_compact(&first).expect("compact write should succeed");
    let third = parse(compact.as_bytes()).expect("compact re-parse should succeed");
    assert_eq!(first, third);
}

#[test]
fn parse_and_write_file_round_trip() {
    let out_dir = tempfile::tempdir().expect("tempdir should be created");
    let out_path = out_dir.path().join("roundtrip.xml");

    let node = parse(RESPONSE.as_bytes()).expect("parse should succeed");
    write_file(&node, &out_path).expect("write_file should succeed");

    let reparsed = parse_file(&out_path).expect("parse_file should succeed");
    assert_eq!(node, reparsed);
}

#[test]
fn response_entries_are_reachable() {
    let node = parse(RESPONSE.as_bytes()).expect("parse should succeed");
    let result = node.get_child("result").expect("result");
    let names: Vec<&str> = result
        .get_children("entry")
        .into_iter()
        .filter_map(|entry| entry.get_attr("name"))
        .collect();
    assert_eq!(names, vec!["trust", "untrust"]);

    let trust: &XmlNode = result.children.first().expect("first entry");
    assert_eq!(
        trust.get_text(&["network", "layer3", "member"]),
        Some("ethernet1/1")
    );
}
