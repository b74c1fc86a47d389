use std::fs;
use std::path::{Path, PathBuf};

/// Three people with byte-typed ages; p2 is the only minor.
pub const SAMPLE_ONTOLOGY: &str = r#"{
  "axioms": [
    { "type": "classAssertion", "class": "Person", "individual": "p1" },
    { "type": "classAssertion", "class": "Person", "individual": "p2" },
    { "type": "classAssertion", "class": "Person", "individual": "p3" },
    { "type": "dataPropertyAssertion", "property": "hasAge", "subject": "p1", "value": "20", "datatype": "xsd:byte" },
    { "type": "dataPropertyAssertion", "property": "hasAge", "subject": "p2", "value": "10", "datatype": "xsd:byte" },
    { "type": "dataPropertyAssertion", "property": "hasAge", "subject": "p3", "value": "30", "datatype": "xsd:byte" }
  ]
}"#;

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write test file");
    path
}
