use owo_colors::{OwoColorize, Stream};
use serde_json::json;
use sqwrl::{Rule, Value, parse_rule};

/// Plain text of a result value: literals by lexical form, entities by
/// name, collections in their bracketed form.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Literal(l) => l.lexical(),
        other => other.to_string(),
    }
}

pub fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Literal(l) => json!({ "datatype": l.datatype().to_string(), "value": l.lexical() }),
        Value::Entity(e) => json!({ "kind": e.kind.to_string(), "name": e.name.as_str() }),
        Value::Collection(c) => json!({
            "collection": c.kind().to_string(),
            "elements": c.elements().iter().map(value_json).collect::<Vec<_>>(),
        }),
    }
}

/// Rules from a rule file: one per line; blank lines and lines starting
/// with `#` are skipped.
pub fn parse_rules(text: &str) -> anyhow::Result<Vec<Rule>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|(i, line)| parse_rule(line).map_err(|e| anyhow::anyhow!("line {}: {e}", i + 1)))
        .collect()
}

pub fn colorize_header(label: &str) -> String {
    label.if_supports_color(Stream::Stdout, |text| text.bold().to_string()).to_string()
}

pub fn colorize_entity(label: &str) -> String {
    label
        .if_supports_color(Stream::Stdout, |text| text.fg_rgb::<79, 166, 255>().to_string())
        .to_string()
}

pub fn colorize_literal(label: &str) -> String {
    label
        .if_supports_color(Stream::Stdout, |text| text.fg_rgb::<136, 192, 74>().to_string())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sqwrl::{Entity, Literal};

    #[rstest]
    fn rule_files_skip_comments_and_blanks() {
        let rules = parse_rules("# ancestors\n\nhasParent(?x, ?y) -> hasAncestor(?x, ?y)\n").unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[rstest]
    fn rule_file_errors_name_the_line() {
        let err = parse_rules("A(?x) -> B(?x)\nA(?x) ->\n").unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[rstest]
    fn json_values_carry_their_type() {
        assert_eq!(
            value_json(&Value::Literal(Literal::Byte(3))),
            json!({ "datatype": "xsd:byte", "value": "3" })
        );
        assert_eq!(value_json(&Value::Entity(Entity::individual("p1")))["name"], "p1");
    }
}
