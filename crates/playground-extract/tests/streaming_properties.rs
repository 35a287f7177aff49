//! Property tests for extraction under streaming growth.
//!
//! A response is streamed one character at a time. For every pair of prefixes
//! that both yield an artifact, the kind must agree as long as the fence
//! language tag is the same; extraction must be idempotent and must never
//! panic, whatever the input.

use playground_artifact::ArtifactKind;
use playground_extract::extract;
use proptest::prelude::*;

/// Complete single-block responses covering every kind and tagging style
const RESPONSES: &[&str] = &[
    "Sure!\n```html\n<!DOCTYPE html>\n<html><body><h1>Hi</h1></body></html>\n```\nEnjoy.",
    "```html\n<div>Hi</div>\n```",
    "```\n<!DOCTYPE html>\n<html><body>x</body></html>\n```",
    "```svg\n<svg width=\"10\" height=\"10\"><rect/></svg>\n```",
    "```\n<svg viewBox=\"0 0 1 1\"></svg>\n```",
    "```mermaid\ngraph TD; A-->B\n```",
    "```\nsequenceDiagram\n  A->>B: hello\n```",
    "```json\n{\"name\":\"Root\",\"children\":[{\"name\":\"Leaf\"}]}\n```",
    "```\n{\"name\":\"Root\",\"children\":[{\"name\":\"Leaf\"}]}\n```",
    "```json\n{\"xAxis\":{\"type\":\"category\"},\"series\":[{\"type\":\"bar\",\"data\":[1,2]}]}\n```",
    "```echarts\noption = {series: [{type: 'pie', data: [1, 2]}]};\n```",
    "```\noption = {xAxis: {}, series: []};\n```",
    "```json\n{\"plain\": [1, 2, 3]}\n```",
    "```xml\n<mxfile><diagram><mxGraphModel/></diagram></mxfile>\n```",
    "```\n<mxGraphModel><root/></mxGraphModel>\n```",
    "```markdown\n# Report\n\n| a | b |\n|---|---|\n| 1 | 2 |\n```",
    "```\n# Notes\n\nSome *text*.\n```",
    "```mindmap\n{\"mindmap\": {\"title\": \"Plan\", \"nodes\": [{\"title\": \"A\"}]}}\n```",
    "```\noption = {series: []};\nmyChart.setOption(option);\n```",
    "```\n{\"a\":1}\n{\"b\":2}\n```",
    "```json\n{\"children\":[]}\n{\"x\":1}\n```",
    "```json\n{\"name\": \n```",
];

fn char_prefixes(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, _)| &text[..i])
        .chain(std::iter::once(text))
        .collect()
}

#[test]
fn kind_is_stable_while_streaming() {
    for response in RESPONSES {
        let kinds: Vec<ArtifactKind> = char_prefixes(response)
            .into_iter()
            .filter_map(|prefix| extract(prefix).map(|a| a.kind()))
            .collect();

        let final_kind = extract(response).map(|a| a.kind());
        assert!(final_kind.is_some(), "no artifact in complete response: {response:?}");
        assert!(
            kinds.iter().all(|k| Some(*k) == final_kind),
            "kind changed while streaming {response:?}: {kinds:?}"
        );
    }
}

#[test]
fn final_content_has_no_fences() {
    for response in RESPONSES {
        let artifact = extract(response).unwrap();
        assert!(!artifact.content().contains("```"), "{response:?}");
        assert_eq!(artifact.content(), artifact.content().trim());
    }
}

#[test]
fn html_scenario_from_two_chunks() {
    let first = "```html\n<div>Hi";
    let second = format!("{first}</div>\n```");

    if let Some(speculative) = extract(first) {
        assert_eq!(speculative.kind(), ArtifactKind::Html);
        assert_eq!(speculative.content(), "<div>Hi");
    }
    let stable = extract(&second).unwrap();
    assert_eq!(stable.kind(), ArtifactKind::Html);
    assert_eq!(stable.content(), "<div>Hi</div>");
}

proptest! {
    #[test]
    fn prop_extract_is_idempotent(buffer in ".{0,200}") {
        prop_assert_eq!(extract(&buffer), extract(&buffer));
    }

    #[test]
    fn prop_never_panics_on_fenced_noise(
        tag in "(html|svg|json|mermaid|xml|drawio|echarts|mindmap|md|python|)",
        body in "[ -~\n]{0,120}",
        close in proptest::bool::ANY,
    ) {
        let buffer = if close {
            format!("```{tag}\n{body}\n```")
        } else {
            format!("```{tag}\n{body}")
        };
        let _ = extract(&buffer);
    }

    #[test]
    fn prop_tagged_kind_is_stable_under_growth(
        tag in "(html|svg|mermaid|markdown|drawio)",
        body in "[a-z<>/ =\"\n]{1,80}",
        cut in 0usize..200,
    ) {
        let full = format!("```{tag}\n{body}\n```");
        let cut = cut.min(full.len());
        let prefix = &full[..cut];
        if let (Some(a), Some(b)) = (extract(prefix), extract(&full)) {
            prop_assert_eq!(a.kind(), b.kind());
        }
    }

    #[test]
    fn prop_untagged_kind_is_stable_under_growth(
        head in r#"(\{"a": ?1\}|option = \{series: \[\]\};|\[1, ?2\]|\{"children": ?\[\]\})"#,
        tail in r#"[a-zA-Z(); {}"]{0,40}"#,
    ) {
        let full = format!("```\n{head}\n{tail}\n```");
        let final_kind = extract(&full).map(|a| a.kind());
        for prefix in char_prefixes(&full) {
            if let Some(artifact) = extract(prefix) {
                prop_assert_eq!(Some(artifact.kind()), final_kind, "prefix {:?}", prefix);
            }
        }
    }

    #[test]
    fn prop_json_tagged_kind_is_stable_under_growth(
        head in r#"(\{"a": ?1\}|option = \{series: \[\]\};|\{"children": ?\[\]\}|\{"series": ?\[\]\})"#,
        tail in r#"[a-zA-Z(); {}"]{0,40}"#,
    ) {
        let full = format!("```json\n{head}\n{tail}\n```");
        let final_kind = extract(&full).map(|a| a.kind());
        prop_assert!(final_kind.is_some());
        for prefix in char_prefixes(&full) {
            if let Some(artifact) = extract(prefix) {
                prop_assert_eq!(Some(artifact.kind()), final_kind, "prefix {:?}", prefix);
            }
        }
    }

}
