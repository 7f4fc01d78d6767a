//! Graph text format reader/writer (spec.md section 6): a line-oriented,
//! UTF-8, round-trippable serialization of a `SyntaxGraph`.
//!
//! This boundary is nominally an external collaborator, but the grammar is
//! simple and fully specified, so it is implemented here rather than left
//! as an unmodeled interface.

use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::{NahwError, Result};
use crate::graph::{SyntaxGraph, SyntaxNode};
use crate::morphology::{Chapter, Token};
use crate::vocab::{Location, PartOfSpeech, PhraseType, Relation, WordType};

/// Builds a `Location -> Token` index shared by `Rc` so multiple graphs
/// read against the same corpus see the same underlying token identity
/// (needed for `SyntaxGraph::equivalent`).
pub fn index_tokens(chapters: &[Chapter]) -> HashMap<Location, Rc<Token>> {
    let mut map = HashMap::new();
    for chapter in chapters {
        for verse in &chapter.verses {
            for token in &verse.tokens {
                map.insert(token.location, Rc::new(token.clone()));
            }
        }
    }
    map
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Words,
    Phrases,
    Edges,
}

pub fn read_graph(text: &str, tokens: &HashMap<Location, Rc<Token>>) -> Result<SyntaxGraph> {
    let mut graph = SyntaxGraph::new();
    let mut nodes: Vec<SyntaxNode> = Vec::new();
    let mut section = Section::None;

    for (lineno, raw_line) in text.lines().enumerate() {
        let line_number = lineno + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "go" {
            break;
        }
        if let Some(rest) = line.strip_prefix("--") {
            let marker = rest.trim();
            section = match marker {
                "words" => Section::Words,
                "phrases" => Section::Phrases,
                "edges" => Section::Edges,
                _ => section,
            };
            continue;
        }

        match section {
            Section::Words => parse_word_line(&mut graph, &mut nodes, line, tokens, line_number)?,
            Section::Phrases => parse_phrase_line(&mut graph, &mut nodes, line, line_number)?,
            Section::Edges => parse_edge_line(&mut graph, &nodes, line, line_number)?,
            Section::None => {
                return Err(NahwError::format_error("content before any section header", line_number))
            }
        }
    }

    Ok(graph)
}

fn split_once_eq(line: &str, line_number: usize) -> Result<(&str, &str)> {
    line.split_once('=')
        .ok_or_else(|| NahwError::format_error(format!("expected '=' in '{}'", line), line_number))
}

fn split_constructor(s: &str, line_number: usize) -> Result<(&str, &str)> {
    let open = s
        .find('(')
        .ok_or_else(|| NahwError::format_error(format!("expected '(' in '{}'", s), line_number))?;
    let close = s
        .rfind(')')
        .ok_or_else(|| NahwError::format_error(format!("expected ')' in '{}'", s), line_number))?;
    if close < open {
        return Err(NahwError::format_error(format!("malformed constructor '{}'", s), line_number));
    }
    Ok((s[..open].trim(), s[open + 1..close].trim()))
}

fn split_endpoints(inner: &str, line_number: usize) -> Result<(&str, &str)> {
    inner
        .split_once(" - ")
        .map(|(a, b)| (a.trim(), b.trim()))
        .ok_or_else(|| NahwError::format_error(format!("expected '<a> - <b>' in '{}'", inner), line_number))
}

fn parse_location(s: &str, line_number: usize) -> Result<Location> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(NahwError::format_error(format!("malformed location '{}'", s), line_number));
    }
    let parse = |p: &str| {
        p.parse::<u32>().map_err(|_| NahwError::format_error(format!("malformed location '{}'", s), line_number))
    };
    Ok(Location::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
}

fn resolve_node(nodes: &[SyntaxNode], name: &str, line_number: usize) -> Result<SyntaxNode> {
    let idx: usize = name
        .strip_prefix('n')
        .and_then(|d| d.parse::<usize>().ok())
        .ok_or_else(|| NahwError::format_error(format!("malformed node name '{}'", name), line_number))?;
    nodes
        .get(idx.wrapping_sub(1))
        .copied()
        .ok_or_else(|| NahwError::format_error(format!("undeclared node '{}'", name), line_number))
}

fn register_node(nodes: &mut Vec<SyntaxNode>, name: &str, node: SyntaxNode, line_number: usize) -> Result<()> {
    let expected = format!("n{}", nodes.len() + 1);
    if name != expected {
        return Err(NahwError::format_error(
            format!("expected node name '{}', found '{}'", expected, name),
            line_number,
        ));
    }
    nodes.push(node);
    Ok(())
}

fn parse_word_line(
    graph: &mut SyntaxGraph,
    nodes: &mut Vec<SyntaxNode>,
    line: &str,
    tokens: &HashMap<Location, Rc<Token>>,
    line_number: usize,
) -> Result<()> {
    let (names_part, ctor_part) = split_once_eq(line, line_number)?;
    let names: Vec<&str> = names_part.split(',').map(|s| s.trim()).collect();
    let (tag, inner) = split_constructor(ctor_part.trim(), line_number)?;

    let created = match tag {
        "word" | "reference" => {
            let loc = parse_location(inner, line_number)?;
            let token = tokens
                .get(&loc)
                .cloned()
                .ok_or_else(|| NahwError::format_error(format!("unknown token at {}", loc), line_number))?;
            let word_type = if tag == "word" { WordType::Token } else { WordType::Reference };
            graph.add_word(word_type, Some(token), None, None)
        }
        pos_tag => {
            let pos = PartOfSpeech::from_tag(pos_tag)
                .ok_or_else(|| NahwError::format_error(format!("unknown POS tag '{}'", pos_tag), line_number))?;
            let text = if inner == "*" { None } else { Some(inner.to_string()) };
            graph.add_word(WordType::Elided, None, text, Some(pos))
        }
    };

    if created.len() != names.len() {
        return Err(NahwError::format_error(
            format!("expected {} node(s), constructor produced {}", names.len(), created.len()),
            line_number,
        ));
    }
    for (name, node) in names.iter().zip(created) {
        register_node(nodes, name, node, line_number)?;
    }
    Ok(())
}

fn parse_phrase_line(
    graph: &mut SyntaxGraph,
    nodes: &mut Vec<SyntaxNode>,
    line: &str,
    line_number: usize,
) -> Result<()> {
    let (name, ctor) = split_once_eq(line, line_number)?;
    let name = name.trim();
    let (tag, inner) = split_constructor(ctor.trim(), line_number)?;
    let phrase_type = PhraseType::from_tag(tag)
        .ok_or_else(|| NahwError::format_error(format!("unknown phrase tag '{}'", tag), line_number))?;
    let (a, b) = split_endpoints(inner, line_number)?;
    let start = resolve_node(nodes, a, line_number)?;
    let end = resolve_node(nodes, b, line_number)?;
    let node = graph.add_phrase(phrase_type, start, end);
    register_node(nodes, name, node, line_number)
}

fn parse_edge_line(graph: &mut SyntaxGraph, nodes: &[SyntaxNode], line: &str, line_number: usize) -> Result<()> {
    let (tag, inner) = split_constructor(line, line_number)?;
    let relation = Relation::from_tag(tag)
        .ok_or_else(|| NahwError::format_error(format!("unknown relation tag '{}'", tag), line_number))?;
    let (dep_name, head_name) = split_endpoints(inner, line_number)?;
    let dep = resolve_node(nodes, dep_name, line_number)?;
    let head = resolve_node(nodes, head_name, line_number)?;
    graph.add_edge(dep, head, relation)?;
    Ok(())
}

fn word_constructor(graph: &SyntaxGraph, first_segment: SyntaxNode) -> String {
    let word = graph.word(first_segment).expect("segment node always has a word");
    match word.word_type {
        WordType::Token => format!("word({})", word.token.as_ref().unwrap().location),
        WordType::Reference => format!("reference({})", word.token.as_ref().unwrap().location),
        WordType::Elided => {
            let tag = word.elided_pos.expect("elided word always carries a POS").tag();
            let text = word.elided_text.as_deref().unwrap_or("*");
            format!("{}({})", tag, text)
        }
    }
}

/// Serializes `graph` back into the text format. Node names are reassigned
/// in declaration order as the writer walks segment nodes grouped by word,
/// then phrases, then edges.
pub fn write_graph(graph: &SyntaxGraph) -> String {
    let mut out = String::new();
    let mut node_names: HashMap<SyntaxNode, String> = HashMap::new();
    let mut counter = 0usize;

    out.push_str("-- words\n");
    let segments = graph.segment_nodes_in_order();
    let mut i = 0;
    while i < segments.len() {
        let word_idx = graph.word_index(segments[i]);
        let mut j = i + 1;
        while j < segments.len() && graph.word_index(segments[j]) == word_idx {
            j += 1;
        }
        let group = &segments[i..j];
        let names: Vec<String> = group
            .iter()
            .map(|n| {
                counter += 1;
                let name = format!("n{}", counter);
                node_names.insert(*n, name.clone());
                name
            })
            .collect();
        let ctor = word_constructor(graph, group[0]);
        out.push_str(&format!("{} = {}\n", names.join(", "), ctor));
        i = j;
    }

    out.push_str("-- phrases\n");
    for phrase in graph.all_phrases() {
        counter += 1;
        let name = format!("n{}", counter);
        let (start, end) = graph.phrase_endpoints(phrase).unwrap();
        let phrase_type = graph.phrase_type(phrase).unwrap();
        out.push_str(&format!(
            "{} = {}({} - {})\n",
            name,
            phrase_type.tag(),
            node_names[&start],
            node_names[&end]
        ));
        node_names.insert(phrase, name);
    }

    out.push_str("-- edges\n");
    for edge in graph.all_edges() {
        out.push_str(&format!(
            "{}({} - {})\n",
            edge.relation.tag(),
            node_names[&edge.dependent],
            node_names[&edge.head]
        ));
    }

    out.push_str("go\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{AgreementFeatures, Segment};
    use crate::vocab::SegmentType;

    fn sample_tokens() -> HashMap<Location, Rc<Token>> {
        let mut map = HashMap::new();
        map.insert(
            Location::new(1, 1, 1),
            Rc::new(Token {
                location: Location::new(1, 1, 1),
                arabic: Some("بِسْمِ".into()),
                segments: vec![Segment {
                    segment_type: SegmentType::Stem,
                    part_of_speech: PartOfSpeech::Noun,
                    segment_number: 1,
                    lemma: None,
                    features: AgreementFeatures::default(),
                }],
            }),
        );
        map
    }

    #[test]
    fn round_trips_a_single_word_graph_with_an_edge() {
        let tokens = sample_tokens();
        let text = "-- words\nn1 = word(1:1:1)\nn2 = ADJ(*)\n-- phrases\n-- edges\nADJ(n2 - n1)\ngo\n";
        let graph = read_graph(text, &tokens).unwrap();
        assert_eq!(graph.segment_node_count(), 2);
        assert_eq!(graph.all_edges().len(), 1);

        let written = write_graph(&graph);
        let reparsed = read_graph(&written, &tokens).unwrap();
        assert_eq!(reparsed.segment_node_count(), 2);
        assert_eq!(reparsed.all_edges().len(), 1);
    }

    #[test]
    fn unknown_token_location_fails() {
        let tokens = sample_tokens();
        let text = "-- words\nn1 = word(9:9:9)\n-- phrases\n-- edges\ngo\n";
        assert!(read_graph(text, &tokens).is_err());
    }

    #[test]
    fn mismatched_node_numbering_fails() {
        let tokens = sample_tokens();
        let text = "-- words\nn2 = word(1:1:1)\n-- phrases\n-- edges\ngo\n";
        assert!(read_graph(text, &tokens).is_err());
    }
}
