//! Reads a corpus off disk: tab-separated morphology rows and gold syntax
//! graphs in the text format libnahw::format reads and writes. The core
//! crate treats both as external collaborators (spec.md section 1); this is
//! where that boundary is crossed.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use libnahw::format;
use libnahw::morphology::{Chapter, MorphologyRow, Token};
use libnahw::vocab::Location;

/// Reads every `.tsv` file in `dir` (sorted by name, so multi-file chapters
/// stay in order) as `chapter\tverse\ttoken\tarabic\tmorphology` rows. The
/// arabic and morphology columns are optional; a verse-level row carries
/// neither and its token component is `0`.
pub fn read_morphology_rows(dir: &Path) -> Result<Vec<MorphologyRow>> {
    let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "tsv").unwrap_or(false))
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();

    let mut rows = Vec::new();
    for path in paths {
        let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            rows.push(parse_row(line).with_context(|| format!("{}:{}", path.display(), line_no + 1))?);
        }
    }
    Ok(rows)
}

fn parse_row(line: &str) -> Result<MorphologyRow> {
    let parts: Vec<&str> = line.split('\t').collect();
    anyhow::ensure!(parts.len() >= 3, "expected at least 3 tab-separated columns, got {}", parts.len());
    let chapter: u32 = parts[0].parse().context("chapter")?;
    let verse: u32 = parts[1].parse().context("verse")?;
    let token: u32 = parts[2].parse().context("token")?;
    let arabic = parts.get(3).filter(|s| !s.is_empty() && **s != "-").map(|s| s.to_string());
    let morphology = parts.get(4).filter(|s| !s.is_empty()).map(|s| s.to_string());
    Ok(MorphologyRow { location: Location::new(chapter, verse, token), arabic, morphology })
}

/// Reads every `.graph` file in `dir` against an already-built token index,
/// one `(file name, SyntaxGraph)` pair per file (sorted by name).
pub fn read_gold_graphs(
    dir: &Path,
    tokens: &HashMap<Location, Rc<Token>>,
) -> Result<Vec<(String, libnahw::graph::SyntaxGraph)>> {
    let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "graph").unwrap_or(false))
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();

    let mut graphs = Vec::new();
    for path in paths {
        let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let graph = format::read_graph(&text, tokens).with_context(|| format!("parsing {}", path.display()))?;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        graphs.push((name, graph));
    }
    Ok(graphs)
}

/// Flattens ingested chapters back into the token index `format::read_graph`
/// needs, in reading order.
pub fn chapters_to_index(chapters: &[Chapter]) -> HashMap<Location, Rc<Token>> {
    format::index_tokens(chapters)
}

/// Builds one token-only working graph per verse, in reading order, sharing
/// the `Rc<Token>` instances in `tokens` so a later evaluation can resolve
/// predicted nodes back against a gold graph built from the same index.
pub fn build_working_graphs(
    chapters: &[Chapter],
    tokens: &HashMap<Location, Rc<Token>>,
) -> Vec<(Location, libnahw::graph::SyntaxGraph)> {
    use libnahw::vocab::WordType;

    let mut graphs = Vec::new();
    for chapter in chapters {
        for verse in &chapter.verses {
            let mut graph = libnahw::graph::SyntaxGraph::new();
            for token in &verse.tokens {
                let Some(shared) = tokens.get(&token.location) else { continue };
                graph.add_word(WordType::Token, Some(shared.clone()), None, None);
            }
            graphs.push((verse.location, graph));
        }
    }
    graphs
}
