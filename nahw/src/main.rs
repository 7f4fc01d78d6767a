mod cli;
mod corpus;
mod evaluate;
mod modelio;
mod report;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use env_logger::Builder;
use libnahw::{format, infer, morphology, train};
use log::LevelFilter;
use modelio::TrainedArtifact;
use tabled::Table;

#[macro_use]
extern crate log;

fn main() -> Result<()> {
    let cli = cli::Args::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if !cli.quiet {
        Builder::new().filter_level(log_level).init();
    }

    let out_data = match cli.command.clone() {
        cli::Commands::Train { morphology: morph_dir, gold, config, models } => {
            run_train(&morph_dir, &gold, config.as_deref(), &models)?
        }
        cli::Commands::Parse { morphology: morph_dir, models } => run_parse(&morph_dir, &models)?,
        cli::Commands::Evaluate { morphology: morph_dir, gold, models } => {
            run_evaluate(&morph_dir, &gold, &models)?
        }
    };

    if let Some(out_path) = cli.output {
        let mut out_file = File::create(out_path)?;
        write!(out_file, "{}", out_data)?;
    } else if !out_data.is_empty() {
        println!("{}", out_data);
    }

    Ok(())
}

fn run_train(morph_dir: &str, gold_dir: &str, config: Option<&str>, models_out: &str) -> Result<String> {
    let cfg = modelio::load_config(config)?;
    let rows = corpus::read_morphology_rows(Path::new(morph_dir))?;
    debug!("read {} morphology rows", rows.len());

    let mut interner = libnahw::lemma::LemmaInterner::new();
    let chapters = morphology::ingest(&rows, &mut interner)?;
    let tokens = corpus::chapters_to_index(&chapters);

    let gold_graphs = corpus::read_gold_graphs(Path::new(gold_dir), &tokens)?;
    info!("training against {} gold graphs", gold_graphs.len());
    let gold_only: Vec<_> = gold_graphs.iter().map(|(_, g)| g.clone()).collect();

    let problems = train::build_training_problems(&gold_only, &interner)?;
    let models = train::train_models(&problems, cfg.training_rounds);
    let bucket_count = models.len();
    let graph_count = gold_only.len();
    info!("trained {} ensemble buckets", bucket_count);

    modelio::save_artifact(
        models_out,
        &TrainedArtifact { interner, models, max_parse_steps: cfg.max_parse_steps },
    )?;
    Ok(format!("trained {} buckets from {} graphs, written to {}", bucket_count, graph_count, models_out))
}

fn run_parse(morph_dir: &str, models_path: &str) -> Result<String> {
    let artifact = modelio::load_artifact(models_path)?;
    let mut interner = artifact.interner;

    let rows = corpus::read_morphology_rows(Path::new(morph_dir))?;
    let chapters = morphology::ingest(&rows, &mut interner)?;
    let tokens = corpus::chapters_to_index(&chapters);
    let working_graphs = corpus::build_working_graphs(&chapters, &tokens);

    let mut rendered = String::new();
    for (location, working) in working_graphs {
        if working.segment_node_count() == 0 {
            continue;
        }
        let parsed = infer::parse(working, &interner, &artifact.models, artifact.max_parse_steps)?;
        rendered.push_str(&format!("-- {}:{}\n", location.chapter, location.verse));
        rendered.push_str(&format::write_graph(&parsed));
        rendered.push('\n');
    }
    Ok(rendered)
}

fn run_evaluate(morph_dir: &str, gold_dir: &str, models_path: &str) -> Result<String> {
    let artifact = modelio::load_artifact(models_path)?;
    let mut interner = artifact.interner;

    let rows = corpus::read_morphology_rows(Path::new(morph_dir))?;
    let chapters = morphology::ingest(&rows, &mut interner)?;
    let tokens = corpus::chapters_to_index(&chapters);
    let gold_graphs = corpus::read_gold_graphs(Path::new(gold_dir), &tokens)?;

    let mut total = evaluate::Scorecard::default();
    let mut rows_out = Vec::new();
    for (name, gold) in gold_graphs {
        let working = gold.only_tokens();
        let predicted = infer::parse(working, &interner, &artifact.models, artifact.max_parse_steps)?;
        let card = evaluate::score(&predicted, &gold);
        total.merge(card);
        rows_out.push(report::EvaluateRow::new(name, card));
    }
    rows_out.push(report::EvaluateRow::new("TOTAL".to_string(), total));

    Ok(Table::new(rows_out).to_string())
}
