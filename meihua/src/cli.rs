//! Subcommands and their text output

use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use meihua_core::interpretation::InterpretationStats;
use meihua_core::{
    DivinationEngine, DivinationParams, DivinationResult, DivinationStore, HexagramEntry,
    InMemoryStore, QuestionCategory, SearchHit, TimeSeed, Trigram,
};
use meihua_narrative::{Narrative, NarrativeContext, NarrativeService};

use crate::config::AppConfig;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Cast a divination
    Cast(CastArgs),

    /// Show one hexagram and its interpretation
    Hexagram {
        /// King Wen number, 1-64
        id: u8,
    },

    /// Search interpretations by keyword
    Search {
        keyword: String,
    },

    /// List the eight trigrams
    Trigrams,

    /// Interpretation database statistics
    Stats,
}

#[derive(Debug, Args)]
pub struct CastArgs {
    /// The question being asked
    #[arg(short, long)]
    pub question: String,

    /// Cast from two numbers
    #[arg(long, num_args = 2, value_names = ["N1", "N2"], conflicts_with = "at")]
    pub numbers: Option<Vec<u32>>,

    /// Cast from a moment, "YYYY-MM-DD HH" (defaults to now)
    #[arg(long)]
    pub at: Option<String>,

    /// Question domain (career, relationship, health, wealth, study, general)
    #[arg(short, long, default_value = "general")]
    pub category: QuestionCategory,

    /// Ask the configured LLM for a written reading
    #[arg(long)]
    pub narrate: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Execute a subcommand and return what should be printed.
pub async fn execute(command: Commands, engine: &DivinationEngine, config: &AppConfig) -> anyhow::Result<String> {
    match command {
        Commands::Cast(args) => cast(args, engine, config).await,

        Commands::Hexagram { id } => {
            let hexagram = engine.bagua().by_id(id)?;
            let entry = engine.interpretations().lookup(id)?;
            Ok(format!("{}\n{}", hexagram, format_entry(entry)))
        }

        Commands::Search { keyword } => {
            let hits = engine.interpretations().search(&keyword);
            Ok(format_hits(&keyword, &hits))
        }

        Commands::Trigrams => Ok(format_trigrams(engine.bagua().trigrams())),

        Commands::Stats => Ok(format_stats(&engine.interpretations().statistics())),
    }
}

async fn cast(args: CastArgs, engine: &DivinationEngine, config: &AppConfig) -> anyhow::Result<String> {
    let (method, params) = match (&args.numbers, &args.at) {
        (Some(numbers), _) => match numbers.as_slice() {
            [first, second] => ("number", DivinationParams::numbers(*first, *second)),
            _ => bail!("--numbers takes exactly two values"),
        },
        (None, Some(at)) => ("time", DivinationParams::at(parse_moment(at)?)),
        (None, None) => ("time", DivinationParams::default()),
    };

    let result = engine.perform_divination(&args.question, method, &params)?;

    let store = InMemoryStore::new();
    let mut record = store.save(&config.owner_id, result).await?;

    let narrative = if args.narrate && !config.narrative.enabled {
        warn!("Narrative requested but disabled in config, skipping");
        None
    } else if args.narrate {
        let service = NarrativeService::from_config(&config.narrative)?;
        let narrative = service
            .generate(&record.result, NarrativeContext::new(args.category))
            .await?;
        record = store.attach_narrative(record.id, narrative.content.clone()).await?;
        Some(narrative)
    } else {
        None
    };

    info!(id = %record.id, owner_id = %record.owner_id, "Cast recorded");

    if args.json {
        return serde_json::to_string_pretty(&record).context("serializing result");
    }

    let mut out = format_result(&record.result);
    if let Some(narrative) = narrative {
        out.push_str(&format_narrative(&narrative));
    }
    Ok(out)
}

/// Parse "YYYY-MM-DD HH".
pub fn parse_moment(input: &str) -> anyhow::Result<TimeSeed> {
    let (date, hour) = input
        .trim()
        .split_once(' ')
        .with_context(|| format!("expected \"YYYY-MM-DD HH\", got {input:?}"))?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").with_context(|| format!("bad date {date:?}"))?;
    let hour: u32 = hour.trim().parse().with_context(|| format!("bad hour {hour:?}"))?;
    Ok(TimeSeed::new(date.year(), date.month(), date.day(), hour))
}

fn format_result(result: &DivinationResult) -> String {
    let analysis = &result.element_analysis;
    let basic = &result.basic_interpretation;
    let mut out = String::new();

    out.push_str(&format!("问题: {}\n", result.question));
    out.push_str(&format!("起卦: {} (动爻 第{}爻)\n\n", result.method.as_str(), result.moving_line));
    out.push_str(&format!("本卦: {}\n", result.primary));
    out.push_str(&format!("互卦: {}\n", result.mutual));
    out.push_str(&format!("变卦: {}\n\n", result.transformed));

    out.push_str(&format!(
        "五行: {} / {} / {}\n",
        analysis.primary.chinese(),
        analysis.mutual.chinese(),
        analysis.transformed.chinese()
    ));
    for rel in [
        analysis.relationships.primary_to_mutual,
        analysis.relationships.primary_to_transformed,
        analysis.relationships.mutual_to_transformed,
    ] {
        out.push_str(&format!("  {}\n", rel.description()));
    }
    out.push_str(&format!(
        "运势: {} ({}, {}分)\n",
        result.fortune.description(),
        result.fortune,
        analysis.score
    ));
    out.push_str(&format!("分析: {}\n", analysis.analysis));
    out.push_str(&format!("建议: {}\n\n", analysis.advice));

    out.push_str(&format!("{}\n", basic.summary));
    out.push_str(&format!("时机: {}\n", basic.timing));
    out.push_str(&format!("要点: {}\n", basic.advice));
    out.push_str(&format!("可信度: {:.2}\n", result.confidence));
    out
}

fn format_narrative(narrative: &Narrative) -> String {
    format!(
        "\n--- {} (可信度 {:.2}, {} tokens) ---\n{}\n",
        narrative.model,
        narrative.confidence,
        narrative.usage.total(),
        narrative.content
    )
}

fn format_entry(entry: &HexagramEntry) -> String {
    let mut out = String::new();
    out.push_str(&format!("卦辞: {}\n", entry.judgment));
    out.push_str(&format!("彖曰: {}\n", entry.commentary));
    out.push_str(&format!("象曰: {}\n", entry.image));
    out.push_str(&format!("关键词: {}\n", entry.keywords.join("、")));
    out.push_str(&format!("运势: {}\n", entry.fortune.description()));
    for category in QuestionCategory::ALL {
        out.push_str(&format!("  {}: {}\n", category.description(), entry.meaning_for(category)));
    }
    if !entry.complete {
        out.push_str("(解读待完善)\n");
    }
    out
}

fn format_hits(keyword: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No matches for {keyword:?}\n");
    }
    hits.iter()
        .map(|hit| format!("{:>2}  {:<8} {}\n", hit.id, hit.name, hit.relevance))
        .collect()
}

fn format_trigrams(trigrams: &[Trigram]) -> String {
    trigrams
        .iter()
        .map(|t| {
            let lines: String = t.lines.iter().map(|l| l.to_string()).collect();
            format!(
                "{} {} {:<4} {} {} {} {}\n",
                t.index,
                t.symbol,
                t.pinyin,
                t.name,
                t.nature,
                t.element.chinese(),
                lines
            )
        })
        .collect()
}

fn format_stats(stats: &InterpretationStats) -> String {
    let mut out = format!(
        "Total: {}\nCurated: {}\nSynthesized: {}\n",
        stats.total, stats.curated, stats.synthesized
    );
    for (fortune, count) in &stats.by_fortune {
        out.push_str(&format!("  {:<9} {}\n", fortune.as_str(), count));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    fn run(args: &[&str]) -> anyhow::Result<String> {
        let cli = TestCli::try_parse_from(std::iter::once("meihua").chain(args.iter().copied()))?;
        let engine = DivinationEngine::new();
        let config = AppConfig {
            owner_id: "tester".to_string(),
            ..Default::default()
        };
        tokio_test::block_on(execute(cli.command, &engine, &config))
    }

    #[test]
    fn test_parse_moment() {
        assert_eq!(parse_moment("2024-03-15 10").unwrap(), TimeSeed::new(2024, 3, 15, 10));
        assert!(parse_moment("2024-03-15").is_err());
        assert!(parse_moment("2024-13-15 10").is_err());
        assert!(parse_moment("2024-03-15 noon").is_err());
    }

    #[test]
    fn test_cast_numbers() {
        let out = run(&["cast", "-q", "问事业", "--numbers", "9", "17"]).unwrap();
        assert!(out.contains("乾为天"));
        assert!(out.contains("天火同人"));
        assert!(out.contains("动爻 第2爻"));
    }

    #[test]
    fn test_cast_json() {
        let out = run(&["cast", "-q", "问事业", "--numbers", "9", "17", "--json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["owner_id"], "tester");
        assert_eq!(value["result"]["transformed"]["id"], 13);
        assert!(value["narrative"].is_null());
    }

    #[test]
    fn test_narrate_skipped_when_disabled() {
        let out = run(&["cast", "-q", "问事业", "--numbers", "9", "17", "--narrate", "--json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["narrative"].is_null());
    }

    #[test]
    fn test_cast_at_moment() {
        let out = run(&["cast", "-q", "问", "--at", "2024-03-15 10"]).unwrap();
        assert!(out.contains("起卦: time (动爻 第3爻)"));
    }

    #[test]
    fn test_cast_rejects_invalid_numbers() {
        assert!(run(&["cast", "-q", "问", "--numbers", "0", "5"]).is_err());
        assert!(run(&["cast", "-q", "  ", "--numbers", "1", "5"]).is_err());
    }

    #[test]
    fn test_lookup_commands() {
        let out = run(&["hexagram", "13"]).unwrap();
        assert!(out.contains("天火同人"));
        assert!(out.contains("解读待完善"));
        assert!(run(&["hexagram", "65"]).is_err());

        let out = run(&["search", "刚健"]).unwrap();
        assert!(out.starts_with(" 1"));

        let out = run(&["trigrams"]).unwrap();
        assert_eq!(out.lines().count(), 8);
        assert!(out.contains("坎"));

        let out = run(&["stats"]).unwrap();
        assert!(out.contains("Curated: 5"));
    }
}
