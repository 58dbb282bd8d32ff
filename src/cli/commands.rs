//! CLI command implementations

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::warn;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::align::{align, edit_distance, grouped_align, phonological_distance, ErrorRate, GroupCount};
use crate::config::Config;
use crate::convert::{ArpaConverter, TimitConverter};
use crate::feature::{FeatureTable, DEFAULT_MAX_SYMBOL_LEN};
use crate::inventory::{Inventory, Mode};
use crate::lang::{load_g2p, load_inventory, MacroLanguageNormalizer};
use crate::similarity::SimilarityEngine;

use super::args::{Commands, UtteranceFormat};

/// Number of most frequent errors listed per category.
const TOP_ERRORS: usize = 10;

/// Marks an utterance excluded from group scoring.
const UNKNOWN_TOKEN: &str = "<unk>";

/// Execute a CLI command
pub fn execute(command: Commands, config: &Config) -> Result<()> {
    let table = feature_table(config);

    match command {
        Commands::Eval {
            reference,
            hypothesis,
            format,
            output,
            verbose,
            json,
            group,
        } => cmd_eval(&reference, &hypothesis, format, output, verbose, json, group, &table),
        Commands::Info { lang, inverse } => cmd_info(&lang, inverse, config, table),
        Commands::Tokenize { text, lang, mode } => cmd_tokenize(&text, lang, mode, config, table),
        Commands::Nearest {
            symbol,
            lang,
            candidates,
            top,
        } => cmd_nearest(&symbol, lang, candidates, top, config, table),
        Commands::Arpa { tokens } => cmd_arpa(&tokens),
        Commands::Timit { labels } => cmd_timit(&labels),
        Commands::G2p { lang, words } => cmd_g2p(&lang, &words, config, &table),
    }
}

/// The bundled feature table with the configured tokenizer bound.
fn feature_table(config: &Config) -> Arc<FeatureTable> {
    let shared = FeatureTable::shared();
    if config.max_symbol_len == DEFAULT_MAX_SYMBOL_LEN {
        shared
    } else {
        Arc::new((*shared).clone().with_max_symbol_len(config.max_symbol_len))
    }
}

/// Read one utterance per line.
///
/// Kaldi lines start with the utterance id; text lines are numbered
/// `00000`, `00001`, ... Blank kaldi lines are skipped.
pub fn read_utterances(path: &Path, format: UtteranceFormat) -> Result<Vec<(String, Vec<String>)>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcriptions: {}", path.display()))?;

    let mut utterances = Vec::new();
    for (i, line) in contents.lines().enumerate() {
        let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        match format {
            UtteranceFormat::Kaldi => {
                let mut fields = fields.into_iter();
                if let Some(id) = fields.next() {
                    utterances.push((id, fields.collect()));
                }
            }
            UtteranceFormat::Text => utterances.push((format!("{i:05}"), fields)),
        }
    }

    Ok(utterances)
}

/// Totals produced by `eval`.
#[derive(Debug, Clone, Serialize)]
pub struct EvalSummary {
    /// Utterances present in both files
    pub utterances: usize,
    /// Hypothesis utterances without a reference
    pub missing: usize,
    /// Total edit cost
    pub errors: usize,
    /// Total phonological distance
    pub distance: f64,
    /// Total reference length
    pub reference_len: usize,
    /// Errors per reference token
    pub error_rate: Option<f64>,
    /// Phonological distance per reference token
    pub distance_rate: Option<f64>,
    /// Insertion, deletion and substitution totals (verbose runs only)
    pub breakdown: Option<Breakdown>,
    /// Per-group error rates (runs with `--group` only)
    pub groups: Option<Vec<GroupReport>>,
}

/// Error rate of one phoneme group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    /// Line of the group file, from 0
    pub group: usize,
    /// Phonemes listed on that line
    pub members: Vec<String>,
    /// Reference tokens and their errors
    #[serde(flatten)]
    pub count: GroupCount,
    /// `errors / total`
    pub rate: Option<f64>,
}

/// Operation totals of a verbose `eval`.
#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    /// Total insertions
    pub insertions: usize,
    /// Total deletions
    pub deletions: usize,
    /// Total substitutions
    pub substitutions: usize,
    /// Most frequent inserted tokens
    pub top_insertions: Vec<(String, usize)>,
    /// Most frequent deleted tokens
    pub top_deletions: Vec<(String, usize)>,
    /// Most frequent `reference>hypothesis` substitutions
    pub top_substitutions: Vec<(String, usize)>,
}

/// Score every hypothesis utterance against its reference.
///
/// With `verbose`, full alignments are computed and written to `out`.
pub fn evaluate(
    references: &[(String, Vec<String>)],
    hypotheses: &[(String, Vec<String>)],
    verbose: bool,
    table: &FeatureTable,
    mut out: Option<&mut dyn Write>,
) -> Result<EvalSummary> {
    let expected: FxHashMap<&str, &[String]> = references
        .iter()
        .map(|(id, tokens)| (id.as_str(), tokens.as_slice()))
        .collect();

    let mut rate = ErrorRate::new();
    let mut missing = 0;

    for (id, hyp) in hypotheses {
        let Some(&reference) = expected.get(id.as_str()) else {
            warn!("utterance {id} has no reference");
            missing += 1;
            continue;
        };
        let hyp: &[String] = hyp;

        rate.add_distance(phonological_distance(table, reference, hyp));

        if verbose {
            let alignment = align(reference, hyp);
            if let Some(w) = out.as_deref_mut() {
                writeln!(w, "{}", "-".repeat(80))?;
                writeln!(
                    w,
                    "UTT: {} - add {}, del {}, sub {}",
                    id,
                    alignment.insertions(),
                    alignment.deletions(),
                    alignment.substitutions()
                )?;
                write!(w, "{alignment}")?;
            }
            rate.add_alignment(&alignment);
        } else {
            rate.add_cost(edit_distance(reference, hyp), reference.len());
        }
    }

    let breakdown = verbose.then(|| Breakdown {
        insertions: rate.insertions(),
        deletions: rate.deletions(),
        substitutions: rate.substitutions(),
        top_insertions: owned(rate.top_insertions(TOP_ERRORS)),
        top_deletions: owned(rate.top_deletions(TOP_ERRORS)),
        top_substitutions: rate
            .top_substitutions(TOP_ERRORS)
            .into_iter()
            .map(|((r, h), c)| (format!("{r}>{h}"), c))
            .collect(),
    });

    Ok(EvalSummary {
        utterances: rate.utterances(),
        missing,
        errors: rate.errors(),
        distance: rate.distance(),
        reference_len: rate.reference_len(),
        error_rate: rate.rate(),
        distance_rate: rate.distance_rate(),
        breakdown,
        groups: None,
    })
}

/// Read a group file: each line lists the phonemes of one group.
///
/// Blank lines still count as (empty) groups so indices match line numbers.
pub fn read_groups(path: &Path) -> Result<Vec<Vec<String>>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read groups: {}", path.display()))?;
    Ok(contents
        .lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect())
}

/// Attribute reference tokens to `groups` and tally their errors.
///
/// Utterances containing `<unk>` on either side are skipped, as are
/// reference tokens in no group. A phoneme listed in several groups belongs
/// to the last one.
pub fn evaluate_groups(
    references: &[(String, Vec<String>)],
    hypotheses: &[(String, Vec<String>)],
    groups: &[Vec<String>],
) -> Vec<GroupReport> {
    let group_of: FxHashMap<&str, usize> = groups
        .iter()
        .enumerate()
        .flat_map(|(i, members)| members.iter().map(move |m| (m.as_str(), i)))
        .collect();

    let hypotheses: FxHashMap<&str, &[String]> = hypotheses
        .iter()
        .map(|(id, tokens)| (id.as_str(), tokens.as_slice()))
        .collect();
    let has_unknown = |tokens: &[String]| tokens.iter().any(|t| t == UNKNOWN_TOKEN);

    let mut counts: FxHashMap<Option<usize>, GroupCount> = FxHashMap::default();
    for (id, reference) in references {
        if has_unknown(reference) {
            continue;
        }
        let Some(&hypothesis) = hypotheses.get(id.as_str()) else {
            warn!("utterance {id} has no hypothesis");
            continue;
        };
        if has_unknown(hypothesis) {
            continue;
        }

        let grouped = grouped_align(reference, hypothesis, |t: &String| group_of.get(t.as_str()).copied());
        for (group, count) in grouped.groups {
            let entry = counts.entry(group).or_default();
            entry.total += count.total;
            entry.errors += count.errors;
        }
    }

    groups
        .iter()
        .enumerate()
        .map(|(i, members)| {
            let count = counts.get(&Some(i)).copied().unwrap_or_default();
            GroupReport {
                group: i,
                members: members.clone(),
                count,
                rate: count.rate(),
            }
        })
        .collect()
}

fn owned(items: Vec<(&str, usize)>) -> Vec<(String, usize)> {
    items.into_iter().map(|(t, c)| (t.to_string(), c)).collect()
}

fn write_summary(w: &mut dyn Write, summary: &EvalSummary) -> std::io::Result<()> {
    writeln!(w, "------------------------------------")?;
    writeln!(w, "TOTAL ERR: {}", summary.errors)?;
    writeln!(w, "TOTAL DST: {:.3}", summary.distance)?;
    writeln!(w, "TOTAL LEN: {}", summary.reference_len)?;

    if let Some(b) = &summary.breakdown {
        writeln!(w, "TOTAL ADD {}: {:?}", b.insertions, b.top_insertions)?;
        writeln!(w, "TOTAL DEL {}: {:?}", b.deletions, b.top_deletions)?;
        writeln!(w, "TOTAL SUB {}: {:?}", b.substitutions, b.top_substitutions)?;
    }

    if let (Some(err), Some(dst)) = (summary.error_rate, summary.distance_rate) {
        writeln!(w, "TOTAL ERR RATE: {err:.3}")?;
        if let Some(b) = &summary.breakdown {
            let len = summary.reference_len as f64;
            writeln!(w, "TOTAL ADD RATE: {:.3}", b.insertions as f64 / len)?;
            writeln!(w, "TOTAL DEL RATE: {:.3}", b.deletions as f64 / len)?;
            writeln!(w, "TOTAL SUB RATE: {:.3}", b.substitutions as f64 / len)?;
        }
        writeln!(w, "TOTAL DST RATE: {dst:.3}")?;
    }

    for report in summary.groups.iter().flatten() {
        match report.rate {
            Some(rate) => writeln!(
                w,
                "GROUP {} ERR {}/{} RATE: {rate:.3}",
                report.group, report.count.errors, report.count.total
            )?,
            None => writeln!(w, "GROUP {} ERR 0/0 RATE: -", report.group)?,
        }
    }
    writeln!(w, "------------------------------------")
}

/// Eval command
#[allow(clippy::too_many_arguments)]
fn cmd_eval(
    reference: &Path,
    hypothesis: &Path,
    format: UtteranceFormat,
    output: Option<PathBuf>,
    verbose: bool,
    json: bool,
    group: Option<PathBuf>,
    table: &FeatureTable,
) -> Result<()> {
    let references = read_utterances(reference, format)?;
    let hypotheses = read_utterances(hypothesis, format)?;
    let groups = group.as_deref().map(read_groups).transpose()?;

    let mut file = match &output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            Some(
                fs::File::create(path)
                    .with_context(|| format!("Failed to create output: {}", path.display()))?,
            )
        }
        None => None,
    };

    let mut summary = evaluate(
        &references,
        &hypotheses,
        verbose,
        table,
        file.as_mut().map(|f| f as &mut dyn Write),
    )?;
    summary.groups = groups.map(|groups| evaluate_groups(&references, &hypotheses, &groups));

    if summary.missing > 0 {
        eprintln!(
            "{}: {} hypothesis utterance(s) had no reference",
            "Warning".yellow().bold(),
            summary.missing
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        write_summary(&mut std::io::stdout().lock(), &summary)?;
    }

    if let Some(f) = file.as_mut() {
        write_summary(f, &summary)?;
    }

    Ok(())
}

fn load_lang(lang: &str, config: &Config, table: Arc<FeatureTable>) -> Result<Inventory> {
    let normalizer = MacroLanguageNormalizer::new();
    load_inventory(&normalizer, &config.resolver(), lang, &config.model, table)
        .with_context(|| format!("Failed to load inventory for {lang}"))
}

/// Info command
fn cmd_info(lang: &str, inverse: bool, config: &Config, table: Arc<FeatureTable>) -> Result<()> {
    let normalizer = MacroLanguageNormalizer::new();
    let inv = load_lang(lang, config, table)?;

    println!("{}", "Inventory Information".bold().underline());
    println!();
    if let Some(name) = normalizer.language_name(lang) {
        println!("  Language: {}", name.cyan());
    }
    println!("  Id:       {}", inv.lang_id().green());
    println!("  Phonemes: {}", inv.phoneme().units().count().to_string().green());
    println!("  Phones:   {}", inv.phone().units().count().to_string().green());
    println!();
    println!("  phoneme : {:?}", inv.phoneme().units().collect::<Vec<_>>());
    println!("  phone   : {:?}", inv.phone().units().collect::<Vec<_>>());
    println!();

    if inverse {
        for phone in inv.phone().units() {
            println!("  {} {:?}", format!("{phone:8}").yellow(), inv.phonemes_of(phone));
        }
    } else {
        for phoneme in inv.phoneme().units() {
            println!("  {} {:?}", format!("{phoneme:8}").yellow(), inv.phones_of(phoneme));
        }
    }

    Ok(())
}

/// Tokenize command
fn cmd_tokenize(
    text: &str,
    lang: Option<String>,
    mode: Mode,
    config: &Config,
    table: Arc<FeatureTable>,
) -> Result<()> {
    let tokens = table.tokenize(text);
    println!("{}", tokens.join(" "));

    if let Some(lang) = lang {
        let inv = load_lang(&lang, config, table)?;
        let remapped = inv.remap(&tokens, mode);
        println!("{}", remapped.join(" ").green());
    }

    Ok(())
}

/// Nearest command
fn cmd_nearest(
    symbol: &str,
    lang: Option<String>,
    candidates: Vec<String>,
    top: usize,
    config: &Config,
    table: Arc<FeatureTable>,
) -> Result<()> {
    let candidates: Vec<String> = match lang {
        Some(lang) => {
            let inv = load_lang(&lang, config, table.clone())?;
            inv.phoneme().units().map(str::to_string).collect()
        }
        None if !candidates.is_empty() => candidates,
        None => bail!("Either --lang or --candidates is required"),
    };

    match table.normalize(symbol) {
        Ok(norm) if norm != symbol => println!("{} → {}", symbol, norm.cyan()),
        Ok(_) => {}
        Err(e) => eprintln!("{}: {}", "Warning".yellow().bold(), e),
    }

    let engine = SimilarityEngine::new(&table);
    for (candidate, similarity) in engine.ranked(symbol, &candidates).into_iter().take(top) {
        println!("  {} {:.3}", format!("{candidate:8}").green(), similarity);
    }

    Ok(())
}

/// Arpa command
fn cmd_arpa(tokens: &[String]) -> Result<()> {
    let converter = ArpaConverter::bundled();
    let tokens: Vec<&str> = tokens.iter().flat_map(|t| t.split_whitespace()).collect();
    let ipa = converter.try_convert(&tokens)?;
    println!("{}", ipa.join(" "));
    Ok(())
}

/// Timit command
fn cmd_timit(labels: &[String]) -> Result<()> {
    let converter = TimitConverter::bundled();
    let labels: Vec<&str> = labels.iter().flat_map(|t| t.split_whitespace()).collect();
    let ipa = converter.try_convert(&labels)?;
    println!("{}", ipa.join(" "));
    Ok(())
}

/// G2p command
fn cmd_g2p(lang: &str, words: &[String], config: &Config, table: &FeatureTable) -> Result<()> {
    let normalizer = MacroLanguageNormalizer::new();
    let g2p = load_g2p(&normalizer, &config.resolver(), lang, &config.model, table)
        .with_context(|| format!("Failed to load g2p table for {lang}"))?;

    for word in words {
        let phonemes = g2p.transliterate(word);
        println!("{} {}", format!("{word:12}").yellow(), phonemes.join(" ").green());
    }
    Ok(())
}
