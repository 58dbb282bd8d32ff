//! CLI argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::inventory::Mode;

#[derive(Parser)]
#[command(name = "allophony")]
#[command(about = "Phonetic normalization, nearest-phone remapping and phone error rates")]
#[command(version)]
pub struct Cli {
    /// Custom configuration file path
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory holding installed inventories
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Model name or a directory of per-language inventories
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute error rates between reference and hypothesis transcriptions
    Eval {
        /// Reference file
        #[arg(long = "ref")]
        reference: PathBuf,

        /// Hypothesis file
        #[arg(long = "hyp")]
        hypothesis: PathBuf,

        /// Layout of both files
        #[arg(short = 'f', long, default_value = "kaldi")]
        format: UtteranceFormat,

        /// Write per-utterance alignments and the summary to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Align every utterance and report insertion/deletion/substitution
        /// breakdowns
        #[arg(short, long)]
        verbose: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Also report error rates per phoneme group, one group of
        /// whitespace-separated phonemes per line
        #[arg(short, long)]
        group: Option<PathBuf>,
    },

    /// Show a language's phoneme and phone inventory
    Info {
        /// Language id (ISO 639-1 or 639-3)
        #[arg(short, long)]
        lang: String,

        /// List phones with the phonemes they realize instead
        #[arg(long)]
        inverse: bool,
    },

    /// Split a transcription into known phonetic symbols
    Tokenize {
        /// Transcription text
        text: String,

        /// Also remap the symbols into this language's inventory
        #[arg(short, long)]
        lang: Option<String>,

        /// Table to remap against
        #[arg(long, default_value = "broad")]
        mode: Mode,
    },

    /// Find the symbols closest to a phonetic symbol
    Nearest {
        /// Symbol to look up
        symbol: String,

        /// Rank this language's phonemes
        #[arg(short, long, conflicts_with = "candidates")]
        lang: Option<String>,

        /// Rank these symbols instead (comma separated)
        #[arg(long, value_delimiter = ',')]
        candidates: Vec<String>,

        /// Number of results to show
        #[arg(short = 'n', long, default_value = "5")]
        top: usize,
    },

    /// Convert ARPAbet symbols to IPA
    Arpa {
        /// ARPAbet symbols, stress digits allowed
        #[arg(required = true)]
        tokens: Vec<String>,
    },

    /// Convert TIMIT phone labels to IPA
    Timit {
        /// TIMIT labels; closures and silence are dropped
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Transliterate words with a language's grapheme-to-phoneme table
    G2p {
        /// Language id, or `<lang>-<script>` to pick a table
        #[arg(short, long)]
        lang: String,

        /// Words to transliterate
        #[arg(required = true)]
        words: Vec<String>,
    },
}

/// Layout of transcription files read by `eval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UtteranceFormat {
    /// `utt_id tok tok ...` per line
    Kaldi,
    /// `tok tok ...` per line; the line number is the id
    Text,
}

impl std::fmt::Display for UtteranceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UtteranceFormat::Kaldi => write!(f, "kaldi"),
            UtteranceFormat::Text => write!(f, "text"),
        }
    }
}
