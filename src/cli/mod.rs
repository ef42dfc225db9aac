// CLI module
// This module provides the command-line interface

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::convert::Unit;
use crate::corpus::Diet;

#[derive(Parser, Debug)]
#[command(name = "chefmate")]
#[command(about = "Chefmate - Ingredient-based recipe search", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Fit the TF-IDF model over the corpus and persist the artifacts
    Index {
        /// Corpus CSV path
        #[arg(long, env = "CORPUS_PATH")]
        csv: Option<PathBuf>,

        /// Artifacts output directory
        #[arg(short, long, env = "ARTIFACTS_DIR")]
        out: Option<PathBuf>,
    },

    /// Search the fitted corpus by ingredients
    Search {
        /// Ingredient query
        query: String,

        /// Filter by diet type
        #[arg(long, value_enum)]
        diet: Option<Diet>,

        /// Maximum calories per recipe
        #[arg(long)]
        max_calories: Option<f64>,

        /// Number of results
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Convert between US cups, Belgian cups, and millilitres
    Convert {
        /// Amount to convert
        amount: f64,

        /// Source unit
        #[arg(long, value_enum)]
        from: Unit,

        /// Target unit
        #[arg(long, value_enum)]
        to: Unit,
    },

    /// Translate text with the bundled seq2seq model
    Translate {
        /// Text to translate
        text: String,

        /// Target language name, e.g. French or German
        #[arg(short, long)]
        language: String,
    },
}
