//! CLI module for the sage binary.
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sage - conflict-aware company policy assistant
#[derive(Parser, Debug)]
#[command(
    name = "sage",
    version,
    about = "Sage - conflict-aware company policy assistant",
    long_about = "A retrieval-augmented assistant that ingests company policy documents\n\
                  into a vector store and answers employee questions, resolving\n\
                  conflicting or outdated policies via metadata-filtered retrieval.",
    after_help = "EXAMPLES:\n    \
                  sage ingest handbook.txt updates.txt faq.txt   # Chunk and store documents\n    \
                  sage ask \"As an intern, can I work remotely?\"  # One-shot question\n    \
                  sage chat                                     # Interactive session\n    \
                  sage collection list                          # Show stored collections"
)]
pub struct Cli {
    /// Collection to operate on
    #[arg(short = 'C', long, global = true, env = "POLICY_COLLECTION")]
    pub collection: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk policy documents and store them in the vector database
    ///
    /// All files are sent to the chunker in a single batch so related
    /// documents are tagged consistently.
    Ingest {
        /// Policy document files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the extracted chunk JSON to this file for inspection
        #[arg(long)]
        dump_chunks: Option<PathBuf>,
    },

    /// Answer a single policy question and exit
    Ask {
        /// The question to answer
        question: String,

        /// Number of retrieved excerpts handed to the answer step
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Interactive question-answering session (type 'exit' to quit)
    Chat {
        /// Number of retrieved excerpts handed to the answer step
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Manage vector store collections
    #[command(subcommand)]
    Collection(CollectionCommands),
}

/// Collection management subcommands
#[derive(Subcommand, Debug)]
pub enum CollectionCommands {
    /// Create a new collection
    Create {
        /// Name of the collection
        name: String,
    },

    /// Delete a collection and everything in it
    Delete {
        /// Name of the collection
        name: String,

        /// Delete without prompting
        #[arg(short, long)]
        force: bool,
    },

    /// List all collections
    List,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
