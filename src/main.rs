use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use docwalk::{config, Document, FieldCleaner, PatchOperation, PatchSet, WalkArgs};
use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "docwalk")]
#[command(about = "Read, patch and fingerprint JSON documents by path", long_about = None)]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace); logs go to stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// JSON document to read (stdin if omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Treat paths as JSON Pointers instead of JQ-like paths
    #[arg(short, long)]
    pointer: bool,
}

#[derive(Args)]
struct Output {
    /// Rewrite the input file instead of printing the result
    #[arg(short, long, requires = "file")]
    in_place: bool,

    /// Show a line diff of the change
    #[arg(short, long)]
    diff: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value at a path
    Get {
        path: String,

        /// Collect every element matched by [] instead of the first
        #[arg(short, long)]
        all: bool,

        /// Print strings without JSON quotes
        #[arg(short, long)]
        raw: bool,

        #[command(flatten)]
        input: Input,
    },

    /// Write a value at a path, creating missing objects and arrays
    Set {
        path: String,

        /// JSON value; anything that does not parse as JSON is taken as a string
        value: String,

        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,
    },

    /// Remove the key or array element at a path
    Delete {
        path: String,

        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,
    },

    /// List the concrete paths a path matches
    Find {
        path: String,

        /// Only report matches equal to this JSON value
        #[arg(long)]
        value: Option<String>,

        /// Stop at the first match
        #[arg(long)]
        first: bool,

        #[command(flatten)]
        input: Input,
    },

    /// Print the JSON patch that adds a value at a path
    Patch {
        path: String,

        /// JSON value; anything that does not parse as JSON is taken as a string
        value: String,

        #[command(flatten)]
        input: Input,
    },

    /// Print order-independent fingerprints of JSON files
    Hash {
        /// Files or directories (searched recursively for *.json)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the 64-bit digest as a decimal number instead of base64
        #[arg(long)]
        numeric: bool,
    },

    /// Strip bookkeeping fields (Kubernetes managed fields unless --config is given)
    Clean {
        /// TOML cleaner descriptor
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Get {
            path,
            all,
            raw,
            input,
        } => cmd_get(&input, &path, all, raw),

        Commands::Set {
            path,
            value,
            input,
            output,
        } => cmd_set(&input, &output, &path, &value),

        Commands::Delete {
            path,
            input,
            output,
        } => cmd_delete(&input, &output, &path),

        Commands::Find {
            path,
            value,
            first,
            input,
        } => cmd_find(&input, &path, value.as_deref(), first),

        Commands::Patch { path, value, input } => cmd_patch(&input, &path, &value),

        Commands::Hash { paths, numeric } => cmd_hash(&paths, numeric),

        Commands::Clean {
            config,
            input,
            output,
        } => cmd_clean(&input, &output, config.as_deref()),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

impl Input {
    fn read(&self) -> Result<Document> {
        let text = match &self.file {
            Some(file) => fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?,
            None => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("failed to read stdin")?;
                text
            }
        };
        Document::from_json(&text).with_context(|| format!("failed to parse {}", self.label()))
    }

    fn path(&self, text: &str) -> docwalk::Path {
        if self.pointer {
            docwalk::Path::parse_json_pointer(text)
        } else {
            docwalk::Path::parse_jq(text)
        }
    }

    fn render(&self, path: &docwalk::Path) -> String {
        if self.pointer {
            path.to_json_pointer()
        } else {
            path.to_string()
        }
    }

    fn label(&self) -> String {
        self.file
            .as_ref()
            .map_or_else(|| "<stdin>".to_string(), |file| file.display().to_string())
    }
}

/// Accept bare words on the command line: `docwalk set metadata.name web`.
fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn cmd_get(input: &Input, path: &str, all: bool, raw: bool) -> Result<()> {
    let doc = input.read()?;
    let path = input.path(path);
    let value = doc.walk(&path, WalkArgs::new().match_all(all))?;

    match value {
        Value::String(text) if raw => println!("{text}"),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    Ok(())
}

fn cmd_set(input: &Input, output: &Output, path: &str, value: &str) -> Result<()> {
    let mut doc = input.read()?;
    let before = doc.to_json_pretty()?;
    doc.set(&input.path(path), parse_value(value))
        .with_context(|| format!("failed to set {path}"))?;
    emit(input, output, &before, &doc)
}

fn cmd_delete(input: &Input, output: &Output, path: &str) -> Result<()> {
    let mut doc = input.read()?;
    let before = doc.to_json_pretty()?;
    doc.delete(&input.path(path))
        .with_context(|| format!("failed to delete {path}"))?;
    emit(input, output, &before, &doc)
}

fn cmd_find(input: &Input, path: &str, value: Option<&str>, first: bool) -> Result<()> {
    let doc = input.read()?;
    let path = input.path(path);
    let value = value.map(parse_value);

    let found = if first {
        vec![doc.find_first(&path, value.as_ref())?]
    } else {
        doc.find_all(&path, value.as_ref())?
    };

    for path in found {
        println!("{}", input.render(&path));
    }
    Ok(())
}

fn cmd_patch(input: &Input, path: &str, value: &str) -> Result<()> {
    let doc = input.read()?;
    let (prefix, value) = doc
        .generate_patch(&input.path(path), parse_value(value))
        .with_context(|| format!("failed to generate patch for {path}"))?;

    let mut patches = PatchSet::new();
    patches.push(PatchOperation::add(prefix.to_json_pointer(), value));
    println!("{}", serde_json::to_string_pretty(&patches)?);
    Ok(())
}

fn cmd_hash(paths: &[PathBuf], numeric: bool) -> Result<()> {
    let mut failed = 0;

    for file in collect_json_files(paths)? {
        match hash_file(&file, numeric) {
            Ok(digest) => println!("{digest}  {}", file.display()),
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗".red(), file.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} file(s) could not be hashed");
    }
    Ok(())
}

fn hash_file(file: &Path, numeric: bool) -> Result<String> {
    let text = fs::read_to_string(file)?;
    let doc = Document::from_json(&text)?;
    if numeric {
        Ok(doc.hash()?.to_string())
    } else {
        Ok(doc.hash_str()?)
    }
}

/// Expand directories into the `*.json` files below them, sorted.
fn collect_json_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("json")
            {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        debug!(dir = %path.display(), files = found.len(), "collected JSON files");
        files.extend(found);
    }
    Ok(files)
}

fn cmd_clean(input: &Input, output: &Output, config_path: Option<&Path>) -> Result<()> {
    let cleaner = match config_path {
        Some(path) => config::load_from_path(path)?,
        None => FieldCleaner::kubernetes_managed_fields(),
    };

    let mut doc = input.read()?;
    let before = doc.to_json_pretty()?;
    cleaner.clean(doc.root_mut());
    emit(input, output, &before, &doc)
}

/// Print or write back a modified document.
fn emit(input: &Input, output: &Output, before: &str, doc: &Document) -> Result<()> {
    let after = doc.to_json_pretty()? + "\n";

    if output.diff {
        display_diff(&input.label(), before, after.trim_end());
    }

    match (&input.file, output.in_place) {
        (Some(file), true) => {
            if before == after.trim_end() {
                debug!(file = %file.display(), "document unchanged");
                return Ok(());
            }
            atomic_write(file, after.as_bytes())
                .with_context(|| format!("failed to write {}", file.display()))?;
            eprintln!("{} {}", "✓".green(), file.display());
        }
        _ if !output.diff => print!("{after}"),
        _ => {}
    }
    Ok(())
}

/// Line diff between the document before and after the change.
fn display_diff(label: &str, original: &str, modified: &str) {
    println!("{}", format!("--- {label} (original)").dimmed());
    println!("{}", format!("+++ {label} (modified)").dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => format!(" {change}").normal(),
        };
        print!("{sign}");
        if change.missing_newline() {
            println!();
        }
    }
}

/// Tempfile in the target directory, fsync, then rename over the original.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
