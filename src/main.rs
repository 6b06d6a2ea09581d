use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use doc_weaver::{
    annotate_source, list_declarations, load_from_path, LlmProvider, OutputGuard, SwiftParser,
    WeaverConfig, SKIP_DIRS,
};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "doc-weaver")]
#[command(about = "Automated documentation annotation for Swift sources", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate Swift files with generated documentation comments
    Annotate {
        /// Swift file or directory to annotate
        path: PathBuf,

        /// Annotation root; files outside it are rejected (defaults to the
        /// target's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Path to a doc-weaver.toml config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Dry run - run the full pipeline without writing files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Parse files and list the declarations that would be documented
    Check {
        /// Swift file or directory to inspect
        path: PathBuf,

        /// Annotation root (defaults to the target's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Annotate {
            path,
            root,
            config,
            dry_run,
            diff,
        } => cmd_annotate(path, root, config, dry_run, diff),

        Commands::Check { path, root } => cmd_check(path, root),
    }
}

/// Resolve the annotation root: explicit flag, else the target's own
/// directory (or the target itself when it is a directory).
fn resolve_root(target: &Path, root: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = root {
        return root
            .canonicalize()
            .with_context(|| format!("cannot resolve root {}", root.display()));
    }

    let root = if target.is_dir() {
        target.to_path_buf()
    } else {
        target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };

    root.canonicalize()
        .with_context(|| format!("cannot resolve root {}", root.display()))
}

/// Collect the Swift files under a target, skipping build directories.
fn discover_swift_files(target: &Path) -> Result<Vec<PathBuf>> {
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(target).into_iter().filter_entry(|entry| {
        let name = entry.file_name().to_str().unwrap_or_default();
        !(entry.file_type().is_dir() && SKIP_DIRS.contains(&name))
    });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("swift")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();

    if files.is_empty() {
        anyhow::bail!("no .swift files found under {}", target.display());
    }

    Ok(files)
}

/// Locate the config: explicit flag, else ./doc-weaver.toml, else defaults.
fn resolve_config(config: Option<PathBuf>) -> Result<WeaverConfig> {
    if let Some(path) = config {
        return load_from_path(&path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    let default_path = Path::new("doc-weaver.toml");
    if default_path.exists() {
        return load_from_path(default_path)
            .with_context(|| "failed to load doc-weaver.toml".to_string());
    }

    Ok(WeaverConfig::default())
}

/// Show unified diff between original and annotated content.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (annotated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_annotate(
    path: PathBuf,
    root: Option<PathBuf>,
    config: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let config = resolve_config(config)?;
    doc_weaver::logging::init(&config.logging);

    let root = resolve_root(&path, root)?;
    let guard = OutputGuard::new(&root)?;
    let files = discover_swift_files(&path)?;

    let provider = LlmProvider::new(&config)?;

    println!("Root: {}", root.display());
    println!("Model: {}", config.model);
    if dry_run {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }
    println!();

    let mut annotated = 0;
    let mut unchanged = 0;
    let mut failed = 0;

    for file in files {
        let file = match guard.validate_path(&file) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                failed += 1;
                continue;
            }
        };

        let original = match fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                failed += 1;
                continue;
            }
        };

        match annotate_source(&original, &provider) {
            Ok(modified) if modified == original => {
                println!("{} {}: no declarations to document", "⊘".cyan(), file.display());
                unchanged += 1;
            }
            Ok(modified) => {
                if show_diff {
                    display_diff(&file, &original, &modified);
                }
                if dry_run {
                    println!("{} {}: would annotate", "✓".green(), file.display());
                } else {
                    guard.revalidate(&file)?;
                    doc_weaver::atomic_replace(&file, &modified)
                        .with_context(|| format!("failed to write {}", file.display()))?;
                    println!("{} {}: annotated", "✓".green(), file.display());
                }
                annotated += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} annotated", format!("{}", annotated).green());
    println!("  {} unchanged", format!("{}", unchanged).cyan());
    println!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check(path: PathBuf, root: Option<PathBuf>) -> Result<()> {
    let config = WeaverConfig::default();
    doc_weaver::logging::init(&config.logging);

    let root = resolve_root(&path, root)?;
    let guard = OutputGuard::new(&root)?;
    let files = discover_swift_files(&path)?;

    println!("{}", "Declaration Report".bold());
    println!("Root: {}", root.display());
    println!();

    let mut total = 0;
    let mut failed = 0;

    for file in files {
        let file = match guard.validate_path(&file) {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                failed += 1;
                continue;
            }
        };

        let source = match fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                failed += 1;
                continue;
            }
        };

        let mut parser = SwiftParser::new()?;
        let parsed = parser.parse_with_source(&source)?;

        if parsed.has_errors() {
            eprintln!(
                "{} {}: {} syntax error nodes",
                "✗".red(),
                file.display(),
                parsed.error_nodes().len()
            );
            failed += 1;
            continue;
        }

        let declarations = list_declarations(parsed.root_node(), &source);
        println!(
            "{} {} ({} declarations)",
            "✓".green(),
            file.display(),
            declarations.len()
        );
        for decl in &declarations {
            println!(
                "  {:>4}:{:<3} {:<9} {}",
                decl.row + 1,
                decl.column,
                decl.kind.as_str(),
                decl.first_line.dimmed()
            );
        }
        total += declarations.len();
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} declarations", format!("{}", total).green());
    println!("  {} files failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
