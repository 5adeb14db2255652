//! Main entry point for the runarch CLI application.
//!
//! This binary provides a command-line interface for listing and extracting
//! members of ttarch2 archives from both local filesystem and remote HTTP
//! URLs.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use runarch::{ArchiveError, ArchiveExtractor, Cli, HttpRangeReader, LocalFileReader, ReadAt};

/// Application entry point.
///
/// Parses command-line arguments and dispatches to the appropriate handler
/// based on whether the input is a local file or HTTP URL.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_http_url() {
        // Handle remote archive via HTTP Range requests
        let reader = HttpRangeReader::new(cli.file.clone()).await?;
        let transferred_before = reader.transferred_bytes();
        let reader = Arc::new(reader);

        process_archive(reader.clone(), &cli).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            let transferred = reader.transferred_bytes() - transferred_before;
            eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
        }
    } else {
        // Handle local archive
        let reader = Arc::new(LocalFileReader::new(Path::new(&cli.file))?);
        process_archive(reader, &cli).await?;
    }

    Ok(())
}

/// Process an archive based on CLI options.
///
/// This function handles both listing and extraction modes:
/// - List mode (`-l` or `-v`): Display archive contents
/// - Extract mode: Extract members selected by `--index`, `--hash`, or the
///   positional name/glob filters
///
/// # Arguments
///
/// * `reader` - A reader implementing the `ReadAt` trait for random access
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if processing fails.
async fn process_archive<R: ReadAt + 'static>(reader: Arc<R>, cli: &Cli) -> Result<()> {
    let extractor = ArchiveExtractor::open(reader)
        .await
        .with_context(|| format!("failed to open archive: {}", cli.file))?;

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        return list_members(&extractor, cli.verbose).await;
    }

    // Extract mode: select members by index, by hash, or by name filters
    let selected: Vec<usize> = if let Some(index) = cli.index {
        // Validate the index up front so a bad one fails before any output
        extractor
            .entry_by_index(index)
            .with_context(|| format!("invalid --index for {}", cli.file))?;
        vec![index]
    } else if let Some(hash) = cli.hash {
        let index = extractor
            .entries()
            .iter()
            .position(|e| e.hash == hash)
            .ok_or(ArchiveError::HashNotFound { hash })
            .with_context(|| format!("invalid --hash for {}", cli.file))?;
        vec![index]
    } else {
        select_by_name(&extractor, cli).await?
    };

    // Extract each selected member
    let multiple_members = cli.pipe && selected.len() > 1;
    for index in selected {
        extract_member(&extractor, index, cli, multiple_members).await?;
    }

    Ok(())
}

/// Select member indices by the positional name/glob filters.
///
/// Resolves every entry's name (needed for matching), then applies:
/// 1. If specific members are requested, only include matching entries
/// 2. Exclude members matching the `-x` patterns
///
/// With no filters at all, every member is selected.
async fn select_by_name<R: ReadAt + 'static>(
    extractor: &ArchiveExtractor<R>,
    cli: &Cli,
) -> Result<Vec<usize>> {
    let mut selected = Vec::new();

    for (index, entry) in extractor.entries().iter().enumerate() {
        let name = extractor
            .entry_name(entry)
            .await
            .with_context(|| format!("failed to resolve name of entry {}", index))?;

        // If specific members are requested via positional arguments,
        // only include entries that match
        if !cli.members.is_empty() {
            let matches = cli.members.iter().any(|m| {
                if has_glob_chars(m) {
                    // Pattern contains wildcards: use glob matching
                    glob_match(m, &name)
                } else {
                    // No wildcards: exact match on member name or basename
                    let basename = Path::new(&name)
                        .file_name()
                        .map(|s| s.to_string_lossy())
                        .unwrap_or_default();
                    name == *m || basename == *m
                }
            });
            if !matches {
                continue;
            }
        }

        // Exclude members matching the -x patterns
        if cli
            .exclude
            .iter()
            .any(|x| name.contains(x) || glob_match(x, &name))
        {
            continue;
        }

        selected.push(index);
    }

    Ok(selected)
}

/// List members of the archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just member names, one per line
/// - Verbose format (`-v`): Detailed table with index, hash, offset and size
///
/// # Arguments
///
/// * `extractor` - The archive extractor instance
/// * `verbose` - If true, display detailed information in table format
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if listing fails.
async fn list_members<R: ReadAt + 'static>(
    extractor: &ArchiveExtractor<R>,
    verbose: bool,
) -> Result<()> {
    if verbose {
        let header = extractor.header();
        println!(
            "Archive {} {}, chunk size {}",
            header.type_tag, header.version_tag, header.chunk_size
        );
        println!(
            "{:>6}  {:>18}  {:>10}  {:>10}  Name",
            "Index", "Hash", "Offset", "Size"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_bytes = 0u64;
    let mut member_count = 0usize;

    for (index, entry) in extractor.entries().iter().enumerate() {
        let name = extractor
            .entry_name(entry)
            .await
            .with_context(|| format!("failed to resolve name of entry {}", index))?;

        if verbose {
            println!(
                "{:>6}  {:#018x}  {:>10}  {:>10}  {}",
                index, entry.hash, entry.offset, entry.size, name
            );
            total_bytes += entry.size as u64;
            member_count += 1;
        } else {
            // Simple format: just the member name
            println!("{}", name);
        }
    }

    // Print summary line in verbose mode
    if verbose {
        println!("{}", "-".repeat(70));
        println!("{:>38}  {:>10}  {} members", "", total_bytes, member_count);
    }

    Ok(())
}

/// Extract a single member from the archive.
///
/// Handles various extraction options:
/// - Pipe mode (`-p`): Write to stdout instead of file
/// - Custom output directory (`-d`): Extract to specified directory
/// - Junk paths (`-j`): Ignore directory structure in member names
/// - Overwrite control (`-n`, `-o`): Handle existing files
///
/// # Arguments
///
/// * `extractor` - The archive extractor instance
/// * `index` - Table index of the member to extract
/// * `cli` - Parsed command-line arguments
/// * `show_name` - If true, print a name marker before content (for pipe
///   mode with multiple members)
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if extraction fails.
async fn extract_member<R: ReadAt + 'static>(
    extractor: &ArchiveExtractor<R>,
    index: usize,
    cli: &Cli,
    show_name: bool,
) -> Result<()> {
    let entry = extractor.entry_by_index(index)?;
    let name = extractor
        .entry_name(entry)
        .await
        .with_context(|| format!("failed to resolve name of entry {}", index))?;

    // Pipe mode: write member contents directly to stdout
    if cli.pipe {
        if show_name {
            use tokio::io::AsyncWriteExt;
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(format!("--- {} ---\n", name).as_bytes())
                .await?;
        }
        return extractor
            .extract_to_stdout(entry)
            .await
            .with_context(|| format!("failed to extract '{}' (entry {})", name, index));
    }

    // Determine the output path based on CLI options
    let file_name = if cli.junk_paths {
        // Junk paths: use only the base filename, ignore directory structure
        Path::new(&name)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.clone())
    } else {
        // Preserve any directory structure in the member name
        name.clone()
    };
    let output_path = match cli.extract_dir {
        Some(ref dir) => PathBuf::from(dir).join(&file_name),
        None => PathBuf::from(&file_name),
    };

    // Handle existing files based on overwrite options
    if output_path.exists() {
        if cli.never_overwrite {
            // -n flag: never overwrite, skip silently (unless quiet)
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", name);
            }
            return Ok(());
        }

        if !cli.overwrite {
            // Default behavior: skip with suggestion to use -o
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", name);
            }
            return Ok(());
        }
        // -o flag: overwrite without prompting (fall through to extraction)
    }

    // Display extraction progress
    if !cli.is_quiet() {
        println!("  extracting: {}", name);
    }

    // Perform the actual extraction
    extractor
        .extract_to_file(entry, &output_path)
        .await
        .with_context(|| format!("failed to extract '{}' (entry {})", name, index))?;

    Ok(())
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// This is a basic implementation for member matching:
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    /// Recursive helper function for glob matching.
    ///
    /// Uses a simple backtracking algorithm to handle `*` wildcards.
    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            // Both exhausted: match successful
            (None, None) => true,
            // Star matches zero or more characters
            (Some('*'), _) => {
                // Try matching zero characters (skip the star)
                // OR matching one character (keep the star for more)
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            // Question mark matches exactly one character
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            // Literal character match
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            // No match
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
