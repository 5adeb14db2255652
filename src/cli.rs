use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "runarch")]
#[command(version)]
#[command(about = "A Rust ttarch2 extraction utility with HTTP URL support", long_about = None)]
#[command(after_help = "Examples:\n  \
  runarch season2.ttarch2 -x boot.lua    extract all members except boot.lua\n  \
  runarch -p data.ttarch2 | more         send member contents via pipe into more\n  \
  runarch --hash 0x1a2b data.ttarch2     extract the member with this hash\n  \
  runarch -l https://example.com/data.ttarch2   list members from a remote archive")]
pub struct Cli {
    /// Archive file path or HTTP URL
    #[arg(value_name = "ARCHIVE")]
    pub file: String,

    /// Member names to extract (default: all)
    #[arg(value_name = "MEMBERS")]
    pub members: Vec<String>,

    /// List members (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract members to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract members into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude members that follow
    #[arg(short = 'x', value_name = "MEMBER", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Extract only the member at this file-table index
    #[arg(long, value_name = "N", conflicts_with = "hash")]
    pub index: Option<usize>,

    /// Extract only the member with this content hash (hex, 0x prefix optional)
    #[arg(long, value_name = "HASH", value_parser = parse_hash)]
    pub hash: Option<u64>,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }
}

/// Parse a 64-bit content hash from hex, with or without a `0x` prefix.
fn parse_hash(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hash '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::parse_hash;

    #[test]
    fn parses_hex_hashes() {
        assert_eq!(parse_hash("0x1a2b"), Ok(0x1a2b));
        assert_eq!(parse_hash("1A2B"), Ok(0x1a2b));
        assert_eq!(parse_hash("0xffffffffffffffff"), Ok(u64::MAX));
        assert!(parse_hash("zz").is_err());
        assert!(parse_hash("").is_err());
    }
}
