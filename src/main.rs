use altre_document::logging::{self, Logger};
use altre_document::{
    DocumentService, EngineOptions, FindQuery, LocalFileSystem, ReplaceOperation,
};
use anyhow::{anyhow, bail, Context, Result};
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = "usage: altre-document <path> --find <term> [--replace <text>] \
[--match-case] [--whole-word] [--save-as <path>] [--debug-log [<path>]]";

#[derive(Debug, Default)]
struct CliOptions {
    path: Option<PathBuf>,
    find: Option<String>,
    replace: Option<String>,
    match_case: bool,
    whole_word: bool,
    save_as: Option<PathBuf>,
    debug_log: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    let mut logger = Logger::new(LevelFilter::Warn);
    if let Some(path) = &cli.debug_log {
        logger = logger.with_level(LevelFilter::Debug).with_file_output(path);
    }
    logging::init(logger).map_err(|e| anyhow!("failed to initialize logger: {}", e))?;

    run(cli).await
}

async fn run(cli: CliOptions) -> Result<()> {
    let path = cli.path.ok_or_else(|| anyhow!("{}", USAGE))?;
    let term = cli.find.ok_or_else(|| anyhow!("{}", USAGE))?;

    let options = EngineOptions::from_env();
    let fs = Arc::new(LocalFileSystem::with_chunk_size(options.chunk_size));
    let mut service = DocumentService::new(fs, options);

    let mut doc = service
        .open(&path, None, None, None)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;

    let query = FindQuery::new(term, cli.match_case, cli.whole_word);
    let Some(replacement) = cli.replace else {
        let result = service.find(&doc, &query);
        for m in result.matches() {
            let (line, column) = line_column(doc.content(), m.start);
            println!("{}:{}:{}", path.display(), line, column);
        }
        println!("{} match(es)", result.len());
        return Ok(());
    };

    let count = service
        .replace_all(&mut doc, &ReplaceOperation::new(query, replacement))
        .with_context(|| format!("failed to replace in {}", path.display()))?;
    println!("{} replacement(s)", count);

    if count > 0 || cli.save_as.is_some() {
        let saved = service
            .save(&mut doc, cli.save_as.as_deref(), None, None)
            .await
            .context("failed to save document")?;
        println!("saved {}", saved.display());
    }
    Ok(())
}

fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut cli = CliOptions::default();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--find" => cli.find = Some(next_value(&mut iter, arg)?),
            "--replace" => cli.replace = Some(next_value(&mut iter, arg)?),
            "--save-as" => cli.save_as = Some(PathBuf::from(next_value(&mut iter, arg)?)),
            "--match-case" => cli.match_case = true,
            "--whole-word" => cli.whole_word = true,
            "--debug-log" => {
                let path = iter
                    .next_if(|next| !next.starts_with('-'))
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("debug.log"));
                cli.debug_log = Some(path);
            }
            "-h" | "--help" => bail!("{}", USAGE),
            other if other.starts_with("--") => bail!("unknown option '{}'\n{}", other, USAGE),
            other => {
                if cli.path.is_some() {
                    bail!("unexpected argument '{}'\n{}", other, USAGE);
                }
                cli.path = Some(PathBuf::from(other));
            }
        }
    }
    Ok(cli)
}

fn next_value<'a, I>(iter: &mut std::iter::Peekable<I>, flag: &str) -> Result<String>
where
    I: Iterator<Item = &'a String>,
{
    iter.next()
        .cloned()
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

/// 文字オフセットを1始まりの行・桁に変換
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for ch in text.chars().take(offset) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let cli = parse_args(&args(&[
            "notes.txt",
            "--find",
            "foo",
            "--replace",
            "bar",
            "--whole-word",
            "--debug-log",
        ]))
        .unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("notes.txt")));
        assert_eq!(cli.find.as_deref(), Some("foo"));
        assert_eq!(cli.replace.as_deref(), Some("bar"));
        assert!(cli.whole_word);
        assert!(!cli.match_case);
        assert_eq!(cli.debug_log, Some(PathBuf::from("debug.log")));
    }

    #[test]
    fn test_parse_args_rejects_unknown_option() {
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["--find"])).is_err());
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("ab\ncd", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
    }
}
