//! CLI tool to validate and inspect Gherkin feature files.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser as _, Subcommand};
use gherkin_parser_rs::{
    BuiltinKeywords, DEFAULT_LANGUAGE, DialectResolver, Error, GherkinDocument, Parser, Scanner,
    Token, TokenKind, TokenMatcher,
};
use tracing_subscriber::EnvFilter;

/// Validate and inspect Gherkin feature files.
#[derive(clap::Parser)]
#[command(author, version, about)]
struct Cli {
    /// Log filter, e.g. `debug` or `gherkin_parser_rs=trace`.
    #[arg(long, global = true, env = "GHERKIN_LOG", default_value = "warn")]
    log_level: String,

    /// Language used when a file has no `# language:` line.
    #[arg(long, global = true, env = "GHERKIN_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    language: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that feature files parse.
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print every line of a file with its classification.
    Tokens { file: PathBuf },
    /// Print the parsed document tree.
    Ast { file: PathBuf },
}

fn init_logging(filter: &str) {
    // A subscriber may already be installed; the first one wins.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .ok();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let resolver =
        Arc::new(DialectResolver::new(BuiltinKeywords).with_default_language(&cli.language));
    let parser = Parser::with_resolver(Arc::clone(&resolver));

    let ok = match &cli.command {
        Commands::Validate { files } => {
            let mut ok = true;
            for path in files {
                ok &= validate(&parser, path);
            }
            ok
        }
        Commands::Tokens { file } => print_tokens(resolver, file),
        Commands::Ast { file } => match parse_file(&parser, file) {
            Ok(doc) => {
                println!("{doc:#?}");
                true
            }
            Err(e) => {
                eprintln!("{}: {e}", file.display());
                false
            }
        },
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn parse_file(parser: &Parser, path: &Path) -> Result<GherkinDocument, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    parser.parse_reader(file).map_err(|e| e.to_string())
}

fn validate(parser: &Parser, path: &Path) -> bool {
    match parse_file(parser, path) {
        Ok(doc) => {
            let summary = doc.feature.map_or_else(
                || "no feature".to_string(),
                |feature| {
                    let definitions = feature.children.len();
                    let steps: usize = feature.children.iter().map(|c| c.steps().len()).sum();
                    format!(
                        "{definitions} scenario definition(s), {steps} step(s), language {}",
                        feature.language
                    )
                },
            );
            eprintln!("{}: valid ({summary})", path.display());
            true
        }
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            false
        }
    }
}

fn print_tokens(resolver: Arc<DialectResolver>, path: &Path) -> bool {
    let result = File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|file| dump_tokens(resolver, file).map_err(|e| e.to_string()));
    match result {
        Ok(()) => true,
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            false
        }
    }
}

fn dump_tokens(resolver: Arc<DialectResolver>, file: File) -> Result<(), Error> {
    let mut matcher = TokenMatcher::new(resolver)?;
    let mut scanner = Scanner::new(BufReader::new(file));
    loop {
        let mut token = scanner.read()?;
        matcher.classify(&mut token)?;
        println!("{}", describe_token(&token));
        if token.is_eof() {
            return Ok(());
        }
    }
}

/// `line:column Kind keyword text`, then any tag or cell values.
fn describe_token(token: &Token) -> String {
    let kind = token.kind.map_or("#None", TokenKind::as_str);
    let location = token.location.to_string();
    let keyword = token.keyword.as_deref().unwrap_or_default().trim_end();
    [location.as_str(), kind, keyword, token.text_or_empty()]
        .into_iter()
        .chain(token.items.iter().map(|item| item.text.as_str()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(input: &str) -> Vec<String> {
        let resolver = Arc::new(DialectResolver::default());
        let mut matcher = TokenMatcher::new(resolver).unwrap();
        let mut scanner = Scanner::from_text(input);
        let mut lines = Vec::new();
        loop {
            let mut token = scanner.read().unwrap();
            matcher.classify(&mut token).unwrap();
            lines.push(describe_token(&token));
            if token.is_eof() {
                return lines;
            }
        }
    }

    #[test]
    fn token_lines_show_location_kind_keyword_and_text() {
        let lines = classified("@a @b\nFeature: Login\n  Given a user\n    | x | y |\n");
        assert_eq!(
            lines,
            [
                "1:1 #TagLine @a @b",
                "2:1 #FeatureLine Feature Login",
                "3:3 #StepLine Given a user",
                "4:5 #TableRow x y",
                "5:1 #EOF",
            ]
        );
    }
}
