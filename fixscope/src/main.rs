/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! `fixscope` command-line tool.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fixscope::Context;
use fixscope_dictionary::Dictionary;
use fixscope_render::RenderConfig;
use fixscope_session::TokenGenerator;
use fixscope_tagvalue::{SOH, replace_delimiter};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "fixscope")]
#[command(about = "Render FIX tag=value messages against a protocol dictionary", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render each non-empty input line as a report.
    Render {
        /// Dictionary file (.xml or .json).
        #[arg(long, env = "FIXSCOPE_DICTIONARY")]
        dictionary: PathBuf,

        /// Input file; standard input when omitted.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Reject messages whose checksum does not match.
        #[arg(long)]
        validate_checksum: bool,
    },
    /// Print fresh request tokens.
    Token {
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Build an outgoing message stamped with a fresh ClOrdID token.
    Stamp {
        /// Dictionary file (.xml or .json).
        #[arg(long, env = "FIXSCOPE_DICTIONARY")]
        dictionary: PathBuf,

        /// Message type of the new message.
        #[arg(long)]
        msg_type: String,

        /// Extra body field as TAG=VALUE; repeatable.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(u32, String)>,
    },
    /// Print the template of a repeating group.
    Template {
        /// Dictionary file (.xml or .json).
        #[arg(long, env = "FIXSCOPE_DICTIONARY")]
        dictionary: PathBuf,

        /// Message type declaring the group.
        #[arg(long)]
        msg_type: String,

        /// Count tag of the group.
        #[arg(long)]
        tag: u32,
    },
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

fn load(path: &Path, config: RenderConfig) -> anyhow::Result<Context> {
    Context::load(path, config)
        .with_context(|| format!("cannot load dictionary {}", path.display()))
}

fn render_lines(context: &Context, input: impl BufRead, out: &mut impl Write) -> anyhow::Result<usize> {
    let renderer = context.renderer();
    let mut rendered = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(out, "{}", renderer.render_line(&line))?;
        rendered += 1;
    }
    Ok(rendered)
}

fn parse_field(arg: &str) -> Result<(u32, String), String> {
    let (tag, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=VALUE, got {}", arg))?;
    let tag = tag
        .parse::<u32>()
        .ok()
        .filter(|t| *t > 0)
        .ok_or_else(|| format!("invalid tag {}", tag))?;
    Ok((tag, value.to_string()))
}

fn stamp(context: &Context, msg_type: &str, fields: &[(u32, String)]) -> String {
    let (token, wire) = context.outgoing(
        msg_type,
        fields.iter().map(|(tag, value)| (*tag, value.as_str())),
    );
    info!("stamped {} message with token {}", msg_type, token);
    let visible = replace_delimiter(&wire, SOH, context.config().delimiter);
    String::from_utf8_lossy(&visible).into_owned()
}

fn write_tokens(tokens: &TokenGenerator, count: usize, out: &mut impl Write) -> io::Result<()> {
    for _ in 0..count {
        writeln!(out, "{}", tokens.next())?;
    }
    Ok(())
}

fn format_template(dictionary: &Dictionary, msg_type: &str, tag: u32) -> anyhow::Result<String> {
    let template = dictionary
        .group_template(msg_type, tag)
        .with_context(|| format!("no template for group {} in message {}", tag, msg_type))?;
    let names: Vec<String> = template
        .iter()
        .map(|t| match dictionary.field(*t) {
            Some(def) => format!("{}={}", t, def.name),
            None => t.to_string(),
        })
        .collect();
    Ok(names.join("\n"))
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.cmd {
        Commands::Render {
            dictionary,
            input,
            validate_checksum,
        } => {
            let config = RenderConfig::default().with_checksum_validation(validate_checksum);
            let context = load(&dictionary, config)?;
            let rendered = match input {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("cannot open {}", path.display()))?;
                    render_lines(&context, BufReader::new(file), &mut out)?
                }
                None => render_lines(&context, io::stdin().lock(), &mut out)?,
            };
            info!("rendered {} messages", rendered);
        }
        Commands::Token { count } => {
            write_tokens(&TokenGenerator::new(), count, &mut out)?;
        }
        Commands::Stamp {
            dictionary,
            msg_type,
            fields,
        } => {
            let context = load(&dictionary, RenderConfig::default())?;
            writeln!(out, "{}", stamp(&context, &msg_type, &fields))?;
        }
        Commands::Template {
            dictionary,
            msg_type,
            tag,
        } => {
            let context = load(&dictionary, RenderConfig::default())?;
            writeln!(out, "{}", format_template(context.dictionary(), &msg_type, tag)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn fixture() -> Context {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../dictionaries/FIX44-PT.xml");
        load(&path, RenderConfig::default()).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_args() {
        let cli = Cli::try_parse_from([
            "fixscope",
            "render",
            "--dictionary",
            "FIX44.xml",
            "--validate-checksum",
        ])
        .unwrap();
        assert!(matches!(
            cli.cmd,
            Commands::Render { validate_checksum: true, input: None, .. }
        ));
    }

    #[test]
    fn test_render_lines_skips_blank() {
        let context = fixture();
        let input = "8=FIX.4.4|9=5|35=0|10=163|\n\n   \n35=D|\n";
        let mut out = Vec::new();
        let rendered = render_lines(&context, input.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(rendered, 2);
        assert!(text.contains("ORIG:\n8=FIX.4.4|9=5|35=0|10=163|"));
        assert!(text.contains("Error: invalid begin string"));
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("55=BTC-USD"), Ok((55, "BTC-USD".to_string())));
        assert_eq!(parse_field("58=a=b"), Ok((58, "a=b".to_string())));
        assert!(parse_field("55").is_err());
        assert!(parse_field("0=x").is_err());
        assert!(parse_field("abc=x").is_err());
    }

    #[test]
    fn test_stamp_renders_back() {
        let context = fixture();
        let cli = Cli::try_parse_from([
            "fixscope", "stamp", "--dictionary", "FIX44.xml", "--msg-type", "D",
            "--field", "55=BTC-USD", "--field", "54=1",
        ])
        .unwrap();
        let Commands::Stamp { msg_type, fields, .. } = cli.cmd else {
            panic!("expected stamp command");
        };

        let line = stamp(&context, &msg_type, &fields);
        assert!(line.starts_with("8=FIX.4.4|"));
        assert!(line.contains("|35=D|11="));
        assert!(line.contains("|55=BTC-USD|54=1|10="));

        let report = context.renderer().render_line(&line);
        assert!(report.contains("Symbol: BTC-USD"));
        assert!(!report.contains("ERROR"));
    }

    #[test]
    fn test_write_tokens() {
        let mut out = Vec::new();
        write_tokens(&TokenGenerator::with_seed(1), 3, &mut out).unwrap();
        let tokens: Vec<u64> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| l.parse().unwrap())
            .collect();
        assert_eq!(tokens.len(), 3);
        assert!(tokens.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_format_template() {
        let context = fixture();
        let text = format_template(context.dictionary(), "D", 627).unwrap();
        assert_eq!(text, "628=HopCompID\n629=HopSendingTime\n630=HopRefID");
        assert!(format_template(context.dictionary(), "D", 11).is_err());
    }
}
