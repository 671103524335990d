use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use miette::IntoDiagnostic;
use rpn_calc::Lexer;
use rpn_calc::Timings;
use rpn_calc::lex::MalformedLiteral;
use rpn_calc::lex::SingleTokenError;
use tracing::debug;

/// Evaluates an arithmetic expression such as "2+3*4" or "max(sin(pi/2), 0.5)".
#[derive(Parser, Debug)]
#[command(version, about, args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Expression to evaluate
    #[arg(allow_hyphen_values = true)]
    expression: Option<String>,

    /// Number of fractional digits printed
    #[arg(short, long, default_value_t = 6)]
    precision: usize,

    /// Print how long each stage took to stderr
    #[arg(long)]
    timings: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the token stream
    Tokenize {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Print the postfix form
    Rpn {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
}

/// Lexical problems exit with 65 like the tokenizer dump does; anything else
/// is handed back to miette.
fn report(e: miette::Error) -> miette::Result<()> {
    if let Some(single_token_error) = e.downcast_ref::<SingleTokenError>() {
        eprintln!(
            "[offset {}] Error: Unexpected character: {}",
            single_token_error.offset(),
            single_token_error.token
        );
        eprintln!("{e:?}");
        std::process::exit(65);
    } else if let Some(malformed) = e.downcast_ref::<MalformedLiteral>() {
        eprintln!(
            "[offset {}] Error: Malformed number: {}",
            malformed.offset(),
            malformed.literal
        );
        eprintln!("{e:?}");
        std::process::exit(65);
    }
    Err(e)
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the level, WARN by default
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match (args.command, args.expression) {
        (Some(Commands::Tokenize { expression }), _) => {
            for token in Lexer::new(&expression) {
                match token {
                    Ok(token) => println!("{token}"),
                    Err(e) => return report(e),
                }
            }
            println!("EOF  null");
        }
        (Some(Commands::Rpn { expression }), _) => {
            match rpn_calc::Parser::new(&expression).parse() {
                Ok(rpn) => println!("{rpn}"),
                Err(e) => return report(e),
            }
        }
        (None, Some(expression)) => {
            let mut timings = Timings::default();
            debug!(%expression, "evaluating");
            let value = match rpn_calc::eval_with(&expression, &mut timings) {
                Ok(value) => value,
                Err(e) => return report(e),
            };
            if args.timings {
                for (stage, elapsed) in timings.iter() {
                    eprintln!("{stage}: {elapsed:?}");
                }
                eprintln!("total: {:?}", timings.total());
            }
            println!("{value:.prec$}", prec = args.precision);
        }
        (None, None) => {
            Args::command().print_help().into_diagnostic()?;
            println!();
        }
    }
    Ok(())
}
