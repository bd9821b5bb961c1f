use clap::Parser;
use log::{debug, error};
use rayon::prelude::*;
use replyquote_lib::{quote_html_with, quote_plain, reply_subject, WrapperSpec, DEFAULT_WRAPPER_ID};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "replyquote")]
#[command(about = "Quote a received email below new reply content")]
struct Args {
    /// Received message file(s).
    #[arg(required = true)]
    received: Vec<PathBuf>,

    /// New content placed above the quoted message.
    #[arg(short, long, conflicts_with = "added_file")]
    added: Option<String>,

    /// Read the new content from a file.
    #[arg(long)]
    added_file: Option<PathBuf>,

    /// Id of the element the quoted message is wrapped in.
    #[arg(long, default_value = DEFAULT_WRAPPER_ID)]
    id: String,

    /// Treat input as plain text and quote it with "> " prefixes.
    #[arg(long)]
    plain: bool,

    /// Print a "Subject:" line for the reply first.
    #[arg(long)]
    subject: Option<String>,

    /// Write <name>.reply.<ext> files into this directory instead of stdout.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // parse the args given in terminal
    let args: Args = Args::parse();
    init_logging(args.verbose);

    let added = match (&args.added_file, &args.added) {
        (Some(path), _) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        (None, Some(text)) => text.clone(),
        (None, None) => String::new(),
    };

    if let Some(subject) = &args.subject {
        println!("Subject: {}\n", reply_subject(subject));
    }

    let wrapper = WrapperSpec::new(args.id.as_str());
    let results: Vec<(&PathBuf, CliResult<String>)> = args
        .received
        .par_iter()
        .map(|path| (path, render(path, &added, &wrapper, args.plain)))
        .collect();

    let mut failed = false;
    for (path, result) in results {
        let written = result.and_then(|reply| emit(path, &reply, &args));
        if let Err(e) = written {
            error!("{}: {}", path.display(), e);
            eprintln!("Error quoting {}: {}", path.display(), e);
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn render(path: &Path, added: &str, wrapper: &WrapperSpec, plain: bool) -> CliResult<String> {
    let received = fs::read_to_string(path)?;
    debug!("quoting {} ({} bytes)", path.display(), received.len());
    if plain {
        return Ok(quote_plain(&received, added));
    }
    Ok(quote_html_with(&received, added, wrapper)?)
}

fn emit(path: &Path, reply: &str, args: &Args) -> CliResult<()> {
    let Some(out_dir) = &args.out_dir else {
        println!("{}", reply);
        return Ok(());
    };
    let target = out_dir.join(reply_file_name(path, args.plain));
    fs::write(&target, reply)?;
    debug!("wrote {}", target.display());
    Ok(())
}

fn reply_file_name(path: &Path, plain: bool) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "message".to_string());
    let extension = if plain { "txt" } else { "html" };
    format!("{}.reply.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_file_name() {
        assert_eq!(
            reply_file_name(Path::new("in/welcome.eml.html"), false),
            "welcome.eml.reply.html"
        );
        assert_eq!(reply_file_name(Path::new("note.txt"), true), "note.reply.txt");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["replyquote", "a.html", "b.html", "--id", "prev", "-a", "hi"]);
        assert_eq!(args.received.len(), 2);
        assert_eq!(args.id, "prev");
        assert_eq!(args.added.as_deref(), Some("hi"));
        assert!(!args.plain);

        let args = Args::parse_from(["replyquote", "a.html"]);
        assert_eq!(args.id, DEFAULT_WRAPPER_ID);
    }

    #[test]
    fn test_added_conflicts_with_added_file() {
        let result =
            Args::try_parse_from(["replyquote", "a.html", "-a", "hi", "--added-file", "x.html"]);
        assert!(result.is_err());
    }
}
