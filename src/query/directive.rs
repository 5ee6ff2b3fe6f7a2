//! Inline `INFILE=`/`OUTFILE=` directives at the start of query text.
//!
//! ```text
//! [INFILE="<path>"[,<charset>]] [OUTFILE="<path>"] <query>
//! ```
//!
//! Text that does not match the grammar exactly is left alone and treated as
//! a plain query.
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

/// File redirection requested by a query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Directive {
    /// File whose contents replace the query text.
    pub input_file: Option<String>,
    /// Charset of the input file, UTF-8 when absent.
    pub input_charset: Option<String>,
    /// File the results are written to.
    pub output_file: Option<String>,
}

impl Directive {
    /// True when neither input nor output is redirected.
    pub fn is_empty(&self) -> bool {
        self.input_file.is_none() && self.output_file.is_none()
    }
}

const INFILE: &str = "INFILE=";
const OUTFILE: &str = "OUTFILE=";

fn directive_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(?:INFILE="(?P<in>[^"]+)"(?:,(?P<cs>\w[\w.:-]*))?)?\s*(?:OUTFILE="(?P<out>[^"]+)")?"#,
        )
        .expect("directive pattern is valid")
    })
}

/// Splits a leading directive off `text`.
///
/// Returns an empty [`Directive`] and `text` unchanged when no well-formed
/// directive is present. On a match the remainder has the directive and the
/// whitespace following it removed.
pub fn parse_directive(text: &str) -> (Directive, &str) {
    let Some(caps) = directive_pattern().captures(text) else {
        return (Directive::default(), text);
    };
    let directive = Directive {
        input_file: caps.name("in").map(|m| m.as_str().to_string()),
        input_charset: caps.name("cs").map(|m| m.as_str().to_string()),
        output_file: caps.name("out").map(|m| m.as_str().to_string()),
    };
    if directive.is_empty() {
        return (Directive::default(), text);
    }
    let end = caps.get(0).map_or(0, |m| m.end());
    let rest = text[end..].trim_start();
    // a second marker means one of the directives was cut short
    if rest.starts_with(INFILE) || rest.starts_with(OUTFILE) {
        debug!(text, "ignoring malformed directive");
        return (Directive::default(), text);
    }
    debug!(?directive, "query directive detected");
    (directive, rest)
}
