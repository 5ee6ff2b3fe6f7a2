//! Turns a typed command into the query text handed to the engine.
use tracing::{debug, error, warn};

use super::directive::parse_directive;
use super::engine::RepositoryConnection;
use super::files::{FileResolver, OutputTarget};
use super::QueryLanguage;
use crate::console::ConsoleIo;
use crate::error::{ConsoleError, Result};
use crate::model::Namespace;
use crate::settings::Settings;

/// Query text ready for parsing plus its output destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledQuery {
    /// Final query text; never empty and free of directives.
    pub text: String,
    /// Output file, `None` for console output.
    pub output: Option<OutputTarget>,
}

/// Builds query text from the command line, directive files, and repository namespaces.
pub struct QueryTextAssembler<'a> {
    settings: &'a Settings,
    files: FileResolver,
}

impl<'a> QueryTextAssembler<'a> {
    /// Assembler reading paths and toggles from `settings`.
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            files: FileResolver::new(settings.work_dir()),
        }
    }

    /// Runs every assembly step for one query.
    pub fn assemble<C>(
        &self,
        language: QueryLanguage,
        raw: &str,
        connection: Option<&C>,
        io: &mut dyn ConsoleIo,
    ) -> Result<AssembledQuery>
    where
        C: RepositoryConnection + ?Sized,
    {
        let text = self.read_query(language, raw, io)?;
        let mut query = self.apply_directive(&text, io)?;
        query.text = self.add_repository_prefixes(language, query.text, connection, io);
        Ok(query)
    }

    /// Returns the trimmed command text, prompting for a multi-line query when blank.
    pub fn read_query(
        &self,
        language: QueryLanguage,
        raw: &str,
        io: &mut dyn ConsoleIo,
    ) -> Result<String> {
        let text = raw.trim();
        if !text.is_empty() {
            return Ok(text.to_string());
        }
        io.writeln(&format!(
            "enter multi-line {} query (terminate with line containing single '.')",
            language.name()
        ))
        .map_err(|e| ConsoleError::io("<console>", e))?;
        let text = io.read_multiline().map_err(|e| {
            error!(error = %e, "failed to read query");
            ConsoleError::io("<console>", e)
        })?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ConsoleError::EmptyQuery);
        }
        Ok(text.to_string())
    }

    /// Resolves directive files and strips the directive from the text.
    ///
    /// The output file is checked first so a refused overwrite never reads
    /// input. An input file replaces whatever query text followed the directive.
    pub fn apply_directive(&self, text: &str, io: &mut dyn ConsoleIo) -> Result<AssembledQuery> {
        let (directive, rest) = parse_directive(text);
        let output = match directive.output_file.as_deref() {
            Some(name) => Some(self.files.resolve_output(name, io)?),
            None => None,
        };
        let text = match directive.input_file.as_deref() {
            Some(name) => self
                .files
                .resolve_input(name, directive.input_charset.as_deref())?,
            None => rest.to_string(),
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(ConsoleError::EmptyQuery);
        }
        Ok(AssembledQuery {
            text: text.to_string(),
            output,
        })
    }

    /// Declares the repository namespaces in the query when enabled and absent.
    ///
    /// A failing connection is reported as a warning and the query is kept as is.
    pub fn add_repository_prefixes<C>(
        &self,
        language: QueryLanguage,
        text: String,
        connection: Option<&C>,
        io: &mut dyn ConsoleIo,
    ) -> String
    where
        C: RepositoryConnection + ?Sized,
    {
        let Some(connection) = connection else {
            return text;
        };
        if !self.settings.query_prefix() || language.prefixes().has_prefixes(&text) {
            return text;
        }
        match connection.namespaces() {
            Ok(namespaces) => {
                debug!(count = namespaces.len(), "injecting repository namespaces");
                inject_prefixes(language, text, &namespaces)
            }
            Err(err) => {
                warn!(error = %err, "error connecting to repository");
                io.write_warning(&format!("Error connecting to repository: {err}"));
                text
            }
        }
    }
}

/// Adds namespace declarations unless the query already has some.
pub fn inject_prefixes(language: QueryLanguage, text: String, namespaces: &[Namespace]) -> String {
    let handler = language.prefixes();
    if namespaces.is_empty() || handler.has_prefixes(&text) {
        return text;
    }
    handler.add_prefixes(&text, namespaces)
}
