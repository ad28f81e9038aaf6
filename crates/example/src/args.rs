//! Command-line arguments for `quill-preview`.

use std::path::PathBuf;
use thiserror::Error;

/// Usage text printed on argument errors.
pub const USAGE: &str = "\
Usage: quill-preview [OPTIONS] <code>...

Options:
  --variables <file>      JSON array of workspace variables to serve
  --payload <json>        JSON object of caller-supplied values (override resolved ones)
  --format <code>=<fmt>   Select an output format for a code (repeatable)
  --template <id>         Template identifier passed to injectors";

/// Argument parsing failures.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// An option was given without its value.
    #[error("missing value for {0}")]
    MissingValue(String),

    /// A `--format` value is not `code=format`.
    #[error("invalid format selection '{0}', expected <code>=<format>")]
    InvalidFormat(String),

    /// The `--payload` value is not valid JSON.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// The `--payload` value is JSON but not an object.
    #[error("payload must be a JSON object")]
    PayloadNotObject,

    /// An option is not recognized.
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    /// No code was given.
    #[error("no codes to resolve")]
    NoCodes,
}

/// Parsed `quill-preview` arguments.
#[derive(Debug, Default, PartialEq)]
pub struct PreviewArgs {
    /// Codes to resolve.
    pub codes: Vec<String>,
    /// Workspace variables file.
    pub variables: Option<PathBuf>,
    /// Caller-supplied values.
    pub payload: serde_json::Map<String, serde_json::Value>,
    /// Format selections, in command-line order.
    pub formats: Vec<(String, String)>,
    /// Template identifier.
    pub template: Option<String>,
}

impl PreviewArgs {
    /// Parses arguments, excluding the program name.
    ///
    /// # Errors
    ///
    /// Returns [`ArgsError`] on malformed options or when no code is given.
    pub fn parse<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value_for = |option: &str| {
                args.next()
                    .ok_or_else(|| ArgsError::MissingValue(option.to_string()))
            };
            match arg.as_str() {
                "--variables" => parsed.variables = Some(PathBuf::from(value_for("--variables")?)),
                "--template" => parsed.template = Some(value_for("--template")?),
                "--payload" => {
                    let raw = value_for("--payload")?;
                    match serde_json::from_str(&raw)? {
                        serde_json::Value::Object(map) => parsed.payload = map,
                        _ => return Err(ArgsError::PayloadNotObject),
                    }
                }
                "--format" => {
                    let raw = value_for("--format")?;
                    let Some((code, format)) = raw.split_once('=') else {
                        return Err(ArgsError::InvalidFormat(raw));
                    };
                    parsed.formats.push((code.to_string(), format.to_string()));
                }
                option if option.starts_with("--") => {
                    return Err(ArgsError::UnknownOption(option.to_string()));
                }
                code => parsed.codes.push(code.to_string()),
            }
        }

        if parsed.codes.is_empty() {
            return Err(ArgsError::NoCodes);
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<PreviewArgs, ArgsError> {
        PreviewArgs::parse(args.iter().map(|a| (*a).to_string()))
    }

    #[test]
    fn parses_codes_and_options() {
        let args = parse(&[
            "current_date",
            "--format",
            "current_date=YYYY-MM-DD",
            "--payload",
            r#"{"note": "hi"}"#,
            "--template",
            "quote",
            "company_name",
        ])
        .unwrap();

        assert_eq!(args.codes, vec!["current_date", "company_name"]);
        assert_eq!(
            args.formats,
            vec![("current_date".to_string(), "YYYY-MM-DD".to_string())]
        );
        assert_eq!(args.payload["note"], "hi");
        assert_eq!(args.template.as_deref(), Some("quote"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse(&[]), Err(ArgsError::NoCodes)));
        assert!(matches!(
            parse(&["a", "--format", "no-equals"]),
            Err(ArgsError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse(&["a", "--payload", "[1]"]),
            Err(ArgsError::PayloadNotObject)
        ));
        assert!(matches!(
            parse(&["a", "--variables"]),
            Err(ArgsError::MissingValue(_))
        ));
        assert!(matches!(parse(&["a", "--verbose"]), Err(ArgsError::UnknownOption(_))));
    }
}
