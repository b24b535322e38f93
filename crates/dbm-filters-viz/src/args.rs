use std::io::Write;

use argparse::{ArgumentParser, List, Store};
use dbm_filters::coverage::CoverageConfig;
use dbm_filters::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub model_path: String,
    pub out_prefix: Option<String>,
    pub coverage: CoverageConfig,
}

/// Parses `args` (program name first). Returns `Ok(None)` when help was
/// requested and printed.
pub fn parse(
    args: Vec<String>,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<Option<Options>> {
    let mut positional: Vec<String> = Vec::new();
    let mut coverage = CoverageConfig::default();

    {
        let mut ap = ArgumentParser::new();
        ap.set_description(
            "Show the matrix product of the first two DBM weight layers and a grid of \
             the strongest first layer filters feeding each second layer unit.",
        );
        ap.refer(&mut coverage.threshold).add_option(
            &["--threshold"],
            Store,
            "fraction of each unit's weight mass the shown filters must cover",
        );
        ap.refer(&mut coverage.limit).add_option(
            &["--limit"],
            Store,
            "maximum number of filters shown per row",
        );
        ap.refer(&mut coverage.max_rows).add_option(
            &["--max-rows"],
            Store,
            "maximum number of second layer units shown",
        );
        ap.refer(&mut positional).add_argument(
            "model [output_prefix]",
            List,
            "saved model, and an optional prefix for writing png files instead of displaying",
        );

        match ap.parse(args, stdout, stderr) {
            Ok(()) => {}
            Err(0) => return Ok(None),
            Err(_) => return Err(Error::Usage("invalid arguments".into())),
        }
    }

    if !(coverage.threshold > 0.0 && coverage.threshold <= 1.0) {
        return Err(Error::Usage(format!(
            "--threshold must be in (0, 1], got {}",
            coverage.threshold
        )));
    }

    if coverage.limit == 0 || coverage.max_rows == 0 {
        return Err(Error::Usage("--limit and --max-rows must be positive".into()));
    }

    let mut positional = positional.into_iter();
    match (positional.next(), positional.next(), positional.len()) {
        (Some(model_path), out_prefix, 0) => Ok(Some(Options {
            model_path,
            out_prefix,
            coverage,
        })),
        (first, second, rest) => Err(Error::Usage(format!(
            "expected 1 or 2 arguments, got {}",
            usize::from(first.is_some()) + usize::from(second.is_some()) + rest
        ))),
    }
}
