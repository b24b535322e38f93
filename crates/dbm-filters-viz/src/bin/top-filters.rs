//! Displays the matrix product of the layer 1 and layer 2 weights of a saved
//! DBM, then a grid of connections: row i belongs to the layer 2 unit with the
//! i-th largest weight norm, and cell (i, j) shows the filter of the layer 1
//! unit with the j-th largest weight into it. Cell borders are yellow for
//! excitatory and magenta for inhibitory connections, brighter when stronger.
//!
//! Usage: top-filters [options] <model> [<output_prefix>]
//!
//! With an output prefix the two grids are written to `<prefix>_prod.png` and
//! `<prefix>.png` instead of being displayed.

use std::env;
use std::io;
use std::process;

use dbm_filters::model::SavedModel;
use dbm_filters::Error;
use dbm_filters_viz::args;
use dbm_filters_viz::pipeline::{self, Output};
use log::info;

fn main() {
    pretty_env_logger::init();

    let options = match args::parse(env::args().collect(), &mut io::stdout(), &mut io::stderr()) {
        Ok(Some(options)) => options,
        Ok(None) => return,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Usage: top-filters [options] <model> [<output_prefix>]");
            process::exit(2);
        }
    };

    if let Err(e) = run(options) {
        eprintln!("error: {e}");
        process::exit(match e {
            Error::Usage(_) => 2,
            _ => 1,
        });
    }
}

fn run(options: args::Options) -> Result<(), Error> {
    info!("Loading {}", options.model_path);
    let model = SavedModel::load(&options.model_path)?;

    pipeline::run(
        &model,
        &Output::from_prefix(options.out_prefix),
        &options.coverage,
    )
}
