use dbm_filters::connections::connection_grid;
use dbm_filters::coverage::{select_count, CoverageConfig, CoverageReport};
use dbm_filters::model::{ImageProjector, ImageStack, WeightProvider};
use dbm_filters::product::composite_filters;
use dbm_filters::sort::sort_by_column_norm;
use dbm_filters::{Matrix, Result};
use log::info;

use crate::patch_viewer::PatchViewer;

/// Where finished grids go: the terminal, or png files sharing a prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Display,
    Files(String),
}

impl Output {
    pub fn from_prefix(prefix: Option<String>) -> Self {
        prefix.map_or(Self::Display, Self::Files)
    }

    fn emit(&self, viewer: &PatchViewer, suffix: &str, title: &str) -> Result<()> {
        match self {
            Self::Display => viewer.show(title),
            Self::Files(prefix) => viewer.save(format!("{prefix}{suffix}.png")),
        }
    }
}

/// Runs the whole report: the weight product first, then the connection grid.
pub fn run<M: WeightProvider + ImageProjector>(
    model: &M,
    output: &Output,
    config: &CoverageConfig,
) -> Result<()> {
    let (w1, w2) = model.weights()?;

    println!("W1 shape: {:?}", w1.shape());
    println!("W2 shape: {:?}", w2.shape());

    let product = product_viewer(model, &w1, &w2)?;
    output.emit(&product, "_prod", "Layer 1 x layer 2 weights")?;

    let imgs = model.weights_view(&w1.transpose())?;
    let (connections, report) = connections_viewer(&imgs, &w2, config)?;

    print_report(&report, w1.cols(), config);

    output.emit(&connections, "", "Top layer 1 filters per layer 2 unit")
}

pub fn product_viewer<P: ImageProjector>(
    projector: &P,
    w1: &Matrix,
    w2: &Matrix,
) -> Result<PatchViewer> {
    let filters = composite_filters(w1, w2)?;
    info!("Composite filters: {:?}", filters.shape());

    PatchViewer::from_images(&projector.weights_view(&filters)?)
}

/// Grid with one row per second layer unit, strongest units first, and one
/// cell per strongly connected first layer filter.
pub fn connections_viewer(
    imgs: &ImageStack,
    w2: &Matrix,
    config: &CoverageConfig,
) -> Result<(PatchViewer, CoverageReport)> {
    let sorted = sort_by_column_norm(w2);

    let n1 = sorted.rows();
    let rows = sorted.cols().min(config.max_rows);

    let report = select_count(&sorted, n1, config);
    let grid = connection_grid(&sorted, rows, report.count);

    let (img_rows, img_cols, _) = imgs.image_shape();
    let mut viewer = PatchViewer::new((rows, report.count), (img_rows, img_cols), imgs.is_color());

    for connection in grid.iter().flatten() {
        viewer.add_patch(imgs.image(connection.unit), true, Some(connection.activation))?;
    }

    Ok((viewer, report))
}

fn print_report(report: &CoverageReport, n1: usize, config: &CoverageConfig) {
    println!("average needed filters {:.2}", report.average_needed);
    println!(
        "It takes {} of {} elements to account for {:.0}% of the weight in at least one filter",
        report.max_needed,
        n1,
        config.threshold * 100.0
    );

    if report.truncated {
        println!("Only displaying {} elements though.", report.count);
    }
}
