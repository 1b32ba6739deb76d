use minescan_cv::detection::DetectionConfig;
use minescan_cv::template::TemplateSet;
use std::path::PathBuf;

mod batch;

fn main() {
    env_logger::init();

    // Capture root: template images at the top, one folder per difficulty.
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = DetectionConfig::default();
    config.template_dir = root.clone();
    config.output_dir = root.join("results");
    config.emit_json = std::env::var_os("MINESCAN_JSON").is_some();
    config.visualization.render_overlays = std::env::var_os("MINESCAN_OVERLAYS").is_some();

    let templates = match TemplateSet::load(&config.template_dir) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Failed to load templates: {e:#}");
            std::process::exit(1);
        }
    };

    match batch::run(&root, config, templates) {
        Ok(summary) => {
            println!("{summary}");
            if summary.failed > 0 {
                std::process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("Batch run failed: {e:#}");
            std::process::exit(1);
        }
    }
}
