use folio::{ExportConfig, ExportError, ExportRequest, ExporterBuilder, PaperSize, StyledNode};
use std::env;
use std::fs;
use std::path::Path;

/// Exports a rendered document tree (JSON) to a PDF.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ExportError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if !(3..=5).contains(&args.len()) {
        eprintln!("Export a rendered document tree to a paginated PDF.");
        eprintln!();
        eprintln!(
            "Usage: {} <path/to/document.json> <path/to/output.pdf> [short|a4|legal] [path/to/config.json]",
            args[0]
        );
        std::process::exit(1);
    }

    let document_path = Path::new(&args[1]);
    let output_path = &args[2];
    let config = match args.get(4) {
        Some(path) => ExportConfig::from_file(path)?,
        None => ExportConfig::default(),
    };
    let paper_size = match args.get(3) {
        Some(name) => name.parse::<PaperSize>()?,
        None => config.paper_size,
    };

    println!("Loading document from {}", document_path.display());
    let node: StyledNode = serde_json::from_str(&fs::read_to_string(document_path)?)?;
    let resource_dir = document_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut exporter = ExporterBuilder::new()
        .with_config(config)
        .with_resource_dir(resource_dir)
        .build()?;

    println!("Exporting to {} on {} paper...", output_path, paper_size);
    let summary = exporter
        .export(ExportRequest::new(node, output_path.as_str()).with_paper_size(paper_size))
        .await?;

    for warning in &summary.warnings {
        eprintln!("warning: {}", warning);
    }
    println!("Successfully wrote {} page(s) to {}", summary.page_count, output_path);
    Ok(())
}
