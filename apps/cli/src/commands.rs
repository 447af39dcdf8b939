use log::info;
use sg::SiteBuilder;
use std::path::Path;

/// Templates come from `./templates` and the feed goes to `./atom.xml`,
/// both relative to the working directory.
pub fn build_site(input_dir: &Path, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Building {} into {}",
        input_dir.display(),
        output_dir.display()
    );

    let summary = SiteBuilder::default()
        .input_dir(input_dir)
        .output_dir(output_dir)
        .build()?;

    info!(
        "{} pages, {} articles, {} copied files; feed at {}",
        summary.pages,
        summary.articles,
        summary.copied,
        summary.feed_path.display()
    );

    Ok(())
}
