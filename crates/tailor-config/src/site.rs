//! This site's build configuration.

use crate::builder::{Dirs, SiteConfigBuilder};
use crate::filter::OrderFilter;
use crate::plugin::SyntaxHighlight;
use crate::shortcode::VersionShortcode;
use crate::transform::{BuildMode, HtmlMinify};

pub const INPUT_DIR: &str = "src";
pub const OUTPUT_DIR: &str = "_site";

/// Register the site's filters, plugins, watch targets, passthrough copies,
/// shortcodes and transforms, and return its directories.
pub fn configure(site: &mut SiteConfigBuilder, mode: BuildMode) -> Dirs {
    site.add_filter("order", OrderFilter);

    site.add_plugin(&SyntaxHighlight::default());

    site.use_gitignore(false);

    site.add_watch_target("./_tmp/style.css")
        .add_watch_target("./js/main.js");

    site.add_passthrough_copy([("./node_modules/alpinejs/dist/cdn.js", "./js/alpine.js")]);

    site.data_deep_merge(true);

    site.add_passthrough_copy([
        ("./_tmp/style.css", "./style.css"),
        ("./images", "./images"),
        ("./assets", "./assets"),
        ("./js/main.js", "./js/main.js"),
    ]);

    site.add_shortcode("version", VersionShortcode::new());

    site.add_transform("htmlmin", HtmlMinify::new(mode));

    Dirs::new(INPUT_DIR, OUTPUT_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SiteConfig;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    #[test]
    fn always_returns_src_and_site_dirs() {
        for mode in [BuildMode::Development, BuildMode::Production] {
            let mut builder = SiteConfigBuilder::new();
            let dirs = configure(&mut builder, mode);

            assert_eq!(dirs, Dirs::new("src", "_site"));
        }
    }

    #[test]
    fn registers_site_extensions() {
        let config = SiteConfig::load(BuildMode::Development);

        assert!(config.filter("order").is_some());
        assert!(config.filter("highlight").is_some());
        assert!(config.shortcode("version").is_some());
        assert_eq!(
            config.transforms().map(|(n, _)| n).collect::<Vec<_>>(),
            vec!["htmlmin"]
        );
        assert_eq!(config.dirs(), &Dirs::new("src", "_site"));
        assert!(!config.use_gitignore());
        assert!(config.data_deep_merge());
    }

    #[test]
    fn declares_watch_targets() {
        let config = SiteConfig::load(BuildMode::Development);

        assert_eq!(
            config.watch_targets(),
            &[PathBuf::from("_tmp/style.css"), PathBuf::from("js/main.js")]
        );
    }

    #[test]
    fn declares_passthrough_copies() {
        let config = SiteConfig::load(BuildMode::Development);

        let pairs: Vec<(&Path, &Path)> = config
            .passthrough_copies()
            .iter()
            .map(|c| (c.source(), c.dest()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                (
                    Path::new("node_modules/alpinejs/dist/cdn.js"),
                    Path::new("js/alpine.js")
                ),
                (Path::new("_tmp/style.css"), Path::new("style.css")),
                (Path::new("images"), Path::new("images")),
                (Path::new("assets"), Path::new("assets")),
                (Path::new("js/main.js"), Path::new("js/main.js")),
            ]
        );
    }

    #[test]
    fn minifies_only_in_production() {
        let page = "<!DOCTYPE html><!-- note --><p>  hi  </p>";
        let path = Path::new("_site/index.html");

        let dev = SiteConfig::load(BuildMode::Development);
        let (_, htmlmin) = dev.transforms().next().unwrap();
        assert_eq!(htmlmin.apply(page, Some(path)).unwrap(), page);

        let prod = SiteConfig::load(BuildMode::Production);
        let (_, htmlmin) = prod.transforms().next().unwrap();
        assert!(!htmlmin.apply(page, Some(path)).unwrap().contains("<!--"));
    }
}
