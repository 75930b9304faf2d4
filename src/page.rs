use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;
use tracing::warn;

use backdrop::{BackgroundKind, Tuning};

/// Browser bindings from the `backdrop-web` build, staged by `build.rs`
mod web_files {
    /// JavaScript glue for the wasm module
    pub const WEB_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/backdrop_web.js"));

    /// Compiled wasm module; empty when `backdrop-web` was not built
    pub const WEB_WASM: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/backdrop_web_bg.wasm"));
}

/// A page section hosting one background
#[derive(Debug, Clone)]
pub struct SectionView {
    pub id: &'static str,
    pub kind: &'static str,
    pub heading: &'static str,
    pub lead: &'static str,
}

impl SectionView {
    fn for_kind(kind: BackgroundKind) -> Self {
        let (heading, lead) = match kind {
            BackgroundKind::Particles => (
                "Interactive particles",
                "Move the pointer through the field to push particles aside.",
            ),
            BackgroundKind::Orbits => ("Technologies", "Orbit hubs drift and dodge the pointer."),
            BackgroundKind::Rings => ("Contact", "Every pointer move sends out a ring."),
        };
        Self {
            id: kind.section(),
            kind: kind.name(),
            heading,
            lead,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct PreviewTemplate<'a> {
    title: &'a str,
    sections: &'a [SectionView],
    /// Tuning handed to every mounted background
    tuning_json: &'a str,
}

/// Write the preview page to `output_dir/index.html`
///
/// The browser bindings it imports go to `output_dir/pkg/`.
pub fn render(tuning: &Tuning, output_dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let sections: Vec<SectionView> = [
        BackgroundKind::Particles,
        BackgroundKind::Orbits,
        BackgroundKind::Rings,
    ]
    .into_iter()
    .map(SectionView::for_kind)
    .collect();
    let tuning_json = tuning.to_json()?;

    let template = PreviewTemplate {
        title: "backdrop preview",
        sections: &sections,
        tuning_json: &tuning_json,
    };

    let html = template.render()?;
    let output_path = output_dir.join("index.html");
    fs::write(&output_path, html)?;

    let pkg_dir = output_dir.join("pkg");
    fs::create_dir_all(&pkg_dir)?;
    fs::write(pkg_dir.join("backdrop_web.js"), web_files::WEB_JS)?;
    fs::write(pkg_dir.join("backdrop_web_bg.wasm"), web_files::WEB_WASM)?;
    if web_files::WEB_WASM.is_empty() {
        warn!("backdrop-web is not built; run `wasm-pack build backdrop-web --target web`");
    }

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn renders_all_sections() {
        let dir = tempdir().expect("temp dir");
        let path = render(&Tuning::default(), dir.path()).expect("Render failed");

        let html = fs::read_to_string(path).expect("Failed to read output");
        assert!(html.contains(r#"id="hero""#));
        assert!(html.contains(r#"id="technologies""#));
        assert!(html.contains(r#"id="contact""#));
        assert!(html.contains(r#"data-backdrop="particles""#));
        assert!(html.contains(r#"data-backdrop="orbits""#));
        assert!(html.contains(r#"data-backdrop="rings""#));
    }

    #[test]
    fn embeds_tuning_unescaped() {
        let mut tuning = Tuning::default();
        tuning.particles.desktop.particle_count = 321;

        let dir = tempdir().expect("temp dir");
        let path = render(&tuning, dir.path()).expect("Render failed");

        let html = fs::read_to_string(path).expect("Failed to read output");
        assert!(html.contains(r#""particle_count":321"#));
    }

    #[test]
    fn ships_browser_bindings_next_to_page() {
        let dir = tempdir().expect("temp dir");
        let path = render(&Tuning::default(), dir.path()).expect("Render failed");

        let html = fs::read_to_string(path).expect("Failed to read output");
        assert!(html.contains("./pkg/backdrop_web.js"));

        let js_path = dir.path().join("pkg").join("backdrop_web.js");
        let wasm_path = dir.path().join("pkg").join("backdrop_web_bg.wasm");
        assert!(js_path.is_file());
        assert!(wasm_path.is_file());

        let js = fs::read_to_string(js_path).expect("Failed to read bindings");
        assert!(js.contains("export function mount"));
    }
}
