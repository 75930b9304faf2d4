//! Stage the browser bindings embedded by the preview page
//!
//! `backdrop serve` writes the `backdrop-web` build next to `index.html`.
//! Build it first with `wasm-pack build backdrop-web --target web`; without
//! it the page gets a module whose `mount` reports the missing build.

use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

const PKG_DIR: &str = "backdrop-web/pkg";
const WEB_JS: &str = "backdrop_web.js";
const WEB_WASM: &str = "backdrop_web_bg.wasm";

const MISSING_JS: &str = r#"const MISSING = "backdrop-web is not built: run `wasm-pack build backdrop-web --target web` and rebuild backdrop";

export default async function init() {
  console.warn(MISSING);
}

export function mount() {
  throw new Error(MISSING);
}
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let pkg = Path::new(PKG_DIR);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    for file in [WEB_JS, WEB_WASM] {
        println!("cargo:rerun-if-changed={PKG_DIR}/{file}");
    }

    let js = pkg.join(WEB_JS);
    let wasm = pkg.join(WEB_WASM);
    if js.is_file() && wasm.is_file() {
        fs::copy(js, out_dir.join(WEB_JS))?;
        fs::copy(wasm, out_dir.join(WEB_WASM))?;
    } else {
        println!("cargo:warning={PKG_DIR} is missing; the preview page cannot mount backgrounds");
        fs::write(out_dir.join(WEB_JS), MISSING_JS)?;
        fs::write(out_dir.join(WEB_WASM), b"")?;
    }

    Ok(())
}
