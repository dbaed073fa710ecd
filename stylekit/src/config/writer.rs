//! INI serialization: `ConfigFile` → commented INI string.

use super::settings::ConfigFile;
use std::path::Path;

/// Convert a `ConfigFile` to a commented INI string.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let url = config.style.url.as_deref().unwrap_or("");

    format!(
        r#"[style]
; Style document to load: http(s) URL, file:// URL or filesystem path
url = {}

[cache]
; Keep fetched styles, TileJSON documents and sprites on disk
enabled = {}
; Cache root. Entries are named after their percent-escaped URL
directory = {}

[fetch]
; HTTP timeout per resource, in seconds
timeout = {}

[pipeline]
; true: raster tiles with a vector overlay. false: legacy paging layer
hybrid = {}
; In hybrid mode, pre-render background and fill layers into the raster
background_to_raster = {}

[render]
; Draw priority of the first style layer and the step between layers
base_draw_priority = {}
draw_priority_per_level = {}
; Size multipliers
line_scale = {}
text_scale = {}
marker_scale = {}

[logging]
file = {}
"#,
        url,
        config.cache.enabled,
        path_to_string(&config.cache.directory),
        config.fetch.timeout,
        config.pipeline.hybrid,
        config.pipeline.background_to_raster,
        config.render.base_draw_priority,
        config.render.draw_priority_per_level,
        config.render.line_scale,
        config.render.text_scale,
        config.render.marker_scale,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
