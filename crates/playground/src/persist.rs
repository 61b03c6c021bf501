//! Source persistence across restarts.
//!
//! All pane sources travel as one JSON-encoded list under a single fixed
//! key. Store failures degrade to a logged warning; they never interrupt the
//! frame that triggered the flush.

use tracing::warn;

use crate::collaborators::PersistentStore;

/// Fixed store key holding the encoded list of pane sources.
pub const STORE_KEY: &str = "pane-sources";

/// Seed shader for panes that have never been edited. Kept valid under the
/// wrapper template so a fresh playground renders immediately.
pub const DEFAULT_SOURCE: &str = "\
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = (2.0 * fragCoord - iResolution.xy) / iResolution.y;
    float dist = length(uv) - 0.5;
    float angle = atan(uv.y, uv.x);
    vec3 ring = 0.5 + 0.5 * cos(iTime + angle + vec3(0.0, 2.0, 4.0));
    float glow = smoothstep(0.25, 0.0, abs(dist));
    float pressed = iMouse.z * smoothstep(80.0, 0.0, length(fragCoord - iMouse.xy));
    fragColor = vec4(ring * glow + pressed, 1.0);
}
";

/// Decodes the stored source list, truncating to `pane_count` and padding
/// with [`DEFAULT_SOURCE`] so every pane starts with renderable text. An
/// absent or unparsable blob seeds every pane with the default.
pub fn seed_sources<S: PersistentStore>(store: &S, pane_count: usize) -> Vec<String> {
    let mut sources = match store.get(STORE_KEY) {
        Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(sources) => sources,
            Err(err) => {
                warn!(%err, "stored pane sources are unparsable; reseeding defaults");
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    sources.truncate(pane_count);
    while sources.len() < pane_count {
        sources.push(DEFAULT_SOURCE.to_string());
    }
    sources
}

/// Writes every pane's current source as one encoded blob.
pub fn flush_sources<S: PersistentStore>(store: &mut S, sources: &[String]) {
    match serde_json::to_string(sources) {
        Ok(raw) => store.set(STORE_KEY, &raw),
        Err(err) => warn!(%err, "failed to encode pane sources; skipping flush"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::MemoryStore;

    #[test]
    fn round_trip_reproduces_sources_verbatim() {
        let mut store = MemoryStore::default();
        let sources: Vec<String> = (0..3).map(|i| format!("// pane {i}\n")).collect();
        flush_sources(&mut store, &sources);
        assert_eq!(seed_sources(&store, 3), sources);
    }

    #[test]
    fn empty_store_seeds_every_pane_with_the_default() {
        let store = MemoryStore::default();
        let sources = seed_sources(&store, 4);
        assert_eq!(sources.len(), 4);
        assert!(sources.iter().all(|source| source == DEFAULT_SOURCE));
    }

    #[test]
    fn short_blob_is_padded_and_long_blob_truncated() {
        let mut store = MemoryStore::default();
        flush_sources(&mut store, &["// only one".to_string()]);
        let padded = seed_sources(&store, 3);
        assert_eq!(padded[0], "// only one");
        assert_eq!(padded[1], DEFAULT_SOURCE);
        assert_eq!(padded[2], DEFAULT_SOURCE);

        let many: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        flush_sources(&mut store, &many);
        assert_eq!(seed_sources(&store, 2), vec!["0".to_string(), "1".to_string()]);
    }

    #[test]
    fn unparsable_blob_degrades_to_defaults() {
        let mut store = MemoryStore::default();
        store.set(STORE_KEY, "{not json");
        let sources = seed_sources(&store, 2);
        assert!(sources.iter().all(|source| source == DEFAULT_SOURCE));
    }
}
