//! Logging for the compiler itself, off unless `TS2PY_LOG` is set.
//!
//! `TS2PY_LOG` holds `EnvFilter` directives, e.g.
//! `TS2PY_LOG="ts2py_parser=trace,ts2py_emitter=debug" ts2py lsp.d.ts`.
//! With `TS2PY_LOG_TREE=1` events are nested under the `compile_source` and
//! `process_file` spans instead of printed as flat lines.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const LOG_VAR: &str = "TS2PY_LOG";
const TREE_VAR: &str = "TS2PY_LOG_TREE";

fn tree_requested(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

/// Install the stderr subscriber; stdout stays reserved for `--show-config`.
pub fn init_tracing() {
    let Ok(directives) = std::env::var(LOG_VAR) else {
        return;
    };
    let filter = EnvFilter::builder().parse_lossy(directives);

    if tree_requested(std::env::var(TREE_VAR).ok().as_deref()) {
        let tree = tracing_tree::HierarchicalLayer::new(2)
            .with_indent_lines(true)
            .with_deferred_spans(true)
            .with_targets(true);
        Registry::default().with(filter).with(tree).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .without_time()
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::tree_requested;

    #[test]
    fn tree_output_needs_a_truthy_value() {
        assert!(tree_requested(Some("1")));
        assert!(tree_requested(Some(" TRUE ")));
        assert!(!tree_requested(Some("0")));
        assert!(!tree_requested(Some("tree-ish")));
        assert!(!tree_requested(None));
    }
}
