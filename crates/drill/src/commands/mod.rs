//! CLI command implementations.

pub(crate) mod excerpt;
pub(crate) mod run;
pub(crate) mod show;

pub(crate) use excerpt::ExcerptArgs;
pub(crate) use run::RunArgs;
pub(crate) use show::ShowArgs;

use drill_config::Config;
use drill_runner::{CachedRunner, Markers, SnippetTransformer, Toolchain};

/// Snippet transformer configured by `[markers]`.
pub(crate) fn transformer_from_config(config: &Config) -> SnippetTransformer {
    let markers = &config.markers;
    SnippetTransformer::new(Markers {
        entry_hook: markers.entry_hook.clone(),
        entry_point: markers.entry_point.clone(),
        package_from: markers.package_from.clone(),
        package_to: markers.package_to.clone(),
    })
    .with_strict(markers.strict)
}

/// Runner configured by `[build]`, `[toolchain]` and `[markers]`.
pub(crate) fn runner_from_config(config: &Config) -> CachedRunner {
    let toolchain = Toolchain {
        program: config.toolchain.program.clone(),
        run_args: config.toolchain.run_args.clone(),
        elide_prefix: config.toolchain.elide_prefix.clone(),
    };
    CachedRunner::new(config.build_resolved.root.clone(), toolchain)
        .with_transformer(transformer_from_config(config))
}
