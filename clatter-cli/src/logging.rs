//! tracing-subscriber setup for the binaries.

use tracing_subscriber::EnvFilter;

/// Crates whose level follows `-v`; everything else stays at `warn`.
const TARGETS: &[&str] = &["clatter_core", "clatter_cli", "detector", "selector"];

pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn default_directives(verbosity: u8) -> String {
    let level = level_for(verbosity);
    let mut directives = String::from("warn");
    for target in TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// Install the global subscriber. `RUST_LOG` overrides `-v`.
pub fn init(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity))),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(3), "trace");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn directives_cover_every_target() {
        let d = default_directives(2);
        assert!(d.starts_with("warn,"));
        for target in TARGETS {
            assert!(d.contains(&format!("{target}=debug")), "{d}");
        }
    }
}
