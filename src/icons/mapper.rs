use std::fmt;

use tunglyph_data::state::TunnelState;
use tunglyph_resources::ResourceSource;

/// The optional logo a packager can drop next to the application.
pub const LOGO_PATH: &str = "icon/logo.png";

pub const LOGO_RESOURCE: u32 = 7;
pub const STOPPED_RESOURCE: u32 = 8;
pub const STARTED_RESOURCE: u32 = 9;
pub const TRANSITIONAL_RESOURCE: u32 = 10;

/// Icon library holding the desktop's stock status glyphs
pub const STATUS_LIBRARY: &str = "tunnel-status";
pub const STARTED_INDEX: i32 = -106;
pub const TRANSITIONAL_INDEX: i32 = -16739;
pub const SHIELD_INDEX: i32 = -1028;

/// Candidate sources for the glyph of `state`, best first.
pub fn sources_for(state: TunnelState) -> Vec<ResourceSource> {
    match state {
        TunnelState::Started => vec![
            ResourceSource::Embedded(STARTED_RESOURCE),
            ResourceSource::system(STATUS_LIBRARY, STARTED_INDEX),
        ],
        TunnelState::Stopped => vec![ResourceSource::Embedded(STOPPED_RESOURCE)],
        TunnelState::Starting | TunnelState::Stopping | TunnelState::Unknown => vec![
            ResourceSource::system(STATUS_LIBRARY, TRANSITIONAL_INDEX),
            ResourceSource::Embedded(TRANSITIONAL_RESOURCE),
        ],
    }
}

pub fn logo_sources() -> Vec<ResourceSource> {
    vec![
        ResourceSource::FileImage(LOGO_PATH.into()),
        ResourceSource::Embedded(LOGO_RESOURCE),
    ]
}

/// The elevation shield, by name if the library has one, otherwise its first icon.
pub fn shield_sources() -> Vec<ResourceSource> {
    vec![
        ResourceSource::system(STATUS_LIBRARY, SHIELD_INDEX),
        ResourceSource::system(STATUS_LIBRARY, 0),
    ]
}

/// Why each source failed, in the order they were tried.
#[derive(Debug)]
pub struct AllSourcesFailed<E>(pub Vec<E>);

impl<E> fmt::Display for AllSourcesFailed<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "None of the {} candidate sources could be loaded", self.0.len())
    }
}

/// Tries `sources` in order and returns the first thing `attempt` manages to produce.
///
/// Every failure is kept, in order, in case nothing works out.
pub fn resolve_first<T, E, F>(
    sources: &[ResourceSource],
    mut attempt: F,
) -> Result<T, AllSourcesFailed<E>>
where
    F: FnMut(&ResourceSource) -> Result<T, E>,
    E: fmt::Display,
{
    let mut failures = Vec::with_capacity(sources.len());

    for source in sources {
        match attempt(source) {
            Ok(found) => return Ok(found),
            Err(why) => {
                tracing::debug!("Could not load {source}, trying the next source: {why}");
                failures.push(why);
            }
        }
    }

    Err(AllSourcesFailed(failures))
}

#[cfg(test)]
mod tests {
    use tunglyph_data::state::TunnelState;
    use tunglyph_resources::ResourceSource;

    use super::*;

    #[test]
    fn every_state_has_a_source() {
        for state in TunnelState::ALL {
            assert!(!sources_for(state).is_empty(), "{state} has no sources");
        }
    }

    #[test]
    fn started_and_stopped_are_distinct() {
        assert_eq!(
            sources_for(TunnelState::Started)[0],
            ResourceSource::Embedded(STARTED_RESOURCE)
        );
        assert_eq!(
            sources_for(TunnelState::Stopped)[0],
            ResourceSource::Embedded(STOPPED_RESOURCE)
        );
        assert_ne!(STARTED_RESOURCE, STOPPED_RESOURCE);
    }

    #[test]
    fn transitional_states_share_the_library_icon() {
        let expected = ResourceSource::system(STATUS_LIBRARY, TRANSITIONAL_INDEX);

        for state in [TunnelState::Starting, TunnelState::Stopping, TunnelState::Unknown] {
            assert_eq!(sources_for(state)[0], expected);
        }
    }

    #[test]
    fn logo_prefers_the_file() {
        assert_eq!(
            logo_sources(),
            [
                ResourceSource::FileImage(LOGO_PATH.into()),
                ResourceSource::Embedded(LOGO_RESOURCE)
            ]
        );
    }

    #[test]
    fn first_success_wins() {
        let sources = logo_sources();
        let mut tried = vec![];

        let found = resolve_first(&sources, |source| {
            tried.push(source.clone());
            match source {
                ResourceSource::FileImage(_) => Err("not found"),
                _ => Ok("embedded logo"),
            }
        });

        assert_eq!(found.ok(), Some("embedded logo"));
        assert_eq!(tried, sources);
    }

    #[test]
    fn stops_at_the_first_success() {
        let sources = shield_sources();
        let mut attempts = 0;

        let found = resolve_first(&sources, |_| {
            attempts += 1;
            Ok::<_, &str>(attempts)
        });

        assert_eq!(found.ok(), Some(1));
        assert_eq!(attempts, 1);
    }

    #[test]
    fn all_failures_are_kept() {
        let sources = sources_for(TunnelState::Unknown);

        let Err(failed) = resolve_first(&sources, |source| Err::<(), _>(source.to_string())) else {
            panic!("nothing can succeed here");
        };

        assert_eq!(
            failed.0,
            ["tunnel-status[-16739]", "embedded resource #10"]
        );
        assert_eq!(
            failed.to_string(),
            "None of the 2 candidate sources could be loaded"
        );
    }
}
