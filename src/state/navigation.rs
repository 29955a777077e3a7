//! Navigation-related state types.
//!
//! `Phase` is the authentication state the controller is in; `Flow` is the
//! one top-level screen flow the rendering layer mounts for it.

/// Specifying the different authentication phases.
///
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Phase {
    #[default]
    Loading,
    Unauthenticated,
    AuthenticatedNoLibrary,
    AuthenticatedReady,
}

/// Specifying the different top-level flows. Exactly one is mounted at a
/// time.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow {
    Splash,
    Auth,
    Setup,
    Main,
}

impl Phase {
    /// Return the phase an authenticated owner lands in for the given
    /// library flag. Only an explicit `false` routes to library setup.
    ///
    pub fn authenticated(is_library_created: Option<bool>) -> Phase {
        match is_library_created {
            Some(false) => Phase::AuthenticatedNoLibrary,
            _ => Phase::AuthenticatedReady,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            Phase::AuthenticatedNoLibrary | Phase::AuthenticatedReady
        )
    }

    /// Return the flow to mount for this phase.
    ///
    pub fn flow(&self) -> Flow {
        match self {
            Phase::Loading => Flow::Splash,
            Phase::Unauthenticated => Flow::Auth,
            Phase::AuthenticatedNoLibrary => Flow::Setup,
            Phase::AuthenticatedReady => Flow::Main,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Unauthenticated => "signed out",
            Phase::AuthenticatedNoLibrary => "signed in, library setup pending",
            Phase::AuthenticatedReady => "signed in",
        }
    }
}

impl Flow {
    pub fn label(&self) -> &'static str {
        match self {
            Flow::Splash => "splash",
            Flow::Auth => "auth",
            Flow::Setup => "library-setup",
            Flow::Main => "main",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phase_is_loading() {
        assert_eq!(Phase::default(), Phase::Loading);
    }

    #[test]
    fn test_each_phase_mounts_one_flow() {
        assert_eq!(Phase::Loading.flow(), Flow::Splash);
        assert_eq!(Phase::Unauthenticated.flow(), Flow::Auth);
        assert_eq!(Phase::AuthenticatedNoLibrary.flow(), Flow::Setup);
        assert_eq!(Phase::AuthenticatedReady.flow(), Flow::Main);
    }

    #[test]
    fn test_authenticated_phase_for_flag() {
        assert_eq!(Phase::authenticated(Some(true)), Phase::AuthenticatedReady);
        assert_eq!(Phase::authenticated(Some(false)), Phase::AuthenticatedNoLibrary);
        assert_eq!(Phase::authenticated(None), Phase::AuthenticatedReady);
    }

    #[test]
    fn test_is_authenticated() {
        assert!(!Phase::Loading.is_authenticated());
        assert!(!Phase::Unauthenticated.is_authenticated());
        assert!(Phase::AuthenticatedNoLibrary.is_authenticated());
        assert!(Phase::AuthenticatedReady.is_authenticated());
    }
}
