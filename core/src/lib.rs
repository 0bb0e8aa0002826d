//! # Tablekeeper Core
//!
//! Core traits and types for the Tablekeeper reducer architecture.
//!
//! Every interactive feature is described by five pieces:
//!
//! - **State**: owned domain data for the feature
//! - **Action**: every input the feature reacts to (user commands, timer feedback)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of work for the runtime (timers, async work)
//! - **Environment**: injected dependencies such as the [`Clock`](environment::Clock)
//!
//! Reducers never touch the outside world directly. A timer is returned as an
//! [`Effect::Delay`](effect::Effect::Delay), optionally wrapped in
//! [`Effect::Cancellable`](effect::Effect::Cancellable) so that a later action can
//! restart or release it.
//!
//! ## Example
//!
//! ```ignore
//! use tablekeeper_core::*;
//!
//! #[derive(Clone, Debug, Default)]
//! struct BannerState {
//!     message: Option<String>,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum BannerAction {
//!     Show(String),
//!     Expired,
//! }
//!
//! const BANNER: EffectId = EffectId::new("banner");
//!
//! impl Reducer for BannerReducer {
//!     type State = BannerState;
//!     type Action = BannerAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut BannerState,
//!         action: BannerAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<BannerAction>; 4]> {
//!         match action {
//!             BannerAction::Show(message) => {
//!                 state.message = Some(message);
//!                 smallvec![cancellable! {
//!                     id: BANNER,
//!                     effect: delay! {
//!                         duration: Duration::from_secs(3),
//!                         action: BannerAction::Expired
//!                     }
//!                 }]
//!             }
//!             BannerAction::Expired => {
//!                 state.message = None;
//!                 SmallVec::new()
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most actions produce zero or one effect, so the result is stored
        /// inline for up to four effects.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and cancellable.
pub mod effect {
    use futures::future::BoxFuture;
    use std::time::Duration;

    /// Identifier under which cancellable work is registered
    ///
    /// Ids are static labels chosen by the feature, e.g. one per timer.
    /// At most one piece of work is registered per id at any time.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Creates an id from a static label
        #[must_use]
        pub const fn new(label: &'static str) -> Self {
            Self(label)
        }

        /// Returns the label
        #[must_use]
        pub const fn as_str(&self) -> &'static str {
            self.0
        }
    }

    impl std::fmt::Display for EffectId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (timers, expiries)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(BoxFuture<'static, Option<Action>>),

        /// Run `effect` registered under `id`
        ///
        /// Work already registered under the same id is aborted first, so
        /// returning the same cancellable timer again restarts it.
        Cancellable {
            /// Registration id
            id: EffectId,
            /// The work to run
            effect: Box<Effect<Action>>,
        },

        /// Abort the work registered under the id, if any
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Register this effect under `id`, replacing earlier work with that id
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Returns true for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Returns the registration id if this is a cancellable effect
        #[must_use]
        pub const fn cancellable_id(&self) -> Option<EffectId> {
            match self {
                Effect::Cancellable { id, .. } => Some(*id),
                _ => None,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use tablekeeper_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Tick,
    }

    const TIMER: EffectId = EffectId::new("timer");

    #[test]
    fn cancellable_wraps_effect_with_id() {
        let effect = Effect::<TestAction>::None.cancellable(TIMER);

        assert_eq!(effect.cancellable_id(), Some(TIMER));
        assert!(matches!(
            effect,
            Effect::Cancellable { effect, .. } if effect.is_none()
        ));
    }

    #[test]
    fn merge_and_chain_build_composites() {
        let delay = || Effect::Delay {
            duration: std::time::Duration::from_millis(5),
            action: Box::new(TestAction::Tick),
        };

        let merged = Effect::merge(vec![delay(), Effect::Cancel(TIMER)]);
        assert!(matches!(&merged, Effect::Parallel(effects) if effects.len() == 2));

        let chained = Effect::chain(vec![delay(), merged]);
        assert!(matches!(
            &chained,
            Effect::Sequential(effects)
                if matches!(effects.as_slice(), [Effect::Delay { .. }, Effect::Parallel(_)])
        ));
    }

    #[test]
    fn debug_output_names_variants() {
        let effect = Effect::Cancellable {
            id: TIMER,
            effect: Box::new(Effect::Delay {
                duration: std::time::Duration::from_secs(1),
                action: Box::new(TestAction::Tick),
            }),
        };
        let debug = format!("{effect:?}");

        assert!(debug.contains("Effect::Cancellable"));
        assert!(debug.contains("timer"));
        assert!(debug.contains("Tick"));
        assert_eq!(format!("{:?}", Effect::<TestAction>::Cancel(TIMER)), "Effect::Cancel(EffectId(\"timer\"))");
    }

    #[test]
    fn effect_id_display() {
        assert_eq!(TIMER.to_string(), "timer");
        assert_eq!(TIMER.as_str(), "timer");
    }
}
