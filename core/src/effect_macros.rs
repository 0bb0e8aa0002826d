//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants, particularly
//! for timers that must be restartable or released later.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use tablekeeper_core::async_effect;
///
/// async_effect! {
///     let rates = fetch_rates().await;
///     Some(MenuAction::RatesLoaded { rates })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use tablekeeper_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(3),
///     action: BannerAction::Expired
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Cancellable` registered under an id
///
/// # Example
///
/// ```rust,ignore
/// use tablekeeper_core::{cancellable, delay};
///
/// cancellable! {
///     id: CLOCK_TIMER,
///     effect: delay! {
///         duration: Duration::from_secs(1),
///         action: ClockAction::Ticked
///     }
/// }
/// ```
#[macro_export]
macro_rules! cancellable {
    (
        id: $id:expr,
        effect: $effect:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($effect),
        }
    };
}
