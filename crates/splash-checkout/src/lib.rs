//! # Splash Checkout
//!
//! Checkout session layer for the Splash water-park POS: one register, one
//! open order, a confirm button.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      UI shell (any front end)                           │
//! │   quantity / discount / payment inputs        toasts, receipt preview   │
//! └───────────────┬───────────────────────────────────────▲─────────────────┘
//!                 │ SessionState::with_session_mut        │ Notifier
//!                 ▼                                       │
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout<S, D>                                  │
//! │  SessionState ── SessionContext ── CheckoutConfig ── in-flight guard    │
//! └───────┬──────────────────────┬──────────────────────────┬───────────────┘
//!         │ pricing              │ submit (timeout)         │ dispatch
//!         ▼                      ▼                          ▼
//!   splash-core            OrderSubmitter            DocumentDispatch
//!   (pure, sync)           (backend)                 (printer / PDF)
//! ```
//!
//! ## Startup
//! ```rust,ignore
//! splash_checkout::init_tracing();
//! let config = CheckoutConfig::load()?;
//! let table = Arc::new(load_price_table(&catalog).await?);
//! let checkout = Checkout::new(config, SessionContext::new(), table, backend, printer);
//! ```

pub mod checkout;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod error;
pub mod notify;
pub mod state;

pub use checkout::{Checkout, ConfirmedOrder};
pub use collaborators::{load_price_table, CatalogSource, DocumentDispatch, OrderSubmitter};
pub use config::CheckoutConfig;
pub use context::{SessionContext, UserSession};
pub use error::{
    ApiError, CheckoutError, CheckoutResult, ConfigError, DispatchError, ErrorCode, SubmissionError,
};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use state::{CheckoutSession, SessionSnapshot, SessionState};

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG` overrides everything
/// - Default: `info`, `debug` for the splash crates
///
/// Calling it twice is harmless; the second call keeps the first subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,splash=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
