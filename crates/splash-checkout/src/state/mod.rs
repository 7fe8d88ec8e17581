//! # State Module
//!
//! Mutable state of one register.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │  SessionState    │  │  SessionContext  │  │  CheckoutConfig  │      │
//! │  │                  │  │                  │  │                  │      │
//! │  │  Arc<Mutex<      │  │  watch channel   │  │  read-only after │      │
//! │  │   Checkout-      │  │  (who is signed  │  │  startup         │      │
//! │  │   Session>>      │  │   in)            │  │                  │      │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: exclusive access, lock never held across `.await`     │
//! │  • PriceTable: shared read-only behind an Arc                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;

pub use session::{CheckoutSession, SessionSnapshot, SessionState};
