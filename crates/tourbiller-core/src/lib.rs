//! # tourbiller-core: Billing & Quotation Calculation Engine
//!
//! This crate holds the arithmetic that turns raw trip and tour inputs into
//! invoiced amounts, plus the date/status derivations used by bookings and
//! dashboards. Everything here is a pure function with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       TourBiller Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 View layer (forms, print pages)                 │   │
//! │  │   Bill form ──► Invoice print      Quote form ──► Quote print   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tourbiller-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ billing  │ │quotation │ │ schedule │ │ documents        │  │   │
//! │  │   │ distance │ │ sums     │ │ status   │ │ invoice lines    │  │   │
//! │  │   │ charges  │ │ markup   │ │ refund   │ │ quotation lines  │  │   │
//! │  │   └──────────┘ └──────────┘ │ windows  │ └──────────────────┘  │   │
//! │  │                             └──────────┘                        │   │
//! │  │   NO I/O • NO DATABASE • NO AMBIENT CLOCK • PURE FUNCTIONS      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tourbiller-db (Persistence Layer)               │   │
//! │  │           SQLite queries, migrations, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer cents
//! - [`currency`] - "Rs." formatting and exchange rates
//! - [`types`] - Distance, percentages and status enums
//! - [`records`] - Persisted records and form inputs
//! - [`billing`] - Distance, base charge, extras, totals, balance
//! - [`quotation`] - Itinerary sums and quotation pricing
//! - [`schedule`] - Display status, refund decision, revenue windows
//! - [`clock`] - Injected "now"
//! - [`documents`] - Printable invoice / quotation breakdowns
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, "now" is a parameter
//! 2. **Integer Money**: amounts are cents (i64), distances are metres (i64)
//! 3. **Clamp, don't throw**: distances, totals and balances floor at zero
//!
//! ## Example Usage
//!
//! ```rust
//! use tourbiller_core::billing::{compute_bill, TripInput};
//! use tourbiller_core::{Distance, Money};
//!
//! let trip = TripInput {
//!     start_meter: Distance::from_km(100),
//!     end_meter: Distance::from_km(250),
//!     hire_rate: Money::from_major(50),
//!     waiting_charge: Money::from_major(200),
//!     gate_pass: Money::from_major(100),
//!     ..TripInput::default()
//! };
//!
//! let totals = compute_bill(&trip);
//! assert_eq!(totals.total_amount, Money::from_major(7800));
//! assert_eq!(totals.total_amount.to_string(), "Rs. 7,800.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod clock;
pub mod currency;
pub mod documents;
pub mod error;
pub mod money;
pub mod quotation;
pub mod records;
pub mod schedule;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use currency::{format_currency, ExchangeRate, DEFAULT_CURRENCY};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use records::*;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Cancellations with more than this many days of notice get their advance back.
pub const REFUND_NOTICE_DAYS: i64 = 7;

/// Company name used when no business profile has been saved yet.
pub const DEFAULT_COMPANY_NAME: &str = "My Transport Company";

/// Company name printed on documents when the profile has no name.
pub const FALLBACK_DOCUMENT_COMPANY: &str = "TourBiller Transport";

/// Default USD → LKR rate stored on a fresh business profile.
pub const DEFAULT_USD_RATE: f64 = 300.0;

/// How many rows the dashboard shows in its "recent" panels.
pub const DASHBOARD_RECENT_LIMIT: u32 = 5;
