//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to          |
//! |------------|------------|----------------------|
//! | `log_sink` | EventSink  | `log` / `env_logger` |

pub mod log_sink;
