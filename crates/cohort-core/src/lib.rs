//! Two-category bounded admission.
//!
//! A room holds up to `capacity` actors at once, all of the same
//! [`Category`]. Arrivals of the resident category are let in while slots
//! remain; the other category waits until the room empties. A fairness
//! streak keeps either side from holding the room forever: once the
//! resident category has been admitted `fairness_threshold` times in a row
//! while the other side waits, further resident arrivals hold back.
//!
//! ## Architecture
//!
//! ```text
//! cohort-core
//!   ├─ RoomState     (sans-IO state machine: predicate, admit, depart)
//!   ├─ WakeAction    (who a departure should wake)
//!   ├─ Room          (Mutex + per-category Condvar, recheck on wake)
//!   ├─ CreditRoom    (waker admits on the waiter's behalf, no streak)
//!   └─ Recorder      (statistics hook, called under the lock)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cohort_core::{Category, Room, RoomConfig};
//!
//! let room = Room::new(RoomConfig::default());
//! let first = room.enter(Category::A);
//! let second = room.enter(Category::A);
//! assert_eq!(room.snapshot().occupants, 2);
//!
//! room.leave(first);
//! room.leave(second);
//! assert_eq!(room.admissions(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod admission;
mod category;
mod config;
mod credit;
mod error;
mod recorder;
mod room;
mod state;
mod wake;

pub use admission::Admission;
pub use category::Category;
pub use config::{DEFAULT_CAPACITY, DEFAULT_FAIRNESS_THRESHOLD, RoomConfig};
pub use credit::CreditRoom;
pub use error::ConfigError;
pub use recorder::{NoopRecorder, Recorder};
pub use room::Room;
pub use state::{RoomSnapshot, RoomState};
pub use wake::WakeAction;
