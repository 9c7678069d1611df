//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements       | Connects to                      |
//! |------------------|------------------|----------------------------------|
//! | `hardware`       | ActuatorPort     | indicator GPIO + gate servo PWM  |
//! | `sim`            | embedded-hal     | in-memory pins (host runs)       |
//! | `log_sink`       | EventSink        | console log output               |
//! | `detection_feed` | DetectionSource  | JSON-lines detector output       |

pub mod detection_feed;
pub mod hardware;
pub mod log_sink;
pub mod sim;
