pub mod error;
pub mod symbology;

pub mod event;
pub mod cfg;
pub mod state;
pub mod decide;
pub mod arbitrator;

pub use error::{CfgError, SymbologyError};
pub use symbology::Symbology;

pub use event::{DecodeEvent, ConfirmedScan};
pub use cfg::ArbiterCfg;
pub use state::{ArbiterState, start_session, stop_session};
pub use decide::observe;
pub use arbitrator::DetectionArbitrator;
