//! Domain operations over the store.
//!
//! - `directory`: shops, designers and customers
//! - `treatments`: treatment record merge (create/update with visit stats)
//! - `gallery`: photos attached to treatments and the portfolio built from them

mod directory;
mod gallery;
mod treatments;

pub use directory::Directory;
pub use gallery::{Gallery, PhotoUpload};
pub use treatments::{CandidateConfirmation, TreatmentFilter, Treatments};
