//! Persistent entities and the request shapes that create or change them.
//!
//! Relations are plain ids resolved through the store:
//! - Shop owns Designers and Customers
//! - Treatment references Customer, Shop and optionally Designer
//! - TreatmentPhoto references Treatment
//! - Portfolio references TreatmentPhoto (weakly, by id)

mod customer;
mod page;
mod patch;
mod photo;
mod portfolio;
mod shop;
mod treatment;

pub use customer::{Customer, CustomerPatch, NewCustomer};
pub use page::Page;
pub use patch::Patch;
pub use photo::{PhotoType, TreatmentPhoto};
pub use portfolio::{NewPortfolio, Portfolio, PortfolioDetail};
pub use shop::{Designer, NewDesigner, NewShop, Shop};
pub use treatment::{
    NewTreatment, ProductUsed, Satisfaction, Treatment, TreatmentDetail, TreatmentPatch,
};
