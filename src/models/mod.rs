//! Domain models for Foodgram.
//!
//! Request inputs with their validation rules, user roles and the
//! shopping list report. Database rows live next to their queries in
//! [`crate::db`].

mod recipe;
mod shopping;
mod user;

pub use recipe::*;
pub use shopping::*;
pub use user::*;
