//! Core types for MediStore.
//!
//! This module provides type-safe wrappers and the records exchanged with the
//! MediStore API.

pub mod cart;
pub mod id;
pub mod order;
pub mod price;
pub mod role;
pub mod status;
pub mod user;

pub use cart::{CartItem, Medicine};
pub use id::*;
pub use order::{Order, OrderItem};
pub use price::{Price, PriceError};
pub use role::{Role, RoleError};
pub use status::OrderStatus;
pub use user::User;
